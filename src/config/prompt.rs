use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;
use log::info;

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are DeforestBot: a friendly, factual chatbot that educates users about deforestation and encourages tree planting. Keep answers concise, cite sources when asked, and always include one short \"how you can help\" action.";

#[derive(Debug)]
pub enum PromptError {
    EmptyPrompt(String),
    IoError(std::io::Error),
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::EmptyPrompt(path) => write!(f, "System prompt file '{}' is empty", path),
            PromptError::IoError(e) => write!(f, "System prompt file IO error: {}", e),
        }
    }
}

impl Error for PromptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PromptError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PromptError {
    fn from(err: std::io::Error) -> Self {
        PromptError::IoError(err)
    }
}

pub fn load_prompt_file<P: AsRef<Path>>(path: P) -> Result<String, PromptError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(PromptError::EmptyPrompt(path.display().to_string()));
    }
    Ok(trimmed.to_string())
}

/// Picks the persona text: a prompt file wins over inline text, and blank
/// inline text falls back to the built-in persona.
pub fn resolve_system_prompt(
    inline: Option<&str>,
    path: Option<&str>
) -> Result<String, PromptError> {
    if let Some(path) = path {
        info!("Loading system prompt from '{}'", path);
        return load_prompt_file(path);
    }
    match inline.map(str::trim) {
        Some(text) if !text.is_empty() => Ok(text.to_string()),
        _ => Ok(DEFAULT_SYSTEM_PROMPT.to_string()),
    }
}

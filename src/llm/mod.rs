pub mod chat;

use serde::{ Deserialize, Serialize };
use std::time::Duration;

use crate::config::RelayConfig;
use crate::models::chat::ChatMessage;

/// Connection settings for the completion provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl From<&RelayConfig> for LlmConfig {
    fn from(config: &RelayConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            base_url: config.provider_url.clone(),
            timeout: config.request_timeout,
        }
    }
}

/// Outbound chat-completion body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
}

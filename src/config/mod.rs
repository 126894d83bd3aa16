pub mod prompt;

use std::fmt;
use std::time::Duration;
use url::Url;

use crate::cli::{ ChatArgs, ServeArgs };
use crate::error::ConfigError;
use self::prompt::{ resolve_system_prompt, DEFAULT_SYSTEM_PROMPT };

pub const DEFAULT_MODEL: &str = "deepseek/deepseek-r1";
pub const DEFAULT_PROVIDER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Everything the relay needs, resolved once at startup.
#[derive(Clone)]
pub struct RelayConfig {
    pub bind_host: String,
    pub port: u16,
    pub api_key: String,
    pub allowed_origin: Option<String>,
    pub default_model: String,
    pub system_prompt: String,
    pub provider_url: String,
    pub temperature: f64,
    pub request_timeout: Duration,
}

impl RelayConfig {
    pub fn from_args(args: &ServeArgs) -> Result<Self, ConfigError> {
        let system_prompt = resolve_system_prompt(
            args.system_prompt.as_deref(),
            args.system_prompt_path.as_deref()
        )?;
        Url::parse(&args.provider_url).map_err(|source| ConfigError::InvalidUrl {
            url: args.provider_url.clone(),
            source,
        })?;

        Ok(Self {
            bind_host: args.bind_host.trim().to_string(),
            port: args.port,
            api_key: args.openrouter_api_key.clone(),
            allowed_origin: args.frontend_origin
                .clone()
                .filter(|origin| !origin.trim().is_empty()),
            default_model: args.default_model.clone(),
            system_prompt,
            provider_url: args.provider_url.clone(),
            temperature: DEFAULT_TEMPERATURE,
            request_timeout: Duration::from_secs(args.provider_timeout_secs),
        })
    }
}

impl RelayConfig {
    /// Host and port in the form `ToSocketAddrs` accepts. Hostnames resolve at
    /// bind time and a bracketed IPv6 literal such as `[::1]` loses its brackets.
    pub fn bind_target(&self) -> (&str, u16) {
        let host = self.bind_host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .unwrap_or(&self.bind_host);
        (host, self.port)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 3001,
            api_key: String::new(),
            allowed_origin: None,
            default_model: DEFAULT_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            provider_url: DEFAULT_PROVIDER_URL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            request_timeout: Duration::from_secs(60),
        }
    }
}

// Keeps the bearer key out of log lines.
impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("bind_host", &self.bind_host)
            .field("port", &self.port)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("allowed_origin", &self.allowed_origin)
            .field("default_model", &self.default_model)
            .field("provider_url", &self.provider_url)
            .field("temperature", &self.temperature)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub relay_url: Url,
    pub model: Option<String>,
    pub fun_fact_interval: Duration,
    pub request_timeout: Duration,
}

impl SessionConfig {
    pub fn from_args(args: &ChatArgs) -> Result<Self, ConfigError> {
        let relay_url = Url::parse(&args.relay_url).map_err(|source| ConfigError::InvalidUrl {
            url: args.relay_url.clone(),
            source,
        })?;

        Ok(Self {
            relay_url,
            model: args.model.clone().filter(|m| !m.trim().is_empty()),
            fun_fact_interval: Duration::from_secs(args.fun_fact_interval_secs.max(1)),
            request_timeout: Duration::from_secs(args.relay_timeout_secs),
        })
    }
}

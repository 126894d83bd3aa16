pub mod openrouter;

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use super::{ CompletionRequest, LlmConfig };
use self::openrouter::OpenRouterChatClient;
use crate::error::{ ConfigError, RelayError };

/// A provider that answers a full chat-completion request in one response.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Returns the provider payload untouched.
    async fn complete(&self, request: &CompletionRequest) -> Result<Value, RelayError>;

    fn get_base_url(&self) -> String;
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, ConfigError> {
    let client = OpenRouterChatClient::from_config(config)?;
    Ok(Arc::new(client))
}

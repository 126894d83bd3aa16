use log::{ error, info };
use serde_json::Value;
use std::sync::Arc;

use crate::config::RelayConfig;
use crate::error::{ ConfigError, RelayError };
use crate::llm::chat::{ new_client, ChatClient };
use crate::llm::{ CompletionRequest, LlmConfig };
use crate::models::chat::ChatMessage;

/// Stateless pass-through from a caller's conversation to the provider.
pub struct RelayService {
    client: Arc<dyn ChatClient>,
    system_prompt: String,
    default_model: String,
    temperature: f64,
}

impl RelayService {
    pub fn new(config: &RelayConfig, client: Arc<dyn ChatClient>) -> Self {
        Self {
            client,
            system_prompt: config.system_prompt.clone(),
            default_model: config.default_model.clone(),
            temperature: config.temperature,
        }
    }

    pub fn from_config(config: &RelayConfig) -> Result<Self, ConfigError> {
        let client = new_client(&LlmConfig::from(config))?;
        Ok(Self::new(config, client))
    }

    /// The persona always goes first, even if the caller already sent a
    /// system message.
    pub fn build_request(
        &self,
        conversation: Vec<ChatMessage>,
        model: Option<String>
    ) -> CompletionRequest {
        let mut messages = Vec::with_capacity(conversation.len() + 1);
        messages.push(ChatMessage::system(self.system_prompt.clone()));
        messages.extend(conversation);

        CompletionRequest {
            model: model.unwrap_or_else(|| self.default_model.clone()),
            messages,
            temperature: self.temperature,
        }
    }

    pub async fn relay(
        &self,
        conversation: Vec<ChatMessage>,
        model: Option<String>
    ) -> Result<Value, RelayError> {
        let request = self.build_request(conversation, model);
        info!(
            "Relaying {} message(s) to {} using model {}",
            request.messages.len(),
            self.client.get_base_url(),
            request.model
        );

        match self.client.complete(&request).await {
            Ok(payload) => Ok(payload),
            Err(e) => {
                error!("Relay to provider failed: {}", e);
                Err(e)
            }
        }
    }
}

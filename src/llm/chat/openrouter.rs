use async_trait::async_trait;
use log::{ debug, error };
use reqwest::{ Client as HttpClient, header::{ HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION } };
use serde_json::Value;
use std::time::Duration;

use super::ChatClient;
use crate::error::{ ConfigError, RelayError };
use crate::llm::{ CompletionRequest, LlmConfig };

pub struct OpenRouterChatClient {
    http: HttpClient,
    base_url: String,
}

impl OpenRouterChatClient {
    pub fn new(api_key: &str, base_url: String, timeout: Duration) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key)).map_err(|source| {
            ConfigError::InvalidHeader { name: "OPENROUTER_API_KEY", source }
        })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let http = HttpClient::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self { http, base_url })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, ConfigError> {
        Self::new(&config.api_key, config.base_url.clone(), config.timeout)
    }
}

/// Error bodies are kept as JSON when they parse, as text otherwise.
fn error_details(body: String) -> Option<Value> {
    if body.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str::<Value>(&body).unwrap_or(Value::String(body)))
}

#[async_trait]
impl ChatClient for OpenRouterChatClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Value, RelayError> {
        debug!(
            "POST {} model={} messages={}",
            self.base_url,
            request.model,
            request.messages.len()
        );

        let resp = self.http.post(&self.base_url).json(request).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("Provider responded with {}: {}", status, body);
            return Err(RelayError::Provider {
                status: status.as_u16(),
                details: error_details(body),
            });
        }

        Ok(resp.json::<Value>().await?)
    }

    fn get_base_url(&self) -> String {
        self.base_url.clone()
    }
}

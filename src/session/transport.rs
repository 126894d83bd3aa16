use async_trait::async_trait;
use log::debug;
use reqwest::Client as HttpClient;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use crate::error::{ ConfigError, TransportError };
use crate::models::chat::RelayRequest;

pub const CHAT_ROUTE: &str = "/api/chat";

/// How a chat session reaches the relay.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    async fn send(&self, request: &RelayRequest) -> Result<Value, TransportError>;
}

pub struct HttpRelayTransport {
    http: HttpClient,
    endpoint: Url,
}

impl HttpRelayTransport {
    pub fn new(relay_url: &Url, timeout: Duration) -> Result<Self, ConfigError> {
        let endpoint = relay_url.join(CHAT_ROUTE).map_err(|source| ConfigError::InvalidUrl {
            url: relay_url.to_string(),
            source,
        })?;
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl RelayTransport for HttpRelayTransport {
    async fn send(&self, request: &RelayRequest) -> Result<Value, TransportError> {
        debug!("POST {} with {} message(s)", self.endpoint, request.messages.len());
        let resp = self.http.post(self.endpoint.clone()).json(request).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;

        // Any body that is not JSON is a transport failure, whatever the status.
        let payload = serde_json
            ::from_slice::<Value>(&body)
            .map_err(|e| TransportError::Decode(e.to_string()))?;

        if !status.is_success() {
            let message = payload
                .get("error")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .unwrap_or("Server error")
                .to_string();
            return Err(TransportError::Status { status: status.as_u16(), message });
        }

        Ok(payload)
    }
}

use axum::http::StatusCode;
use axum::response::{ IntoResponse, Response };
use axum::Json;
use serde_json::Value;
use thiserror::Error;

use crate::config::prompt::PromptError;
use crate::models::chat::ErrorEnvelope;

/// Generic message sent back to callers whenever the provider call fails.
pub const PROVIDER_FAILURE: &str = "OpenRouter request failed";

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("provider returned status {status}")]
    Provider {
        status: u16,
        details: Option<Value>,
    },

    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl RelayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RelayError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            RelayError::Provider { .. } | RelayError::Transport(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        match self {
            RelayError::InvalidRequest(reason) =>
                ErrorEnvelope {
                    error: "Invalid request".to_string(),
                    details: Some(Value::String(reason.clone())),
                },
            RelayError::Provider { details, .. } =>
                ErrorEnvelope {
                    error: PROVIDER_FAILURE.to_string(),
                    details: details.clone(),
                },
            RelayError::Transport(e) =>
                ErrorEnvelope {
                    error: PROVIDER_FAILURE.to_string(),
                    details: Some(Value::String(e.to_string())),
                },
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.envelope())).into_response()
    }
}

/// Failures seen by the chat session when talking to the relay.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The relay answered with a non-2xx status and a JSON body.
    #[error("relay returned status {status}: {message}")]
    Status {
        status: u16,
        message: String,
    },

    #[error("{0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid response from relay: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load system prompt: {0}")]
    Prompt(#[from] PromptError),

    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid value for {name}: {source}")]
    InvalidHeader {
        name: &'static str,
        #[source]
        source: reqwest::header::InvalidHeaderValue,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn provider_error_keeps_details() {
        let err = RelayError::Provider {
            status: 402,
            details: Some(json!({ "error": { "message": "Insufficient credits" } })),
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let envelope = err.envelope();
        assert_eq!(envelope.error, PROVIDER_FAILURE);
        assert_eq!(envelope.details, Some(json!({ "error": { "message": "Insufficient credits" } })));
    }

    #[test]
    fn invalid_request_is_client_error() {
        let err = RelayError::InvalidRequest("messages must be an array".into());
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.envelope().error, "Invalid request");
    }
}

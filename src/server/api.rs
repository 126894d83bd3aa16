use crate::config::RelayConfig;
use crate::error::{ ConfigError, RelayError };
use crate::models::chat::RelayRequest;
use crate::relay::RelayService;
use std::error::Error;
use std::sync::Arc;
use axum::{
    routing::{ get, post },
    Router,
    Json,
    extract::{ State, rejection::JsonRejection },
    http::HeaderValue,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::cors::{ AllowOrigin, Any, CorsLayer };
use log::{ info, warn };

pub const LIVENESS_MESSAGE: &str = "Deforestation Chatbot Backend is running 🚀";

#[derive(Clone)]
struct AppState {
    relay: Arc<RelayService>,
}

fn cors_layer(allowed_origin: Option<&str>) -> Result<CorsLayer, ConfigError> {
    let origin = match allowed_origin.map(str::trim) {
        None | Some("") | Some("*") => AllowOrigin::any(),
        Some(origin) => {
            let value = HeaderValue::from_str(origin).map_err(|source| {
                ConfigError::InvalidHeader { name: "FRONTEND_ORIGIN", source }
            })?;
            AllowOrigin::exact(value)
        }
    };

    Ok(CorsLayer::new().allow_origin(origin).allow_methods(Any).allow_headers(Any))
}

pub fn router(relay: Arc<RelayService>, allowed_origin: Option<&str>) -> Result<Router, ConfigError> {
    let app = Router::new()
        .route("/", get(liveness_handler))
        .route("/api/chat", post(chat_handler))
        .layer(cors_layer(allowed_origin)?)
        .with_state(AppState { relay });
    Ok(app)
}

pub async fn bind_listener(config: &RelayConfig) -> Result<TcpListener, Box<dyn Error + Send + Sync>> {
    let (host, port) = config.bind_target();
    let listener = TcpListener
        ::bind((host, port)).await
        .map_err(|e| {
            format!("Failed to bind HTTP server to {}:{}: {}. Try a different host or port.", host, port, e)
        })?;
    Ok(listener)
}

pub async fn start_http_server(
    config: &RelayConfig,
    relay: Arc<RelayService>
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let app = router(relay, config.allowed_origin.as_deref())?;

    let listener = bind_listener(config).await?;
    info!("Backend running on http://{}", listener.local_addr()?);

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

async fn liveness_handler() -> &'static str {
    LIVENESS_MESSAGE
}

async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<RelayRequest>, JsonRejection>
) -> Result<Json<Value>, RelayError> {
    let Json(req) = payload.map_err(|rejection| {
        warn!("Rejected chat request: {}", rejection.body_text());
        RelayError::InvalidRequest(rejection.body_text())
    })?;

    let response = state.relay.relay(req.messages, req.model).await?;
    Ok(Json(response))
}

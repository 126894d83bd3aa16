use axum::body::{ to_bytes, Body };
use axum::http::{ header, Request, StatusCode };
use axum::Router;
use serde_json::{ json, Value };
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{ body_json, header as header_is, method, path };
use wiremock::{ Mock, MockServer, ResponseTemplate };

use deforestbot::config::RelayConfig;
use deforestbot::relay::RelayService;
use deforestbot::server::api::{ router, LIVENESS_MESSAGE };

const COMPLETIONS: &str = "/api/v1/chat/completions";

fn relay_config(provider_uri: &str) -> RelayConfig {
    RelayConfig {
        api_key: "sk-or-test".into(),
        system_prompt: "You are DeforestBot.".into(),
        provider_url: format!("{}{}", provider_uri, COMPLETIONS),
        request_timeout: Duration::from_secs(5),
        ..Default::default()
    }
}

fn app(config: &RelayConfig) -> Router {
    let relay = Arc::new(RelayService::from_config(config).unwrap());
    router(relay, config.allowed_origin.as_deref()).unwrap()
}

async fn post_raw(app: Router, body: String) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post_chat(app: Router, body: Value) -> (StatusCode, Value) {
    post_raw(app, body.to_string()).await
}

/// Provider payload is returned untouched and the persona goes first.
#[tokio::test]
async fn test_chat_forwards_persona_and_passes_payload_through() {
    let provider = MockServer::start().await;
    let payload = json!({
        "id": "gen-123",
        "model": "deepseek/deepseek-r1",
        "choices": [{ "message": { "role": "assistant", "content": "Forests are being cleared." } }],
        "usage": { "total_tokens": 42 }
    });

    Mock::given(method("POST"))
        .and(path(COMPLETIONS))
        .and(header_is("authorization", "Bearer sk-or-test"))
        .and(
            body_json(json!({
                "model": "deepseek/deepseek-r1",
                "messages": [
                    { "role": "system", "content": "You are DeforestBot." },
                    { "role": "user", "content": "What is deforestation?" }
                ],
                "temperature": 0.7
            }))
        )
        .respond_with(ResponseTemplate::new(200).set_body_json(payload.clone()))
        .expect(1)
        .mount(&provider).await;

    let (status, body) = post_chat(
        app(&relay_config(&provider.uri())),
        json!({ "messages": [{ "role": "user", "content": "What is deforestation?" }] })
    ).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, payload);
}

#[tokio::test]
async fn test_chat_keeps_caller_system_message_after_persona() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "output": "ok" })))
        .mount(&provider).await;

    let (status, _) = post_chat(
        app(&relay_config(&provider.uri())),
        json!({
            "model": "openai/gpt-4o-mini",
            "messages": [
                { "role": "system", "content": "caller persona" },
                { "role": "user", "content": "hi" }
            ]
        })
    ).await;
    assert_eq!(status, StatusCode::OK);

    let received = provider.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    let sent: Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(sent["model"], "openai/gpt-4o-mini");
    assert_eq!(
        sent["messages"],
        json!([
            { "role": "system", "content": "You are DeforestBot." },
            { "role": "system", "content": "caller persona" },
            { "role": "user", "content": "hi" }
        ])
    );
}

#[tokio::test]
async fn test_chat_with_missing_messages_sends_persona_only() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&provider).await;

    let (status, _) = post_chat(app(&relay_config(&provider.uri())), json!({})).await;
    assert_eq!(status, StatusCode::OK);

    let received = provider.received_requests().await.unwrap();
    let sent: Value = serde_json::from_slice(&received[0].body).unwrap();
    assert_eq!(sent["messages"], json!([{ "role": "system", "content": "You are DeforestBot." }]));
}

#[tokio::test]
async fn test_provider_error_becomes_envelope() {
    let provider = MockServer::start().await;
    let provider_error = json!({ "error": { "code": 402, "message": "Insufficient credits" } });
    Mock::given(method("POST"))
        .and(path(COMPLETIONS))
        .respond_with(ResponseTemplate::new(402).set_body_json(provider_error.clone()))
        .expect(1)
        .mount(&provider).await;

    let (status, body) = post_chat(
        app(&relay_config(&provider.uri())),
        json!({ "messages": [{ "role": "user", "content": "hello" }] })
    ).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "OpenRouter request failed", "details": provider_error }));
}

#[tokio::test]
async fn test_unreachable_provider_becomes_envelope() {
    let closed_uri = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };

    let app = app(&relay_config(&closed_uri));
    let (status, body) = post_chat(
        app.clone(),
        json!({ "messages": [{ "role": "user", "content": "hello" }] })
    ).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "OpenRouter request failed");
    assert!(body["details"].is_string());

    // the relay keeps serving after a failed call
    let (status, _) = post_chat(app, json!({ "messages": [] })).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_non_array_messages_is_rejected_without_provider_call() {
    let provider = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(COMPLETIONS))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&provider).await;

    let app = app(&relay_config(&provider.uri()));
    let (status, body) = post_chat(app.clone(), json!({ "messages": "hello" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request");

    let (status, _) = post_raw(app, "{not json".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_liveness_route() {
    let app = app(&RelayConfig::default());
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap()).await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(std::str::from_utf8(&bytes).unwrap(), LIVENESS_MESSAGE);
}

#[tokio::test]
async fn test_cors_allows_configured_origin() {
    let config = RelayConfig {
        allowed_origin: Some("http://localhost:5173".into()),
        ..Default::default()
    };
    let response = app(&config)
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::ORIGIN, "http://localhost:5173")
                .body(Body::empty())
                .unwrap()
        ).await
        .unwrap();

    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "http://localhost:5173"
    );
}

//! Thin proxy to an OpenAI-compatible chat completions endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, error, warn};

use crate::config::ChatConfig;

/// Appended to every forwarded message.
pub const BREVITY_SUFFIX: &str = " (Answer in 2-3 short sentences maximum. Be extremely concise and conversational. Use only plain paragraphs. Do not use tables, lists, or bold formatting.)";

pub const EMPTY_MESSAGE_REPLY: &str = "I didn't hear anything!";
pub const EMPTY_RESPONSE_REPLY: &str = "I received a response, but it was empty.";
pub const NOT_CONFIGURED_REPLY: &str =
    "I'm having trouble accessing my brain (credentials missing).";
pub const UPSTREAM_FAILURE_REPLY: &str =
    "Sorry, I'm having trouble connecting to the AI agent right now.";

#[derive(Debug, Clone)]
struct Upstream {
    endpoint: String,
    api_key: String,
}

/// Forwards single messages upstream and extracts the reply text.
#[derive(Debug, Clone)]
pub struct ChatProxy {
    client: reqwest::Client,
    upstream: Option<Upstream>,
}

impl ChatProxy {
    /// Builds a proxy. Without both an endpoint and a key the proxy is
    /// created unconfigured and every call fails with [`ChatError::NotConfigured`].
    pub fn new(config: &ChatConfig) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        let upstream = match (&config.endpoint, &config.api_key) {
            (Some(endpoint), Some(api_key)) => Some(Upstream {
                endpoint: endpoint.clone(),
                api_key: api_key.clone(),
            }),
            _ => None,
        };

        Ok(Self { client, upstream })
    }

    pub fn is_configured(&self) -> bool {
        self.upstream.is_some()
    }

    pub async fn reply(&self, message: &str) -> Result<String, ChatError> {
        let upstream = self.upstream.as_ref().ok_or(ChatError::NotConfigured)?;

        debug!(endpoint = %upstream.endpoint, "forwarding chat message");
        let response = self
            .client
            .post(&upstream.endpoint)
            .bearer_auth(&upstream.api_key)
            .json(&completion_request(message))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response.json().await?;
        Ok(extract_reply(&payload).unwrap_or_else(|| EMPTY_RESPONSE_REPLY.to_string()))
    }
}

/// Request body sent upstream for one user message.
pub fn completion_request(message: &str) -> Value {
    json!({
        "messages": [
            { "role": "user", "content": format!("{message}{BREVITY_SUFFIX}") }
        ]
    })
}

/// Pulls the reply text from `choices[0].message.content`, falling back to
/// a top-level `answer` field.
pub fn extract_reply(payload: &Value) -> Option<String> {
    payload
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .or_else(|| payload.get("answer").and_then(Value::as_str))
        .map(str::to_string)
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("chat endpoint or API key is not configured")]
    NotConfigured,
    #[error("chat request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("chat endpoint answered {status}: {body}")]
    Status { status: u16, body: String },
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    #[serde(default)]
    message: String,
}

/// Router builder exposing the chat endpoint.
pub fn chat_router(proxy: Arc<ChatProxy>) -> Router {
    Router::new()
        .route("/api/v1/chat", post(chat_handler))
        .with_state(proxy)
}

async fn chat_handler(
    State(proxy): State<Arc<ChatProxy>>,
    request: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match request {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let body = json!({ "error": rejection.body_text(), "reply": EMPTY_MESSAGE_REPLY });
            return (StatusCode::BAD_REQUEST, Json(body)).into_response();
        }
    };
    let message = request.message.trim();
    if message.is_empty() {
        return reply(StatusCode::BAD_REQUEST, EMPTY_MESSAGE_REPLY);
    }

    match proxy.reply(message).await {
        Ok(text) => reply(StatusCode::OK, &text),
        Err(ChatError::NotConfigured) => {
            error!("chat requested but no endpoint credentials are configured");
            reply(StatusCode::SERVICE_UNAVAILABLE, NOT_CONFIGURED_REPLY)
        }
        Err(err) => {
            warn!(error = %err, "chat upstream failed");
            reply(StatusCode::BAD_GATEWAY, UPSTREAM_FAILURE_REPLY)
        }
    }
}

fn reply(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "reply": text }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use tower::ServiceExt;

    fn proxy(endpoint: Option<&str>, api_key: Option<&str>) -> Arc<ChatProxy> {
        let config = ChatConfig {
            endpoint: endpoint.map(str::to_string),
            api_key: api_key.map(str::to_string),
            timeout_secs: 2,
        };
        Arc::new(ChatProxy::new(&config).expect("client builds"))
    }

    async fn post_chat(proxy: Arc<ChatProxy>, body: Value) -> (StatusCode, Value) {
        let response = chat_router(proxy)
            .oneshot(
                Request::post("/api/v1/chat")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .expect("route executes");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 16 * 1024)
            .await
            .expect("read body");
        (status, serde_json::from_slice(&bytes).expect("json payload"))
    }

    #[test]
    fn extracts_openai_style_content() {
        let payload = json!({
            "choices": [{ "message": { "role": "assistant", "content": "Try co-op programs." } }]
        });
        assert_eq!(extract_reply(&payload).as_deref(), Some("Try co-op programs."));
    }

    #[test]
    fn falls_back_to_answer_field() {
        let payload = json!({ "choices": [], "answer": "Waterloo is a good fit." });
        assert_eq!(
            extract_reply(&payload).as_deref(),
            Some("Waterloo is a good fit.")
        );
        assert_eq!(extract_reply(&json!({ "id": "x" })), None);
    }

    #[test]
    fn request_body_carries_brevity_instruction() {
        let body = completion_request("Which program suits me?");
        let content = body["messages"][0]["content"].as_str().unwrap();
        assert_eq!(body["messages"][0]["role"], json!("user"));
        assert!(content.starts_with("Which program suits me? (Answer in 2-3"));
    }

    #[test]
    fn proxy_requires_endpoint_and_key() {
        assert!(!proxy(Some("http://127.0.0.1:9/chat"), None).is_configured());
        assert!(!proxy(None, Some("key")).is_configured());
        assert!(proxy(Some("http://127.0.0.1:9/chat"), Some("key")).is_configured());
    }

    #[tokio::test]
    async fn empty_message_is_rejected() {
        let (status, body) = post_chat(proxy(None, None), json!({ "message": "   " })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["reply"], json!(EMPTY_MESSAGE_REPLY));

        let (status, _) = post_chat(proxy(None, None), json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_body_is_answered_with_json() {
        let response = chat_router(proxy(None, None))
            .oneshot(
                Request::post("/api/v1/chat")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("message=hello"))
                    .unwrap(),
            )
            .await
            .expect("route executes");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let bytes = axum::body::to_bytes(response.into_body(), 16 * 1024)
            .await
            .expect("read body");
        let body: Value = serde_json::from_slice(&bytes).expect("json payload");
        assert!(body["error"].as_str().is_some_and(|text| !text.is_empty()));
        assert_eq!(body["reply"], json!(EMPTY_MESSAGE_REPLY));
    }

    #[tokio::test]
    async fn unconfigured_proxy_returns_fallback_reply() {
        let (status, body) = post_chat(proxy(None, None), json!({ "message": "hello" })).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["reply"], json!(NOT_CONFIGURED_REPLY));
    }

    #[tokio::test]
    async fn unreachable_upstream_maps_to_bad_gateway() {
        let proxy = proxy(Some("http://127.0.0.1:9/v1/chat/completions"), Some("key"));
        let (status, body) = post_chat(proxy, json!({ "message": "hello" })).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["reply"], json!(UPSTREAM_FAILURE_REPLY));
    }
}

//! HTTP surface: the XenForo notification webhook and inbound OneBot
//! message events.

use crate::commands::Dispatcher;
use crate::config::ConfigHandle;
use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware as axum_middleware,
    middleware::Next,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use napcat_client::NapCatClient;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, warn};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Configuration holder (reloaded per command)
    pub config: Arc<ConfigHandle>,
    /// Chat backend client
    pub chat: Arc<NapCatClient>,
    /// Command dispatcher
    pub dispatcher: Arc<Dispatcher>,
}

/// Webhook failure modes, mapped to HTTP statuses.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("invalid key")]
    InvalidKey,

    #[error("missing parameters")]
    MissingParameters,

    #[error("send failed: {0}")]
    SendFailed(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::InvalidKey => StatusCode::UNAUTHORIZED,
            WebhookError::MissingParameters => StatusCode::BAD_REQUEST,
            WebhookError::SendFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorResponse {
            error: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Create the HTTP router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/xenforo/notify", post(xenforo_notify))
        .route("/onebot/event", post(onebot_event))
        .layer(axum_middleware::from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness + chat backend reachability.
async fn health(State(state): State<AppState>) -> Json<Value> {
    let napcat_healthy = state.chat.health_check().await;
    Json(json!({
        "status": "ok",
        "napcat_healthy": napcat_healthy,
    }))
}

/// `group_id` arrives as a string or a number depending on the sender.
fn group_id_field(payload: &Value) -> String {
    match payload.get("group_id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Inbound forum notification: validate the shared secret, then relay the
/// message verbatim to the target group. One send per request, no retry.
async fn xenforo_notify(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, WebhookError> {
    let cfg = state.config.current().await;

    let provided = headers
        .get("X-API-Key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if cfg.webhook_token.is_empty() || provided != cfg.webhook_token {
        warn!("Webhook rejected: invalid key");
        return Err(WebhookError::InvalidKey);
    }

    let group_id = group_id_field(&payload);
    let message = payload
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("");
    if group_id.is_empty() || message.is_empty() {
        return Err(WebhookError::MissingParameters);
    }

    let event_type = payload
        .get("event_type")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    info!(event_type, group_id = %group_id, "Forwarding forum notification");

    state
        .chat
        .send_group_msg(&group_id, message)
        .await
        .map_err(|e| WebhookError::SendFailed(e.to_string()))?;

    Ok(Json(json!({ "status": "success" })))
}

/// Inbound OneBot event push. Group text messages are dispatched on a
/// spawned task so the event endpoint never waits on the forum API.
async fn onebot_event(State(state): State<AppState>, Json(event): Json<Value>) -> StatusCode {
    let post_type = event.get("post_type").and_then(Value::as_str);
    let message_type = event.get("message_type").and_then(Value::as_str);
    if post_type != Some("message") || message_type != Some("group") {
        return StatusCode::NO_CONTENT;
    }

    let group_id = group_id_field(&event);
    let text = event
        .get("raw_message")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string();
    if group_id.is_empty() || text.is_empty() {
        return StatusCode::NO_CONTENT;
    }

    tokio::spawn(async move {
        if let Some(reply) = state.dispatcher.dispatch(&text).await {
            if let Err(e) = state.chat.send_group_msg(&group_id, &reply).await {
                error!(group_id = %group_id, "Failed to send reply: {}", e);
            }
        }
    });

    StatusCode::NO_CONTENT
}

/// Logging middleware for requests.
async fn logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = std::time::Instant::now();

    let response = next.run(request).await;

    let duration = start.elapsed();
    let status = response.status();

    if status.is_server_error() || status.is_client_error() {
        warn!(%method, %uri, %status, ?duration, "Request failed");
    } else {
        debug!(%method, %uri, %status, ?duration, "Request completed");
    }

    response
}

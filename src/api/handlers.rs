//! HTTP request handlers

use super::AppState;
use crate::telegram::Update;
use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::Value;
use tower_http::trace::TraceLayer;

/// Body Telegram expects on every acknowledged request
const ACK: &str = "!";

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Webhook registration
        .route("/", get(register_webhook))
        // Update delivery
        .route("/:token", post(receive_update))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================
// Update Delivery
// ============================================================

async fn receive_update(
    State(state): State<AppState>,
    Path(token): Path<String>,
    body: Bytes,
) -> Result<&'static str, AppError> {
    if token != *state.token {
        return Err(AppError::NotFound);
    }

    let raw: Value = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid JSON: {e}")))?;

    // Anything we cannot use is still acknowledged so Telegram stops redelivering it
    let raw_update_id = update_id_of(&raw);
    let update = match serde_json::from_value::<Update>(raw) {
        Ok(update) => update,
        Err(e) => {
            tracing::warn!(update_id = ?raw_update_id, error = %e, "Ignoring malformed update");
            return Ok(ACK);
        }
    };

    let update_id = update.update_id;
    match update.into_inbound() {
        Some(inbound) => {
            if let Err(e) = state.dispatcher.dispatch(inbound).await {
                tracing::error!(update_id, error = %e, "Failed to dispatch update");
            }
        }
        None => tracing::debug!(update_id, "Ignoring unsupported update"),
    }

    Ok(ACK)
}

/// Best-effort update id for logging bodies that fail typed parsing
fn update_id_of(raw: &Value) -> Option<i64> {
    raw.get("update_id").and_then(Value::as_i64)
}

// ============================================================
// Webhook Registration
// ============================================================

async fn register_webhook(State(state): State<AppState>) -> Result<&'static str, AppError> {
    state
        .telegram
        .delete_webhook()
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;
    state
        .telegram
        .set_webhook(&state.webhook_url())
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))?;

    tracing::info!(base = %state.webhook_base, "Webhook registered");
    Ok(ACK)
}

// ============================================================
// Error Handling
// ============================================================

#[derive(Debug)]
enum AppError {
    BadRequest(String),
    NotFound,
    Upstream(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            AppError::NotFound => StatusCode::NOT_FOUND.into_response(),
            AppError::Upstream(msg) => {
                tracing::error!(error = %msg, "Webhook registration failed");
                (StatusCode::BAD_GATEWAY, msg).into_response()
            }
        }
    }
}

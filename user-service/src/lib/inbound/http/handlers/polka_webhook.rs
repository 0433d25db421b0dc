use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use serde::Deserialize;

use super::authorization;
use super::ApiError;
use crate::domain::user::models::UserId;
use crate::inbound::http::router::AppState;

const USER_UPGRADED_EVENT: &str = "user.upgraded";

/// Payment provider callback. The key is checked before the body is read.
pub async fn polka_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    state
        .session_service
        .verify_webhook_key(authorization(&headers))?;

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid webhook payload: {}", e)))?;

    if event.event != USER_UPGRADED_EVENT {
        tracing::debug!(event = %event.event, "Ignoring webhook event");
        return Ok(StatusCode::NO_CONTENT);
    }

    let user_id = event
        .data
        .user_id
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("Missing user_id".to_string()))
        .and_then(|id| {
            UserId::from_string(id).map_err(|e| ApiError::BadRequest(e.to_string()))
        })?;

    state.user_service.upgrade_to_chirpy_red(&user_id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
struct WebhookEvent {
    event: String,
    #[serde(default)]
    data: WebhookData,
}

#[derive(Debug, Default, Deserialize)]
struct WebhookData {
    user_id: Option<String>,
}

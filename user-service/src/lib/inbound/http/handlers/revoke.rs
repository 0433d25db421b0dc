use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;

use super::authorization;
use super::ApiError;
use crate::inbound::http::router::AppState;

pub async fn revoke(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, ApiError> {
    state
        .session_service
        .revoke(authorization(&headers))
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

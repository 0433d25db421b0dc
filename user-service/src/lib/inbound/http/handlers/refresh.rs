use axum::extract::State;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use serde::Serialize;

use super::authorization;
use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::router::AppState;

/// Exchange the `Bearer` refresh token for a fresh access token.
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<ApiSuccess<RefreshResponseData>, ApiError> {
    let token = state
        .session_service
        .refresh(authorization(&headers))
        .await?;

    Ok(ApiSuccess::new(StatusCode::OK, RefreshResponseData { token }))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshResponseData {
    pub token: String,
}

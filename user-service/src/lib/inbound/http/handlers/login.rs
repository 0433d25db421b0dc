use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::session::models::LoginCommand;
use crate::inbound::http::router::AppState;

pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequestBody>, JsonRejection>,
) -> Result<ApiSuccess<LoginResponseData>, ApiError> {
    // Unreadable credentials fail the same way wrong ones do.
    let Json(body) = body.map_err(|e| {
        tracing::debug!(error = %e, "Login body rejected");
        ApiError::Unauthorized
    })?;

    let session = state
        .session_service
        .login(LoginCommand {
            email: body.email,
            password: body.password,
            expires_in_seconds: body.expires_in_seconds,
        })
        .await?;

    let user = state
        .user_service
        .get_user(&session.user_id)
        .await
        .map_err(|e| ApiError::InternalServerError(format!("Logged-in user lookup failed: {}", e)))?;

    Ok(ApiSuccess::new(
        StatusCode::OK,
        LoginResponseData {
            user: (&user).into(),
            token: session.access_token,
            refresh_token: session.refresh_token,
        },
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginRequestBody {
    email: String,
    password: String,
    #[serde(default)]
    expires_in_seconds: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponseData {
    #[serde(flatten)]
    pub user: UserData,
    pub token: String,
    pub refresh_token: String,
}

use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::ChirpData;
use crate::domain::chirp::errors::ChirpError;
use crate::domain::chirp::models::ChirpBody;
use crate::domain::chirp::models::CreateChirpCommand;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

/// Publish a chirp as the user the access token belongs to.
pub async fn create_chirp(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(body): Json<CreateChirpRequest>,
) -> Result<ApiSuccess<ChirpData>, ApiError> {
    let command = CreateChirpCommand {
        body: ChirpBody::new(body.body).map_err(ChirpError::from)?,
        author_id: caller.user_id,
    };

    state
        .chirp_service
        .create_chirp(command)
        .await
        .map_err(ApiError::from)
        .map(|ref chirp| ApiSuccess::new(StatusCode::CREATED, chirp.into()))
}

/// HTTP request body for creating a chirp (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreateChirpRequest {
    body: String,
}

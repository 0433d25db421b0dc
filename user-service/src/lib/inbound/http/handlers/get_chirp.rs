use axum::extract::Path;
use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::ChirpData;
use crate::domain::chirp::models::ChirpId;
use crate::inbound::http::router::AppState;

pub async fn get_chirp(
    State(state): State<AppState>,
    Path(chirp_id): Path<String>,
) -> Result<ApiSuccess<ChirpData>, ApiError> {
    let chirp_id =
        ChirpId::from_string(&chirp_id).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    state
        .chirp_service
        .get_chirp(&chirp_id)
        .await
        .map_err(ApiError::from)
        .map(|ref chirp| ApiSuccess::new(StatusCode::OK, chirp.into()))
}

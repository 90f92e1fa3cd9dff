use axum::extract::{Path, State};
use axum::Json;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::lookups::fetch_copy;
use crate::core::state::AppState;
use crate::schemas::claim::{FlagRequest, FlagResponse, RectifyRequest, RectifyResponse};

// Nothing is persisted yet: both endpoints acknowledge and echo the request.

pub(super) async fn request_rectification(
    Path((exam_id, copy_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<RectifyRequest>,
) -> Result<Json<RectifyResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let copy = fetch_copy(&state, &exam_id, &copy_id).await?;

    tracing::info!(
        user_id = %user.id,
        exam_id = %exam_id,
        copy_id = %copy.id,
        action = "copy_rectify",
        "Rectification requested"
    );

    Ok(Json(RectifyResponse { status: "rectification requested", message: payload.message }))
}

pub(super) async fn flag_copy(
    Path((exam_id, copy_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<FlagRequest>,
) -> Result<Json<FlagResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let copy = fetch_copy(&state, &exam_id, &copy_id).await?;

    tracing::info!(
        user_id = %user.id,
        exam_id = %exam_id,
        copy_id = %copy.id,
        action = "copy_flag",
        "Copy flagged"
    );

    Ok(Json(FlagResponse { status: "flagged", reason: payload.reason }))
}

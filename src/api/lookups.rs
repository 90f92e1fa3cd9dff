use crate::api::errors::ApiError;
use crate::core::state::AppState;
use crate::db::models::{Copy, Exam};
use crate::repositories;

pub(crate) async fn fetch_exam(state: &AppState, exam_id: &str) -> Result<Exam, ApiError> {
    let exam = repositories::exams::find_by_id(state.db(), exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?;

    exam.ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))
}

pub(crate) async fn ensure_exam_exists(state: &AppState, exam_id: &str) -> Result<(), ApiError> {
    let exists = repositories::exams::exists(state.db(), exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?;

    if exists {
        Ok(())
    } else {
        Err(ApiError::NotFound("Exam not found".to_string()))
    }
}

/// A copy is only visible through the exam it belongs to.
pub(crate) async fn fetch_copy(
    state: &AppState,
    exam_id: &str,
    copy_id: &str,
) -> Result<Copy, ApiError> {
    let copy = repositories::copies::find_in_exam(state.db(), exam_id, copy_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch copy"))?;

    copy.ok_or_else(|| ApiError::NotFound("Copy not found".to_string()))
}

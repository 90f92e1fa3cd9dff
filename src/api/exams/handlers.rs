use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::lookups::fetch_exam;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::exam::{
    ExamCreate, ExamResponse, ExamUpdate, ReportKind, ReportQuery, ReportResponse,
};

pub(super) async fn create_exam(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<ExamCreate>,
) -> Result<(StatusCode, Json<ExamResponse>), ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let exam_id = Uuid::new_v4().to_string();
    let exam = repositories::exams::create(
        state.db(),
        repositories::exams::CreateExam {
            id: &exam_id,
            course: payload.course.trim(),
            date: payload.date,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create exam"))?;

    tracing::info!(
        user_id = %user.id,
        exam_id = %exam.id,
        action = "exam_create",
        "Exam created"
    );

    Ok((StatusCode::CREATED, Json(ExamResponse::from(exam))))
}

pub(super) async fn list_exams(
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<ExamResponse>>, ApiError> {
    let exams = repositories::exams::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list exams"))?;

    Ok(Json(exams.into_iter().map(ExamResponse::from).collect()))
}

pub(super) async fn get_exam(
    Path(exam_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ExamResponse>, ApiError> {
    let exam = fetch_exam(&state, &exam_id).await?;
    Ok(Json(ExamResponse::from(exam)))
}

pub(super) async fn update_exam(
    Path(exam_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Json(payload): Json<ExamUpdate>,
) -> Result<Json<ExamResponse>, ApiError> {
    payload.validate().map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let updated = repositories::exams::update(
        state.db(),
        &exam_id,
        repositories::exams::UpdateExam {
            course: payload.course.map(|course| course.trim().to_string()),
            date: payload.date,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update exam"))?;

    let Some(exam) = updated else {
        return Err(ApiError::NotFound("Exam not found".to_string()));
    };

    tracing::info!(user_id = %user.id, exam_id = %exam.id, action = "exam_update", "Exam updated");

    Ok(Json(ExamResponse::from(exam)))
}

pub(super) async fn delete_exam(
    Path(exam_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let deleted = repositories::exams::delete_by_id(state.db(), &exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete exam"))?;

    if !deleted {
        return Err(ApiError::NotFound("Exam not found".to_string()));
    }

    tracing::info!(user_id = %user.id, exam_id = %exam_id, action = "exam_delete", "Exam deleted");

    Ok(StatusCode::NO_CONTENT)
}

pub(super) async fn exam_report(
    Path(exam_id): Path<String>,
    Query(query): Query<ReportQuery>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ReportResponse>, ApiError> {
    let kind = ReportKind::parse(query.kind.as_deref()).ok_or_else(|| {
        ApiError::BadRequest("Report type must be 'summary' or 'detailed'".to_string())
    })?;

    let exam = fetch_exam(&state, &exam_id).await?;
    let stats = repositories::exams::copy_stats(state.db(), &exam.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to compute exam report"))?;

    Ok(Json(ReportResponse::new(exam.id, kind, stats)))
}

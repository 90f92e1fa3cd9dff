use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentUser;
use crate::api::lookups::{ensure_exam_exists, fetch_copy};
use crate::api::validation::{sanitized_filename, validate_copy_extension};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::copy::{
    AnnotationsResponse, BatchCorrectionResponse, CopyFailure, CopyResponse, GradeResponse,
    UploadResponse,
};
use crate::services::correction;

/// A received file, hashed while streaming. The bytes themselves are not kept.
struct ReceivedFile {
    copy_id: String,
    original_filename: String,
    file_path: String,
    content_sha256: String,
    file_size: i64,
}

pub(super) async fn upload_copies(
    Path(exam_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    ensure_exam_exists(&state, &exam_id).await?;

    let storage = state.settings().storage();
    let max_bytes = storage.max_upload_bytes();
    let mut received: Vec<ReceivedFile> = Vec::new();

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Invalid multipart data".to_string()))?
    {
        let Some(original_filename) = field.file_name().map(ToString::to_string) else {
            continue;
        };

        if received.len() as u64 >= storage.max_files_per_upload {
            return Err(ApiError::BadRequest(format!(
                "At most {} files can be uploaded at once",
                storage.max_files_per_upload
            )));
        }

        validate_copy_extension(&original_filename, &storage.allowed_copy_extensions)?;

        let mut hasher = Sha256::new();
        let mut size: u64 = 0;
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|_| ApiError::BadRequest("Failed to read file".to_string()))?
        {
            size += chunk.len() as u64;
            if size > max_bytes {
                return Err(ApiError::BadRequest(format!(
                    "File '{original_filename}' exceeds {}MB limit",
                    storage.max_upload_size_mb
                )));
            }
            hasher.update(&chunk);
        }

        if size == 0 {
            return Err(ApiError::BadRequest(format!("File '{original_filename}' is empty")));
        }

        let copy_id = Uuid::new_v4().to_string();
        let file_path = format!(
            "{}/{exam_id}/{copy_id}_{}",
            storage.upload_dir,
            sanitized_filename(&original_filename)
        );

        received.push(ReceivedFile {
            copy_id,
            original_filename,
            file_path,
            content_sha256: hex::encode(hasher.finalize()),
            file_size: size as i64,
        });
    }

    if received.is_empty() {
        return Err(ApiError::BadRequest("No files uploaded".to_string()));
    }

    let now = primitive_now_utc();
    let mut tx = state
        .db()
        .begin()
        .await
        .map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let mut copies = Vec::with_capacity(received.len());
    for file in &received {
        let copy = repositories::copies::create(
            &mut *tx,
            repositories::copies::CreateCopy {
                id: &file.copy_id,
                exam_id: &exam_id,
                file_path: Some(&file.file_path),
                original_filename: Some(&file.original_filename),
                content_sha256: Some(&file.content_sha256),
                file_size: Some(file.file_size),
                created_at: now,
            },
        )
        .await
        .map_err(|e| ApiError::internal(e, "Failed to register copy"))?;
        copies.push(CopyResponse::from(copy));
    }

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit transaction"))?;

    metrics::counter!("copies_uploaded_total").increment(copies.len() as u64);
    tracing::info!(
        user_id = %user.id,
        exam_id = %exam_id,
        uploaded = copies.len(),
        action = "copies_upload",
        "Copies uploaded"
    );

    let first_copy_id = copies[0].id.clone();
    Ok((
        StatusCode::CREATED,
        Json(UploadResponse { uploaded_count: copies.len(), first_copy_id, copies }),
    ))
}

pub(super) async fn list_copies(
    Path(exam_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CopyResponse>>, ApiError> {
    ensure_exam_exists(&state, &exam_id).await?;

    let copies = repositories::copies::list_by_exam(state.db(), &exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list copies"))?;

    Ok(Json(copies.into_iter().map(CopyResponse::from).collect()))
}

pub(super) async fn get_copy(
    Path((exam_id, copy_id)): Path<(String, String)>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<CopyResponse>, ApiError> {
    let copy = fetch_copy(&state, &exam_id, &copy_id).await?;
    Ok(Json(CopyResponse::from(copy)))
}

pub(super) async fn correct_copy(
    Path((exam_id, copy_id)): Path<(String, String)>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<CopyResponse>, ApiError> {
    let copy = fetch_copy(&state, &exam_id, &copy_id).await?;

    let corrected = correction::correct_copy(&state, &copy)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to store correction"))?;

    tracing::debug!(user_id = %user.id, copy_id = %corrected.id, "Correction requested");

    Ok(Json(CopyResponse::from(corrected)))
}

pub(super) async fn correct_all_copies(
    Path(exam_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<BatchCorrectionResponse>, ApiError> {
    ensure_exam_exists(&state, &exam_id).await?;

    let report = correction::correct_all(&state, &exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load copies for correction"))?;

    tracing::debug!(user_id = %user.id, exam_id = %exam_id, "Batch correction requested");

    Ok(Json(BatchCorrectionResponse {
        exam_id,
        total: report.total,
        corrected: report.corrected.into_iter().map(CopyResponse::from).collect(),
        failed: report
            .failed
            .into_iter()
            .map(|failure| CopyFailure { copy_id: failure.copy_id, error: failure.error })
            .collect(),
    }))
}

pub(super) async fn copy_grade(
    Path((exam_id, copy_id)): Path<(String, String)>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<GradeResponse>, ApiError> {
    let copy = fetch_copy(&state, &exam_id, &copy_id).await?;
    Ok(Json(GradeResponse { grade: copy.grade }))
}

pub(super) async fn copy_annotations(
    Path((exam_id, copy_id)): Path<(String, String)>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<AnnotationsResponse>, ApiError> {
    let copy = fetch_copy(&state, &exam_id, &copy_id).await?;
    Ok(Json(AnnotationsResponse { annotations: copy.annotations.map(|value| value.0) }))
}

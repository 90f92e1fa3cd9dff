use sqlx::types::Json;
use sqlx::{PgExecutor, PgPool};
use time::PrimitiveDateTime;

use crate::db::models::Copy;

pub(crate) const COLUMNS: &str = "\
    id, exam_id, file_path, original_filename, content_sha256, file_size, \
    grade, annotations, corrected_at, created_at";

pub(crate) struct CreateCopy<'a> {
    pub id: &'a str,
    pub exam_id: &'a str,
    pub file_path: Option<&'a str>,
    pub original_filename: Option<&'a str>,
    pub content_sha256: Option<&'a str>,
    pub file_size: Option<i64>,
    pub created_at: PrimitiveDateTime,
}

pub(crate) async fn create<'e, E>(executor: E, params: CreateCopy<'_>) -> Result<Copy, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Copy>(&format!(
        "INSERT INTO copies (
            id, exam_id, file_path, original_filename, content_sha256, file_size, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7)
        RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.exam_id)
    .bind(params.file_path)
    .bind(params.original_filename)
    .bind(params.content_sha256)
    .bind(params.file_size)
    .bind(params.created_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn list_by_exam(pool: &PgPool, exam_id: &str) -> Result<Vec<Copy>, sqlx::Error> {
    sqlx::query_as::<_, Copy>(&format!(
        "SELECT {COLUMNS} FROM copies WHERE exam_id = $1 ORDER BY created_at, id"
    ))
    .bind(exam_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_in_exam(
    pool: &PgPool,
    exam_id: &str,
    copy_id: &str,
) -> Result<Option<Copy>, sqlx::Error> {
    sqlx::query_as::<_, Copy>(&format!(
        "SELECT {COLUMNS} FROM copies WHERE exam_id = $1 AND id = $2"
    ))
    .bind(exam_id)
    .bind(copy_id)
    .fetch_optional(pool)
    .await
}

/// Overwrites any previous correction.
pub(crate) async fn store_correction(
    pool: &PgPool,
    copy_id: &str,
    grade: f64,
    annotations: serde_json::Value,
    corrected_at: PrimitiveDateTime,
) -> Result<Copy, sqlx::Error> {
    sqlx::query_as::<_, Copy>(&format!(
        "UPDATE copies SET grade = $1, annotations = $2, corrected_at = $3
         WHERE id = $4
         RETURNING {COLUMNS}"
    ))
    .bind(grade)
    .bind(Json(annotations))
    .bind(corrected_at)
    .bind(copy_id)
    .fetch_one(pool)
    .await
}

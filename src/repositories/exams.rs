use sqlx::PgPool;
use time::{Date, PrimitiveDateTime};

use crate::db::models::Exam;

pub(crate) const COLUMNS: &str = "id, course, date, created_at, updated_at";

/// Aggregate over the copies of one exam, shared by both report flavours.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ExamCopyStats {
    pub(crate) copy_count: i64,
    pub(crate) graded_count: i64,
    pub(crate) average_grade: Option<f64>,
}

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!("SELECT {COLUMNS} FROM exams WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn exists(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM exams WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await
}

pub(crate) async fn list(pool: &PgPool) -> Result<Vec<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "SELECT {COLUMNS} FROM exams ORDER BY date DESC, created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) struct CreateExam<'a> {
    pub id: &'a str,
    pub course: &'a str,
    pub date: Date,
    pub created_at: PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateExam<'_>) -> Result<Exam, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "INSERT INTO exams (id, course, date, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $4)
         RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.course)
    .bind(params.date)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) struct UpdateExam {
    pub course: Option<String>,
    pub date: Option<Date>,
    pub updated_at: PrimitiveDateTime,
}

/// Applies only the provided fields. `None` when the exam does not exist.
pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateExam,
) -> Result<Option<Exam>, sqlx::Error> {
    sqlx::query_as::<_, Exam>(&format!(
        "UPDATE exams SET
            course = COALESCE($1, course),
            date = COALESCE($2, date),
            updated_at = $3
         WHERE id = $4
         RETURNING {COLUMNS}"
    ))
    .bind(params.course)
    .bind(params.date)
    .bind(params.updated_at)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Returns whether a row was removed. Copies go with it through the cascade.
pub(crate) async fn delete_by_id(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM exams WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn copy_stats(pool: &PgPool, exam_id: &str) -> Result<ExamCopyStats, sqlx::Error> {
    sqlx::query_as::<_, ExamCopyStats>(
        "SELECT COUNT(*) AS copy_count,
                COUNT(grade) AS graded_count,
                AVG(grade) AS average_grade
         FROM copies
         WHERE exam_id = $1",
    )
    .bind(exam_id)
    .fetch_one(pool)
    .await
}

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use time::{Date, PrimitiveDateTime};

use crate::db::types::UserRole;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) email: String,
    pub(crate) full_name: Option<String>,
    pub(crate) hashed_password: String,
    pub(crate) role: UserRole,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Exam {
    pub(crate) id: String,
    pub(crate) course: String,
    pub(crate) date: Date,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// One scanned answer sheet. `grade` and `annotations` stay empty until corrected.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub(crate) struct Copy {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) file_path: Option<String>,
    pub(crate) original_filename: Option<String>,
    pub(crate) content_sha256: Option<String>,
    pub(crate) file_size: Option<i64>,
    pub(crate) grade: Option<f64>,
    pub(crate) annotations: Option<Json<serde_json::Value>>,
    pub(crate) corrected_at: Option<PrimitiveDateTime>,
    pub(crate) created_at: PrimitiveDateTime,
}

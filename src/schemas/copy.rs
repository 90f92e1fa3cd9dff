use serde::Serialize;

use crate::core::time::format_primitive;
use crate::db::models::Copy;

#[derive(Debug, Serialize)]
pub(crate) struct CopyResponse {
    pub(crate) id: String,
    pub(crate) exam_id: String,
    pub(crate) file_path: Option<String>,
    pub(crate) original_filename: Option<String>,
    pub(crate) content_sha256: Option<String>,
    pub(crate) file_size: Option<i64>,
    pub(crate) grade: Option<f64>,
    pub(crate) annotations: Option<serde_json::Value>,
    pub(crate) corrected_at: Option<String>,
    pub(crate) created_at: String,
}

impl From<Copy> for CopyResponse {
    fn from(copy: Copy) -> Self {
        Self {
            id: copy.id,
            exam_id: copy.exam_id,
            file_path: copy.file_path,
            original_filename: copy.original_filename,
            content_sha256: copy.content_sha256,
            file_size: copy.file_size,
            grade: copy.grade,
            annotations: copy.annotations.map(|value| value.0),
            corrected_at: copy.corrected_at.map(format_primitive),
            created_at: format_primitive(copy.created_at),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct UploadResponse {
    pub(crate) uploaded_count: usize,
    pub(crate) first_copy_id: String,
    pub(crate) copies: Vec<CopyResponse>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CopyFailure {
    pub(crate) copy_id: String,
    pub(crate) error: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct BatchCorrectionResponse {
    pub(crate) exam_id: String,
    pub(crate) total: usize,
    pub(crate) corrected: Vec<CopyResponse>,
    pub(crate) failed: Vec<CopyFailure>,
}

#[derive(Debug, Serialize)]
pub(crate) struct GradeResponse {
    pub(crate) grade: Option<f64>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnnotationsResponse {
    pub(crate) annotations: Option<serde_json::Value>,
}

use serde::{Deserialize, Serialize};
use time::Date;
use validator::{Validate, ValidationError};

use crate::core::time::{exam_date, format_primitive};
use crate::db::models::Exam;
use crate::repositories::exams::ExamCopyStats;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamCreate {
    #[validate(custom(function = "not_blank"))]
    pub(crate) course: String,
    #[serde(with = "exam_date")]
    pub(crate) date: Date,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct ExamUpdate {
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub(crate) course: Option<String>,
    #[serde(default, deserialize_with = "exam_date::option::deserialize")]
    pub(crate) date: Option<Date>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ExamResponse {
    pub(crate) id: String,
    pub(crate) course: String,
    #[serde(with = "exam_date")]
    pub(crate) date: Date,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl From<Exam> for ExamResponse {
    fn from(exam: Exam) -> Self {
        Self {
            id: exam.id,
            course: exam.course,
            date: exam.date,
            created_at: format_primitive(exam.created_at),
            updated_at: format_primitive(exam.updated_at),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReportQuery {
    #[serde(default, rename = "type")]
    pub(crate) kind: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ReportKind {
    Summary,
    Detailed,
}

impl ReportKind {
    /// Missing or blank selects the summary.
    pub(crate) fn parse(raw: Option<&str>) -> Option<Self> {
        match raw.map(str::trim).filter(|value| !value.is_empty()) {
            None => Some(Self::Summary),
            Some(value) if value.eq_ignore_ascii_case("summary") => Some(Self::Summary),
            Some(value) if value.eq_ignore_ascii_case("detailed") => Some(Self::Detailed),
            Some(_) => None,
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Summary => "summary report",
            Self::Detailed => "detailed report",
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ReportResponse {
    pub(crate) exam_id: String,
    #[serde(rename = "type")]
    pub(crate) kind: ReportKind,
    pub(crate) report: String,
    pub(crate) copy_count: i64,
    pub(crate) graded_count: i64,
    pub(crate) average_grade: Option<f64>,
}

impl ReportResponse {
    pub(crate) fn new(exam_id: String, kind: ReportKind, stats: ExamCopyStats) -> Self {
        Self {
            exam_id,
            kind,
            report: kind.label().to_string(),
            copy_count: stats.copy_count,
            graded_count: stats.graded_count,
            average_grade: stats.average_grade,
        }
    }
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("course must not be empty".into());
        return Err(error);
    }
    Ok(())
}

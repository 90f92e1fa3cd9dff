use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::Copy;
use crate::repositories;
use crate::services::extraction::{Extraction, ExtractionError};

/// Placeholder grade until real grading exists.
pub(crate) const PLACEHOLDER_SCORE: f64 = 15.5;
pub(crate) const EXCERPT_CHARS: usize = 500;

pub(crate) const SIMULATION_TEXT: &str =
    "Document extraction unavailable or file not found. Using simulation.";
pub(crate) const EXTRACTION_FAILED_TEXT: &str = "Extraction failed.";

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CorrectionOutcome {
    pub(crate) grade: f64,
    pub(crate) annotations: Value,
    pub(crate) status: &'static str,
}

#[derive(Debug)]
pub(crate) struct BatchFailure {
    pub(crate) copy_id: String,
    pub(crate) error: String,
}

#[derive(Debug, Default)]
pub(crate) struct BatchReport {
    pub(crate) total: usize,
    pub(crate) corrected: Vec<Copy>,
    pub(crate) failed: Vec<BatchFailure>,
}

/// Extraction problems never fail a correction; they only change the excerpt.
pub(crate) fn build_outcome(result: Result<Extraction, ExtractionError>) -> CorrectionOutcome {
    let (text, status) = match result {
        Ok(extraction) => {
            tracing::debug!(
                elements = extraction.elements.len(),
                pages = extraction.page_count(),
                "Document extracted"
            );
            (extraction.text(), "extracted")
        }
        Err(ExtractionError::Unavailable | ExtractionError::FileNotFound(_)) => {
            (SIMULATION_TEXT.to_string(), "simulated")
        }
        Err(ExtractionError::Failed(err)) => {
            tracing::warn!(error = %format!("{err:#}"), "Document extraction failed");
            (EXTRACTION_FAILED_TEXT.to_string(), "failed")
        }
    };

    CorrectionOutcome {
        grade: PLACEHOLDER_SCORE,
        annotations: json!({
            "extracted_content": excerpt(&text),
            "q1": "good",
            "q2": "partial",
        }),
        status,
    }
}

fn excerpt(text: &str) -> String {
    let mut excerpt: String = text.chars().take(EXCERPT_CHARS).collect();
    excerpt.push_str("...");
    excerpt
}

fn resolve_path(raw: &str) -> PathBuf {
    let path = Path::new(raw);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path.to_path_buf(),
    }
}

/// Runs extraction on one copy and stores the resulting grade and annotations.
pub(crate) async fn correct_copy(state: &AppState, copy: &Copy) -> Result<Copy, sqlx::Error> {
    let result = match copy.file_path.as_deref() {
        Some(raw) => state.extractor().extract(&resolve_path(raw)).await,
        None => Err(ExtractionError::FileNotFound(PathBuf::new())),
    };

    let outcome = build_outcome(result);
    metrics::counter!("copy_corrections_total", "status" => outcome.status).increment(1);

    let updated = repositories::copies::store_correction(
        state.db(),
        &copy.id,
        outcome.grade,
        outcome.annotations,
        primitive_now_utc(),
    )
    .await?;

    tracing::info!(
        exam_id = %copy.exam_id,
        copy_id = %copy.id,
        status = outcome.status,
        action = "copy_correct",
        "Copy corrected"
    );

    Ok(updated)
}

/// Corrects every copy of an exam one after another. Earlier corrections stay
/// stored when a later one fails.
pub(crate) async fn correct_all(state: &AppState, exam_id: &str) -> Result<BatchReport, sqlx::Error> {
    let copies = repositories::copies::list_by_exam(state.db(), exam_id).await?;
    let mut report = BatchReport { total: copies.len(), ..BatchReport::default() };

    for copy in &copies {
        match correct_copy(state, copy).await {
            Ok(updated) => report.corrected.push(updated),
            Err(err) => {
                tracing::error!(
                    exam_id = %exam_id,
                    copy_id = %copy.id,
                    error = %err,
                    "Batch correction failed for copy"
                );
                report.failed.push(BatchFailure { copy_id: copy.id.clone(), error: err.to_string() });
            }
        }
    }

    tracing::info!(
        exam_id = %exam_id,
        total = report.total,
        corrected = report.corrected.len(),
        failed = report.failed.len(),
        action = "exam_correct_all",
        "Batch correction finished"
    );

    Ok(report)
}

mod handlers;

use axum::extract::DefaultBodyLimit;
use axum::{routing::get, routing::post, Router};

use crate::core::config::Settings;
use crate::core::state::AppState;

/// Slack for multipart boundaries and headers on top of the file payloads.
const MULTIPART_OVERHEAD_BYTES: u64 = 1024 * 1024;

pub(crate) fn router(settings: &Settings) -> Router<AppState> {
    let storage = settings.storage();
    let body_limit = storage
        .max_upload_bytes()
        .saturating_mul(storage.max_files_per_upload)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    Router::new()
        .route(
            "/:exam_id/copies",
            post(handlers::upload_copies)
                .layer(DefaultBodyLimit::max(body_limit))
                .get(handlers::list_copies),
        )
        .route("/:exam_id/copies/:copy_id", get(handlers::get_copy))
        .route("/:exam_id/copies/:copy_id/correct", post(handlers::correct_copy))
        .route("/:exam_id/copies/:copy_id/grade", get(handlers::copy_grade))
        .route("/:exam_id/copies/:copy_id/annotations", get(handlers::copy_annotations))
        .route("/:exam_id/correct", post(handlers::correct_all_copies))
}

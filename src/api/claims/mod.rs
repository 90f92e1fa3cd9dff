mod handlers;

use axum::{routing::post, Router};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/:exam_id/copies/:copy_id/rectify", post(handlers::request_rectification))
        .route("/:exam_id/copies/:copy_id/flag", post(handlers::flag_copy))
}

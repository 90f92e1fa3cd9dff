use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct RectifyRequest {
    #[validate(length(min = 1, message = "message must not be empty"))]
    pub(crate) message: String,
}

#[derive(Debug, Deserialize, Validate)]
pub(crate) struct FlagRequest {
    #[validate(length(min = 1, message = "reason must not be empty"))]
    pub(crate) reason: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct RectifyResponse {
    pub(crate) status: &'static str,
    pub(crate) message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct FlagResponse {
    pub(crate) status: &'static str,
    pub(crate) reason: String,
}

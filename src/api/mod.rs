pub(crate) mod auth;
pub(crate) mod claims;
pub(crate) mod copies;
pub(crate) mod errors;
pub(crate) mod exams;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod lookups;
pub(crate) mod router;
pub(crate) mod validation;

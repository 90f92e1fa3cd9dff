pub(crate) mod copies;
pub(crate) mod exams;
pub(crate) mod users;

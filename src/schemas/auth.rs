use serde::{Deserialize, Serialize};

/// OAuth2 password grant body. `username` carries the email.
#[derive(Debug, Deserialize)]
pub(crate) struct PasswordForm {
    pub(crate) username: String,
    pub(crate) password: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct TokenResponse {
    pub(crate) access_token: String,
    pub(crate) token_type: String,
}

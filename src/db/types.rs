use serde::{Deserialize, Serialize};
use sqlx::Type;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "userrole", rename_all = "lowercase")]
pub(crate) enum UserRole {
    Admin,
    Professor,
    #[default]
    Student,
}

#[cfg(test)]
mod tests {
    use super::UserRole;

    #[test]
    fn roles_use_lowercase_wire_names() {
        assert_eq!(serde_json::to_value(UserRole::Professor).unwrap(), "professor");
        let parsed: UserRole = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(parsed, UserRole::Admin);
        assert_eq!(UserRole::default(), UserRole::Student);
    }
}

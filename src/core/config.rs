mod parsing;
mod secret;
mod settings;
mod types;

pub(crate) use types::{ExtractionSettings, Settings};

#[cfg(test)]
mod tests {
    use super::types::{ConfigError, Environment, StorageSettings};
    use super::Settings;
    use crate::test_support;

    #[tokio::test]
    async fn test_environment_loads_with_defaults() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();

        let settings = Settings::load().expect("settings");

        assert_eq!(settings.runtime().environment, Environment::Test);
        assert_eq!(settings.api().api_v1_str, "/api/v1");
        assert_eq!(settings.security().access_token_expire_minutes, 30);
        assert_eq!(settings.storage().upload_dir, "uploads");
        assert!(settings.storage().allowed_copy_extensions.contains(&"pdf".to_string()));
        assert!(!settings.extraction().is_configured());
    }

    #[tokio::test]
    async fn strict_config_requires_extraction_key() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::set_var("EXAM_STRICT_CONFIG", "1");
        std::env::remove_var("DATALAB_API_KEY");

        let result = Settings::load();
        std::env::set_var("EXAM_STRICT_CONFIG", "0");

        assert!(matches!(result, Err(ConfigError::MissingSecret("DATALAB_API_KEY"))));
    }

    #[tokio::test]
    async fn unsupported_copy_extension_is_rejected() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::set_var("ALLOWED_COPY_EXTENSIONS", "pdf,exe");

        let result = Settings::load();
        std::env::remove_var("ALLOWED_COPY_EXTENSIONS");

        match result {
            Err(ConfigError::InvalidValue { field, value }) => {
                assert_eq!(field, "ALLOWED_COPY_EXTENSIONS");
                assert_eq!(value, "exe");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn submit_retries_are_bounded() {
        let _guard = test_support::env_lock().await;
        test_support::set_test_env();
        std::env::set_var("DATALAB_MAX_SUBMIT_RETRIES", "64");

        let result = Settings::load();
        std::env::remove_var("DATALAB_MAX_SUBMIT_RETRIES");

        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { field: "DATALAB_MAX_SUBMIT_RETRIES", .. })
        ));
    }

    #[test]
    fn upload_limit_saturates_on_huge_sizes() {
        let storage = StorageSettings {
            upload_dir: "uploads".to_string(),
            max_upload_size_mb: u64::MAX / 2,
            max_files_per_upload: 1,
            allowed_copy_extensions: vec!["pdf".to_string()],
        };
        assert_eq!(storage.max_upload_bytes(), u64::MAX);
    }
}

use super::parsing::{
    env_optional, env_or_default, is_supported_copy_extension, parse_bool, parse_cors_origins,
    parse_environment, parse_string_list, parse_u16, parse_u32, parse_u64,
};
use super::secret::load_or_create_secret_key;
use super::types::{
    AdminSettings, ApiSettings, ConfigError, CorsSettings, DatabaseSettings, ExtractionSettings,
    RedisSettings, RuntimeSettings, SecuritySettings, ServerHost, ServerPort, ServerSettings,
    Settings, StorageSettings, TelemetrySettings,
};

const DEFAULT_COPY_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png"];
const MAX_SUBMIT_RETRIES: u32 = 10;

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("EXAM_HOST", "0.0.0.0");
        let port = env_or_default("EXAM_PORT", "8000");

        let environment =
            parse_environment(env_optional("EXAM_ENV").or_else(|| env_optional("ENVIRONMENT")));
        let strict_config =
            env_optional("EXAM_STRICT_CONFIG").map(|value| parse_bool(&value)).unwrap_or(false)
                || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "Exam Correction System");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let api_v1_str = env_or_default("API_V1_STR", "/api/v1");

        let secret_key = match env_optional("SECRET_KEY") {
            Some(value) => value,
            None => load_or_create_secret_key(),
        };
        let access_token_expire_minutes = parse_u64(
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            env_or_default("ACCESS_TOKEN_EXPIRE_MINUTES", "30"),
        )?;
        let algorithm = env_or_default("ALGORITHM", "HS256");

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let postgres_server = env_or_default("POSTGRES_SERVER", "localhost");
        let postgres_port = parse_u16("POSTGRES_PORT", env_or_default("POSTGRES_PORT", "5432"))?;
        let postgres_user = env_or_default("POSTGRES_USER", "exam");
        let postgres_password = env_or_default("POSTGRES_PASSWORD", "");
        let postgres_db = env_or_default("POSTGRES_DB", "exam_correction");
        let database_url = env_optional("DATABASE_URL");

        let redis_host = env_or_default("REDIS_HOST", "localhost");
        let redis_port = parse_u16("REDIS_PORT", env_or_default("REDIS_PORT", "6379"))?;
        let redis_db = parse_u16("REDIS_DB", env_or_default("REDIS_DB", "0"))?;
        let redis_password = env_or_default("REDIS_PASSWORD", "");

        let extraction = ExtractionSettings {
            api_key: env_or_default("DATALAB_API_KEY", ""),
            base_url: env_or_default("DATALAB_BASE_URL", "https://www.datalab.to/api/v1"),
            mode: env_or_default("DATALAB_MODE", "accurate").to_ascii_lowercase(),
            output_format: env_or_default("DATALAB_OUTPUT_FORMAT", "chunks,markdown")
                .to_ascii_lowercase(),
            timeout_seconds: parse_u64(
                "DATALAB_TIMEOUT_SECONDS",
                env_or_default("DATALAB_TIMEOUT_SECONDS", "120"),
            )?,
            poll_interval_seconds: parse_u64(
                "DATALAB_POLL_INTERVAL_SECONDS",
                env_or_default("DATALAB_POLL_INTERVAL_SECONDS", "2"),
            )?,
            max_poll_attempts: parse_u32(
                "DATALAB_MAX_POLL_ATTEMPTS",
                env_or_default("DATALAB_MAX_POLL_ATTEMPTS", "120"),
            )?,
            max_submit_retries: parse_u32(
                "DATALAB_MAX_SUBMIT_RETRIES",
                env_or_default("DATALAB_MAX_SUBMIT_RETRIES", "3"),
            )?,
        };

        let storage = StorageSettings {
            upload_dir: env_or_default("UPLOAD_DIR", "uploads").trim_end_matches('/').to_string(),
            max_upload_size_mb: parse_u64(
                "MAX_UPLOAD_SIZE_MB",
                env_or_default("MAX_UPLOAD_SIZE_MB", "20"),
            )?,
            max_files_per_upload: parse_u64(
                "MAX_FILES_PER_UPLOAD",
                env_or_default("MAX_FILES_PER_UPLOAD", "50"),
            )?,
            allowed_copy_extensions: parse_string_list(
                env_optional("ALLOWED_COPY_EXTENSIONS"),
                DEFAULT_COPY_EXTENSIONS,
            ),
        };

        let first_superuser_email = env_or_default("FIRST_SUPERUSER_EMAIL", "admin@example.com");
        let first_superuser_password = env_or_default("FIRST_SUPERUSER_PASSWORD", "");

        let log_level = env_or_default("EXAM_LOG_LEVEL", "info");
        let json = env_optional("EXAM_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            server: ServerSettings {
                host: ServerHost::parse(host)?,
                port: ServerPort::parse(port)?,
            },
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version, api_v1_str },
            security: SecuritySettings { secret_key, access_token_expire_minutes, algorithm },
            cors: CorsSettings { origins: cors_origins },
            database: DatabaseSettings {
                postgres_server,
                postgres_port,
                postgres_user,
                postgres_password,
                postgres_db,
                database_url,
            },
            redis: RedisSettings {
                host: redis_host,
                port: redis_port,
                db: redis_db,
                password: redis_password,
            },
            extraction,
            storage,
            admin: AdminSettings { first_superuser_email, first_superuser_password },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host.0, self.server.port.0)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host.0
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port.0
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn security(&self) -> &SecuritySettings {
        &self.security
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn database(&self) -> &DatabaseSettings {
        &self.database
    }

    pub(crate) fn redis(&self) -> &RedisSettings {
        &self.redis
    }

    pub(crate) fn extraction(&self) -> &ExtractionSettings {
        &self.extraction
    }

    pub(crate) fn storage(&self) -> &StorageSettings {
        &self.storage
    }

    pub(crate) fn admin(&self) -> &AdminSettings {
        &self.admin
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.allowed_copy_extensions.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "ALLOWED_COPY_EXTENSIONS",
                value: String::from("<empty>"),
            });
        }

        for extension in &self.storage.allowed_copy_extensions {
            if !is_supported_copy_extension(extension) {
                return Err(ConfigError::InvalidValue {
                    field: "ALLOWED_COPY_EXTENSIONS",
                    value: extension.clone(),
                });
            }
        }

        if self.storage.max_files_per_upload == 0 {
            return Err(ConfigError::InvalidValue {
                field: "MAX_FILES_PER_UPLOAD",
                value: "0".to_string(),
            });
        }

        if self.extraction.poll_interval_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "DATALAB_POLL_INTERVAL_SECONDS",
                value: "0".to_string(),
            });
        }

        if self.extraction.max_submit_retries > MAX_SUBMIT_RETRIES {
            return Err(ConfigError::InvalidValue {
                field: "DATALAB_MAX_SUBMIT_RETRIES",
                value: self.extraction.max_submit_retries.to_string(),
            });
        }

        if self.extraction.max_poll_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "DATALAB_MAX_POLL_ATTEMPTS",
                value: "0".to_string(),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.database.database_url.is_none() && self.database.postgres_password.is_empty() {
            return Err(ConfigError::MissingSecret("POSTGRES_PASSWORD"));
        }
        if self.extraction.api_key.is_empty() {
            return Err(ConfigError::MissingSecret("DATALAB_API_KEY"));
        }
        if self.admin.first_superuser_password.is_empty() {
            return Err(ConfigError::MissingSecret("FIRST_SUPERUSER_PASSWORD"));
        }

        Ok(())
    }
}

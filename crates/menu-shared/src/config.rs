//! Configuration management

use config::{builder::DefaultState, Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

use crate::constants::*;
use crate::error::AppError;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub http: HttpSettings,
    pub menu: MenuSettings,
    pub log: LogSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub host: String,
    pub port: u16,
    pub name: String,
}

/// Which store adapter backs the service.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub backend: DatabaseBackend,
    #[serde(default)]
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub connect_retries: u32,
    pub retry_delay_ms: u64,
    pub run_migrations: bool,
}

impl DatabaseSettings {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpSettings {
    /// Empty means any origin is allowed.
    #[serde(default)]
    pub cors_allow_origins: Vec<String>,
    pub request_timeout_secs: u64,
    pub static_dir: Option<String>,
    pub docs_dir: Option<String>,
}

impl HttpSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MenuSettings {
    pub operation_timeout_ms: u64,
}

impl MenuSettings {
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogSettings {
    pub level: String,
    pub format: LogFormat,
}

impl AppConfig {
    /// Load configuration from defaults, `config/default`, `config/{APP_ENV}`
    /// and `APP__SECTION__KEY` environment variables, in that order.
    pub fn load() -> Result<Self, AppError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let config = Self::builder(&env)?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("http.cors_allow_origins")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Builder pre-populated with every default; callers add their own sources.
    pub fn builder(env: &str) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("app.env", env)?
            .set_default("app.host", DEFAULT_HOST)?
            .set_default("app.port", DEFAULT_PORT)?
            .set_default("app.name", DEFAULT_APP_NAME)?
            .set_default("database.backend", "postgres")?
            .set_default("database.url", "")?
            .set_default("database.max_connections", DEFAULT_MAX_CONNECTIONS)?
            .set_default("database.min_connections", DEFAULT_MIN_CONNECTIONS)?
            .set_default("database.acquire_timeout_secs", DEFAULT_ACQUIRE_TIMEOUT_SECS)?
            .set_default("database.max_lifetime_secs", DEFAULT_MAX_LIFETIME_SECS)?
            .set_default("database.connect_retries", DEFAULT_CONNECT_RETRIES)?
            .set_default("database.retry_delay_ms", DEFAULT_RETRY_DELAY_MS)?
            .set_default("database.run_migrations", true)?
            .set_default("http.cors_allow_origins", Vec::<String>::new())?
            .set_default("http.request_timeout_secs", DEFAULT_REQUEST_TIMEOUT_SECS)?
            .set_default("menu.operation_timeout_ms", DEFAULT_OPERATION_TIMEOUT_MS)?
            .set_default("log.level", "info")?
            .set_default("log.format", "json")
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.database.backend == DatabaseBackend::Postgres && self.database.url.trim().is_empty() {
            return Err(AppError::InvalidConfig(
                "database.url is required for the postgres backend".to_string(),
            ));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(AppError::InvalidConfig(format!(
                "database.min_connections ({}) exceeds database.max_connections ({})",
                self.database.min_connections, self.database.max_connections
            )));
        }
        if self.database.connect_retries == 0 {
            return Err(AppError::InvalidConfig(
                "database.connect_retries must be at least 1".to_string(),
            ));
        }
        if self.menu.operation_timeout_ms == 0 {
            return Err(AppError::InvalidConfig(
                "menu.operation_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(overrides: &[(&str, &str)]) -> Result<AppConfig, AppError> {
        let mut builder = AppConfig::builder("test")?;
        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }
        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn test_defaults_with_memory_backend() {
        let config = build(&[("database.backend", "memory")]).unwrap();
        assert_eq!(config.app.env, "test");
        assert_eq!(config.app.port, DEFAULT_PORT);
        assert_eq!(config.database.backend, DatabaseBackend::Memory);
        assert_eq!(config.database.connect_retries, 6);
        assert_eq!(config.database.retry_delay(), Duration::from_millis(2000));
        assert!(config.http.cors_allow_origins.is_empty());
        assert!(config.http.static_dir.is_none());
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn test_postgres_requires_url() {
        let err = build(&[]).unwrap_err();
        assert!(matches!(err, AppError::InvalidConfig(_)));

        let config = build(&[("database.url", "postgres://menu@localhost/menu")]).unwrap();
        assert_eq!(config.database.backend, DatabaseBackend::Postgres);
    }

    #[test]
    fn test_rejects_inverted_pool_bounds() {
        let err = build(&[
            ("database.backend", "memory"),
            ("database.min_connections", "10"),
            ("database.max_connections", "2"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("min_connections"));
    }

    #[test]
    fn test_unknown_backend_is_config_error() {
        let err = build(&[("database.backend", "mysql")]).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }
}

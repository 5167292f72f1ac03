//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section, and every field carries a serde default so that an empty
//! file yields a working in-memory setup.

pub mod app;
pub mod auth;
pub mod cache;
pub mod database;
pub mod logging;
pub mod session;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::{AuthConfig, MAX_REMEMBER_DAYS, PasswordAlgorithm};
pub use self::cache::{CacheConfig, MemoryCacheConfig, RedisCacheConfig};
pub use self::database::{DatabaseConfig, DatabaseProvider};
pub use self::logging::LoggingConfig;
pub use self::session::{MAX_IDLE_TIMEOUT_MINUTES, SessionConfig};

use crate::error::AppError;

/// Root application configuration.
///
/// Top-level deserialization target for the merged TOML configuration
/// files (default.toml + environment overlay + `CUBE__*` variables).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// User store settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Session cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Authentication and remember-me settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Session key settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default` with the environment-specific overlay
    /// `config/{env}` and environment variables prefixed with `CUBE`
    /// (`CUBE__AUTH__COOKIE_KEY=...`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CUBE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let config: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the server cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if !(1..=MAX_REMEMBER_DAYS).contains(&self.auth.remember_days) {
            return Err(AppError::configuration(format!(
                "auth.remember_days must be between 1 and {MAX_REMEMBER_DAYS}"
            )));
        }
        if !(1..=MAX_IDLE_TIMEOUT_MINUTES).contains(&self.session.idle_timeout_minutes) {
            return Err(AppError::configuration(format!(
                "session.idle_timeout_minutes must be between 1 and {MAX_IDLE_TIMEOUT_MINUTES}"
            )));
        }
        if self.session.key.trim().is_empty() {
            return Err(AppError::configuration("session.key must not be empty"));
        }
        Ok(())
    }
}

//! Configuration for the central service.
//!
//! Configuration is loaded from multiple sources with the following precedence:
//! 1. Environment variables (highest priority)
//! 2. `central.toml` file in the working directory
//! 3. Default values (lowest priority)
//!
//! The loaded [`CentralConfig`] is built once at startup and handed to each
//! component; nothing reads configuration from global state.
//!
//! # Environment Variables
//!
//! - `CENTRAL_SERVER_HOST` - Server bind address
//! - `CENTRAL_SERVER_PORT` - Server port
//! - `CENTRAL_DATABASE_URL` - SQLite connection URL
//! - `CENTRAL_LATEST_VERSION` - Latest released instance version
//! - `CENTRAL_RELEASE_DATE` - Release date of the latest version
//! - `CENTRAL_CHANGELOG_URL` - Changelog link returned to instances
//! - `CENTRAL_RELEASE_CRITICAL` - Whether the latest release is a critical update
//! - `MASTER_ADMIN_USERNAME` - Dashboard basic-auth username
//! - `MASTER_ADMIN_PASSWORD` - Dashboard basic-auth password
//! - `CENTRAL_LOG_LEVEL` - Log level (trace, debug, info, warn, error)

use std::env;

use config::Config;
use serde::Deserialize;

use crate::errors::{CentralError, CentralResult};

/// Admin password shipped as the default. Startup warns when it is still in use.
pub const DEFAULT_ADMIN_PASSWORD: &str = "changeme123";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CentralConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    /// What `/latest-version` advertises and what the dashboard compares against
    pub release: ReleaseConfig,
    /// Dashboard credentials
    pub admin: AdminConfig,
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8001,
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite connection URL
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://instances.db".to_string(),
        }
    }
}

/// Release information for customer instances.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReleaseConfig {
    pub latest_version: String,
    pub released: String,
    pub changelog_url: String,
    /// Set for security releases instances should install immediately
    pub critical: bool,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            latest_version: "1.0.0".to_string(),
            released: "2026-01-18".to_string(),
            changelog_url: "https://hushlane.app/changelog".to_string(),
            critical: false,
        }
    }
}

/// Basic-auth credentials guarding the admin dashboard.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    pub username: String,
    pub password: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: DEFAULT_ADMIN_PASSWORD.to_string(),
        }
    }
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

fn config_error(e: config::ConfigError) -> CentralError {
    CentralError::ConfigError(e.to_string())
}

impl CentralConfig {
    /// Load and validate configuration from defaults, `central.toml` and the environment.
    pub fn load() -> CentralResult<Self> {
        let defaults = CentralConfig::default();

        let builder = Config::builder()
            .set_default("server.host", defaults.server.host)
            .map_err(config_error)?
            .set_default("server.port", i64::from(defaults.server.port))
            .map_err(config_error)?
            .set_default("database.url", defaults.database.url)
            .map_err(config_error)?
            .set_default("release.latest_version", defaults.release.latest_version)
            .map_err(config_error)?
            .set_default("release.released", defaults.release.released)
            .map_err(config_error)?
            .set_default("release.changelog_url", defaults.release.changelog_url)
            .map_err(config_error)?
            .set_default("release.critical", defaults.release.critical)
            .map_err(config_error)?
            .set_default("admin.username", defaults.admin.username)
            .map_err(config_error)?
            .set_default("admin.password", defaults.admin.password)
            .map_err(config_error)?
            .set_default("logging.level", defaults.logging.level)
            .map_err(config_error)?
            // Load from central.toml (optional)
            .add_source(config::File::with_name("central").required(false))
            // Override with environment variables
            .set_override_option("server.host", env::var("CENTRAL_SERVER_HOST").ok())
            .map_err(config_error)?
            .set_override_option(
                "server.port",
                env::var("CENTRAL_SERVER_PORT")
                    .ok()
                    .and_then(|v| v.parse::<i64>().ok()),
            )
            .map_err(config_error)?
            .set_override_option("database.url", env::var("CENTRAL_DATABASE_URL").ok())
            .map_err(config_error)?
            .set_override_option(
                "release.latest_version",
                env::var("CENTRAL_LATEST_VERSION").ok(),
            )
            .map_err(config_error)?
            .set_override_option("release.released", env::var("CENTRAL_RELEASE_DATE").ok())
            .map_err(config_error)?
            .set_override_option(
                "release.changelog_url",
                env::var("CENTRAL_CHANGELOG_URL").ok(),
            )
            .map_err(config_error)?
            .set_override_option(
                "release.critical",
                env::var("CENTRAL_RELEASE_CRITICAL")
                    .ok()
                    .and_then(|v| v.parse::<bool>().ok()),
            )
            .map_err(config_error)?
            .set_override_option("admin.username", env::var("MASTER_ADMIN_USERNAME").ok())
            .map_err(config_error)?
            .set_override_option("admin.password", env::var("MASTER_ADMIN_PASSWORD").ok())
            .map_err(config_error)?
            .set_override_option("logging.level", env::var("CENTRAL_LOG_LEVEL").ok())
            .map_err(config_error)?;

        let settings = builder
            .build()
            .map_err(|e| CentralError::ConfigError(format!("failed to build config: {e}")))?;

        let config: CentralConfig = settings.try_deserialize().map_err(|e| {
            CentralError::ConfigError(format!("failed to deserialize config: {e}"))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> CentralResult<()> {
        if self.server.port == 0 {
            return Err(CentralError::ConfigError(
                "server.port must be greater than 0".to_string(),
            ));
        }

        if self.database.url.trim().is_empty() {
            return Err(CentralError::ConfigError(
                "database.url cannot be empty".to_string(),
            ));
        }

        if self.release.latest_version.trim().is_empty() {
            return Err(CentralError::ConfigError(
                "release.latest_version cannot be empty".to_string(),
            ));
        }

        if self.admin.username.is_empty() || self.admin.password.is_empty() {
            return Err(CentralError::ConfigError(
                "admin.username and admin.password are required".to_string(),
            ));
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(CentralError::ConfigError(format!(
                    "logging.level must be one of: trace, debug, info, warn, error. Got '{other}'"
                )));
            }
        }

        Ok(())
    }

    /// True while the dashboard is still protected by the shipped password.
    pub fn uses_default_admin_password(&self) -> bool {
        self.admin.password == DEFAULT_ADMIN_PASSWORD
    }

    /// `host:port` string the server binds to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod database;
pub mod logging;
pub mod migration;
pub mod plugin;

use serde::{Deserialize, Serialize};

pub use self::app::ServerConfig;
pub use self::database::{DatabaseConfig, PoolConfig};
pub use self::logging::LoggingConfig;
pub use self::migration::MigrationConfig;
pub use self::plugin::{HookConfig, PluginConfig};

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Plugin manifest settings.
    #[serde(default)]
    pub plugins: PluginConfig,
    /// Hook dispatch settings.
    #[serde(default)]
    pub hooks: HookConfig,
    /// Schema migration settings.
    #[serde(default)]
    pub migrations: MigrationConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the base configuration file with an environment-specific overlay
    /// (`config/{env}.toml`) and environment variables prefixed with `FOLIO__`.
    pub fn load(path: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("FOLIO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "database": { "url": "postgres://folio@localhost/folio" }
        }))
        .expect("deserialize");

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.public_url, "http://127.0.0.1:3000");
        assert_eq!(config.plugins.manifest, "config/plugins.toml");
        assert!(config.hooks.timeout().is_none());
        assert!(config.migrations.apply_timeout().is_none());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.database.pool, PoolConfig::default());
    }

    #[test]
    fn test_timeouts_are_opt_in() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "database": { "url": "postgres://localhost/folio" },
            "hooks": { "timeout_seconds": 5 },
            "migrations": { "apply_timeout_seconds": 120 }
        }))
        .expect("deserialize");

        assert_eq!(config.hooks.timeout(), Some(std::time::Duration::from_secs(5)));
        assert_eq!(
            config.migrations.apply_timeout(),
            Some(std::time::Duration::from_secs(120))
        );
    }
}

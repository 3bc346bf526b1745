//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod bus;
pub mod database;
pub mod logging;
pub mod notifications;
pub mod scheduler;
pub mod store;

use serde::{Deserialize, Serialize};

pub use self::bus::{BusConfig, BusProvider};
pub use self::database::DatabaseConfig;
pub use self::logging::{LogFormat, LoggingConfig};
pub use self::notifications::NotificationsConfig;
pub use self::scheduler::SchedulerConfig;
pub use self::store::{StoreConfig, StoreProvider};

use crate::error::AppError;

/// Prefix for environment variable overrides (`HERALD__BUS__PROVIDER=redis`).
pub const ENV_PREFIX: &str = "HERALD";

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Which store backs notifications and the recipient ledger.
    #[serde(default)]
    pub store: StoreConfig,
    /// Message bus settings for live push.
    #[serde(default)]
    pub bus: BusConfig,
    /// Scheduler sweep settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    /// Read-path limits.
    #[serde(default)]
    pub notifications: NotificationsConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration for an environment.
    ///
    /// Merges `config/default.toml` with `config/{env}.toml` and environment
    /// variables prefixed with `HERALD__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::build(&["config/default".to_string(), format!("config/{env}")])
    }

    /// Load configuration from a single file plus environment overrides.
    pub fn load_from(path: &str) -> Result<Self, AppError> {
        Self::build(&[path.trim_end_matches(".toml").to_string()])
    }

    fn build(files: &[String]) -> Result<Self, AppError> {
        let mut builder = config::Config::builder();
        for file in files {
            builder = builder.add_source(config::File::with_name(file).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
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

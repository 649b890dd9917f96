//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod booking;
pub mod gateway;
pub mod logging;
pub mod worker;

use serde::{Deserialize, Serialize};

use self::booking::BookingConfig;
use self::gateway::GatewayConfig;
use self::logging::LoggingConfig;
use self::worker::WorkerConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Reservation and settlement settings.
    #[serde(default)]
    pub booking: BookingConfig,
    /// Payment gateway settings.
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Background worker settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `COURTBOOK_`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("COURTBOOK")
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

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            booking: BookingConfig::default(),
            gateway: GatewayConfig::default(),
            worker: WorkerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

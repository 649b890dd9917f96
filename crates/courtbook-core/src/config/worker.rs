//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Background maintenance worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the worker is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Interval in seconds between reservation expiry sweeps.
    #[serde(default = "default_sweep_interval")]
    pub expiry_sweep_seconds: u64,
    /// Interval in seconds between booking completion/reminder passes.
    #[serde(default = "default_lifecycle_interval")]
    pub lifecycle_seconds: u64,
    /// Interval in seconds between tournament status evaluations.
    #[serde(default = "default_status_interval")]
    pub tournament_status_seconds: u64,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            expiry_sweep_seconds: default_sweep_interval(),
            lifecycle_seconds: default_lifecycle_interval(),
            tournament_status_seconds: default_status_interval(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_lifecycle_interval() -> u64 {
    300
}

fn default_status_interval() -> u64 {
    30
}

//! Payment gateway configuration.

use serde::{Deserialize, Serialize};

/// External payment gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the gateway API.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Merchant secret key sent in the `Authorization` header.
    #[serde(default)]
    pub secret_key: String,
    /// URL the gateway redirects the customer back to after payment.
    #[serde(default = "default_return_url")]
    pub return_url: String,
    /// Bound on each gateway HTTP call, in seconds. A hung call is
    /// treated as a failure once this elapses.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            secret_key: String::new(),
            return_url: default_return_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://dev.khalti.com/api/v2".to_string()
}

fn default_return_url() -> String {
    "https://courtbook.example.com/payments/return".to_string()
}

fn default_timeout() -> u64 {
    30
}

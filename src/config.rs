//! Configuration management for Tokengate.

use serde::{Deserialize, Serialize};

/// Quota configuration for a single rate-limited resource.
///
/// The defaults match the published free-tier quota of the AI provider the
/// limiter was originally deployed against (15 requests and one million
/// tokens per minute).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuotaConfig {
    /// Maximum admitted requests per rolling 60-second window
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,

    /// Maximum admitted token weight per rolling 60-second window
    #[serde(default = "default_tokens_per_minute")]
    pub tokens_per_minute: u64,

    /// Safety margin added to every computed wait, in milliseconds.
    /// Guards against re-triggering on clock-resolution races.
    #[serde(default = "default_safety_margin_ms")]
    pub safety_margin_ms: u64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            requests_per_minute: default_requests_per_minute(),
            tokens_per_minute: default_tokens_per_minute(),
            safety_margin_ms: default_safety_margin_ms(),
        }
    }
}

fn default_requests_per_minute() -> u32 {
    15
}

fn default_tokens_per_minute() -> u64 {
    1_000_000
}

fn default_safety_margin_ms() -> u64 {
    100
}

impl QuotaConfig {
    /// Load configuration from a YAML file path.
    pub fn from_file(path: &str) -> crate::error::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> crate::error::Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| crate::error::TokengateError::Config(e.to_string()))
    }
}

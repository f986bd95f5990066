//! Health monitor configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Health monitor configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthConfig {
    /// Seconds between sweeps
    #[serde(default = "default_refresh_interval")]
    pub check_interval_secs: u64,
    /// Upper bound for a single provider probe
    #[serde(default = "default_timeout")]
    pub check_timeout_secs: u64,
    /// Probes slower than this are recorded as degraded
    #[serde(default = "default_degraded_threshold_ms")]
    pub degraded_threshold_ms: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: default_refresh_interval(),
            check_timeout_secs: default_timeout(),
            degraded_threshold_ms: default_degraded_threshold_ms(),
        }
    }
}

impl HealthConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn check_timeout(&self) -> Duration {
        Duration::from_secs(self.check_timeout_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.check_interval_secs == 0 {
            return Err("check_interval_secs must be greater than 0".to_string());
        }
        if self.check_timeout_secs == 0 {
            return Err("check_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

//! Model router configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Model router configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    /// How long a loaded rules/providers/health snapshot stays fresh
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: default_refresh_interval(),
        }
    }
}

impl RouterConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.refresh_interval_secs == 0 {
            return Err("refresh_interval_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

//! Request broker settings

use super::*;
use serde::{Deserialize, Serialize};

/// Global switches for request processing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerSettings {
    /// Consult and populate the response cache
    #[serde(default = "default_true")]
    pub caching_enabled: bool,
    /// Retry failed requests against alternate providers
    #[serde(default = "default_true")]
    pub fallback_enabled: bool,
    /// Maximum number of fallback attempts after the primary attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for BrokerSettings {
    fn default() -> Self {
        Self {
            caching_enabled: true,
            fallback_enabled: true,
            max_retries: default_max_retries(),
        }
    }
}

impl BrokerSettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_retries > 10 {
            return Err("max_retries cannot exceed 10".to_string());
        }
        Ok(())
    }
}

//! Response cache configuration

use super::*;
use serde::{Deserialize, Serialize};

/// Response cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Base TTL in seconds, scaled per request kind
    #[serde(default = "default_cache_ttl")]
    pub default_ttl_secs: u64,
    /// Maximum number of stored entries
    #[serde(default = "default_cache_max_size")]
    pub max_size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: default_cache_ttl(),
            max_size: default_cache_max_size(),
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_size == 0 {
            return Err("max_size must be greater than 0".to_string());
        }
        if self.default_ttl_secs == 0 {
            return Err("default_ttl_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

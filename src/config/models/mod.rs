//! Configuration data models

pub mod broker;
pub mod cache;
pub mod health;
pub mod logging;
pub mod provider;
pub mod router;
pub mod server;
pub mod storage;

pub use broker::*;
pub use cache::*;
pub use health::*;
pub use logging::*;
pub use provider::*;
pub use router::*;
pub use server::*;
pub use storage::*;

/// Default values for configuration
pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default server port
pub fn default_port() -> u16 {
    8000
}

/// Default timeout in seconds
pub fn default_timeout() -> u64 {
    30
}

/// Default maximum fallback attempts
pub fn default_max_retries() -> u32 {
    3
}

pub fn default_rpm() -> u32 {
    60
}

pub fn default_tpm() -> u32 {
    100_000
}

pub fn default_cache_ttl() -> u64 {
    3600 // 1 hour
}

pub fn default_cache_max_size() -> usize {
    1000
}

/// Router snapshot and health sweep cadence
pub fn default_refresh_interval() -> u64 {
    300
}

pub fn default_degraded_threshold_ms() -> u64 {
    5000
}

pub fn default_max_connections() -> u32 {
    10
}

pub fn default_connection_timeout() -> u64 {
    5
}

pub fn default_memory_retention() -> usize {
    10_000
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_true() -> bool {
    true
}

//! Utility modules for the broker
//!
//! - **clock**: injectable time source used by the router, cache and health monitor
//! - **error**: infrastructure error type and HTTP error responses
//! - **logging**: tracing subscriber setup

pub mod clock;
pub mod error;
pub mod logging;

pub use clock::{Clock, ManualClock, SystemClock};

use uuid::Uuid;

/// Generate a unique identifier for responses, log rows and rules
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Rough token estimate used when a provider does not report usage
pub fn estimate_tokens(text: &str) -> u32 {
    text.chars().count().div_ceil(4) as u32
}

/// Truncate string to specified length with ellipsis
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

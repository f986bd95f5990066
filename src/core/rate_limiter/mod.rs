//! Per-provider request rate limiting
//!
//! Each adapter owns a sliding one-minute window of its own calls so it can
//! refuse work before contacting the vendor.

mod limiter;
mod types;

pub use limiter::SlidingWindowLimiter;
pub use types::RateLimitResult;

//! Core broker logic
//!
//! Provider adapters, routing, caching, health monitoring and the request
//! broker that ties them together.

pub mod broker;
pub mod cache_manager;
pub mod health;
pub mod providers;
pub mod rate_limiter;
pub mod router;
pub mod traits;
pub mod types;

//! Provider health monitoring

pub mod checker;
pub mod monitor;


pub use checker::{CheckOutcome, HealthCheckResult};
pub use monitor::HealthMonitor;

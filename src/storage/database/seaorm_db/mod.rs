// Module declarations
mod cache_ops;
mod connection;
mod health_ops;
mod log_ops;
mod provider_ops;
mod rule_ops;
mod store;
mod types;

// Re-export public types
pub use types::{DatabaseBackendType, SeaOrmDatabase};

use crate::utils::error::Result;
use tracing::warn;

/// Treat a missing table as "no data" so the broker keeps serving before
/// migrations have run.
pub(super) fn tolerate_missing_table<T: Default>(result: Result<T>, table: &str) -> Result<T> {
    match result {
        Err(e) if e.is_missing_table() => {
            warn!("Table {} does not exist yet, using defaults", table);
            Ok(T::default())
        }
        other => other,
    }
}

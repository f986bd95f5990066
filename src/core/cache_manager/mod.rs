//! Response cache
//!
//! Caches successful broker responses by request fingerprint, with
//! per-kind TTLs, capacity-bounded eviction and lock-free statistics.

pub mod fingerprint;
pub mod manager;
pub mod policy;
pub mod types;


pub use fingerprint::{canonical_form, fingerprint};
pub use manager::ResponseCache;
pub use types::{CacheStats, CachedResponse};

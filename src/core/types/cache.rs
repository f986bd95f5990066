//! Cached response entries

use super::response::ResponseData;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored successful response keyed by request fingerprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub fingerprint: String,
    pub data: ResponseData,
    pub model_used: Option<String>,
    pub provider_used: Option<String>,
    pub tokens_used: Option<u32>,
    pub cost: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub hit_count: u64,
    pub last_accessed: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

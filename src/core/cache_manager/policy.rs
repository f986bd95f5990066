//! Which requests may be cached, and for how long

use crate::core::types::{BrokerRequest, RequestKind, RequestPriority};

/// Whether a request's response may be read from or written to the cache
pub fn is_cacheable(request: &BrokerRequest) -> bool {
    if !request.caching_enabled() {
        return false;
    }
    if request.priority == RequestPriority::Urgent {
        return false;
    }

    let params = &request.parameters;
    if params.is_real_time() || params.has_personal_markers() {
        return false;
    }

    match request.kind() {
        RequestKind::Generation | RequestKind::Analysis => true,
        // Free-form chat is only repeatable when anchored to a subject
        RequestKind::Chat => params.subject().is_some(),
    }
}

/// Longest lifetime any entry may have (one year)
pub const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Entry lifetime in seconds, within `1..=MAX_TTL_SECS`
pub fn ttl_secs(request: &BrokerRequest, default_ttl_secs: u64) -> u64 {
    let ttl = match request.custom_ttl() {
        Some(ttl) => ttl,
        None => match request.kind() {
            RequestKind::Generation => default_ttl_secs.saturating_mul(2),
            RequestKind::Analysis => default_ttl_secs,
            RequestKind::Chat => default_ttl_secs / 2,
        },
    };
    ttl.clamp(1, MAX_TTL_SECS)
}

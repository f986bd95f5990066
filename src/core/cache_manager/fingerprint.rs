//! Request fingerprinting
//!
//! Two requests share a fingerprint when they ask for the same thing: same
//! kind, same normalized parameters, same model preference. The user id is
//! not part of it.

use crate::core::types::BrokerRequest;
use serde_json::{Map, Value, json};
use sha2::{Digest, Sha256};

/// Parameter keys that vary per call without changing the answer
const VOLATILE_KEYS: [&str; 3] = ["timestamp", "session_id", "request_id"];

/// Free-text keys compared case- and whitespace-insensitively
const TEXT_KEYS: [&str; 2] = ["message", "description"];

/// Hex SHA-256 fingerprint of a request
pub fn fingerprint(request: &BrokerRequest) -> String {
    if let Some(key) = request.cache_key() {
        return sha256_hex(key.as_bytes());
    }
    sha256_hex(canonical_form(request).as_bytes())
}

/// Canonical JSON the fingerprint is computed over
pub fn canonical_form(request: &BrokerRequest) -> String {
    let canonical = json!({
        "kind": request.kind(),
        "parameters": normalize_parameters(request.parameters.to_map()),
        "model_preference": request.model_preference,
    });
    // serde_json maps are ordered by key, so serialization is canonical
    canonical.to_string()
}

fn normalize_parameters(mut params: Map<String, Value>) -> Value {
    for key in VOLATILE_KEYS {
        params.remove(key);
    }
    for key in TEXT_KEYS {
        if let Some(Value::String(text)) = params.get_mut(key) {
            *text = text.trim().to_lowercase();
        }
    }
    for value in params.values_mut() {
        if let Value::Array(items) = value {
            items.sort_by_cached_key(|item| item.to_string());
        }
    }
    Value::Object(params)
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

//! Request complexity scoring
//!
//! A deterministic heuristic over request shape and text length that buckets
//! requests into simple, medium and complex.

use crate::core::types::{BrokerRequest, Complexity, RequestKind};

const LONG_TEXT_CHARS: usize = 500;
const VERY_LONG_TEXT_CHARS: usize = 1000;
const LONG_INSTRUCTIONS_CHARS: usize = 100;

/// Raw complexity score
pub fn complexity_score(request: &BrokerRequest) -> u32 {
    let params = &request.parameters;
    let mut score = match request.kind() {
        RequestKind::Analysis => 2,
        RequestKind::Generation => 1,
        RequestKind::Chat => 0,
    };

    if params.is_multimodal() {
        score += 2;
    }
    if params
        .custom_instructions()
        .is_some_and(|c| c.chars().count() > LONG_INSTRUCTIONS_CHARS)
    {
        score += 1;
    }
    if params
        .material_type()
        .is_some_and(|m| m.eq_ignore_ascii_case("lesson_plan"))
    {
        score += 2;
    }
    if params
        .difficulty()
        .is_some_and(|d| d.eq_ignore_ascii_case("advanced"))
    {
        score += 1;
    }

    let text_len = params.message().map(|m| m.chars().count()).unwrap_or(0)
        + params.description().map(|d| d.chars().count()).unwrap_or(0);
    if text_len > VERY_LONG_TEXT_CHARS {
        score += 2;
    } else if text_len > LONG_TEXT_CHARS {
        score += 1;
    }

    score
}

/// Bucket a request by its score
pub fn assess_complexity(request: &BrokerRequest) -> Complexity {
    match complexity_score(request) {
        s if s >= 4 => Complexity::Complex,
        s if s >= 2 => Complexity::Medium,
        _ => Complexity::Simple,
    }
}

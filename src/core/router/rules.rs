//! Routing rule matching
//!
//! Rules are evaluated in `(priority desc, created_at asc)` order and an
//! unset condition matches everything.

use crate::core::types::{BrokerRequest, Complexity, RequestKind, RoutingConditions, RoutingRule};
use crate::utils::estimate_tokens;

use super::complexity::assess_complexity;

/// The request attributes rule conditions are tested against
#[derive(Debug, Clone, PartialEq)]
pub struct RequestFeatures<'a> {
    pub kind: RequestKind,
    pub subject: Option<&'a str>,
    pub complexity: Complexity,
    pub real_time: bool,
    pub multimodal: bool,
    pub user_role: Option<&'a str>,
    pub estimated_tokens: u32,
}

impl<'a> RequestFeatures<'a> {
    pub fn from_request(request: &'a BrokerRequest) -> Self {
        let params = &request.parameters;
        Self {
            kind: request.kind(),
            subject: params.subject(),
            complexity: assess_complexity(request),
            real_time: params.is_real_time(),
            multimodal: params.is_multimodal(),
            user_role: request.metadata.user_role.as_deref(),
            estimated_tokens: estimate_tokens(&params.prompt_text()),
        }
    }
}

/// Whether every set condition holds for the request
pub fn matches(conditions: &RoutingConditions, features: &RequestFeatures<'_>) -> bool {
    if !conditions.request_types.is_empty() && !conditions.request_types.contains(&features.kind)
    {
        return false;
    }

    if !conditions.subjects.is_empty() {
        let Some(subject) = features.subject else {
            return false;
        };
        if !conditions
            .subjects
            .iter()
            .any(|s| s.trim().eq_ignore_ascii_case(subject.trim()))
        {
            return false;
        }
    }

    if !conditions.complexity.is_empty() && !conditions.complexity.contains(&features.complexity) {
        return false;
    }

    if conditions
        .real_time
        .is_some_and(|wanted| wanted != features.real_time)
    {
        return false;
    }
    if conditions
        .multimodal
        .is_some_and(|wanted| wanted != features.multimodal)
    {
        return false;
    }

    if !conditions.user_roles.is_empty() {
        let Some(role) = features.user_role else {
            return false;
        };
        if !conditions.user_roles.iter().any(|r| r.eq_ignore_ascii_case(role)) {
            return false;
        }
    }

    if conditions
        .min_tokens
        .is_some_and(|min| features.estimated_tokens < min)
    {
        return false;
    }
    if conditions
        .max_tokens
        .is_some_and(|max| features.estimated_tokens > max)
    {
        return false;
    }

    true
}

/// Order rules for evaluation: priority desc, then oldest first
pub fn sort_rules(rules: &mut [RoutingRule]) {
    rules.sort_by(|a, b| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}

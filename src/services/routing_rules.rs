//! Routing rule administration
//!
//! Rules are upserted by name and deleted by id. Every change invalidates the
//! router snapshot so the next request sees it.

use crate::core::router::ModelRouter;
use crate::core::types::{RoutingRule, RoutingRuleSpec};
use crate::storage::BrokerStore;
use crate::utils::error::{GatewayError, Result};
use std::sync::Arc;
use tracing::info;

/// Administrative access to routing rules
#[derive(Debug, Clone)]
pub struct RoutingRuleService {
    store: Arc<dyn BrokerStore>,
    router: Arc<ModelRouter>,
}

impl RoutingRuleService {
    pub fn new(store: Arc<dyn BrokerStore>, router: Arc<ModelRouter>) -> Self {
        Self { store, router }
    }

    /// All rules in evaluation order
    pub async fn list(&self) -> Result<Vec<RoutingRule>> {
        let mut rules = self.store.load_routing_rules().await?;
        crate::core::router::rules::sort_rules(&mut rules);
        Ok(rules)
    }

    /// Create a rule, or replace the rule with the same name
    pub async fn upsert(&self, spec: RoutingRuleSpec) -> Result<RoutingRule> {
        validate_spec(&spec)?;
        let rule = self.store.upsert_routing_rule(&spec).await?;
        self.router.invalidate();
        info!(rule = %rule.name, id = %rule.id, "Routing rule saved");
        Ok(rule)
    }

    /// Delete a rule by id
    pub async fn delete(&self, id: &str) -> Result<()> {
        if !self.store.delete_routing_rule(id).await? {
            return Err(GatewayError::not_found(format!("routing rule {}", id)));
        }
        self.router.invalidate();
        info!(id, "Routing rule deleted");
        Ok(())
    }
}

fn validate_spec(spec: &RoutingRuleSpec) -> Result<()> {
    if spec.name.trim().is_empty() {
        return Err(GatewayError::validation("rule name is required"));
    }
    if spec.target.provider_id.trim().is_empty() {
        return Err(GatewayError::validation("rule target provider is required"));
    }
    if let (Some(min), Some(max)) = (spec.conditions.min_tokens, spec.conditions.max_tokens) {
        if min > max {
            return Err(GatewayError::validation(
                "min_tokens cannot be greater than max_tokens",
            ));
        }
    }
    Ok(())
}

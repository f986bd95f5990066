use crate::core::types::{RoutingRule, RoutingRuleSpec, RoutingTarget};
use crate::utils::error::{GatewayError, Result};
use chrono::Utc;
use sea_orm::*;
use tracing::{debug, warn};

use super::super::entities::{self, routing_rule};
use super::types::SeaOrmDatabase;

impl SeaOrmDatabase {
    /// Load all routing rules
    pub async fn list_routing_rules(&self) -> Result<Vec<RoutingRule>> {
        let rows = entities::RoutingRule::find()
            .order_by_desc(routing_rule::Column::Priority)
            .order_by_asc(routing_rule::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        let mut rules = Vec::with_capacity(rows.len());
        for row in rows {
            let name = row.name.clone();
            match rule_from_model(row) {
                Ok(rule) => rules.push(rule),
                Err(e) => warn!("Skipping unreadable routing rule {}: {}", name, e),
            }
        }
        Ok(rules)
    }

    /// Insert a rule or update the rule with the same name
    pub async fn save_routing_rule(&self, spec: &RoutingRuleSpec) -> Result<RoutingRule> {
        debug!("Saving routing rule: {}", spec.name);

        let conditions = serde_json::to_string(&spec.conditions)?;
        let now = Utc::now();

        let existing = entities::RoutingRule::find()
            .filter(routing_rule::Column::Name.eq(spec.name.as_str()))
            .one(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        let model = match existing {
            Some(row) => {
                let mut active_model: routing_rule::ActiveModel = row.into();
                active_model.priority = Set(spec.priority);
                active_model.enabled = Set(spec.enabled);
                active_model.conditions = Set(conditions);
                active_model.target_provider = Set(spec.target.provider_id.clone());
                active_model.target_model = Set(spec.target.model.clone());
                active_model.updated_at = Set(now.into());
                active_model
                    .update(&self.db)
                    .await
                    .map_err(GatewayError::Database)?
            }
            None => {
                let active_model = routing_rule::ActiveModel {
                    id: Set(crate::utils::generate_id()),
                    name: Set(spec.name.clone()),
                    priority: Set(spec.priority),
                    enabled: Set(spec.enabled),
                    conditions: Set(conditions),
                    target_provider: Set(spec.target.provider_id.clone()),
                    target_model: Set(spec.target.model.clone()),
                    created_at: Set(now.into()),
                    updated_at: Set(now.into()),
                };
                active_model
                    .insert(&self.db)
                    .await
                    .map_err(GatewayError::Database)?
            }
        };

        rule_from_model(model)
    }

    /// Delete a routing rule by id
    pub async fn remove_routing_rule(&self, id: &str) -> Result<bool> {
        debug!("Deleting routing rule: {}", id);

        let result = entities::RoutingRule::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(result.rows_affected > 0)
    }
}

fn rule_from_model(model: routing_rule::Model) -> Result<RoutingRule> {
    Ok(RoutingRule {
        conditions: serde_json::from_str(&model.conditions)?,
        id: model.id,
        name: model.name,
        priority: model.priority,
        enabled: model.enabled,
        target: RoutingTarget {
            provider_id: model.target_provider,
            model: model.target_model,
        },
        created_at: model.created_at.with_timezone(&Utc),
    })
}

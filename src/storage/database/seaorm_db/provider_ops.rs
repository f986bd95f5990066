use crate::config::ProviderConfig;
use crate::utils::error::{GatewayError, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::debug;

use super::super::entities::{self, provider};
use super::types::SeaOrmDatabase;

impl SeaOrmDatabase {
    /// Load all provider rows
    pub async fn list_providers(&self) -> Result<Vec<ProviderConfig>> {
        let rows = entities::Provider::find()
            .order_by_desc(provider::Column::Priority)
            .order_by_asc(provider::Column::Id)
            .all(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        rows.into_iter().map(provider_from_model).collect()
    }

    /// Insert or replace a provider row by id
    pub async fn save_provider(&self, config: &ProviderConfig) -> Result<()> {
        debug!("Saving provider: {}", config.id);

        let active_model = provider::ActiveModel {
            id: Set(config.id.clone()),
            name: Set(config.display_name().to_string()),
            provider_type: Set(config.provider_type.clone()),
            base_url: Set(config.base_url.clone()),
            models: Set(serde_json::to_string(&config.models)?),
            default_model: Set(config.default_model.clone()),
            fast_model: Set(config.fast_model.clone()),
            capable_model: Set(config.capable_model.clone()),
            priority: Set(config.priority),
            enabled: Set(config.enabled),
            rpm: Set(config.rpm as i32),
            tpm: Set(config.tpm as i32),
            timeout_secs: Set(config.timeout as i64),
            fallback_provider: Set(config.fallback_provider.clone()),
            updated_at: Set(chrono::Utc::now().into()),
        };

        entities::Provider::insert(active_model)
            .on_conflict(
                OnConflict::column(provider::Column::Id)
                    .update_columns([
                        provider::Column::Name,
                        provider::Column::ProviderType,
                        provider::Column::BaseUrl,
                        provider::Column::Models,
                        provider::Column::DefaultModel,
                        provider::Column::FastModel,
                        provider::Column::CapableModel,
                        provider::Column::Priority,
                        provider::Column::Enabled,
                        provider::Column::Rpm,
                        provider::Column::Tpm,
                        provider::Column::TimeoutSecs,
                        provider::Column::FallbackProvider,
                        provider::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(())
    }
}

fn provider_from_model(model: provider::Model) -> Result<ProviderConfig> {
    Ok(ProviderConfig {
        models: serde_json::from_str(&model.models)?,
        id: model.id,
        name: model.name,
        provider_type: model.provider_type,
        api_key: String::new(),
        base_url: model.base_url,
        default_model: model.default_model,
        fast_model: model.fast_model,
        capable_model: model.capable_model,
        priority: model.priority,
        enabled: model.enabled,
        rpm: model.rpm.max(0) as u32,
        tpm: model.tpm.max(0) as u32,
        timeout: model.timeout_secs.max(0) as u64,
        fallback_provider: model.fallback_provider,
    })
}

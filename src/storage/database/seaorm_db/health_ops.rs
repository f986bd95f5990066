use crate::core::types::ProviderHealthRecord;
use crate::utils::error::{GatewayError, Result};
use chrono::Utc;
use sea_orm::*;
use tracing::warn;

use super::super::entities::{self, provider_health};
use super::types::SeaOrmDatabase;

impl SeaOrmDatabase {
    /// Append a health record
    pub async fn save_health_record(&self, record: &ProviderHealthRecord) -> Result<()> {
        let active_model = provider_health::ActiveModel {
            id: Set(crate::utils::generate_id()),
            provider_id: Set(record.provider_id.clone()),
            status: Set(record.status.as_str().to_string()),
            checked_at: Set(record.checked_at.into()),
            response_time_ms: Set(record.response_time_ms as i64),
            error_rate: Set(record.error_rate),
            rate_limit_remaining: Set(record.rate_limit_remaining.map(|r| r as i32)),
            error: Set(record.error.clone()),
        };

        entities::ProviderHealth::insert(active_model)
            .exec(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(())
    }

    /// Most recent record for each provider that has any
    pub async fn latest_health_by_provider(&self) -> Result<Vec<ProviderHealthRecord>> {
        let provider_ids: Vec<String> = entities::ProviderHealth::find()
            .select_only()
            .column(provider_health::Column::ProviderId)
            .distinct()
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        let mut records = Vec::with_capacity(provider_ids.len());
        for provider_id in provider_ids {
            let row = entities::ProviderHealth::find()
                .filter(provider_health::Column::ProviderId.eq(provider_id.as_str()))
                .order_by_desc(provider_health::Column::CheckedAt)
                .one(&self.db)
                .await
                .map_err(GatewayError::Database)?;

            if let Some(row) = row {
                match record_from_model(row) {
                    Some(record) => records.push(record),
                    None => warn!("Skipping health record with unknown status for {}", provider_id),
                }
            }
        }

        records.sort_by(|a, b| a.provider_id.cmp(&b.provider_id));
        Ok(records)
    }
}

fn record_from_model(model: provider_health::Model) -> Option<ProviderHealthRecord> {
    Some(ProviderHealthRecord {
        status: model.status.parse().ok()?,
        provider_id: model.provider_id,
        checked_at: model.checked_at.with_timezone(&Utc),
        response_time_ms: model.response_time_ms.max(0) as u64,
        error_rate: model.error_rate,
        rate_limit_remaining: model.rate_limit_remaining.map(|r| r.max(0) as u32),
        error: model.error,
    })
}

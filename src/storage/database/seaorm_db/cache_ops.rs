use crate::core::types::CacheEntry;
use crate::utils::error::{GatewayError, Result};
use chrono::{DateTime, Utc};
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use tracing::debug;

use super::super::entities::{self, response_cache};
use super::types::SeaOrmDatabase;

impl SeaOrmDatabase {
    pub async fn find_cache_entry(&self, fingerprint: &str) -> Result<Option<CacheEntry>> {
        let row = entities::ResponseCache::find_by_id(fingerprint)
            .one(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        row.map(entry_from_model).transpose()
    }

    /// Insert or overwrite a cache entry
    pub async fn save_cache_entry(&self, entry: &CacheEntry) -> Result<()> {
        debug!("Saving cache entry: {}", entry.fingerprint);

        let active_model = response_cache::ActiveModel {
            fingerprint: Set(entry.fingerprint.clone()),
            data: Set(serde_json::to_string(&entry.data)?),
            model_used: Set(entry.model_used.clone()),
            provider_used: Set(entry.provider_used.clone()),
            tokens_used: Set(entry.tokens_used.map(|t| t as i32)),
            cost: Set(entry.cost),
            created_at: Set(entry.created_at.into()),
            expires_at: Set(entry.expires_at.into()),
            hit_count: Set(entry.hit_count as i64),
            last_accessed: Set(entry.last_accessed.into()),
        };

        entities::ResponseCache::insert(active_model)
            .on_conflict(
                OnConflict::column(response_cache::Column::Fingerprint)
                    .update_columns([
                        response_cache::Column::Data,
                        response_cache::Column::ModelUsed,
                        response_cache::Column::ProviderUsed,
                        response_cache::Column::TokensUsed,
                        response_cache::Column::Cost,
                        response_cache::Column::CreatedAt,
                        response_cache::Column::ExpiresAt,
                        response_cache::Column::HitCount,
                        response_cache::Column::LastAccessed,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(())
    }

    pub async fn touch_cache_entry(&self, fingerprint: &str, at: DateTime<Utc>) -> Result<()> {
        let Some(row) = entities::ResponseCache::find_by_id(fingerprint)
            .one(&self.db)
            .await
            .map_err(GatewayError::Database)?
        else {
            return Ok(());
        };

        let hit_count = row.hit_count;
        let mut active_model: response_cache::ActiveModel = row.into();
        active_model.hit_count = Set(hit_count + 1);
        active_model.last_accessed = Set(at.into());
        active_model
            .update(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(())
    }

    pub async fn remove_cache_entry(&self, fingerprint: &str) -> Result<()> {
        entities::ResponseCache::delete_by_id(fingerprint)
            .exec(&self.db)
            .await
            .map_err(GatewayError::Database)?;
        Ok(())
    }

    pub async fn cache_entry_count(&self) -> Result<usize> {
        let count = entities::ResponseCache::find()
            .count(&self.db)
            .await
            .map_err(GatewayError::Database)?;
        Ok(count as usize)
    }

    /// Delete the `count` least recently used entries
    pub async fn evict_least_recently_used(&self, count: usize) -> Result<usize> {
        if count == 0 {
            return Ok(0);
        }

        let victims: Vec<String> = entities::ResponseCache::find()
            .order_by_asc(response_cache::Column::LastAccessed)
            .order_by_asc(response_cache::Column::CreatedAt)
            .limit(count as u64)
            .all(&self.db)
            .await
            .map_err(GatewayError::Database)?
            .into_iter()
            .map(|row| row.fingerprint)
            .collect();

        if victims.is_empty() {
            return Ok(0);
        }

        let result = entities::ResponseCache::delete_many()
            .filter(response_cache::Column::Fingerprint.is_in(victims))
            .exec(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        debug!("Evicted {} cache entries", result.rows_affected);
        Ok(result.rows_affected as usize)
    }

    pub async fn remove_all_cache_entries(&self) -> Result<usize> {
        let result = entities::ResponseCache::delete_many()
            .exec(&self.db)
            .await
            .map_err(GatewayError::Database)?;
        Ok(result.rows_affected as usize)
    }
}

fn entry_from_model(model: response_cache::Model) -> Result<CacheEntry> {
    Ok(CacheEntry {
        data: serde_json::from_str(&model.data)?,
        fingerprint: model.fingerprint,
        model_used: model.model_used,
        provider_used: model.provider_used,
        tokens_used: model.tokens_used.map(|t| t.max(0) as u32),
        cost: model.cost,
        created_at: model.created_at.with_timezone(&Utc),
        expires_at: model.expires_at.with_timezone(&Utc),
        hit_count: model.hit_count.max(0) as u64,
        last_accessed: model.last_accessed.with_timezone(&Utc),
    })
}

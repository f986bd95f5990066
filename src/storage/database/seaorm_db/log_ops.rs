use crate::core::types::{ErrorCode, RequestLogRecord, RequestPriority};
use crate::utils::error::{GatewayError, Result};
use chrono::Utc;
use sea_orm::*;

use super::super::entities::{self, request_log};
use super::types::SeaOrmDatabase;

impl SeaOrmDatabase {
    /// Insert a request log row
    pub async fn save_request_log(&self, record: &RequestLogRecord) -> Result<()> {
        let active_model = request_log::ActiveModel {
            id: Set(record.id.clone()),
            request_id: Set(record.request_id.clone()),
            user_id: Set(record.user_id.clone()),
            conversation_id: Set(record.conversation_id.clone()),
            kind: Set(record.kind.map(|k| k.as_str().to_string())),
            priority: Set(record.priority.as_str().to_string()),
            provider_id: Set(record.provider_id.clone()),
            model: Set(record.model.clone()),
            tokens_used: Set(record.tokens_used.map(|t| t as i32)),
            cost: Set(record.cost),
            processing_time_ms: Set(record.processing_time_ms as i64),
            cached: Set(record.cached),
            streaming: Set(record.streaming),
            success: Set(record.success),
            error_code: Set(record.error_code.map(|c| c.as_str().to_string())),
            error_message: Set(record.error_message.clone()),
            attempts: Set(serde_json::to_string(&record.attempts)?),
            created_at: Set(record.created_at.into()),
        };

        entities::RequestLog::insert(active_model)
            .exec(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok(())
    }

    /// Newest request log rows first
    pub async fn list_request_logs(&self, limit: u64) -> Result<Vec<RequestLogRecord>> {
        let rows = entities::RequestLog::find()
            .order_by_desc(request_log::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        rows.into_iter().map(log_from_model).collect()
    }
}

fn log_from_model(model: request_log::Model) -> Result<RequestLogRecord> {
    let error_code = model
        .error_code
        .as_deref()
        .map(|code| serde_json::from_value::<ErrorCode>(serde_json::Value::String(code.to_string())))
        .transpose()?;
    let priority: RequestPriority =
        serde_json::from_value(serde_json::Value::String(model.priority.clone()))?;

    Ok(RequestLogRecord {
        attempts: serde_json::from_str(&model.attempts)?,
        kind: model.kind.as_deref().and_then(|k| k.parse().ok()),
        id: model.id,
        request_id: model.request_id,
        user_id: model.user_id,
        conversation_id: model.conversation_id,
        priority,
        provider_id: model.provider_id,
        model: model.model,
        tokens_used: model.tokens_used.map(|t| t.max(0) as u32),
        cost: model.cost,
        processing_time_ms: model.processing_time_ms.max(0) as u64,
        cached: model.cached,
        streaming: model.streaming,
        success: model.success,
        error_code,
        error_message: model.error_message,
        created_at: model.created_at.with_timezone(&Utc),
    })
}

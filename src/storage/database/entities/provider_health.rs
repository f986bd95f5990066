use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Provider health history row (append-only)
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "broker_provider_health")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub provider_id: String,

    /// healthy, degraded or unhealthy
    pub status: String,

    pub checked_at: DateTimeWithTimeZone,

    pub response_time_ms: i64,

    pub error_rate: f64,

    pub rate_limit_remaining: Option<i32>,

    #[sea_orm(column_type = "Text", nullable)]
    pub error: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cached response row
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "broker_response_cache")]
pub struct Model {
    /// Hex SHA-256 request fingerprint
    #[sea_orm(primary_key, auto_increment = false)]
    pub fingerprint: String,

    /// Response payload (JSON)
    pub data: String,

    pub model_used: Option<String>,

    pub provider_used: Option<String>,

    pub tokens_used: Option<i32>,

    pub cost: Option<f64>,

    pub created_at: DateTimeWithTimeZone,

    pub expires_at: DateTimeWithTimeZone,

    pub hit_count: i64,

    pub last_accessed: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

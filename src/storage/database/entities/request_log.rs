use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Request log row, one per handled request
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "broker_request_logs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub request_id: String,

    pub user_id: String,

    pub conversation_id: Option<String>,

    /// chat, generation or analysis; absent when the payload could not be parsed
    pub kind: Option<String>,

    pub priority: String,

    pub provider_id: Option<String>,

    pub model: Option<String>,

    pub tokens_used: Option<i32>,

    pub cost: Option<f64>,

    pub processing_time_ms: i64,

    pub cached: bool,

    pub streaming: bool,

    pub success: bool,

    pub error_code: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub error_message: Option<String>,

    /// Provider attempts (JSON array)
    #[sea_orm(column_type = "Text")]
    pub attempts: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

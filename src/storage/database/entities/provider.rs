use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Provider configuration row. Credentials are never persisted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "broker_providers")]
pub struct Model {
    /// Provider ID
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Display name
    pub name: String,

    /// Vendor type
    pub provider_type: String,

    /// Base URL (optional)
    pub base_url: Option<String>,

    /// Supported models (JSON array)
    pub models: String,

    pub default_model: Option<String>,
    pub fast_model: Option<String>,
    pub capable_model: Option<String>,

    /// Routing priority, higher first
    pub priority: i32,

    pub enabled: bool,

    /// Requests per minute
    pub rpm: i32,

    /// Tokens per minute
    pub tpm: i32,

    /// Request timeout in seconds
    pub timeout_secs: i64,

    /// Designated fallback provider ID
    pub fallback_provider: Option<String>,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Routing rule row
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "broker_routing_rules")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Natural key used by administrative upserts
    #[sea_orm(unique)]
    pub name: String,

    pub priority: i32,

    pub enabled: bool,

    /// Match conditions (JSON object)
    pub conditions: String,

    pub target_provider: String,

    pub target_model: String,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

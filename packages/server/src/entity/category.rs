use common::Visibility;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Blog category. `parent_id` is a plain column, not a foreign key: a
/// dangling parent is tolerated and rendered as a root.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "category")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub slug: String,

    /// Locale code -> display name.
    #[sea_orm(column_type = "JsonBinary")]
    pub name: serde_json::Value,

    #[sea_orm(column_type = "JsonBinary")]
    pub description: Option<serde_json::Value>,

    #[sea_orm(indexed)]
    pub parent_id: Option<i32>,

    pub sort_order: f64,

    #[sea_orm(default_value = true, indexed)]
    pub is_active: bool,

    pub visibility: Visibility,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

use common::PostStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Snapshot of a post after an editing save. Pruned oldest-first.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post_revision")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub post_id: i32,

    pub date: DateTimeUtc,

    #[sea_orm(column_type = "JsonBinary")]
    pub content: serde_json::Value,

    #[sea_orm(column_type = "JsonBinary")]
    pub seo: serde_json::Value,

    /// JSON array of category ids.
    #[sea_orm(column_type = "JsonBinary")]
    pub category_ids: serde_json::Value,

    pub featured_image: Option<String>,

    pub status: PostStatus,

    pub modified_by: String,
}

impl ActiveModelBehavior for ActiveModel {}

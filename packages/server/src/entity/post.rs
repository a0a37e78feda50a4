use common::PostStatus;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub slug: String,

    /// Locale code -> {title, summary, body}.
    #[sea_orm(column_type = "JsonBinary")]
    pub content: serde_json::Value,

    #[sea_orm(column_type = "JsonBinary")]
    pub seo: serde_json::Value,

    pub featured_image: Option<String>,

    #[sea_orm(indexed)]
    pub status: PostStatus,

    pub publish_date: Option<DateTimeUtc>,

    #[sea_orm(indexed)]
    pub scheduled_publish_date: Option<DateTimeUtc>,

    #[sea_orm(default_value = 0)]
    pub view_count: i64,

    /// Soft-delete flag; deleted rows are excluded from every read.
    #[sea_orm(default_value = false, indexed)]
    pub is_deleted: bool,

    /// Lowercased slug, titles and summaries for substring search.
    #[sea_orm(column_type = "Text")]
    pub search_text: String,

    pub created_by: String,
    pub updated_by: String,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

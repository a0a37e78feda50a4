use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use common::{BlogPost, LocalizedContent, PostContent, PostStatus, Revision, SeoMeta};
use serde::{Deserialize, Serialize};

pub use super::shared::Pagination;
use super::shared::double_option;

/// New posts always start as drafts.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct CreatePostRequest {
    #[schema(example = "starke-verben")]
    pub slug: String,
    #[schema(value_type = std::collections::BTreeMap<String, LocalizedContent>)]
    pub content: PostContent,
    #[serde(default)]
    pub seo: SeoMeta,
    #[serde(default)]
    pub category_ids: BTreeSet<i32>,
    #[serde(default)]
    pub featured_image: Option<String>,
    #[serde(default)]
    pub scheduled_publish_date: Option<DateTime<Utc>>,
}

/// Absent fields are left unchanged. The three date and image fields accept
/// `null` to clear.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdatePostRequest {
    pub slug: Option<String>,
    #[schema(value_type = Option<std::collections::BTreeMap<String, LocalizedContent>>)]
    pub content: Option<PostContent>,
    pub seo: Option<SeoMeta>,
    pub category_ids: Option<BTreeSet<i32>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub featured_image: Option<Option<String>>,
    pub status: Option<PostStatus>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub publish_date: Option<Option<DateTime<Utc>>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub scheduled_publish_date: Option<Option<DateTime<Utc>>>,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PostListQuery {
    /// Page number (1-indexed).
    #[param(example = 1)]
    pub page: Option<u64>,
    /// Items per page (1-100, default 20).
    #[param(example = 20)]
    pub per_page: Option<u64>,
    /// `draft`, `published` or `archived`.
    #[param(example = "published")]
    pub status: Option<String>,
    /// Only posts linked to this category id.
    #[param(example = 7)]
    pub category: Option<i32>,
    /// Case-insensitive match on slug, titles and summaries.
    #[param(example = "verben")]
    pub search: Option<String>,
    /// `created_at` (default), `updated_at`, `publish_date` or `view_count`.
    #[param(example = "publish_date")]
    pub sort_by: Option<String>,
    /// `asc` or `desc` (default).
    #[param(example = "desc")]
    pub sort_order: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct PostListResponse {
    pub data: Vec<BlogPost>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RevisionListResponse {
    /// Oldest first.
    pub data: Vec<Revision>,
}

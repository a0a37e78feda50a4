//! Persistence seam for categories, posts and revisions.
//!
//! Services only talk to [`ContentStore`]. The SeaORM backend is used in
//! production; the in-memory one backs tests and `memory:` demos.

mod filter;

pub mod memory;
pub mod sea;

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{
    BlogPost, Category, LocalizedText, PostContent, PostStatus, Revision, SeoMeta, Visibility,
};
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

pub use filter::{CategoryFilter, ParentFilter, PostFilter, PostSort};
pub use memory::MemoryStore;
pub use sea::SeaStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => StoreError::Conflict(detail),
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Backend(format!("malformed stored document: {err}"))
    }
}

/// Category fields supplied on creation; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub slug: String,
    pub name: LocalizedText,
    pub description: Option<LocalizedText>,
    pub parent_id: Option<i32>,
    pub sort_order: f64,
    pub is_active: bool,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
}

/// Post fields supplied on creation; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub slug: String,
    pub content: PostContent,
    pub seo: SeoMeta,
    pub category_ids: BTreeSet<i32>,
    pub featured_image: Option<String>,
    pub status: PostStatus,
    pub publish_date: Option<DateTime<Utc>>,
    pub scheduled_publish_date: Option<DateTime<Utc>>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// One page of posts plus the total number of matches.
#[derive(Debug, Clone)]
pub struct PostPage {
    pub items: Vec<BlogPost>,
    pub total: u64,
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Categories matching `filter`, ordered by `sort_order` then id.
    async fn list_categories(&self, filter: &CategoryFilter) -> Result<Vec<Category>, StoreError>;

    async fn get_category(&self, id: i32) -> Result<Option<Category>, StoreError>;

    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError>;

    /// Insert a category. A taken slug yields [`StoreError::Conflict`].
    async fn insert_category(&self, category: NewCategory) -> Result<Category, StoreError>;

    /// Overwrite every mutable field of an existing category.
    async fn update_category(&self, category: &Category) -> Result<Category, StoreError>;

    /// Returns `true` if the category existed.
    async fn delete_category(&self, id: i32) -> Result<bool, StoreError>;

    async fn count_children(&self, id: i32) -> Result<u64, StoreError>;

    /// Number of non-deleted posts linked to the category.
    async fn count_posts_in_category(&self, id: i32) -> Result<u64, StoreError>;

    async fn list_posts(&self, filter: &PostFilter) -> Result<PostPage, StoreError>;

    /// Soft-deleted posts are never returned.
    async fn get_post(&self, id: i32) -> Result<Option<BlogPost>, StoreError>;

    async fn find_post_by_slug(&self, slug: &str) -> Result<Option<BlogPost>, StoreError>;

    /// Insert a post. A taken slug yields [`StoreError::Conflict`].
    async fn insert_post(&self, post: NewPost) -> Result<BlogPost, StoreError>;

    /// Overwrite the editable fields of a live post, including its category
    /// links, and return the stored row. `None` when the post is missing or
    /// soft-deleted. `is_deleted`, `view_count` and the `created_*` fields
    /// are never taken from `post`.
    async fn update_post(&self, post: &BlogPost) -> Result<Option<BlogPost>, StoreError>;

    /// Mark a post deleted. Returns `false` if it was missing or already deleted.
    async fn soft_delete_post(
        &self,
        id: i32,
        actor: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    async fn increment_view_count(&self, id: i32) -> Result<(), StoreError>;

    /// Publish every live draft whose scheduled date is at or before `now`
    /// in one conditional write: status becomes published, `publish_date`
    /// becomes `now`, the schedule is cleared and `actor` is stamped.
    /// Returns how many posts changed.
    async fn publish_due_scheduled(
        &self,
        now: DateTime<Utc>,
        actor: &str,
    ) -> Result<u64, StoreError>;

    /// Append a revision, keep the newest `cap`, return how many were pruned.
    async fn append_revision(
        &self,
        post_id: i32,
        revision: Revision,
        cap: usize,
    ) -> Result<usize, StoreError>;

    /// Revisions oldest first.
    async fn list_revisions(&self, post_id: i32) -> Result<Vec<Revision>, StoreError>;
}

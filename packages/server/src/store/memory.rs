use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{BlogPost, Category, PostStatus, Revision, RevisionLog, post::is_due_for_publish};
use tokio::sync::RwLock;

use super::{
    CategoryFilter, ContentStore, NewCategory, NewPost, ParentFilter, PostFilter, PostPage,
    PostSort, StoreError,
};

#[derive(Default)]
struct MemoryState {
    last_category_id: i32,
    last_post_id: i32,
    categories: BTreeMap<i32, Category>,
    posts: BTreeMap<i32, BlogPost>,
    revisions: HashMap<i32, Vec<Revision>>,
}

impl MemoryState {
    fn category_slug_taken(&self, slug: &str, except: Option<i32>) -> bool {
        self.categories
            .values()
            .any(|c| c.slug == slug && Some(c.id) != except)
    }

    /// Slugs stay reserved by soft-deleted posts, like the unique index.
    fn post_slug_taken(&self, slug: &str, except: Option<i32>) -> bool {
        self.posts
            .values()
            .any(|p| p.slug == slug && Some(p.id) != except)
    }
}

/// Process-local store behind a single `RwLock`.
///
/// Each trait call takes the lock once, so every call is atomic.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn category_matches(filter: &CategoryFilter, category: &Category) -> bool {
    if let Some(active) = filter.active
        && category.is_active != active
    {
        return false;
    }
    if let Some(visibility) = filter.visibility
        && category.visibility != visibility
    {
        return false;
    }
    match filter.parent {
        None => true,
        Some(ParentFilter::Root) => category.parent_id.is_none(),
        Some(ParentFilter::Id(id)) => category.parent_id == Some(id),
    }
}

fn post_matches(filter: &PostFilter, search: Option<&str>, post: &BlogPost) -> bool {
    if post.is_deleted {
        return false;
    }
    if let Some(status) = filter.status
        && post.status != status
    {
        return false;
    }
    if let Some(category_id) = filter.category_id
        && !post.category_ids.contains(&category_id)
    {
        return false;
    }
    match search {
        Some(term) => post.search_text().contains(term),
        None => true,
    }
}

fn compare_posts(sort: PostSort, a: &BlogPost, b: &BlogPost) -> Ordering {
    let primary = match sort {
        PostSort::CreatedAt => a.created_at.cmp(&b.created_at),
        PostSort::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        PostSort::PublishDate => a.publish_date.cmp(&b.publish_date),
        PostSort::ViewCount => a.view_count.cmp(&b.view_count),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn list_categories(&self, filter: &CategoryFilter) -> Result<Vec<Category>, StoreError> {
        let state = self.state.read().await;
        let mut categories: Vec<Category> = state
            .categories
            .values()
            .filter(|c| category_matches(filter, c))
            .cloned()
            .collect();
        categories.sort_by(|a, b| {
            a.sort_order
                .total_cmp(&b.sort_order)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(categories)
    }

    async fn get_category(&self, id: i32) -> Result<Option<Category>, StoreError> {
        Ok(self.state.read().await.categories.get(&id).cloned())
    }

    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError> {
        let state = self.state.read().await;
        Ok(state.categories.values().find(|c| c.slug == slug).cloned())
    }

    async fn insert_category(&self, category: NewCategory) -> Result<Category, StoreError> {
        let mut state = self.state.write().await;
        if state.category_slug_taken(&category.slug, None) {
            return Err(StoreError::Conflict(format!(
                "category slug '{}' already exists",
                category.slug
            )));
        }

        state.last_category_id += 1;
        let stored = Category {
            id: state.last_category_id,
            slug: category.slug,
            name: category.name,
            description: category.description,
            parent_id: category.parent_id,
            sort_order: category.sort_order,
            is_active: category.is_active,
            visibility: category.visibility,
            created_at: category.created_at,
            updated_at: category.created_at,
        };
        state.categories.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_category(&self, category: &Category) -> Result<Category, StoreError> {
        let mut state = self.state.write().await;
        if !state.categories.contains_key(&category.id) {
            return Err(StoreError::Backend(format!(
                "category {} vanished during update",
                category.id
            )));
        }
        if state.category_slug_taken(&category.slug, Some(category.id)) {
            return Err(StoreError::Conflict(format!(
                "category slug '{}' already exists",
                category.slug
            )));
        }
        state.categories.insert(category.id, category.clone());
        Ok(category.clone())
    }

    async fn delete_category(&self, id: i32) -> Result<bool, StoreError> {
        Ok(self.state.write().await.categories.remove(&id).is_some())
    }

    async fn count_children(&self, id: i32) -> Result<u64, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .categories
            .values()
            .filter(|c| c.parent_id == Some(id))
            .count() as u64)
    }

    async fn count_posts_in_category(&self, id: i32) -> Result<u64, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .posts
            .values()
            .filter(|p| !p.is_deleted && p.category_ids.contains(&id))
            .count() as u64)
    }

    async fn list_posts(&self, filter: &PostFilter) -> Result<PostPage, StoreError> {
        let state = self.state.read().await;
        let search = filter.search_term();
        let mut matched: Vec<&BlogPost> = state
            .posts
            .values()
            .filter(|p| post_matches(filter, search.as_deref(), p))
            .collect();

        matched.sort_by(|a, b| compare_posts(filter.sort_by, a, b));
        if filter.descending {
            matched.reverse();
        }

        let total = matched.len() as u64;
        let items = matched
            .into_iter()
            .skip(usize::try_from(filter.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(filter.per_page).unwrap_or(usize::MAX))
            .cloned()
            .collect();

        Ok(PostPage { items, total })
    }

    async fn get_post(&self, id: i32) -> Result<Option<BlogPost>, StoreError> {
        let state = self.state.read().await;
        Ok(state.posts.get(&id).filter(|p| !p.is_deleted).cloned())
    }

    async fn find_post_by_slug(&self, slug: &str) -> Result<Option<BlogPost>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .posts
            .values()
            .find(|p| !p.is_deleted && p.slug == slug)
            .cloned())
    }

    async fn insert_post(&self, post: NewPost) -> Result<BlogPost, StoreError> {
        let mut state = self.state.write().await;
        if state.post_slug_taken(&post.slug, None) {
            return Err(StoreError::Conflict(format!(
                "post slug '{}' already exists",
                post.slug
            )));
        }

        state.last_post_id += 1;
        let stored = BlogPost {
            id: state.last_post_id,
            slug: post.slug,
            content: post.content,
            seo: post.seo,
            category_ids: post.category_ids,
            featured_image: post.featured_image,
            status: post.status,
            publish_date: post.publish_date,
            scheduled_publish_date: post.scheduled_publish_date,
            view_count: 0,
            is_deleted: false,
            updated_by: post.created_by.clone(),
            created_by: post.created_by,
            created_at: post.created_at,
            updated_at: post.created_at,
        };
        state.posts.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_post(&self, post: &BlogPost) -> Result<Option<BlogPost>, StoreError> {
        let mut state = self.state.write().await;
        if !state.posts.get(&post.id).is_some_and(|p| !p.is_deleted) {
            return Ok(None);
        }
        if state.post_slug_taken(&post.slug, Some(post.id)) {
            return Err(StoreError::Conflict(format!(
                "post slug '{}' already exists",
                post.slug
            )));
        }
        let Some(stored) = state.posts.get_mut(&post.id) else {
            return Ok(None);
        };
        stored.slug = post.slug.clone();
        stored.content = post.content.clone();
        stored.seo = post.seo.clone();
        stored.category_ids = post.category_ids.clone();
        stored.featured_image = post.featured_image.clone();
        stored.status = post.status;
        stored.publish_date = post.publish_date;
        stored.scheduled_publish_date = post.scheduled_publish_date;
        stored.updated_by = post.updated_by.clone();
        stored.updated_at = post.updated_at;
        Ok(Some(stored.clone()))
    }

    async fn soft_delete_post(
        &self,
        id: i32,
        actor: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        match state.posts.get_mut(&id) {
            Some(post) if !post.is_deleted => {
                post.is_deleted = true;
                post.updated_by = actor.to_string();
                post.updated_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn increment_view_count(&self, id: i32) -> Result<(), StoreError> {
        if let Some(post) = self.state.write().await.posts.get_mut(&id) {
            post.view_count += 1;
        }
        Ok(())
    }

    async fn publish_due_scheduled(
        &self,
        now: DateTime<Utc>,
        actor: &str,
    ) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        let mut published = 0;
        for post in state.posts.values_mut() {
            if !is_due_for_publish(post, now) {
                continue;
            }
            post.status = PostStatus::Published;
            post.publish_date = Some(now);
            post.scheduled_publish_date = None;
            post.updated_by = actor.to_string();
            post.updated_at = now;
            published += 1;
        }
        Ok(published)
    }

    async fn append_revision(
        &self,
        post_id: i32,
        revision: Revision,
        cap: usize,
    ) -> Result<usize, StoreError> {
        let mut state = self.state.write().await;
        let log = state.revisions.entry(post_id).or_default();
        Ok(RevisionLog::push(log, revision, cap))
    }

    async fn list_revisions(&self, post_id: i32) -> Result<Vec<Revision>, StoreError> {
        let state = self.state.read().await;
        Ok(state.revisions.get(&post_id).cloned().unwrap_or_default())
    }
}

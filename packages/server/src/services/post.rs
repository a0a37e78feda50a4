use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use common::post::{resolve_publish_date, validate_post_content};
use common::slug::{normalize_slug, validate_slug};
use common::{BlogPost, DomainError, PostStatus, Revision};
use tracing::{info, instrument, warn};

use super::{ServiceResult, slug_conflict};
use crate::config::ContentConfig;
use crate::models::post::{CreatePostRequest, UpdatePostRequest};
use crate::models::shared::patch_nullable;
use crate::store::{ContentStore, NewPost, PostFilter, PostPage};

pub struct PostService<'a> {
    store: &'a dyn ContentStore,
    config: &'a ContentConfig,
}

fn clean_image(image: Option<String>) -> Option<String> {
    image
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl<'a> PostService<'a> {
    pub fn new(store: &'a dyn ContentStore, config: &'a ContentConfig) -> Self {
        Self { store, config }
    }

    /// Live (not soft-deleted) post by id.
    pub async fn get(&self, id: i32) -> ServiceResult<BlogPost> {
        self.store
            .get_post(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Post {id} not found")).into())
    }

    pub async fn list(&self, filter: &PostFilter) -> ServiceResult<PostPage> {
        Ok(self.store.list_posts(filter).await?)
    }

    async fn ensure_slug_free(&self, slug: &str, except: Option<i32>) -> ServiceResult<()> {
        match self.store.find_post_by_slug(slug).await? {
            Some(existing) if Some(existing.id) != except => Err(DomainError::validation(
                format!("Slug '{slug}' is already in use"),
            )
            .into()),
            _ => Ok(()),
        }
    }

    async fn ensure_categories_exist(&self, ids: &BTreeSet<i32>) -> ServiceResult<()> {
        for &id in ids {
            if self.store.get_category(id).await?.is_none() {
                return Err(DomainError::ReferentialIntegrity(format!(
                    "Category {id} does not exist"
                ))
                .into());
            }
        }
        Ok(())
    }

    #[instrument(skip(self, req), fields(slug = %req.slug))]
    pub async fn create(&self, req: CreatePostRequest, actor: &str) -> ServiceResult<BlogPost> {
        let slug = normalize_slug(&req.slug);
        validate_slug(&slug)?;
        validate_post_content(&req.content, &self.config.required_locales)?;
        self.ensure_categories_exist(&req.category_ids).await?;
        self.ensure_slug_free(&slug, None).await?;

        let created = self
            .store
            .insert_post(NewPost {
                slug: slug.clone(),
                content: req.content,
                seo: req.seo,
                category_ids: req.category_ids,
                featured_image: clean_image(req.featured_image),
                status: PostStatus::Draft,
                publish_date: None,
                scheduled_publish_date: req.scheduled_publish_date,
                created_by: actor.to_string(),
                created_at: Utc::now(),
            })
            .await
            .map_err(|e| slug_conflict(e, &slug))?;

        info!(post_id = created.id, actor, "Post created");
        Ok(created)
    }

    /// Apply a partial update, then record a revision if any tracked field
    /// changed. The revision write never fails the update.
    #[instrument(skip(self, req))]
    pub async fn update(
        &self,
        id: i32,
        req: UpdatePostRequest,
        actor: &str,
    ) -> ServiceResult<BlogPost> {
        let current = self.get(id).await?;
        let mut next = current.clone();
        let now = Utc::now();

        if let Some(slug) = req.slug {
            let slug = normalize_slug(&slug);
            validate_slug(&slug)?;
            if slug != current.slug {
                self.ensure_slug_free(&slug, Some(id)).await?;
            }
            next.slug = slug;
        }
        if let Some(content) = req.content {
            next.content = content;
        }
        validate_post_content(&next.content, &self.config.required_locales)?;
        if let Some(seo) = req.seo {
            next.seo = seo;
        }
        if let Some(category_ids) = req.category_ids {
            self.ensure_categories_exist(&category_ids).await?;
            next.category_ids = category_ids;
        }
        if let Some(image) = req.featured_image {
            next.featured_image = clean_image(image);
        }
        patch_nullable(&mut next.publish_date, req.publish_date);
        patch_nullable(&mut next.scheduled_publish_date, req.scheduled_publish_date);
        if let Some(status) = req.status {
            next.status = status;
        }
        next.publish_date = resolve_publish_date(
            current.status,
            next.status,
            next.publish_date,
            next.scheduled_publish_date,
            now,
        );
        next.updated_by = actor.to_string();
        next.updated_at = now;

        let slug = next.slug.clone();
        let saved = self
            .store
            .update_post(&next)
            .await
            .map_err(|e| slug_conflict(e, &slug))?
            .ok_or_else(|| DomainError::not_found(format!("Post {id} not found")))?;

        if current.status != saved.status {
            info!(
                post_id = id,
                from = %current.status,
                to = %saved.status,
                publish_date = ?saved.publish_date,
                "Post status changed"
            );
        }
        if current.tracked_fields_differ(&saved) {
            self.record_revision(&saved, actor, now).await;
        }
        Ok(saved)
    }

    async fn record_revision(&self, post: &BlogPost, actor: &str, at: DateTime<Utc>) {
        let revision = Revision::snapshot(post, actor, at);
        match self
            .store
            .append_revision(post.id, revision, self.config.max_revisions)
            .await
        {
            Ok(0) => {}
            Ok(pruned) => info!(post_id = post.id, pruned, "Pruned old revisions"),
            Err(e) => warn!(
                post_id = post.id,
                error = %e,
                "Failed to record revision; the post update itself was saved"
            ),
        }
    }

    /// Public read: only published posts are visible. Counts a view.
    #[instrument(skip(self))]
    pub async fn get_published_by_slug(&self, slug: &str) -> ServiceResult<BlogPost> {
        let mut post = self
            .store
            .find_post_by_slug(slug)
            .await?
            .filter(|p| p.status == PostStatus::Published)
            .ok_or_else(|| DomainError::not_found(format!("Post '{slug}' not found")))?;

        match self.store.increment_view_count(post.id).await {
            Ok(()) => post.view_count += 1,
            Err(e) => warn!(post_id = post.id, error = %e, "Failed to count post view"),
        }
        Ok(post)
    }

    /// Soft delete. The post disappears from every read but keeps its slug.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32, actor: &str) -> ServiceResult<()> {
        if !self.store.soft_delete_post(id, actor, Utc::now()).await? {
            return Err(DomainError::not_found(format!("Post {id} not found")).into());
        }
        info!(post_id = id, actor, "Post deleted");
        Ok(())
    }

    pub async fn revisions(&self, id: i32) -> ServiceResult<Vec<Revision>> {
        self.get(id).await?;
        Ok(self.store.list_revisions(id).await?)
    }
}

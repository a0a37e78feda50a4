use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{BlogPost, Category, PostStatus, Revision};
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr, Query as SeaQuery};
use sea_orm::*;

use super::{
    CategoryFilter, ContentStore, NewCategory, NewPost, ParentFilter, PostFilter, PostPage,
    PostSort, StoreError,
};
use crate::entity::{category, post, post_category, post_revision};

/// Postgres-backed store. Multi-row writes run inside one transaction.
#[derive(Clone)]
pub struct SeaStore {
    db: DatabaseConnection,
}

impl SeaStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

/// Escape LIKE wildcards so user input matches literally.
fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn apply_category_filter(
    mut select: Select<category::Entity>,
    filter: &CategoryFilter,
) -> Select<category::Entity> {
    if let Some(active) = filter.active {
        select = select.filter(category::Column::IsActive.eq(active));
    }
    if let Some(visibility) = filter.visibility {
        select = select.filter(category::Column::Visibility.eq(visibility));
    }
    match filter.parent {
        None => select,
        Some(ParentFilter::Root) => select.filter(category::Column::ParentId.is_null()),
        Some(ParentFilter::Id(id)) => select.filter(category::Column::ParentId.eq(id)),
    }
}

fn apply_post_filter(mut select: Select<post::Entity>, filter: &PostFilter) -> Select<post::Entity> {
    select = select.filter(post::Column::IsDeleted.eq(false));
    if let Some(status) = filter.status {
        select = select.filter(post::Column::Status.eq(status));
    }
    if let Some(category_id) = filter.category_id {
        select = select.filter(
            post::Column::Id.in_subquery(
                SeaQuery::select()
                    .column(post_category::Column::PostId)
                    .from(post_category::Entity)
                    .and_where(post_category::Column::CategoryId.eq(category_id))
                    .to_owned(),
            ),
        );
    }
    if let Some(term) = filter.search_term() {
        let term = escape_like(&term);
        select = select.filter(
            Expr::expr(Func::lower(Expr::col(post::Column::SearchText)))
                .like(LikeExpr::new(format!("%{term}%")).escape('\\')),
        );
    }
    select
}

fn category_from_model(model: category::Model) -> Result<Category, StoreError> {
    Ok(Category {
        id: model.id,
        slug: model.slug,
        name: serde_json::from_value(model.name)?,
        description: model
            .description
            .map(serde_json::from_value)
            .transpose()?,
        parent_id: model.parent_id,
        sort_order: model.sort_order,
        is_active: model.is_active,
        visibility: model.visibility,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn post_from_model(model: post::Model, category_ids: BTreeSet<i32>) -> Result<BlogPost, StoreError> {
    Ok(BlogPost {
        id: model.id,
        slug: model.slug,
        content: serde_json::from_value(model.content)?,
        seo: serde_json::from_value(model.seo)?,
        category_ids,
        featured_image: model.featured_image,
        status: model.status,
        publish_date: model.publish_date,
        scheduled_publish_date: model.scheduled_publish_date,
        view_count: model.view_count,
        is_deleted: model.is_deleted,
        created_by: model.created_by,
        updated_by: model.updated_by,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

fn revision_from_model(model: post_revision::Model) -> Result<Revision, StoreError> {
    Ok(Revision {
        date: model.date,
        content: serde_json::from_value(model.content)?,
        seo: serde_json::from_value(model.seo)?,
        category_ids: serde_json::from_value(model.category_ids)?,
        featured_image: model.featured_image,
        status: model.status,
        modified_by: model.modified_by,
    })
}

/// Category links for a batch of posts, keyed by post id.
async fn load_category_links<C: ConnectionTrait>(
    db: &C,
    post_ids: &[i32],
) -> Result<HashMap<i32, BTreeSet<i32>>, StoreError> {
    let mut links: HashMap<i32, BTreeSet<i32>> = HashMap::new();
    if post_ids.is_empty() {
        return Ok(links);
    }
    let rows: Vec<(i32, i32)> = post_category::Entity::find()
        .filter(post_category::Column::PostId.is_in(post_ids.to_vec()))
        .select_only()
        .column(post_category::Column::PostId)
        .column(post_category::Column::CategoryId)
        .into_tuple()
        .all(db)
        .await?;
    for (post_id, category_id) in rows {
        links.entry(post_id).or_default().insert(category_id);
    }
    Ok(links)
}

async fn posts_with_links<C: ConnectionTrait>(
    db: &C,
    models: Vec<post::Model>,
) -> Result<Vec<BlogPost>, StoreError> {
    let ids: Vec<i32> = models.iter().map(|m| m.id).collect();
    let mut links = load_category_links(db, &ids).await?;
    models
        .into_iter()
        .map(|m| {
            let category_ids = links.remove(&m.id).unwrap_or_default();
            post_from_model(m, category_ids)
        })
        .collect()
}

async fn replace_category_links<C: ConnectionTrait>(
    db: &C,
    post_id: i32,
    category_ids: &BTreeSet<i32>,
) -> Result<(), StoreError> {
    post_category::Entity::delete_many()
        .filter(post_category::Column::PostId.eq(post_id))
        .exec(db)
        .await?;
    if category_ids.is_empty() {
        return Ok(());
    }
    let rows = category_ids.iter().map(|&category_id| post_category::ActiveModel {
        post_id: Set(post_id),
        category_id: Set(category_id),
    });
    post_category::Entity::insert_many(rows).exec(db).await?;
    Ok(())
}

#[async_trait]
impl ContentStore for SeaStore {
    async fn list_categories(&self, filter: &CategoryFilter) -> Result<Vec<Category>, StoreError> {
        let models = apply_category_filter(category::Entity::find(), filter)
            .order_by_asc(category::Column::SortOrder)
            .order_by_asc(category::Column::Id)
            .all(&self.db)
            .await?;
        models.into_iter().map(category_from_model).collect()
    }

    async fn get_category(&self, id: i32) -> Result<Option<Category>, StoreError> {
        category::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .map(category_from_model)
            .transpose()
    }

    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError> {
        category::Entity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await?
            .map(category_from_model)
            .transpose()
    }

    async fn insert_category(&self, new: NewCategory) -> Result<Category, StoreError> {
        let description = new
            .description
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;
        let model = category::ActiveModel {
            slug: Set(new.slug),
            name: Set(serde_json::to_value(&new.name)?),
            description: Set(description),
            parent_id: Set(new.parent_id),
            sort_order: Set(new.sort_order),
            is_active: Set(new.is_active),
            visibility: Set(new.visibility),
            created_at: Set(new.created_at),
            updated_at: Set(new.created_at),
            ..Default::default()
        }
        .insert(&self.db)
        .await?;
        category_from_model(model)
    }

    async fn update_category(&self, c: &Category) -> Result<Category, StoreError> {
        let description = c
            .description
            .as_ref()
            .map(serde_json::to_value)
            .transpose()?;
        let model = category::ActiveModel {
            id: Unchanged(c.id),
            slug: Set(c.slug.clone()),
            name: Set(serde_json::to_value(&c.name)?),
            description: Set(description),
            parent_id: Set(c.parent_id),
            sort_order: Set(c.sort_order),
            is_active: Set(c.is_active),
            visibility: Set(c.visibility),
            created_at: Unchanged(c.created_at),
            updated_at: Set(c.updated_at),
        }
        .update(&self.db)
        .await?;
        category_from_model(model)
    }

    async fn delete_category(&self, id: i32) -> Result<bool, StoreError> {
        let result = category::Entity::delete_by_id(id).exec(&self.db).await?;
        Ok(result.rows_affected > 0)
    }

    async fn count_children(&self, id: i32) -> Result<u64, StoreError> {
        Ok(category::Entity::find()
            .filter(category::Column::ParentId.eq(id))
            .count(&self.db)
            .await?)
    }

    async fn count_posts_in_category(&self, id: i32) -> Result<u64, StoreError> {
        Ok(post_category::Entity::find()
            .filter(post_category::Column::CategoryId.eq(id))
            .filter(
                post_category::Column::PostId.in_subquery(
                    SeaQuery::select()
                        .column(post::Column::Id)
                        .from(post::Entity)
                        .and_where(post::Column::IsDeleted.eq(false))
                        .to_owned(),
                ),
            )
            .count(&self.db)
            .await?)
    }

    async fn list_posts(&self, filter: &PostFilter) -> Result<PostPage, StoreError> {
        let order = if filter.descending {
            Order::Desc
        } else {
            Order::Asc
        };
        let sort_column = match filter.sort_by {
            PostSort::CreatedAt => post::Column::CreatedAt,
            PostSort::UpdatedAt => post::Column::UpdatedAt,
            PostSort::PublishDate => post::Column::PublishDate,
            PostSort::ViewCount => post::Column::ViewCount,
        };

        let paginator = apply_post_filter(post::Entity::find(), filter)
            .order_by(sort_column, order.clone())
            .order_by(post::Column::Id, order)
            .paginate(&self.db, filter.per_page.max(1));
        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(filter.page.saturating_sub(1)).await?;

        Ok(PostPage {
            items: posts_with_links(&self.db, models).await?,
            total,
        })
    }

    async fn get_post(&self, id: i32) -> Result<Option<BlogPost>, StoreError> {
        let model = post::Entity::find_by_id(id)
            .filter(post::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await?;
        match model {
            Some(m) => Ok(posts_with_links(&self.db, vec![m]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_post_by_slug(&self, slug: &str) -> Result<Option<BlogPost>, StoreError> {
        let model = post::Entity::find()
            .filter(post::Column::Slug.eq(slug))
            .filter(post::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await?;
        match model {
            Some(m) => Ok(posts_with_links(&self.db, vec![m]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn insert_post(&self, new: NewPost) -> Result<BlogPost, StoreError> {
        let txn = self.db.begin().await?;

        let search_text = common::post::search_text(&new.slug, &new.content);
        let model = post::ActiveModel {
            slug: Set(new.slug),
            content: Set(serde_json::to_value(&new.content)?),
            seo: Set(serde_json::to_value(&new.seo)?),
            featured_image: Set(new.featured_image),
            status: Set(new.status),
            publish_date: Set(new.publish_date),
            scheduled_publish_date: Set(new.scheduled_publish_date),
            view_count: Set(0),
            is_deleted: Set(false),
            search_text: Set(search_text),
            created_by: Set(new.created_by.clone()),
            updated_by: Set(new.created_by),
            created_at: Set(new.created_at),
            updated_at: Set(new.created_at),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        replace_category_links(&txn, model.id, &new.category_ids).await?;

        txn.commit().await?;
        post_from_model(model, new.category_ids)
    }

    async fn update_post(&self, p: &BlogPost) -> Result<Option<BlogPost>, StoreError> {
        let txn = self.db.begin().await?;

        // Only editable columns are set; the row must still be live.
        let changes = post::ActiveModel {
            slug: Set(p.slug.clone()),
            content: Set(serde_json::to_value(&p.content)?),
            seo: Set(serde_json::to_value(&p.seo)?),
            featured_image: Set(p.featured_image.clone()),
            status: Set(p.status),
            publish_date: Set(p.publish_date),
            scheduled_publish_date: Set(p.scheduled_publish_date),
            search_text: Set(p.search_text()),
            updated_by: Set(p.updated_by.clone()),
            updated_at: Set(p.updated_at),
            ..Default::default()
        };
        let result = post::Entity::update_many()
            .set(changes)
            .filter(post::Column::Id.eq(p.id))
            .filter(post::Column::IsDeleted.eq(false))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(None);
        }
        replace_category_links(&txn, p.id, &p.category_ids).await?;

        let model = post::Entity::find_by_id(p.id).one(&txn).await?;
        txn.commit().await?;
        model
            .map(|m| post_from_model(m, p.category_ids.clone()))
            .transpose()
    }

    async fn soft_delete_post(
        &self,
        id: i32,
        actor: &str,
        at: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = post::Entity::update_many()
            .col_expr(post::Column::IsDeleted, Expr::value(true))
            .col_expr(post::Column::UpdatedBy, Expr::value(actor.to_string()))
            .col_expr(post::Column::UpdatedAt, Expr::value(at))
            .filter(post::Column::Id.eq(id))
            .filter(post::Column::IsDeleted.eq(false))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn increment_view_count(&self, id: i32) -> Result<(), StoreError> {
        post::Entity::update_many()
            .col_expr(
                post::Column::ViewCount,
                Expr::col(post::Column::ViewCount).add(1),
            )
            .filter(post::Column::Id.eq(id))
            .exec(&self.db)
            .await?;
        Ok(())
    }

    async fn publish_due_scheduled(
        &self,
        now: DateTime<Utc>,
        actor: &str,
    ) -> Result<u64, StoreError> {
        let changes = post::ActiveModel {
            status: Set(PostStatus::Published),
            publish_date: Set(Some(now)),
            scheduled_publish_date: Set(None),
            updated_by: Set(actor.to_string()),
            updated_at: Set(now),
            ..Default::default()
        };
        let result = post::Entity::update_many()
            .set(changes)
            .filter(post::Column::IsDeleted.eq(false))
            .filter(post::Column::Status.eq(PostStatus::Draft))
            .filter(post::Column::ScheduledPublishDate.lte(now))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected)
    }

    async fn append_revision(
        &self,
        post_id: i32,
        revision: Revision,
        cap: usize,
    ) -> Result<usize, StoreError> {
        let txn = self.db.begin().await?;

        post_revision::ActiveModel {
            post_id: Set(post_id),
            date: Set(revision.date),
            content: Set(serde_json::to_value(&revision.content)?),
            seo: Set(serde_json::to_value(&revision.seo)?),
            category_ids: Set(serde_json::to_value(&revision.category_ids)?),
            featured_image: Set(revision.featured_image),
            status: Set(revision.status),
            modified_by: Set(revision.modified_by),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        // Everything past the newest `cap` rows goes.
        let stale: Vec<i32> = post_revision::Entity::find()
            .filter(post_revision::Column::PostId.eq(post_id))
            .select_only()
            .column(post_revision::Column::Id)
            .order_by_desc(post_revision::Column::Date)
            .order_by_desc(post_revision::Column::Id)
            .offset(cap as u64)
            .into_tuple()
            .all(&txn)
            .await?;
        let pruned = stale.len();
        if !stale.is_empty() {
            post_revision::Entity::delete_many()
                .filter(post_revision::Column::Id.is_in(stale))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(pruned)
    }

    async fn list_revisions(&self, post_id: i32) -> Result<Vec<Revision>, StoreError> {
        let models = post_revision::Entity::find()
            .filter(post_revision::Column::PostId.eq(post_id))
            .order_by_asc(post_revision::Column::Date)
            .order_by_asc(post_revision::Column::Id)
            .all(&self.db)
            .await?;
        models.into_iter().map(revision_from_model).collect()
    }
}

use chrono::Utc;
use common::category::validate_sort_order;
use common::locale::{trim_localized_text, validate_localized_text};
use common::placement::{
    next_sibling_order, plan_move, plan_reorder, renumber_siblings, validate_parent_change,
};
use common::slug::{normalize_slug, validate_slug};
use common::{
    Category, CategoryNode, CategoryTree, DomainError, Locale, LocalizedText, MoveRequest,
    Placement, ReorderDirection,
};
use tracing::{info, instrument};

use super::{ServiceResult, slug_conflict};
use crate::models::category::{CreateCategoryRequest, UpdateCategoryRequest};
use crate::models::shared::patch_nullable;
use crate::store::{CategoryFilter, ContentStore, NewCategory, ParentFilter};

pub struct CategoryService<'a> {
    store: &'a dyn ContentStore,
    required_locales: &'a [Locale],
}

/// An empty description is stored as none.
fn clean_description(description: Option<LocalizedText>) -> Option<LocalizedText> {
    description
        .map(trim_localized_text)
        .filter(|text| !text.is_empty())
}

impl<'a> CategoryService<'a> {
    pub fn new(store: &'a dyn ContentStore, required_locales: &'a [Locale]) -> Self {
        Self {
            store,
            required_locales,
        }
    }

    async fn all(&self) -> ServiceResult<Vec<Category>> {
        Ok(self.store.list_categories(&CategoryFilter::default()).await?)
    }

    /// Nested view of the categories matching `filter`.
    pub async fn tree(&self, filter: &CategoryFilter) -> ServiceResult<Vec<CategoryNode>> {
        let categories = self.store.list_categories(filter).await?;
        Ok(CategoryTree::build(categories).to_nested())
    }

    /// What anonymous readers may browse: active, public categories whose
    /// ancestors are all active and public too.
    pub async fn public_tree(&self) -> ServiceResult<Vec<CategoryNode>> {
        let tree = CategoryTree::build(self.all().await?);
        Ok(tree.prune(Category::is_publicly_visible).to_nested())
    }

    pub async fn list(&self, filter: &CategoryFilter) -> ServiceResult<Vec<Category>> {
        Ok(self.store.list_categories(filter).await?)
    }

    pub async fn get(&self, id: i32) -> ServiceResult<Category> {
        self.store
            .get_category(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Category {id} not found")).into())
    }

    async fn ensure_slug_free(&self, slug: &str, except: Option<i32>) -> ServiceResult<()> {
        match self.store.find_category_by_slug(slug).await? {
            Some(existing) if Some(existing.id) != except => Err(DomainError::validation(
                format!("Slug '{slug}' is already in use"),
            )
            .into()),
            _ => Ok(()),
        }
    }

    #[instrument(skip(self, req), fields(slug = %req.slug))]
    pub async fn create(&self, req: CreateCategoryRequest, actor: &str) -> ServiceResult<Category> {
        let slug = normalize_slug(&req.slug);
        validate_slug(&slug)?;
        let name = trim_localized_text(req.name);
        validate_localized_text("Name", &name, self.required_locales)?;
        let description = clean_description(req.description);
        if let Some(order) = req.sort_order {
            validate_sort_order(order)?;
        }

        let all = self.all().await?;
        if let Some(parent) = req.parent_id
            && !all.iter().any(|c| c.id == parent)
        {
            return Err(DomainError::ReferentialIntegrity(format!(
                "Parent category {parent} does not exist"
            ))
            .into());
        }
        self.ensure_slug_free(&slug, None).await?;

        let sort_order = req
            .sort_order
            .unwrap_or_else(|| next_sibling_order(&all, req.parent_id));

        let created = self
            .store
            .insert_category(NewCategory {
                slug: slug.clone(),
                name,
                description,
                parent_id: req.parent_id,
                sort_order,
                is_active: req.is_active,
                visibility: req.visibility,
                created_at: Utc::now(),
            })
            .await
            .map_err(|e| slug_conflict(e, &slug))?;

        info!(category_id = created.id, actor, "Category created");
        Ok(created)
    }

    #[instrument(skip(self, req))]
    pub async fn update(
        &self,
        id: i32,
        req: UpdateCategoryRequest,
        actor: &str,
    ) -> ServiceResult<Category> {
        let mut category = self.get(id).await?;

        if let Some(slug) = req.slug {
            let slug = normalize_slug(&slug);
            validate_slug(&slug)?;
            if slug != category.slug {
                self.ensure_slug_free(&slug, Some(id)).await?;
            }
            category.slug = slug;
        }
        if let Some(name) = req.name {
            let name = trim_localized_text(name);
            validate_localized_text("Name", &name, self.required_locales)?;
            category.name = name;
        }
        if let Some(description) = req.description {
            category.description = clean_description(description);
        }
        if let Some(order) = req.sort_order {
            validate_sort_order(order)?;
            category.sort_order = order;
        }
        if let Some(active) = req.is_active {
            category.is_active = active;
        }
        if let Some(visibility) = req.visibility {
            category.visibility = visibility;
        }

        let previous_parent = category.parent_id;
        patch_nullable(&mut category.parent_id, req.parent_id);
        if category.parent_id != previous_parent {
            let tree = CategoryTree::build(self.all().await?);
            validate_parent_change(&tree, id, category.parent_id)?;
        }

        category.updated_at = Utc::now();
        let slug = category.slug.clone();
        let updated = self
            .store
            .update_category(&category)
            .await
            .map_err(|e| slug_conflict(e, &slug))?;

        info!(category_id = id, actor, "Category updated");
        Ok(updated)
    }

    /// Refuses while children or live posts still reference the category.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32, actor: &str) -> ServiceResult<()> {
        self.get(id).await?;

        let children = self.store.count_children(id).await?;
        if children > 0 {
            return Err(DomainError::ReferentialIntegrity(format!(
                "Category {id} still has {children} child categories"
            ))
            .into());
        }
        let posts = self.store.count_posts_in_category(id).await?;
        if posts > 0 {
            return Err(DomainError::ReferentialIntegrity(format!(
                "Category {id} is still assigned to {posts} posts"
            ))
            .into());
        }

        if !self.store.delete_category(id).await? {
            return Err(DomainError::not_found(format!("Category {id} not found")).into());
        }
        info!(category_id = id, actor, "Category deleted");
        Ok(())
    }

    async fn apply(&self, placement: Placement) -> ServiceResult<Category> {
        let mut category = self.get(placement.id).await?;
        category.parent_id = placement.parent_id;
        category.sort_order = placement.sort_order;
        category.updated_at = Utc::now();
        Ok(self.store.update_category(&category).await?)
    }

    /// Move one step among siblings. At either end the category is returned
    /// unchanged.
    #[instrument(skip(self))]
    pub async fn reorder(
        &self,
        id: i32,
        direction: ReorderDirection,
        actor: &str,
    ) -> ServiceResult<Category> {
        let all = self.all().await?;
        match plan_reorder(&all, id, direction)? {
            Some(placement) => {
                let moved = self.apply(placement).await?;
                info!(
                    category_id = id,
                    sort_order = moved.sort_order,
                    actor,
                    "Category reordered"
                );
                Ok(moved)
            }
            None => self.get(id).await,
        }
    }

    #[instrument(skip(self))]
    pub async fn move_category(&self, request: MoveRequest, actor: &str) -> ServiceResult<Category> {
        let tree = CategoryTree::build(self.all().await?);
        match plan_move(&tree, request)? {
            Some(placement) => {
                let moved = self.apply(placement).await?;
                info!(
                    category_id = moved.id,
                    parent_id = ?moved.parent_id,
                    sort_order = moved.sort_order,
                    actor,
                    "Category moved"
                );
                Ok(moved)
            }
            None => self.get(request.dragged_id).await,
        }
    }

    /// Rewrite sibling orders under `parent` as `0, 1, 2, ...`.
    #[instrument(skip(self))]
    pub async fn renumber(&self, parent: Option<i32>, actor: &str) -> ServiceResult<Vec<Category>> {
        let all = self.all().await?;
        if let Some(parent) = parent
            && !all.iter().any(|c| c.id == parent)
        {
            return Err(DomainError::not_found(format!("Category {parent} not found")).into());
        }

        let placements = renumber_siblings(&all, parent);
        let changed = placements.len();
        for placement in placements {
            self.apply(placement).await?;
        }
        info!(parent_id = ?parent, changed, actor, "Sibling orders renumbered");

        let filter = CategoryFilter {
            parent: Some(parent.map_or(ParentFilter::Root, ParentFilter::Id)),
            ..Default::default()
        };
        Ok(self.store.list_categories(&filter).await?)
    }
}

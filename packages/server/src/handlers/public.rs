//! Unauthenticated reads for the public site.

use axum::Json;
use axum::extract::{Path, Query, State};
use common::{BlogPost, CategoryNode, PostStatus};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::handlers::post::post_filter;
use crate::models::post::{Pagination, PostListQuery, PostListResponse};
use crate::state::AppState;

/// Active, public categories as a tree. A hidden category hides its subtree.
#[utoipa::path(
    get,
    path = "/categories",
    tag = "Public",
    operation_id = "publicCategoryTree",
    summary = "Public category tree",
    description = "Active, public categories as a nested tree. A category that is inactive or not public hides its whole subtree.",
    responses(
        (status = 200, description = "Category tree", body = Vec<CategoryNode>),
    ),
)]
#[instrument(skip(state))]
pub async fn category_tree(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryNode>>, AppError> {
    Ok(Json(state.categories().public_tree().await?))
}

/// Published posts only; any `status` parameter is ignored.
#[utoipa::path(
    get,
    path = "/posts",
    tag = "Public",
    operation_id = "listPublishedPosts",
    summary = "List published posts",
    description = "Published posts only. Any `status` parameter is ignored.",
    params(PostListQuery),
    responses(
        (status = 200, description = "Page of posts", body = PostListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_published_posts(
    State(state): State<AppState>,
    Query(query): Query<PostListQuery>,
) -> Result<Json<PostListResponse>, AppError> {
    let mut filter = post_filter(&PostListQuery {
        status: None,
        ..query
    })?;
    filter.status = Some(PostStatus::Published);

    let page = state.posts().list(&filter).await?;
    Ok(Json(PostListResponse {
        data: page.items,
        pagination: Pagination::new(filter.page, filter.per_page, page.total),
    }))
}

#[utoipa::path(
    get,
    path = "/posts/{slug}",
    tag = "Public",
    operation_id = "getPublishedPost",
    summary = "Read a published post",
    description = "Returns a published post by slug and counts the view.",
    params(("slug" = String, Path, description = "Post slug")),
    responses(
        (status = 200, description = "Post", body = BlogPost),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn get_published_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<BlogPost>, AppError> {
    Ok(Json(state.posts().get_published_by_slug(&slug).await?))
}

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{BlogPost, PostStatus};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, permissions};
use crate::extractors::json::AppJson;
use crate::models::post::*;
use crate::state::AppState;
use crate::store::{PostFilter, PostSort};

/// Translate list query parameters into typed criteria.
pub(crate) fn post_filter(query: &PostListQuery) -> Result<PostFilter, AppError> {
    let status = query
        .status
        .as_deref()
        .map(str::parse::<PostStatus>)
        .transpose()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let sort_by = query
        .sort_by
        .as_deref()
        .map(str::parse::<PostSort>)
        .transpose()
        .map_err(AppError::Validation)?
        .unwrap_or_default();
    let descending = match query.sort_order.as_deref() {
        None | Some("desc") => true,
        Some("asc") => false,
        Some(_) => {
            return Err(AppError::Validation(
                "sort_order must be one of: asc, desc".into(),
            ));
        }
    };

    Ok(PostFilter {
        status,
        category_id: query.category,
        search: query.search.clone(),
        page: Ord::max(query.page.unwrap_or(1), 1),
        per_page: query.per_page.unwrap_or(20).clamp(1, 100),
        sort_by,
        descending,
    })
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Posts",
    operation_id = "listPosts",
    summary = "List posts with pagination and search",
    description = "Returns a page of live posts. Supports status and category filters, case-insensitive search and sorting by `created_at` (default, desc), `updated_at`, `publish_date` or `view_count`. Requires `post:manage` permission.",
    params(PostListQuery),
    responses(
        (status = 200, description = "Page of posts", body = PostListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_posts(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PostListQuery>,
) -> Result<Json<PostListResponse>, AppError> {
    auth_user.require_permission(permissions::POST_MANAGE)?;

    let filter = post_filter(&query)?;
    let page = state.posts().list(&filter).await?;

    Ok(Json(PostListResponse {
        data: page.items,
        pagination: Pagination::new(filter.page, filter.per_page, page.total),
    }))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Posts",
    operation_id = "createPost",
    summary = "Create a draft post",
    description = "Creates a post in `draft` status. Content must be complete for every required locale. Requires `post:manage` permission.",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = BlogPost),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Unknown category (REFERENTIAL_INTEGRITY)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(slug = %payload.slug))]
pub async fn create_post(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission(permissions::POST_MANAGE)?;

    let post = state.posts().create(payload, &auth_user.actor).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Posts",
    operation_id = "getPost",
    summary = "Get a post",
    description = "Returns a live post in any status. Requires `post:manage` permission.",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post", body = BlogPost),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_post(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<BlogPost>, AppError> {
    auth_user.require_permission(permissions::POST_MANAGE)?;

    Ok(Json(state.posts().get(id).await?))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Posts",
    operation_id = "updatePost",
    summary = "Update a post",
    description = "Partially updates a live post. Entering `published` without a publish date stamps one. A revision is recorded when content, SEO, categories, image or status change. Requires `post:manage` permission.",
    params(("id" = i32, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Post updated", body = BlogPost),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Unknown category (REFERENTIAL_INTEGRITY)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn update_post(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdatePostRequest>,
) -> Result<Json<BlogPost>, AppError> {
    auth_user.require_permission(permissions::POST_MANAGE)?;

    let post = state
        .posts()
        .update(id, payload, &auth_user.actor)
        .await?;
    Ok(Json(post))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Posts",
    operation_id = "deletePost",
    summary = "Soft-delete a post",
    description = "Hides the post from every read. Its slug stays reserved. Requires `post:manage` permission.",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_post(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission(permissions::POST_MANAGE)?;

    state.posts().delete(id, &auth_user.actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/{id}/revisions",
    tag = "Posts",
    operation_id = "listPostRevisions",
    summary = "List post revisions",
    description = "Returns the retained revisions of a post, oldest first. Requires `post:manage` permission.",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Revisions", body = RevisionListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Post not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_revisions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<RevisionListResponse>, AppError> {
    auth_user.require_permission(permissions::POST_MANAGE)?;

    Ok(Json(RevisionListResponse {
        data: state.posts().revisions(id).await?,
    }))
}

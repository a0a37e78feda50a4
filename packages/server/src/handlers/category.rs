use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::{Category, MoveRequest, Visibility};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, permissions};
use crate::extractors::json::AppJson;
use crate::models::category::*;
use crate::state::AppState;
use crate::store::{CategoryFilter, ParentFilter};

/// Translate list query parameters into typed criteria.
fn category_filter(query: &CategoryListQuery) -> Result<CategoryFilter, AppError> {
    let parent = query
        .parent
        .as_deref()
        .map(str::parse::<ParentFilter>)
        .transpose()
        .map_err(AppError::Validation)?;
    let visibility = query
        .visibility
        .as_deref()
        .map(str::parse::<Visibility>)
        .transpose()
        .map_err(AppError::Validation)?;
    Ok(CategoryFilter {
        active: query.active,
        parent,
        visibility,
    })
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Categories",
    operation_id = "listCategories",
    summary = "List categories",
    description = "Returns categories as a flat list or, with `tree=true`, as a nested tree. Filters apply before nesting. Requires `category:manage` permission.",
    params(CategoryListQuery),
    responses(
        (status = 200, description = "Categories", body = CategoryListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_categories(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<CategoryListQuery>,
) -> Result<Json<CategoryListResponse>, AppError> {
    auth_user.require_permission(permissions::CATEGORY_MANAGE)?;

    let filter = category_filter(&query)?;
    let service = state.categories();
    let response = if query.tree {
        CategoryListResponse::Tree {
            data: service.tree(&filter).await?,
        }
    } else {
        CategoryListResponse::Flat {
            data: service.list(&filter).await?,
        }
    };
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Categories",
    operation_id = "createCategory",
    summary = "Create a category",
    description = "Creates a category. Without `sort_order` it is appended after its last sibling. Requires `category:manage` permission.",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created", body = Category),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Unknown parent (REFERENTIAL_INTEGRITY)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(slug = %payload.slug))]
pub async fn create_category(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission(permissions::CATEGORY_MANAGE)?;

    let category = state
        .categories()
        .create(payload, &auth_user.actor)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Categories",
    operation_id = "getCategory",
    summary = "Get a category",
    description = "Requires `category:manage` permission.",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Category", body = Category),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_category(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Category>, AppError> {
    auth_user.require_permission(permissions::CATEGORY_MANAGE)?;

    Ok(Json(state.categories().get(id).await?))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Categories",
    operation_id = "updateCategory",
    summary = "Update a category",
    description = "Partially updates a category. A parent change that would place the category under its own descendant is rejected. Requires `category:manage` permission.",
    params(("id" = i32, Path, description = "Category ID")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated", body = Category),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Parent loop or unknown parent (CYCLE_DETECTED, REFERENTIAL_INTEGRITY)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn update_category(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateCategoryRequest>,
) -> Result<Json<Category>, AppError> {
    auth_user.require_permission(permissions::CATEGORY_MANAGE)?;

    let category = state
        .categories()
        .update(id, payload, &auth_user.actor)
        .await?;
    Ok(Json(category))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Categories",
    operation_id = "deleteCategory",
    summary = "Delete a category",
    description = "Deletes a category that has no children and no live posts. Requires `category:manage` permission.",
    params(("id" = i32, Path, description = "Category ID")),
    responses(
        (status = 204, description = "Category deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Category still has children or posts (REFERENTIAL_INTEGRITY)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_category(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission(permissions::CATEGORY_MANAGE)?;

    state.categories().delete(id, &auth_user.actor).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/{id}/reorder",
    tag = "Categories",
    operation_id = "reorderCategory",
    summary = "Move a category up or down",
    description = "Swaps the category with its neighbouring sibling. At either end this is a no-op. Requires `category:manage` permission.",
    params(("id" = i32, Path, description = "Category ID")),
    request_body = ReorderCategoryRequest,
    responses(
        (status = 200, description = "Category after the move", body = Category),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(direction = ?payload.direction))]
pub async fn reorder_category(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<ReorderCategoryRequest>,
) -> Result<Json<Category>, AppError> {
    auth_user.require_permission(permissions::CATEGORY_MANAGE)?;

    let category = state
        .categories()
        .reorder(id, payload.direction, &auth_user.actor)
        .await?;
    Ok(Json(category))
}

#[utoipa::path(
    post,
    path = "/move",
    tag = "Categories",
    operation_id = "moveCategory",
    summary = "Drop a category above, below or inside another",
    description = "Applies a drag-and-drop placement relative to a target category. Requires `category:manage` permission.",
    request_body = MoveRequest,
    responses(
        (status = 200, description = "Category after the move", body = Category),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Category not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Drop inside own subtree (CYCLE_DETECTED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn move_category(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<MoveRequest>,
) -> Result<Json<Category>, AppError> {
    auth_user.require_permission(permissions::CATEGORY_MANAGE)?;

    let category = state
        .categories()
        .move_category(payload, &auth_user.actor)
        .await?;
    Ok(Json(category))
}

#[utoipa::path(
    post,
    path = "/renumber",
    tag = "Categories",
    operation_id = "renumberCategories",
    summary = "Renumber siblings",
    description = "Rewrites the order of one sibling group to 0, 1, 2 and so on, keeping display order. Requires `category:manage` permission.",
    request_body = RenumberCategoriesRequest,
    responses(
        (status = 200, description = "Renumbered siblings", body = Vec<Category>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(parent_id = ?payload.parent_id))]
pub async fn renumber_categories(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<RenumberCategoriesRequest>,
) -> Result<Json<Vec<Category>>, AppError> {
    auth_user.require_permission(permissions::CATEGORY_MANAGE)?;

    let siblings = state
        .categories()
        .renumber(payload.parent_id, &auth_user.actor)
        .await?;
    Ok(Json(siblings))
}

use common::{Category, CategoryNode, LocalizedText, ReorderDirection, Visibility};
use serde::{Deserialize, Serialize};

use super::shared::double_option;

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct CreateCategoryRequest {
    #[schema(example = "grammar")]
    pub slug: String,
    #[schema(value_type = std::collections::BTreeMap<String, String>)]
    pub name: LocalizedText,
    #[serde(default)]
    #[schema(value_type = Option<std::collections::BTreeMap<String, String>>)]
    pub description: Option<LocalizedText>,
    #[serde(default)]
    #[schema(example = 3)]
    pub parent_id: Option<i32>,
    /// Appended after the last sibling when omitted.
    #[serde(default)]
    pub sort_order: Option<f64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub visibility: Visibility,
}

/// Absent fields are left unchanged. `description` and `parent_id` accept
/// `null` to clear.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct UpdateCategoryRequest {
    pub slug: Option<String>,
    #[schema(value_type = Option<std::collections::BTreeMap<String, String>>)]
    pub name: Option<LocalizedText>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<std::collections::BTreeMap<String, String>>)]
    pub description: Option<Option<LocalizedText>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>)]
    pub parent_id: Option<Option<i32>>,
    pub sort_order: Option<f64>,
    pub is_active: Option<bool>,
    pub visibility: Option<Visibility>,
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ReorderCategoryRequest {
    pub direction: ReorderDirection,
}

#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct RenumberCategoriesRequest {
    /// Siblings under this parent are renumbered; `null` means the roots.
    #[serde(default)]
    pub parent_id: Option<i32>,
}

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CategoryListQuery {
    /// Filter by active flag.
    #[param(example = true)]
    pub active: Option<bool>,
    /// `root` or a category id.
    #[param(example = "root")]
    pub parent: Option<String>,
    /// `public`, `registered` or `admin`.
    #[param(example = "public")]
    pub visibility: Option<String>,
    /// Return the nested tree instead of a flat list.
    #[serde(default)]
    pub tree: bool,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum CategoryListResponse {
    Tree { data: Vec<CategoryNode> },
    Flat { data: Vec<Category> },
}

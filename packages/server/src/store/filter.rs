use std::str::FromStr;

use common::{PostStatus, Visibility};

/// Which parent a category listing is restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentFilter {
    /// Categories without a parent.
    Root,
    Id(i32),
}

impl FromStr for ParentFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "root" | "null" => Ok(Self::Root),
            other => other
                .parse::<i32>()
                .map(Self::Id)
                .map_err(|_| format!("parent must be 'root' or a category id, got '{other}'")),
        }
    }
}

/// Typed category listing criteria. `None` fields do not restrict.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFilter {
    pub active: Option<bool>,
    pub parent: Option<ParentFilter>,
    pub visibility: Option<Visibility>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostSort {
    #[default]
    CreatedAt,
    UpdatedAt,
    PublishDate,
    ViewCount,
}

impl FromStr for PostSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created_at" => Ok(Self::CreatedAt),
            "updated_at" => Ok(Self::UpdatedAt),
            "publish_date" => Ok(Self::PublishDate),
            "view_count" => Ok(Self::ViewCount),
            _ => Err(
                "sort_by must be one of: created_at, updated_at, publish_date, view_count".into(),
            ),
        }
    }
}

/// Typed post listing criteria. Soft-deleted posts are always excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostFilter {
    pub status: Option<PostStatus>,
    pub category_id: Option<i32>,
    /// Case-insensitive substring over slug, titles and summaries.
    pub search: Option<String>,
    /// 1-based.
    pub page: u64,
    pub per_page: u64,
    pub sort_by: PostSort,
    pub descending: bool,
}

impl Default for PostFilter {
    fn default() -> Self {
        Self {
            status: None,
            category_id: None,
            search: None,
            page: 1,
            per_page: 20,
            sort_by: PostSort::CreatedAt,
            descending: true,
        }
    }
}

impl PostFilter {
    pub fn offset(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page)
    }

    /// Trimmed, lowercased search term, or `None` when blank.
    pub fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

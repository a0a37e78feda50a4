#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::locale::{Locale, LocalizedText};

/// Editorial state of a blog post.
///
/// Any state may move to any other; only entering `Published` has side
/// effects (see [`resolve_publish_date`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "draft"))]
    Draft,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "published"))]
    Published,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "archived"))]
    Archived,
}

impl PostStatus {
    pub const ALL: &'static [PostStatus] = &[Self::Draft, Self::Published, Self::Archived];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for PostStatus {
    fn default() -> Self {
        Self::Draft
    }
}

/// Error when parsing an invalid post status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePostStatusError {
    invalid: String,
}

impl fmt::Display for ParsePostStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid status '{}'. Valid values: draft, published, archived",
            self.invalid
        )
    }
}

impl std::error::Error for ParsePostStatusError {}

impl FromStr for PostStatus {
    type Err = ParsePostStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "published" => Ok(Self::Published),
            "archived" => Ok(Self::Archived),
            _ => Err(ParsePostStatusError {
                invalid: s.to_string(),
            }),
        }
    }
}

/// Title, teaser and body for one locale.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct LocalizedContent {
    #[schema(example = "Starke Verben")]
    pub title: String,
    pub summary: String,
    /// Rich-text HTML from the editor.
    pub body: String,
}

pub type PostContent = BTreeMap<Locale, LocalizedContent>;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SeoMeta {
    #[serde(default)]
    #[schema(value_type = BTreeMap<String, String>)]
    pub meta_title: LocalizedText,
    #[serde(default)]
    #[schema(value_type = BTreeMap<String, String>)]
    pub meta_description: LocalizedText,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct BlogPost {
    #[schema(example = 42)]
    pub id: i32,
    #[schema(example = "starke-verben")]
    pub slug: String,
    #[schema(value_type = BTreeMap<String, LocalizedContent>)]
    pub content: PostContent,
    #[serde(default)]
    pub seo: SeoMeta,
    #[serde(default)]
    pub category_ids: BTreeSet<i32>,
    pub featured_image: Option<String>,
    pub status: PostStatus,
    pub publish_date: Option<DateTime<Utc>>,
    pub scheduled_publish_date: Option<DateTime<Utc>>,
    #[schema(example = 128)]
    pub view_count: i64,
    pub is_deleted: bool,
    pub created_by: String,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BlogPost {
    /// True when any field that revisions snapshot differs between the two.
    pub fn tracked_fields_differ(&self, other: &BlogPost) -> bool {
        self.content != other.content
            || self.seo != other.seo
            || self.category_ids != other.category_ids
            || self.featured_image != other.featured_image
            || self.status != other.status
    }

    /// Lowercased titles and summaries, used for substring search.
    pub fn search_text(&self) -> String {
        search_text(&self.slug, &self.content)
    }
}

pub fn search_text(slug: &str, content: &PostContent) -> String {
    let mut text = slug.to_lowercase();
    for entry in content.values() {
        text.push('\n');
        text.push_str(&entry.title.to_lowercase());
        text.push('\n');
        text.push_str(&entry.summary.to_lowercase());
    }
    text
}

/// Every required locale needs a non-blank title, summary and body.
pub fn validate_post_content(content: &PostContent, required: &[Locale]) -> Result<(), DomainError> {
    let mut problems = Vec::new();
    for locale in required {
        match content.get(locale) {
            None => problems.push(format!("{locale}: content missing")),
            Some(entry) => {
                let empty: Vec<&str> = [
                    ("title", &entry.title),
                    ("summary", &entry.summary),
                    ("body", &entry.body),
                ]
                .into_iter()
                .filter(|(_, v)| v.trim().is_empty())
                .map(|(name, _)| name)
                .collect();
                if !empty.is_empty() {
                    problems.push(format!("{locale}: {} required", empty.join(", ")));
                }
            }
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(DomainError::Validation(format!(
            "Incomplete post content ({})",
            problems.join("; ")
        )))
    }
}

/// The `publish_date` a post should carry after moving from `previous` to
/// `status`.
///
/// Only a transition into `Published` without a publish date stamps one:
/// a future scheduled date is adopted, otherwise `now`. A post that was
/// already published keeps whatever date the caller set, even `None`.
pub fn resolve_publish_date(
    previous: PostStatus,
    status: PostStatus,
    publish_date: Option<DateTime<Utc>>,
    scheduled_publish_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let entering = previous != PostStatus::Published && status == PostStatus::Published;
    if !entering || publish_date.is_some() {
        return publish_date;
    }
    match scheduled_publish_date {
        Some(scheduled) if scheduled > now => Some(scheduled),
        _ => Some(now),
    }
}

/// Whether the scheduled-publish sweep should flip this post.
pub fn is_due_for_publish(post: &BlogPost, now: DateTime<Utc>) -> bool {
    !post.is_deleted
        && post.status == PostStatus::Draft
        && post.scheduled_publish_date.is_some_and(|at| at <= now)
}

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::post::{BlogPost, LocalizedContent, PostContent, PostStatus, SeoMeta};

/// Number of revisions kept per post.
pub const MAX_REVISIONS: usize = 10;

/// Immutable snapshot of a post taken after an editing save.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Revision {
    pub date: DateTime<Utc>,
    #[schema(value_type = std::collections::BTreeMap<String, LocalizedContent>)]
    pub content: PostContent,
    pub seo: SeoMeta,
    pub category_ids: BTreeSet<i32>,
    pub featured_image: Option<String>,
    pub status: PostStatus,
    /// Opaque id of the actor who made the change.
    pub modified_by: String,
}

impl Revision {
    /// Snapshot `post` as it was saved, attributed to `modified_by`.
    pub fn snapshot(post: &BlogPost, modified_by: &str, date: DateTime<Utc>) -> Self {
        Self {
            date,
            content: post.content.clone(),
            seo: post.seo.clone(),
            category_ids: post.category_ids.clone(),
            featured_image: post.featured_image.clone(),
            status: post.status,
            modified_by: modified_by.to_string(),
        }
    }
}

/// Bounded, oldest-first revision history.
pub struct RevisionLog;

impl RevisionLog {
    /// Append `revision` and drop the oldest entries beyond `cap`.
    ///
    /// Returns how many entries were discarded.
    pub fn push(revisions: &mut Vec<Revision>, revision: Revision, cap: usize) -> usize {
        revisions.push(revision);
        Self::prune(revisions, cap)
    }

    /// Keep only the newest `cap` entries.
    pub fn prune(revisions: &mut Vec<Revision>, cap: usize) -> usize {
        let excess = revisions.len().saturating_sub(cap);
        if excess > 0 {
            revisions.drain(..excess);
        }
        excess
    }
}

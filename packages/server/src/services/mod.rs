//! Orchestration between the pure content core and the store.
//!
//! Every rule check runs before the first write, so a rejected call leaves
//! the store untouched.

pub mod category;
pub mod post;
pub mod scheduler;

use common::DomainError;
use thiserror::Error;

use crate::store::StoreError;

pub use category::CategoryService;
pub use post::PostService;
pub use scheduler::{publish_due_posts, run_scheduled_publisher};

/// Identity stamped on changes made by background jobs.
pub const SYSTEM_ACTOR: &str = "system:scheduler";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Turn a uniqueness conflict from the store into the validation error the
/// caller would have seen from the application-level check.
pub(crate) fn slug_conflict(err: StoreError, slug: &str) -> ServiceError {
    match err {
        StoreError::Conflict(_) => {
            DomainError::validation(format!("Slug '{slug}' is already in use")).into()
        }
        other => other.into(),
    }
}

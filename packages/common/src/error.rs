use thiserror::Error;

/// Rejection reasons raised by the content core.
///
/// Every variant is detected before any mutation is applied, so a rejected
/// operation never leaves partial state behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Malformed input: missing localized fields, duplicate slug, bad order value.
    #[error("{0}")]
    Validation(String),

    /// A referenced record is missing, or a delete would orphan dependents.
    #[error("{0}")]
    ReferentialIntegrity(String),

    /// The requested parent change would make a category its own ancestor.
    #[error("{0}")]
    Cycle(String),

    #[error("{0}")]
    NotFound(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

pub type DomainResult<T> = Result<T, DomainError>;

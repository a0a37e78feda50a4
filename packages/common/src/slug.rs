use crate::error::DomainError;

pub const MAX_SLUG_LENGTH: usize = 128;

/// Lowercase and trim a user-supplied slug, turning whitespace and
/// underscores into single hyphens.
pub fn normalize_slug(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for ch in input.trim().chars() {
        if ch.is_whitespace() || ch == '_' || ch == '-' {
            pending_hyphen = !out.is_empty();
            continue;
        }
        if pending_hyphen {
            out.push('-');
            pending_hyphen = false;
        }
        out.extend(ch.to_lowercase());
    }

    out
}

/// Validate a slug: 1-128 characters of `[a-z0-9]` separated by single hyphens.
pub fn validate_slug(slug: &str) -> Result<(), DomainError> {
    if slug.is_empty() || slug.len() > MAX_SLUG_LENGTH {
        return Err(DomainError::Validation(format!(
            "Slug must be 1-{MAX_SLUG_LENGTH} characters"
        )));
    }
    if slug.starts_with('-') || slug.ends_with('-') || slug.contains("--") {
        return Err(DomainError::Validation(
            "Slug must not start or end with a hyphen or contain consecutive hyphens".into(),
        ));
    }
    if let Some(bad) = slug
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-'))
    {
        return Err(DomainError::Validation(format!(
            "Slug contains invalid character '{bad}'"
        )));
    }
    Ok(())
}

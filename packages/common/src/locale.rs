use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Content locales served by the site.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, utoipa::ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Persian.
    Fa,
    /// German.
    De,
}

impl Locale {
    pub const ALL: &'static [Locale] = &[Self::Fa, Self::De];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fa => "fa",
            Self::De => "de",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an unsupported locale code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLocaleError {
    invalid: String,
}

impl fmt::Display for ParseLocaleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unsupported locale '{}'. Valid values: {}",
            self.invalid,
            Locale::ALL
                .iter()
                .map(|l| l.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseLocaleError {}

impl FromStr for Locale {
    type Err = ParseLocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fa" => Ok(Self::Fa),
            "de" => Ok(Self::De),
            _ => Err(ParseLocaleError {
                invalid: s.to_string(),
            }),
        }
    }
}

/// A display string per locale.
pub type LocalizedText = BTreeMap<Locale, String>;

/// Require a non-blank entry for every locale in `required`.
pub fn validate_localized_text(
    field: &str,
    text: &LocalizedText,
    required: &[Locale],
) -> Result<(), DomainError> {
    let missing: Vec<&str> = required
        .iter()
        .filter(|locale| text.get(locale).is_none_or(|v| v.trim().is_empty()))
        .map(|locale| locale.as_str())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DomainError::Validation(format!(
            "{field} is required for locale(s): {}",
            missing.join(", ")
        )))
    }
}

/// Trim every entry and drop the ones that end up empty.
pub fn trim_localized_text(text: LocalizedText) -> LocalizedText {
    text.into_iter()
        .map(|(locale, value)| (locale, value.trim().to_string()))
        .filter(|(_, value)| !value.is_empty())
        .collect()
}

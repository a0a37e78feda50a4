#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::locale::LocalizedText;

/// Who may see a category on the public site.
///
/// When the `sea-orm` feature is enabled, this enum can be used directly in SeaORM entities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "public"))]
    Public,
    /// Only signed-in students.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "registered"))]
    Registered,
    /// Admin panel only.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "admin"))]
    Admin,
}

impl Visibility {
    pub const ALL: &'static [Visibility] = &[Self::Public, Self::Registered, Self::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Registered => "registered",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Self::Public
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "registered" => Ok(Self::Registered),
            "admin" => Ok(Self::Admin),
            _ => Err(format!(
                "Invalid visibility '{s}'. Valid values: public, registered, admin"
            )),
        }
    }
}

/// A blog category as persisted.
///
/// `parent_id` is a weak reference: it may point at a category that no
/// longer exists, in which case the tree treats this category as a root.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Category {
    #[schema(example = 7)]
    pub id: i32,
    #[schema(example = "grammar")]
    pub slug: String,
    #[schema(value_type = std::collections::BTreeMap<String, String>)]
    pub name: LocalizedText,
    #[serde(default)]
    #[schema(value_type = Option<std::collections::BTreeMap<String, String>>)]
    pub description: Option<LocalizedText>,
    #[serde(default)]
    pub parent_id: Option<i32>,
    /// Sibling sequence. Not necessarily integral: moves insert at half steps.
    #[schema(example = 1.5)]
    pub sort_order: f64,
    pub is_active: bool,
    #[serde(default)]
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// Active and open to anonymous readers. The public tree additionally
    /// requires this of every ancestor.
    pub fn is_publicly_visible(&self) -> bool {
        self.is_active && self.visibility == Visibility::Public
    }
}

/// Reject NaN and infinite order values.
pub fn validate_sort_order(order: f64) -> Result<(), crate::DomainError> {
    if order.is_finite() {
        Ok(())
    } else {
        Err(crate::DomainError::Validation(
            "Order must be a finite number".into(),
        ))
    }
}

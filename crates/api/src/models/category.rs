//! Category domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use paradise_core::{CategoryId, Slug};

/// A product category.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    pub image: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for creating a category.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub slug: Slug,
    pub image: Option<String>,
    pub description: Option<String>,
}

/// Validated partial update for a category.
///
/// A new name always comes with a new slug. `Some(None)` clears an
/// optional field; `None` leaves it unchanged.
#[derive(Debug, Clone, Default)]
pub struct CategoryChanges {
    pub name: Option<(String, Slug)>,
    pub image: Option<Option<String>>,
    pub description: Option<Option<String>>,
}

impl CategoryChanges {
    /// Whether the update would change nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.image.is_none() && self.description.is_none()
    }
}


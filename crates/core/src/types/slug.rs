//! URL slugs for products and categories.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when creating a [`Slug`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    /// The name contains no ASCII letters or digits.
    #[error("name must contain at least one letter or digit")]
    Empty,
}

/// Turn a display name into a URL slug.
///
/// Lowercases the input, collapses every run of characters outside `[a-z0-9]`
/// into a single `-`, and trims leading and trailing dashes.
///
/// ```
/// use paradise_core::slugify;
///
/// assert_eq!(slugify("Snake Plant (Sansevieria)"), "snake-plant-sansevieria");
/// assert_eq!(slugify("  Pothos -- Devil's Ivy!"), "pothos-devil-s-ivy");
/// assert_eq!(slugify("!!!"), "");
/// ```
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// A validated, non-empty URL slug.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Slug(String);

impl Slug {
    /// Derive a slug from a display name.
    ///
    /// # Errors
    ///
    /// Returns `SlugError::Empty` if the name has no slug-safe characters.
    pub fn from_name(name: &str) -> Result<Self, SlugError> {
        let slug = slugify(name);
        if slug.is_empty() {
            return Err(SlugError::Empty);
        }
        Ok(Self(slug))
    }

    /// Append a numeric suffix, used to resolve collisions.
    #[must_use]
    pub fn with_suffix(&self, suffix: u32) -> Self {
        Self(format!("{}-{suffix}", self.0))
    }

    /// Returns the slug as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Slug` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Slug {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Monstera Deliciosa"), "monstera-deliciosa");
        assert_eq!(slugify("ZZ Plant"), "zz-plant");
    }

    #[test]
    fn test_slugify_collapses_and_trims() {
        assert_eq!(slugify("--Indoor   Plants--"), "indoor-plants");
        assert_eq!(slugify("Low/Light & Shade"), "low-light-shade");
    }

    #[test]
    fn test_slugify_drops_non_ascii() {
        assert_eq!(slugify("Café Fern"), "caf-fern");
    }

    #[test]
    fn test_slug_from_name_rejects_empty() {
        assert_eq!(Slug::from_name("***"), Err(SlugError::Empty));
        assert_eq!(Slug::from_name(""), Err(SlugError::Empty));
    }

    #[test]
    fn test_slug_with_suffix() {
        let slug = Slug::from_name("Peace Lily").unwrap();
        assert_eq!(slug.with_suffix(42).as_str(), "peace-lily-42");
    }
}

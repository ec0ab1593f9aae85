//! Category route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Deserializer};
use tracing::instrument;

use paradise_core::{CategoryId, Slug};

use crate::db::{CategoryRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{Category, CategoryChanges, NewCategory};
use crate::state::AppState;

/// Category fields accepted on create and update.
///
/// The outer `Option` records whether a key was sent at all, so an explicit
/// `null` can clear `image` or `description` on update.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CategoryInput {
    pub name: Option<String>,
    #[serde(deserialize_with = "present")]
    pub image: Option<Option<String>>,
    #[serde(deserialize_with = "present")]
    pub description: Option<Option<String>>,
}

fn present<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Trimmed name and its slug, or `None` when the name is absent or blank.
fn name_and_slug(name: Option<&str>) -> Result<Option<(String, Slug)>> {
    let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };
    let slug = Slug::from_name(name)
        .map_err(|_| AppError::BadRequest("Name must contain a letter or digit".to_owned()))?;
    Ok(Some((name.to_owned(), slug)))
}

fn map_write_error(err: RepositoryError) -> AppError {
    match err {
        RepositoryError::NotFound => AppError::NotFound("Category not found".to_owned()),
        RepositoryError::Conflict(_) => {
            AppError::Conflict("A category with this name already exists".to_owned())
        }
        other => other.into(),
    }
}

/// List categories ordered by name.
///
/// GET /api/categories
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = CategoryRepository::new(state.pool()).list().await?;
    Ok(Json(categories))
}

/// Create a category.
///
/// POST /api/categories
#[instrument(skip(state, input), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CategoryInput>,
) -> Result<(StatusCode, Json<Category>)> {
    let (name, slug) = name_and_slug(input.name.as_deref())?
        .ok_or_else(|| AppError::BadRequest("Name is required".to_owned()))?;

    let category = CategoryRepository::new(state.pool())
        .create(&NewCategory {
            name,
            slug,
            image: input.image.flatten(),
            description: input.description.flatten(),
        })
        .await
        .map_err(map_write_error)?;

    tracing::info!(category_id = %category.id, slug = %category.slug, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// Update a category. A new name regenerates the slug.
///
/// PUT /api/categories/{id}
#[instrument(skip(state, input), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<CategoryId>,
    Json(input): Json<CategoryInput>,
) -> Result<Json<Category>> {
    let changes = CategoryChanges {
        name: name_and_slug(input.name.as_deref())?,
        image: input.image,
        description: input.description,
    };

    let categories = CategoryRepository::new(state.pool());
    if changes.is_empty() {
        return categories
            .get_by_id(id)
            .await?
            .map(Json)
            .ok_or_else(|| AppError::NotFound("Category not found".to_owned()));
    }

    let category = categories
        .update(id, &changes)
        .await
        .map_err(map_write_error)?;
    Ok(Json(category))
}

/// Delete a category with no products.
///
/// DELETE /api/categories/{id}
#[instrument(skip(state), fields(admin_id = %admin.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<CategoryId>,
) -> Result<StatusCode> {
    CategoryRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Category not found".to_owned()),
            RepositoryError::Conflict(_) => AppError::Conflict(
                "Failed to delete category. It may contain products.".to_owned(),
            ),
            other => other.into(),
        })?;

    tracing::info!(category_id = %id, "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_name_and_slug() {
        let (name, slug) = name_and_slug(Some("  Low Light ")).unwrap().unwrap();
        assert_eq!(name, "Low Light");
        assert_eq!(slug.as_str(), "low-light");
    }

    #[test]
    fn test_name_and_slug_blank_is_none() {
        assert!(name_and_slug(None).unwrap().is_none());
        assert!(name_and_slug(Some("   ")).unwrap().is_none());
    }

    #[test]
    fn test_input_tells_null_from_missing() {
        let input: CategoryInput =
            serde_json::from_str(r#"{"image": null, "description": "Shade lovers"}"#).unwrap();
        assert_eq!(input.image, Some(None));
        assert_eq!(input.description, Some(Some("Shade lovers".to_owned())));

        let input: CategoryInput = serde_json::from_str(r#"{"name": "Ferns"}"#).unwrap();
        assert_eq!(input.image, None);
        assert_eq!(input.description, None);
    }

    #[test]
    fn test_name_and_slug_rejects_symbols_only() {
        assert!(matches!(
            name_and_slug(Some("%%%")),
            Err(AppError::BadRequest(_))
        ));
    }
}

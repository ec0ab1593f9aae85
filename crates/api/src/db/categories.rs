//! Category repository for database operations.

use sqlx::PgPool;

use paradise_core::CategoryId;

use super::RepositoryError;
use crate::models::{Category, CategoryChanges, NewCategory};

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    /// Create a new category repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all categories, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let categories = sqlx::query_as::<_, Category>(
            r"
            SELECT id, name, slug, image, description, created_at, updated_at
            FROM nursery.category
            ORDER BY name ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(categories)
    }

    /// Get a category by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let category = sqlx::query_as::<_, Category>(
            r"
            SELECT id, name, slug, image, description, created_at, updated_at
            FROM nursery.category
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(category)
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is already taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, category: &NewCategory) -> Result<Category, RepositoryError> {
        sqlx::query_as::<_, Category>(
            r"
            INSERT INTO nursery.category (name, slug, image, description)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, slug, image, description, created_at, updated_at
            ",
        )
        .bind(&category.name)
        .bind(category.slug.as_str())
        .bind(category.image.as_deref())
        .bind(category.description.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            RepositoryError::from_constraint(e, "category slug already exists", "invalid reference")
        })
    }

    /// Apply a partial update. A rename also replaces the slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    /// Returns `RepositoryError::Conflict` if the new slug is already taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: CategoryId,
        changes: &CategoryChanges,
    ) -> Result<Category, RepositoryError> {
        let (name, slug) = changes
            .name
            .as_ref()
            .map_or((None, None), |(name, slug)| (Some(name.as_str()), Some(slug.as_str())));

        sqlx::query_as::<_, Category>(
            r"
            UPDATE nursery.category
            SET name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                image = CASE WHEN $4 THEN $5 ELSE image END,
                description = CASE WHEN $6 THEN $7 ELSE description END
            WHERE id = $1
            RETURNING id, name, slug, image, description, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(name)
        .bind(slug)
        .bind(changes.image.is_some())
        .bind(changes.image.as_ref().and_then(Option::as_deref))
        .bind(changes.description.is_some())
        .bind(changes.description.as_ref().and_then(Option::as_deref))
        .fetch_optional(self.pool)
        .await
        .map_err(|e| {
            RepositoryError::from_constraint(e, "category slug already exists", "invalid reference")
        })?
        .ok_or(RepositoryError::NotFound)
    }

    /// Delete a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    /// Returns `RepositoryError::Conflict` if products still reference it.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM nursery.category WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                RepositoryError::from_constraint(
                    e,
                    "category slug already exists",
                    "category still has products",
                )
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

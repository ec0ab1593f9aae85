//! Product repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use paradise_core::{CategoryId, Price, ProductId};

use super::RepositoryError;
use crate::models::{Category, NewProduct, Product, ProductChanges, ProductWithCategory};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
pub(super) struct ProductRow {
    id: ProductId,
    name: String,
    slug: String,
    description: Option<String>,
    price: Price,
    stock: i32,
    category_id: CategoryId,
    images: Vec<String>,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            price: row.price,
            stock: row.stock,
            category_id: row.category_id,
            images: row.images,
            tags: row.tags,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Product joined with its category; category columns are prefixed `c_`.
#[derive(Debug, sqlx::FromRow)]
struct ProductWithCategoryRow {
    #[sqlx(flatten)]
    product: ProductRow,
    c_name: String,
    c_slug: String,
    c_image: Option<String>,
    c_description: Option<String>,
    c_created_at: DateTime<Utc>,
    c_updated_at: DateTime<Utc>,
}

impl From<ProductWithCategoryRow> for ProductWithCategory {
    fn from(row: ProductWithCategoryRow) -> Self {
        let category = Category {
            id: row.product.category_id,
            name: row.c_name,
            slug: row.c_slug,
            image: row.c_image,
            description: row.c_description,
            created_at: row.c_created_at,
            updated_at: row.c_updated_at,
        };
        Self {
            product: row.product.into(),
            category,
        }
    }
}

pub(super) const PRODUCT_COLUMNS: &str = "id, name, slug, description, price, stock, category_id, \
                               images, tags, created_at, updated_at";

const JOINED_SELECT: &str = r"
    SELECT p.id, p.name, p.slug, p.description, p.price, p.stock, p.category_id,
           p.images, p.tags, p.created_at, p.updated_at,
           c.name AS c_name, c.slug AS c_slug, c.image AS c_image,
           c.description AS c_description,
           c.created_at AS c_created_at, c.updated_at AS c_updated_at
    FROM nursery.product p
    JOIN nursery.category c ON c.id = p.category_id
";

fn map_write_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::from_constraint(e, "product slug already exists", "category does not exist")
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products with their categories, newest first.
    ///
    /// When `category_slug` is given only products in that category are returned.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        category_slug: Option<&str>,
    ) -> Result<Vec<ProductWithCategory>, RepositoryError> {
        let rows: Vec<ProductWithCategoryRow> = sqlx::query_as(&format!(
            "{JOINED_SELECT} WHERE ($1::TEXT IS NULL OR c.slug = $1) ORDER BY p.created_at DESC, p.id DESC"
        ))
        .bind(category_slug)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a product and its category by slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<ProductWithCategory>, RepositoryError> {
        let row: Option<ProductWithCategoryRow> =
            sqlx::query_as(&format!("{JOINED_SELECT} WHERE p.slug = $1"))
                .bind(slug)
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(Into::into))
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM nursery.product WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Whether a product already uses this slug.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn slug_exists(&self, slug: &str) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM nursery.product WHERE slug = $1)")
                .bind(slug)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the slug is taken or the category
    /// does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let row: ProductRow = sqlx::query_as(&format!(
            r"
            INSERT INTO nursery.product
                (name, slug, description, price, stock, category_id, images, tags)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(&product.name)
        .bind(product.slug.as_str())
        .bind(product.description.as_deref())
        .bind(product.price)
        .bind(product.stock)
        .bind(product.category_id)
        .bind(&product.images)
        .bind(&product.tags)
        .fetch_one(self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(row.into())
    }

    /// Apply a partial update; the slug never changes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Conflict` if the new category does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: ProductId,
        changes: &ProductChanges,
    ) -> Result<Product, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            r"
            UPDATE nursery.product
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                price = COALESCE($4, price),
                stock = COALESCE($5, stock),
                category_id = COALESCE($6, category_id),
                images = COALESCE($7, images),
                tags = COALESCE($8, tags)
            WHERE id = $1
            RETURNING {PRODUCT_COLUMNS}
            "
        ))
        .bind(id)
        .bind(changes.name.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.price)
        .bind(changes.stock)
        .bind(changes.category_id)
        .bind(changes.images.as_ref())
        .bind(changes.tags.as_ref())
        .fetch_optional(self.pool)
        .await
        .map_err(map_write_error)?;

        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::Conflict` if orders still reference it.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM nursery.product WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                RepositoryError::from_constraint(
                    e,
                    "product slug already exists",
                    "product is referenced by existing orders",
                )
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rand::Rng;
use serde::Deserialize;
use tracing::instrument;

use paradise_core::{CategoryId, Price, ProductId, Slug};

use crate::db::{CategoryRepository, ProductRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdmin;
use crate::models::{NewProduct, Product, ProductChanges, ProductWithCategory};
use crate::state::AppState;

/// Query parameters for the product listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Category slug to filter by.
    pub category: Option<String>,
}

/// Product fields accepted on create and update.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub stock: Option<i32>,
    pub category_id: Option<CategoryId>,
    pub images: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
}

fn validate_stock(stock: Option<i32>) -> Result<()> {
    if stock.is_some_and(|s| s < 0) {
        return Err(AppError::BadRequest("Stock cannot be negative".to_owned()));
    }
    Ok(())
}

async fn ensure_category(state: &AppState, id: CategoryId) -> Result<()> {
    CategoryRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::BadRequest(format!("Category {id} does not exist")))
}

/// List products with their category.
///
/// GET /api/products?category=<slug>
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ProductWithCategory>>> {
    let category = query.category.as_deref().filter(|c| !c.is_empty());
    let products = ProductRepository::new(state.pool()).list(category).await?;
    Ok(Json(products))
}

/// Product detail by slug.
///
/// GET /api/products/{slug}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<ProductWithCategory>> {
    ProductRepository::new(state.pool())
        .get_by_slug(&slug)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))
}

/// Create a product. The slug is derived from the name and gets a random
/// numeric suffix if already taken.
///
/// POST /api/products
#[instrument(skip(state, input), fields(admin_id = %admin.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<ProductInput>,
) -> Result<(StatusCode, Json<Product>)> {
    let name = input
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::BadRequest("Product name is required".to_owned()))?;
    let price = input
        .price
        .ok_or_else(|| AppError::BadRequest("Price is required".to_owned()))?;
    let category_id = input.category_id.ok_or_else(|| {
        AppError::BadRequest("Category is required. Please create a category first.".to_owned())
    })?;
    validate_stock(input.stock)?;
    ensure_category(&state, category_id).await?;

    let products = ProductRepository::new(state.pool());
    let mut slug = Slug::from_name(name)
        .map_err(|_| AppError::BadRequest("Product name must contain a letter or digit".to_owned()))?;
    if products.slug_exists(slug.as_str()).await? {
        slug = slug.with_suffix(rand::rng().random_range(0..10_000));
    }

    let product = products
        .create(&NewProduct {
            name: name.to_owned(),
            slug,
            description: input.description,
            price,
            stock: input.stock.unwrap_or(0),
            category_id,
            images: input.images.unwrap_or_default(),
            tags: input.tags.unwrap_or_default(),
        })
        .await?;

    tracing::info!(product_id = %product.id, slug = %product.slug, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// Partially update a product.
///
/// PUT /api/products/{id}
#[instrument(skip(state, input), fields(admin_id = %admin.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
    Json(input): Json<ProductInput>,
) -> Result<Json<Product>> {
    let name = match input.name {
        Some(name) if name.trim().is_empty() => {
            return Err(AppError::BadRequest("Product name cannot be empty".to_owned()));
        }
        other => other.map(|n| n.trim().to_owned()),
    };
    validate_stock(input.stock)?;
    if let Some(category_id) = input.category_id {
        ensure_category(&state, category_id).await?;
    }

    let changes = ProductChanges {
        name,
        description: input.description,
        price: input.price,
        stock: input.stock,
        category_id: input.category_id,
        images: input.images,
        tags: input.tags,
    };

    let product = ProductRepository::new(state.pool())
        .update(id, &changes)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => {
                AppError::NotFound("Product not found".to_owned())
            }
            other => other.into(),
        })?;
    Ok(Json(product))
}

/// Delete a product that no order references.
///
/// DELETE /api/products/{id}
#[instrument(skip(state), fields(admin_id = %admin.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<ProductId>,
) -> Result<StatusCode> {
    ProductRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => {
                AppError::NotFound("Product not found".to_owned())
            }
            RepositoryError::Conflict(_) => AppError::Conflict(
                "Product cannot be deleted because it appears in existing orders".to_owned(),
            ),
            other => other.into(),
        })?;

    tracing::info!(product_id = %id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_input_accepts_camel_case_and_numeric_price() {
        let input: ProductInput =
            serde_json::from_str(r#"{"name": "Snake Plant", "price": 25, "categoryId": 1}"#)
                .unwrap();
        assert_eq!(input.name.as_deref(), Some("Snake Plant"));
        assert_eq!(input.price.unwrap().to_string(), "25.00");
        assert_eq!(input.category_id, Some(CategoryId::new(1)));
        assert!(input.images.is_none());
    }

    #[test]
    fn test_validate_stock() {
        assert!(validate_stock(None).is_ok());
        assert!(validate_stock(Some(0)).is_ok());
        assert!(validate_stock(Some(-1)).is_err());
    }
}

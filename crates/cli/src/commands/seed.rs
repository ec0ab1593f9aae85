//! Seed the catalog from a YAML file.
//!
//! Categories and products are upserted by slug, so the command can be run
//! repeatedly. Stock is only written on first insert; later runs leave
//! whatever the shop has sold untouched.
//!
//! When `SEED_ADMIN_EMAIL` and `SEED_ADMIN_PASSWORD` are both set, an admin
//! account is created as well (skipped if the email is already registered).
//! `SEED_ADMIN_NAME` defaults to "Admin User".

use std::collections::{HashMap, HashSet};
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{error, info, warn};

use paradise_core::{CategoryId, Price, slugify};

use super::admin::{AdminError, insert_admin};
use super::{ConnectError, connect};

/// Top-level layout of the catalog file.
#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub categories: Vec<SeedCategory>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
}

#[derive(Debug, Deserialize)]
pub struct SeedCategory {
    pub name: String,
    /// Derived from `name` when omitted.
    pub slug: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeedProduct {
    pub name: String,
    pub slug: Option<String>,
    /// Slug of a category in the same file.
    pub category: String,
    pub price: Decimal,
    #[serde(default)]
    pub stock: u32,
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SeedCategory {
    fn slug(&self) -> String {
        self.slug.clone().unwrap_or_else(|| slugify(&self.name))
    }
}

impl SeedProduct {
    fn slug(&self) -> String {
        self.slug.clone().unwrap_or_else(|| slugify(&self.name))
    }
}

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0} validation errors found")]
    Invalid(usize),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Seed admin: {0}")]
    Admin(#[from] AdminError),
}

/// Check a parsed catalog, returning one message per problem.
#[must_use]
pub fn validate_catalog(catalog: &CatalogFile) -> Vec<String> {
    let mut errors = Vec::new();
    let mut category_slugs = HashSet::new();

    for category in &catalog.categories {
        let slug = category.slug();
        if category.name.trim().is_empty() {
            errors.push("category with empty name".to_owned());
        }
        if slug.is_empty() || slugify(&slug) != slug {
            errors.push(format!("category '{}': invalid slug '{slug}'", category.name));
        }
        if !category_slugs.insert(slug.clone()) {
            errors.push(format!("duplicate category slug '{slug}'"));
        }
    }

    let mut product_slugs = HashSet::new();
    for product in &catalog.products {
        let slug = product.slug();
        if product.name.trim().is_empty() {
            errors.push("product with empty name".to_owned());
        }
        if slug.is_empty() || slugify(&slug) != slug {
            errors.push(format!("product '{}': invalid slug '{slug}'", product.name));
        }
        if !product_slugs.insert(slug.clone()) {
            errors.push(format!("duplicate product slug '{slug}'"));
        }
        if !category_slugs.contains(&product.category) {
            errors.push(format!(
                "product '{}': unknown category '{}'",
                product.name, product.category
            ));
        }
        if let Err(e) = Price::new(product.price) {
            errors.push(format!("product '{}': {e}", product.name));
        }
        if i32::try_from(product.stock).is_err() {
            errors.push(format!("product '{}': stock out of range", product.name));
        }
    }

    errors
}

/// Seed categories, products and the optional admin account.
///
/// # Errors
///
/// Returns an error if the file cannot be read or validated, or if any
/// database write fails.
pub async fn catalog(file_path: &str) -> Result<(), SeedError> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(SeedError::FileNotFound(file_path.to_owned()));
    }

    info!(path = %file_path, "Loading catalog from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let catalog: CatalogFile = serde_yaml::from_str(&content)?;

    info!(
        categories = catalog.categories.len(),
        products = catalog.products.len(),
        "Parsed catalog"
    );

    let errors = validate_catalog(&catalog);
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(SeedError::Invalid(errors.len()));
    }

    let pool = connect().await?;
    info!("Connected to database");

    let category_ids = upsert_categories(&pool, &catalog.categories).await?;
    upsert_products(&pool, &catalog.products, &category_ids).await?;
    seed_admin(&pool).await?;

    info!(
        "Seeded {} categories and {} products",
        catalog.categories.len(),
        catalog.products.len()
    );
    Ok(())
}

async fn upsert_categories(
    pool: &PgPool,
    categories: &[SeedCategory],
) -> Result<HashMap<String, CategoryId>, SeedError> {
    let mut ids = HashMap::with_capacity(categories.len());

    for category in categories {
        let slug = category.slug();
        let id: CategoryId = sqlx::query_scalar(
            r"
            INSERT INTO nursery.category (name, slug, description, image)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (slug) DO UPDATE
            SET name = EXCLUDED.name,
                description = COALESCE(EXCLUDED.description, nursery.category.description),
                image = COALESCE(EXCLUDED.image, nursery.category.image)
            RETURNING id
            ",
        )
        .bind(category.name.trim())
        .bind(&slug)
        .bind(category.description.as_deref())
        .bind(category.image.as_deref())
        .fetch_one(pool)
        .await?;

        info!(%slug, id = %id, "Category upserted");
        ids.insert(slug, id);
    }

    Ok(ids)
}

async fn upsert_products(
    pool: &PgPool,
    products: &[SeedProduct],
    category_ids: &HashMap<String, CategoryId>,
) -> Result<(), SeedError> {
    let mut tx = pool.begin().await?;

    for product in products {
        let slug = product.slug();
        let Some(category_id) = category_ids.get(&product.category) else {
            // validate_catalog already rejected unknown categories
            warn!(%slug, category = %product.category, "Skipping product with unknown category");
            continue;
        };
        let price = Price::from_stored(product.price.round_dp(Price::SCALE));
        let stock = i32::try_from(product.stock).unwrap_or(i32::MAX);

        sqlx::query(
            r"
            INSERT INTO nursery.product
                (name, slug, description, price, stock, category_id, images, tags)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (slug) DO UPDATE
            SET name = EXCLUDED.name,
                description = EXCLUDED.description,
                price = EXCLUDED.price,
                category_id = EXCLUDED.category_id,
                images = EXCLUDED.images,
                tags = EXCLUDED.tags
            ",
        )
        .bind(product.name.trim())
        .bind(&slug)
        .bind(product.description.as_deref())
        .bind(price.amount())
        .bind(stock)
        .bind(category_id)
        .bind(&product.images)
        .bind(&product.tags)
        .execute(&mut *tx)
        .await?;

        info!(%slug, "Product upserted");
    }

    tx.commit().await?;
    Ok(())
}

async fn seed_admin(pool: &PgPool) -> Result<(), SeedError> {
    let (Ok(email), Ok(password)) = (
        std::env::var("SEED_ADMIN_EMAIL"),
        std::env::var("SEED_ADMIN_PASSWORD"),
    ) else {
        info!("SEED_ADMIN_EMAIL/SEED_ADMIN_PASSWORD not set, skipping admin account");
        return Ok(());
    };
    let name = std::env::var("SEED_ADMIN_NAME").unwrap_or_else(|_| "Admin User".to_owned());

    match insert_admin(pool, &email, &name, &password).await {
        Ok(id) => {
            info!(id = %id, %email, "Seed admin created");
            Ok(())
        }
        Err(AdminError::UserExists(_)) => {
            info!(%email, "Seed admin already exists");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const BUNDLED: &str = include_str!("../../seed/catalog.yaml");

    #[test]
    fn test_bundled_catalog_is_valid() {
        let catalog: CatalogFile = serde_yaml::from_str(BUNDLED).unwrap();
        assert_eq!(catalog.categories.len(), 2);
        assert_eq!(catalog.products.len(), 6);
        assert!(validate_catalog(&catalog).is_empty());
    }

    #[test]
    fn test_slug_defaults_to_name() {
        let catalog: CatalogFile = serde_yaml::from_str(
            r"
categories:
  - name: Succulents & Cacti
products:
  - name: Jade Plant
    category: succulents-cacti
    price: '12.5'
",
        )
        .unwrap();
        assert_eq!(catalog.categories[0].slug(), "succulents-cacti");
        assert_eq!(catalog.products[0].slug(), "jade-plant");
        assert_eq!(catalog.products[0].stock, 0);
        assert!(validate_catalog(&catalog).is_empty());
    }

    #[test]
    fn test_validation_reports_each_problem() {
        let catalog: CatalogFile = serde_yaml::from_str(
            r"
categories:
  - name: Ferns
    slug: Ferns!
products:
  - name: Boston Fern
    category: shade
    price: '-3'
  - name: Boston Fern
    category: shade
    price: '4'
",
        )
        .unwrap();
        let errors = validate_catalog(&catalog);
        assert!(errors.iter().any(|e| e.contains("invalid slug 'Ferns!'")));
        assert!(errors.iter().any(|e| e.contains("unknown category 'shade'")));
        assert!(errors.iter().any(|e| e.contains("duplicate product slug 'boston-fern'")));
        assert!(errors.iter().any(|e| e.contains("Boston Fern': ")));
    }
}

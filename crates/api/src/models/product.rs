//! Product domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use paradise_core::{CategoryId, Price, ProductId, Slug};

use super::Category;

/// A catalog product.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub price: Price,
    pub stock: i32,
    pub category_id: CategoryId,
    pub images: Vec<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether at least `qty` units can be sold.
    #[must_use]
    pub fn has_stock_for(&self, qty: u32) -> bool {
        u32::try_from(self.stock).is_ok_and(|stock| stock >= qty)
    }
}

/// A product together with its category, as returned by catalog listings.
#[derive(Debug, Clone, Serialize)]
pub struct ProductWithCategory {
    #[serde(flatten)]
    pub product: Product,
    pub category: Category,
}

/// Validated input for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub slug: Slug,
    pub description: Option<String>,
    pub price: Price,
    pub stock: i32,
    pub category_id: CategoryId,
    pub images: Vec<String>,
    pub tags: Vec<String>,
}

/// Validated partial update for a product.
///
/// `None` leaves the stored value unchanged. The slug is stable across
/// renames so existing links keep working.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Price>,
    pub stock: Option<i32>,
    pub category_id: Option<CategoryId>,
    pub images: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(stock: i32) -> Product {
        Product {
            id: ProductId::new(1),
            name: "ZZ Plant".to_string(),
            slug: "zz-plant".to_string(),
            description: None,
            price: Price::new("35".parse().unwrap()).unwrap(),
            stock,
            category_id: CategoryId::new(2),
            images: vec![],
            tags: vec!["low-light".to_string()],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_has_stock_for() {
        assert!(product(3).has_stock_for(3));
        assert!(!product(3).has_stock_for(4));
        assert!(!product(-1).has_stock_for(0));
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(product(3)).unwrap();
        assert_eq!(json["categoryId"], 2);
        assert_eq!(json["price"], "35.00");
        assert!(json.get("category_id").is_none());
    }
}

//! Order repository for database operations.
//!
//! Placing an order is the only multi-statement write in the API. It runs in a
//! single transaction that locks the ordered product rows, checks stock,
//! records the order with prices read from the locked rows, and decrements
//! stock. Any failure rolls the whole thing back.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;

use paradise_core::{
    OrderId, OrderItemId, OrderStatus, PaymentMode, Price, PriceError, ProductId, UserId,
};

use super::RepositoryError;
use super::products::{PRODUCT_COLUMNS, ProductRow};
use crate::models::{NewOrder, Order, OrderItem, Product};

/// Errors specific to placing an order.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    /// The order has no lines, or a line has a zero quantity.
    #[error("{0}")]
    InvalidLines(&'static str),

    /// A requested product does not exist.
    #[error("product {0} does not exist")]
    UnknownProduct(ProductId),

    /// Not enough stock to fill a line.
    #[error("insufficient stock for {name}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        name: String,
        requested: u32,
        available: i32,
    },

    /// The order total does not fit in the amount column.
    #[error("order total is out of range: {0}")]
    TotalOutOfRange(#[from] PriceError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for PlaceOrderError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: Option<UserId>,
    customer_name: String,
    phone: String,
    whatsapp: Option<String>,
    address: String,
    city: String,
    pincode: String,
    total_amount: Price,
    payment_mode: PaymentMode,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            user_id: self.user_id,
            customer_name: self.customer_name,
            phone: self.phone,
            whatsapp: self.whatsapp,
            address: self.address,
            city: self.city,
            pincode: self.pincode,
            total_amount: self.total_amount,
            payment_mode: self.payment_mode,
            status: self.status,
            items,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Order line joined with its product. Line columns are prefixed `item_`.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    item_id: OrderItemId,
    item_order_id: OrderId,
    item_qty: i32,
    item_price: Price,
    #[sqlx(flatten)]
    product: ProductRow,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        let product: Product = row.product.into();
        Self {
            id: row.item_id,
            order_id: row.item_order_id,
            product_id: product.id,
            qty: row.item_qty,
            price: row.item_price,
            product: Some(product),
        }
    }
}

const ORDER_COLUMNS: &str = "id, user_id, customer_name, phone, whatsapp, address, city, \
                             pincode, total_amount, payment_mode, status, created_at, updated_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Place an order, decrementing stock in the same transaction.
    ///
    /// Duplicate product lines are merged. Rows are locked in product ID
    /// order so concurrent checkouts of overlapping carts serialize instead
    /// of deadlocking.
    ///
    /// # Errors
    ///
    /// Returns `PlaceOrderError::InvalidLines` for an empty order or a zero quantity.
    /// Returns `PlaceOrderError::UnknownProduct` if a product does not exist.
    /// Returns `PlaceOrderError::InsufficientStock` if a line cannot be filled.
    /// Returns `PlaceOrderError::TotalOutOfRange` if the total overflows the amount column.
    /// Returns `PlaceOrderError::Repository` for database errors.
    pub async fn place(&self, order: &NewOrder) -> Result<Order, PlaceOrderError> {
        if order.lines.is_empty() {
            return Err(PlaceOrderError::InvalidLines("order must contain at least one item"));
        }
        if order.lines.iter().any(|l| l.qty == 0) {
            return Err(PlaceOrderError::InvalidLines("item quantity must be at least 1"));
        }

        let lines = order.merged_lines();
        let ids: Vec<ProductId> = lines.iter().map(|l| l.product_id).collect();

        let mut tx = self.pool.begin().await?;

        let locked: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM nursery.product WHERE id = ANY($1) ORDER BY id FOR UPDATE"
        ))
        .bind(&ids)
        .fetch_all(&mut *tx)
        .await?;
        let mut products: HashMap<ProductId, Product> = locked
            .into_iter()
            .map(|row| {
                let product: Product = row.into();
                (product.id, product)
            })
            .collect();

        for line in &lines {
            let product = products
                .get(&line.product_id)
                .ok_or(PlaceOrderError::UnknownProduct(line.product_id))?;
            if !product.has_stock_for(line.qty) {
                return Err(PlaceOrderError::InsufficientStock {
                    product_id: product.id,
                    name: product.name.clone(),
                    requested: line.qty,
                    available: product.stock,
                });
            }
        }

        let total = Price::checked_total(
            lines
                .iter()
                .filter_map(|l| products.get(&l.product_id).map(|p| (p.price, l.qty))),
        )?;

        let shipping = &order.shipping;
        let row: OrderRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO nursery."order"
                (user_id, customer_name, phone, whatsapp, address, city, pincode,
                 total_amount, payment_mode)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(order.user_id)
        .bind(shipping.customer_name.trim())
        .bind(shipping.phone.trim())
        .bind(shipping.whatsapp.as_deref().map(str::trim))
        .bind(shipping.address.trim())
        .bind(shipping.city.trim())
        .bind(shipping.pincode.trim())
        .bind(total)
        .bind(order.payment_mode)
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            let Some(product) = products.get_mut(&line.product_id) else {
                continue;
            };
            // has_stock_for already guaranteed qty <= stock <= i32::MAX
            let qty = i32::try_from(line.qty).map_err(|_| PlaceOrderError::InsufficientStock {
                product_id: product.id,
                name: product.name.clone(),
                requested: line.qty,
                available: product.stock,
            })?;

            let item_id: OrderItemId = sqlx::query_scalar(
                r"
                INSERT INTO nursery.order_item (order_id, product_id, qty, price)
                VALUES ($1, $2, $3, $4)
                RETURNING id
                ",
            )
            .bind(row.id)
            .bind(product.id)
            .bind(qty)
            .bind(product.price)
            .fetch_one(&mut *tx)
            .await?;

            let stock: i32 = sqlx::query_scalar(
                r"
                UPDATE nursery.product
                SET stock = stock - $2
                WHERE id = $1 AND stock >= $2
                RETURNING stock
                ",
            )
            .bind(product.id)
            .bind(qty)
            .fetch_one(&mut *tx)
            .await?;
            product.stock = stock;

            items.push(OrderItem {
                id: item_id,
                order_id: row.id,
                product_id: product.id,
                qty,
                price: product.price,
                product: Some(product.clone()),
            });
        }

        tx.commit().await?;

        tracing::info!(
            order_id = %row.id,
            total = %total,
            lines = items.len(),
            "Order placed"
        );

        Ok(row.into_order(items))
    }

    /// List every order with its items and products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            r#"SELECT {ORDER_COLUMNS} FROM nursery."order" ORDER BY created_at DESC, id DESC"#
        ))
        .fetch_all(self.pool)
        .await?;

        self.attach_items(rows).await
    }

    /// List one user's orders with items and products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list_for_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            r#"
            SELECT {ORDER_COLUMNS} FROM nursery."order"
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        self.attach_items(rows).await
    }

    /// Get a single order with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> = sqlx::query_as(&format!(
            r#"SELECT {ORDER_COLUMNS} FROM nursery."order" WHERE id = $1"#
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.attach_items(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Set an order's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let row: OrderRow = sqlx::query_as(&format!(
            r#"
            UPDATE nursery."order"
            SET status = $2
            WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        self.attach_items(vec![row])
            .await?
            .pop()
            .ok_or(RepositoryError::NotFound)
    }

    /// Load items for a batch of orders in one query, preserving order of `rows`.
    async fn attach_items(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<OrderId> = rows.iter().map(|r| r.id).collect();
        let item_rows: Vec<OrderItemRow> = sqlx::query_as(
            r"
            SELECT oi.id AS item_id, oi.order_id AS item_order_id,
                   oi.qty AS item_qty, oi.price AS item_price,
                   p.id, p.name, p.slug, p.description, p.price, p.stock, p.category_id,
                   p.images, p.tags, p.created_at, p.updated_at
            FROM nursery.order_item oi
            JOIN nursery.product p ON p.id = oi.product_id
            WHERE oi.order_id = ANY($1)
            ORDER BY oi.id
            ",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for item in item_rows {
            let item: OrderItem = item.into();
            by_order.entry(item.order_id).or_default().push(item);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let items = by_order.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect())
    }
}

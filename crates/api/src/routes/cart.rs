//! Session cart route handlers.
//!
//! The cart lives in the anonymous session so guests can shop before
//! signing in. Prices shown in the cart are captured when a product is
//! added; checkout re-reads current prices from the database.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use paradise_core::{Cart, CartItem, NewCartItem, PaymentMode, Price, ProductId};

use crate::db::{OrderRepository, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::OptionalUser;
use crate::models::{Order, OrderLine, ShippingDetails, session_keys};
use crate::routes::orders::build_order;
use crate::state::AppState;

/// Cart as returned to clients.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub total_items: u32,
    pub total_price: Price,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().to_vec(),
            total_items: cart.total_items(),
            total_price: cart.total_price(),
        }
    }
}

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItem {
    pub product_id: ProductId,
}

/// Quantity update request body.
#[derive(Debug, Deserialize)]
pub struct SetQuantity {
    pub quantity: u32,
}

/// Query for removals.
#[derive(Debug, Default, Deserialize)]
pub struct RemoveQuery {
    /// Drop the whole line instead of one unit.
    #[serde(default)]
    pub all: bool,
}

/// Checkout request body: shipping details for the session cart.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(flatten)]
    pub shipping: ShippingDetails,
    #[serde(default)]
    pub payment_mode: Option<PaymentMode>,
}

// =============================================================================
// Session Helpers
// =============================================================================

async fn load_cart(session: &Session) -> Result<Cart> {
    session
        .get::<Cart>(session_keys::CART)
        .await
        .map(Option::unwrap_or_default)
        .map_err(|e| AppError::Internal(format!("failed to read cart from session: {e}")))
}

async fn save_cart(session: &Session, cart: &Cart) -> Result<()> {
    session
        .insert(session_keys::CART, cart)
        .await
        .map_err(|e| AppError::Internal(format!("failed to write cart to session: {e}")))
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /api/cart
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<CartView>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Add one unit of a product.
///
/// POST /api/cart/items
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<AddItem>,
) -> Result<Json<CartView>> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(body.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_owned()))?;

    let mut cart = load_cart(&session).await?;
    cart.add_item(NewCartItem {
        id: product.id,
        name: product.name,
        price: product.price,
        image: product.images.into_iter().next(),
    });
    save_cart(&session, &cart).await?;

    Ok(Json(CartView::from(&cart)))
}

/// Set the quantity of a line. Quantities below one are ignored.
///
/// PUT /api/cart/items/{id}
#[instrument(skip(session))]
pub async fn update(
    session: Session,
    Path(id): Path<ProductId>,
    Json(body): Json<SetQuantity>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    cart.update_quantity(id, body.quantity);
    save_cart(&session, &cart).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Remove one unit, or the whole line with `?all=true`.
///
/// DELETE /api/cart/items/{id}
#[instrument(skip(session))]
pub async fn remove(
    session: Session,
    Path(id): Path<ProductId>,
    Query(query): Query<RemoveQuery>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    cart.remove_item(id, query.all);
    save_cart(&session, &cart).await?;
    Ok(Json(CartView::from(&cart)))
}

/// DELETE /api/cart
#[instrument(skip(session))]
pub async fn clear(session: Session) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    cart.clear();
    save_cart(&session, &cart).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Place an order from the session cart, then empty it.
///
/// The cart is left untouched if the order fails.
///
/// POST /api/cart/checkout
#[instrument(skip(state, session, body))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    OptionalUser(user): OptionalUser,
    Json(body): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let mut cart = load_cart(&session).await?;
    if cart.is_empty() {
        return Err(AppError::BadRequest("Cart is empty".to_owned()));
    }

    let lines = cart
        .items()
        .iter()
        .map(|item| OrderLine {
            product_id: item.id,
            qty: item.quantity,
        })
        .collect();
    let order = build_order(user.map(|u| u.id), body.shipping, body.payment_mode, lines)?;
    let order = OrderRepository::new(state.pool()).place(&order).await?;

    cart.clear();
    save_cart(&session, &cart).await?;

    Ok((StatusCode::CREATED, Json(order)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_cart_view_totals() {
        let mut cart = Cart::new();
        cart.add_item(NewCartItem {
            id: ProductId::new(1),
            name: "Peace Lily".to_owned(),
            price: Price::new(Decimal::new(2800, 2)).unwrap(),
            image: None,
        });
        cart.update_quantity(ProductId::new(1), 3);

        let json = serde_json::to_value(CartView::from(&cart)).unwrap();
        assert_eq!(json["totalItems"], 3);
        assert_eq!(json["totalPrice"], "84.00");
        assert_eq!(json["items"][0]["quantity"], 3);
    }

    #[test]
    fn test_remove_query_defaults_to_single_unit() {
        let query: RemoveQuery = serde_json::from_str("{}").unwrap();
        assert!(!query.all);
    }
}

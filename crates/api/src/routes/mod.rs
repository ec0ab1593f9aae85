//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                           - Banner
//! GET    /health                     - Liveness
//! GET    /health/ready               - Readiness (pings the database)
//!
//! # Auth (rate limited)
//! POST   /api/auth/register          - Create account, returns token
//! POST   /api/auth/login             - Exchange credentials for token
//! GET    /api/auth/me                - Current profile (user)
//! PUT    /api/auth/profile/{user_id} - Update profile (self or admin)
//!
//! # Catalog
//! GET    /api/products               - List (optional ?category=<slug>)
//! GET    /api/products/{slug}        - Detail
//! POST   /api/products               - Create (admin)
//! PUT    /api/products/{id}          - Update (admin)
//! DELETE /api/products/{id}          - Delete (admin)
//! GET    /api/categories             - List
//! POST   /api/categories             - Create (admin)
//! PUT    /api/categories/{id}        - Update (admin)
//! DELETE /api/categories/{id}        - Delete (admin)
//!
//! # Orders
//! POST   /api/orders                 - Place order (guest or user)
//! GET    /api/orders                 - All orders (admin)
//! GET    /api/orders/user/{user_id}  - A user's orders (self or admin)
//! GET    /api/orders/{id}            - One order (owner or admin)
//! PUT    /api/orders/{id}/status     - Set status (admin)
//!
//! # Admin
//! GET    /api/admin/dashboard        - Aggregate counters (admin)
//!
//! # Session cart
//! GET    /api/cart                   - Show cart
//! DELETE /api/cart                   - Clear cart
//! POST   /api/cart/items             - Add one unit
//! PUT    /api/cart/items/{id}        - Set quantity
//! DELETE /api/cart/items/{id}        - Remove one unit (?all=true for the line)
//! POST   /api/cart/checkout          - Place order from cart
//! ```
//!
//! Products are addressed by slug for reads and by ID for writes.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod health;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .route("/profile/{user_id}", put(auth::update_profile))
        .layer(auth_rate_limiter())
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{key}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
}

/// Create the category routes router.
pub fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index).post(categories::create))
        .route(
            "/{id}",
            put(categories::update).delete(categories::delete),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/user/{user_id}", get(orders::for_user))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", put(orders::update_status))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add))
        .route("/items/{id}", put(cart::update).delete(cart::remove))
        .route("/checkout", post(cart::checkout))
}

/// Create all routes for the API.
pub fn routes() -> Router<AppState> {
    let api = Router::new()
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/orders", order_routes())
        .nest("/cart", cart_routes())
        .route("/admin/dashboard", get(admin::dashboard));

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/api", api)
}

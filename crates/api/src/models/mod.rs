//! Domain models for the nursery API.
//!
//! These types are validated domain objects, separate from the database row
//! types in [`crate::db`]. They serialize with camelCase field names, which is
//! the wire format the storefront client speaks.

pub mod category;
pub mod dashboard;
pub mod order;
pub mod product;
pub mod session;
pub mod user;

pub use category::{Category, CategoryChanges, NewCategory};
pub use dashboard::DashboardStats;
pub use order::{NewOrder, Order, OrderItem, OrderLine, ShippingDetails};
pub use product::{NewProduct, Product, ProductChanges, ProductWithCategory};
pub use session::{CurrentUser, keys as session_keys};
pub use user::{ProfileChanges, User};

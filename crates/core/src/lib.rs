//! Paradise Nursery Core - Shared domain types.
//!
//! This crate provides common types used across all Paradise Nursery components:
//! - `api` - REST API server for the storefront and admin dashboard
//! - `cli` - Command-line tools for migrations, seeding and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no database
//! access, no HTTP clients. Database encodings are gated behind the `postgres`
//! feature so the types stay usable anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, slugs and statuses
//! - [`cart`] - Shopping cart state keyed by product ID

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod types;

pub use cart::{Cart, CartItem, NewCartItem};
pub use types::*;

//! Integration tests for the Paradise Nursery API.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate and seed a database, then start the API
//! cargo run -p paradise-cli -- migrate
//! SEED_ADMIN_EMAIL=admin@paradise.com SEED_ADMIN_PASSWORD=admin1234 \
//!     cargo run -p paradise-cli -- seed
//! cargo run -p paradise-api
//!
//! # Run the ignored HTTP tests against it
//! cargo test -p paradise-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `API_BASE_URL` - Server under test (default `http://localhost:3001`)
//! - `TEST_ADMIN_EMAIL` / `TEST_ADMIN_PASSWORD` - Seeded admin credentials

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL for the API (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("API_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// Token plus profile returned by register and login.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: Value,
}

/// HTTP client bound to the server under test.
///
/// The cookie store keeps the cart session between requests. Each client
/// reports its own forwarded address so the auth rate limiter treats test
/// clients as separate callers.
pub struct TestClient {
    pub client: Client,
    pub base_url: String,
    token: Option<String>,
}

impl Default for TestClient {
    fn default() -> Self {
        Self::new()
    }
}

impl TestClient {
    #[must_use]
    pub fn new() -> Self {
        let b = Uuid::new_v4().into_bytes();
        let ip = format!("10.{}.{}.{}", b[0], b[1], b[2]);
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_str(&ip).unwrap());

        let client = Client::builder()
            .cookie_store(true)
            .default_headers(headers)
            .build()
            .expect("Failed to create HTTP client");
        Self {
            client,
            base_url: base_url(),
            token: None,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn with_auth(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.with_auth(self.client.get(self.url(path)))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.with_auth(self.client.post(self.url(path)))
    }

    pub fn put(&self, path: &str) -> RequestBuilder {
        self.with_auth(self.client.put(self.url(path)))
    }

    pub fn delete(&self, path: &str) -> RequestBuilder {
        self.with_auth(self.client.delete(self.url(path)))
    }

    /// Register a fresh shopper with a unique email and keep its token.
    pub async fn register_shopper(&mut self) -> AuthResponse {
        let email = format!("shopper-{}@example.com", Uuid::new_v4());
        let resp = self
            .post("/api/auth/register")
            .json(&json!({
                "name": "Integration Shopper",
                "email": email,
                "password": "leafy-greens-42",
            }))
            .send()
            .await
            .expect("Failed to register");

        assert_eq!(resp.status(), StatusCode::CREATED);
        let auth: AuthResponse = resp.json().await.expect("Invalid auth response");
        self.token = Some(auth.token.clone());
        auth
    }

    /// Log in as the seeded admin and keep its token.
    pub async fn login_admin(&mut self) -> AuthResponse {
        let email =
            std::env::var("TEST_ADMIN_EMAIL").unwrap_or_else(|_| "admin@paradise.com".to_string());
        let password =
            std::env::var("TEST_ADMIN_PASSWORD").unwrap_or_else(|_| "admin1234".to_string());

        let resp = self
            .post("/api/auth/login")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to log in");

        assert_eq!(resp.status(), StatusCode::OK, "seeded admin login failed");
        let auth: AuthResponse = resp.json().await.expect("Invalid auth response");
        self.token = Some(auth.token.clone());
        auth
    }

    /// Create a category with a unique name, returning its JSON.
    pub async fn create_category(&self) -> Value {
        let resp = self
            .post("/api/categories")
            .json(&json!({ "name": format!("Test Ferns {}", Uuid::new_v4()) }))
            .send()
            .await
            .expect("Failed to create category");
        assert_eq!(resp.status(), StatusCode::CREATED);
        resp.json().await.unwrap()
    }

    /// Create a product in `category_id`, returning its JSON.
    pub async fn create_product(&self, category_id: &Value, price: &str, stock: i32) -> Value {
        let resp = self
            .post("/api/products")
            .json(&json!({
                "name": format!("Test Fern {}", Uuid::new_v4()),
                "description": "Created by integration tests",
                "price": price,
                "stock": stock,
                "categoryId": category_id,
                "images": [],
                "tags": ["test"],
            }))
            .send()
            .await
            .expect("Failed to create product");
        assert_eq!(resp.status(), StatusCode::CREATED);
        resp.json().await.unwrap()
    }
}

/// Shipping fields accepted by checkout and order placement.
#[must_use]
pub fn shipping_details() -> Value {
    json!({
        "customerName": "Asha Rao",
        "phone": "9876543210",
        "address": "12 Fern Lane",
        "city": "Pune",
        "pincode": "411001",
    })
}

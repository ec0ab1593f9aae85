//! Router-level tests for paths that never reach the database.
//!
//! The pool is created lazily and never connects, so every request here must
//! be answered by routing, extractors or validation alone.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use url::Url;

use paradise_api::config::{ApiConfig, AuthConfig};
use paradise_api::services::auth::TokenService;
use paradise_api::state::AppState;
use paradise_core::{Role, UserId};

const SECRET: &str = "aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6";

fn config() -> ApiConfig {
    ApiConfig {
        database_url: SecretString::from("postgres://nursery@localhost:1/unreachable"),
        host: "127.0.0.1".parse().unwrap(),
        port: 3001,
        base_url: Url::parse("http://localhost:3001").unwrap(),
        cors_origins: Vec::new(),
        auth: AuthConfig {
            jwt_secret: SecretString::from(SECRET),
            token_ttl: Duration::from_secs(3600),
        },
        low_stock_threshold: 5,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    }
}

fn app() -> Router {
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(200))
        .connect_lazy("postgres://nursery@localhost:1/unreachable")
        .unwrap();
    paradise_api::app(AppState::new(config(), pool))
}

fn token(role: Role) -> String {
    TokenService::new(&SecretString::from(SECRET), Duration::from_secs(3600))
        .issue(UserId::new(7), role)
        .unwrap()
}

fn request(method: &str, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-forwarded-for", "203.0.113.10")
}

async fn send(req: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app().oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, body.to_vec())
}

async fn send_json(req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let (status, _, body) = send(req).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_root_banner() {
    let (status, _, body) = send(request("GET", "/").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"Paradise Nursery API Running");
}

#[tokio::test]
async fn test_health() {
    let (status, _, body) = send(request("GET", "/health").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let req = request("GET", "/health")
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();
    let (_, headers, _) = send(req).await;
    assert_eq!(headers.get("x-request-id").unwrap(), "req-123");
}

#[tokio::test]
async fn test_request_id_is_generated() {
    let (_, headers, _) = send(request("GET", "/health").body(Body::empty()).unwrap()).await;
    let id = headers.get("x-request-id").unwrap().to_str().unwrap();
    assert_eq!(id.len(), 36);
}

#[tokio::test]
async fn test_me_requires_token() {
    let (status, body) =
        send_json(request("GET", "/api/auth/me").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "No token provided");
}

#[tokio::test]
async fn test_invalid_token_is_unauthorized() {
    let req = request("GET", "/api/auth/me")
        .header(header::AUTHORIZATION, "Bearer not.a.token")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send_json(req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid or expired token");
}

#[tokio::test]
async fn test_order_listing_requires_admin() {
    let (status, _) = send_json(request("GET", "/api/orders").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = request("GET", "/api/orders")
        .header(header::AUTHORIZATION, format!("Bearer {}", token(Role::User)))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send_json(req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Admin access required");
}

#[tokio::test]
async fn test_dashboard_forbidden_for_shoppers() {
    let req = request("GET", "/api/admin/dashboard")
        .header(header::AUTHORIZATION, format!("Bearer {}", token(Role::User)))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send_json(req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_product_create_forbidden_for_shoppers() {
    let req = request("POST", "/api/products")
        .header(header::AUTHORIZATION, format!("Bearer {}", token(Role::User)))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"name": "Fern", "price": 10, "categoryId": 1}"#))
        .unwrap();
    let (status, _) = send_json(req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_product_create_requires_name() {
    let req = request("POST", "/api/products")
        .header(header::AUTHORIZATION, format!("Bearer {}", token(Role::Admin)))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"price": 10, "categoryId": 1}"#))
        .unwrap();
    let (status, body) = send_json(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Product name is required");
}

#[tokio::test]
async fn test_product_create_requires_category() {
    let req = request("POST", "/api/products")
        .header(header::AUTHORIZATION, format!("Bearer {}", token(Role::Admin)))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"name": "Fern", "price": "12.50"}"#))
        .unwrap();
    let (status, body) = send_json(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Category is required. Please create a category first."
    );
}

#[tokio::test]
async fn test_category_create_requires_name() {
    let req = request("POST", "/api/categories")
        .header(header::AUTHORIZATION, format!("Bearer {}", token(Role::Admin)))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"description": "Shade lovers"}"#))
        .unwrap();
    let (status, body) = send_json(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name is required");
}

#[tokio::test]
async fn test_order_without_items_is_rejected() {
    let req = request("POST", "/api/orders")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            r#"{"customerName": "Asha", "phone": "98", "address": "12 Fern Lane",
                "city": "Pune", "pincode": "411001", "items": []}"#,
        ))
        .unwrap();
    let (status, body) = send_json(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Order must contain at least one item");
}

#[tokio::test]
async fn test_other_users_orders_are_forbidden() {
    let req = request("GET", "/api/orders/user/8")
        .header(header::AUTHORIZATION, format!("Bearer {}", token(Role::User)))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send_json(req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_single_order_requires_token() {
    let (status, _) = send_json(request("GET", "/api/orders/5").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_other_users_profile_is_forbidden() {
    let req = request("PUT", "/api/auth/profile/8")
        .header(header::AUTHORIZATION, format!("Bearer {}", token(Role::User)))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"city": "Pune"}"#))
        .unwrap();
    let (status, _) = send_json(req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_readiness_reports_unavailable_database() {
    let (status, _, _) =
        send(request("GET", "/health/ready").body(Body::empty()).unwrap()).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

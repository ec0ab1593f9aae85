//! Integration tests for registration, login and profiles.
//!
//! These tests require:
//! - A migrated and seeded `PostgreSQL` database (pn-cli migrate, pn-cli seed)
//! - The API server running (cargo run -p paradise-api)

#![allow(clippy::unwrap_used)]

use paradise_core::Role;
use paradise_integration_tests::TestClient;
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_register_then_me() {
    let mut client = TestClient::new();
    let auth = client.register_shopper().await;

    let role: Role = serde_json::from_value(auth.user["role"].clone()).unwrap();
    assert_eq!(role, Role::User);
    assert!(auth.user.get("passwordHash").is_none());

    let resp = client.get("/api/auth/me").send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let me: Value = resp.json().await.unwrap();
    assert_eq!(me["email"], auth.user["email"]);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_duplicate_registration_is_rejected() {
    let mut client = TestClient::new();
    let auth = client.register_shopper().await;

    let resp = client
        .post("/api/auth/register")
        .json(&json!({
            "name": "Someone Else",
            "email": auth.user["email"],
            "password": "another-password",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_login_with_wrong_password() {
    let mut client = TestClient::new();
    let auth = client.register_shopper().await;

    let resp = client
        .post("/api/auth/login")
        .json(&json!({ "email": auth.user["email"], "password": "wrong-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
#[ignore = "Requires running API server and database"]
async fn test_profile_update() {
    let mut client = TestClient::new();
    let auth = client.register_shopper().await;
    let id = &auth.user["id"];

    let resp = client
        .put(&format!("/api/auth/profile/{id}"))
        .json(&json!({ "city": "Pune", "pincode": "411001" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    let user = &body["user"];
    assert_eq!(user["id"], *id);
    assert_eq!(user["city"], "Pune");
    assert_eq!(user["pincode"], "411001");
    assert_eq!(user["name"], auth.user["name"]);

    let me: Value = client.get("/api/auth/me").send().await.unwrap().json().await.unwrap();
    assert_eq!(me["city"], "Pune");
}

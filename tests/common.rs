//! Common test utilities for stores-api integration tests
//!
//! This file contains shared functions for all integration tests, including
//! test application setup and helpers for creating common test objects
//! through the API.

#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use stores_api::{auth::TokenService, create_app, db::init_pool, run_migrations, state::AppState};
use tower::Service;

/// Creates a test application with an in-memory SQLite database
///
/// Each call gets its own shared-cache in-memory database, so tests are
/// isolated from each other and need no cleanup.
///
/// ### Returns
///
/// An Axum Router configured with all routes
pub fn create_test_app() -> Router {
    let database_url = format!("file:it_{}?mode=memory&cache=shared", uuid::Uuid::new_v4());
    let pool = init_pool(&database_url).unwrap();

    run_migrations(&mut pool.get().unwrap()).unwrap();

    let tokens = TokenService::new(
        b"integration-secret",
        Duration::from_secs(15 * 60),
        Duration::from_secs(30 * 24 * 3600),
    );

    create_app(AppState::new(Arc::new(pool), tokens))
}

/// Sends a request and returns the status with the parsed JSON body
///
/// A body that is empty or not JSON comes back as `Value::Null`.
pub async fn send(
    app: &mut Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().uri(uri).method(method);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.call(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, value)
}

/// Registers a user and logs in
///
/// ### Returns
///
/// The (fresh access token, refresh token) pair
pub async fn register_and_login(app: &mut Router, username: &str) -> (String, String) {
    let credentials = json!({ "username": username, "password": "hunter2" });

    let (status, _) = send(app, Method::POST, "/register", Some(credentials.clone()), None).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(app, Method::POST, "/login", Some(credentials), None).await;
    assert_eq!(status, StatusCode::OK);

    (
        body["access_token"].as_str().unwrap().to_string(),
        body["refresh_token"].as_str().unwrap().to_string(),
    )
}

/// Creates a store via the API and returns its id
pub async fn create_store(app: &mut Router, name: &str) -> i64 {
    let (status, body) = send(app, Method::POST, "/store", Some(json!({ "name": name })), None).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

/// Creates an item via the API and returns its id
///
/// `token` must be a fresh access token.
pub async fn create_item(app: &mut Router, token: &str, store_id: i64, name: &str, price: f64) -> i64 {
    let payload = json!({ "name": name, "price": price, "store_id": store_id });
    let (status, body) = send(app, Method::POST, "/item", Some(payload), Some(token)).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

/// Creates a tag in a store via the API and returns its id
pub async fn create_tag(app: &mut Router, store_id: i64, name: &str) -> i64 {
    let uri = format!("/store/{}/tag", store_id);
    let (status, body) = send(app, Method::POST, &uri, Some(json!({ "name": name })), None).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

/// Links a tag to an item via the API
pub async fn link(app: &mut Router, item_id: i64, tag_id: i64) -> (StatusCode, Value) {
    send(app, Method::POST, &format!("/item/{}/tag/{}", item_id, tag_id), None, None).await
}

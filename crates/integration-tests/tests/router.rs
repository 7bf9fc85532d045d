//! Integration tests for the HTTP surface.
//!
//! The app runs over a pool that never connects, so these tests cover
//! routing, the auth extractors and the error body without a database.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use url::Url;

use bookstore_storefront::config::{BookstoreConfig, CartPolicy, SentryConfig};
use bookstore_storefront::db::PgStore;
use bookstore_storefront::middleware::request_id::REQUEST_ID_HEADER;
use bookstore_storefront::routes;
use bookstore_storefront::state::AppState;

fn app() -> Router {
    let config = BookstoreConfig {
        database_url: SecretString::from("postgres://bookstore@127.0.0.1:1/bookstore"),
        host: "127.0.0.1".parse().unwrap(),
        port: 8080,
        base_url: Url::parse("http://localhost:8080").unwrap(),
        session_secret: SecretString::from("k7Qm2vX9pL4wR8tZ3nB6yH1cF5jD0sGa"),
        cart_policy: CartPolicy::default(),
        sentry: SentryConfig::default(),
    };
    let pool = PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(1))
        .connect_lazy("postgres://bookstore@127.0.0.1:1/bookstore")
        .unwrap();
    let state = AppState::new(config, PgStore::new(pool));
    routes::app(state, tower_sessions::MemoryStore::default())
}

fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = app()
        .oneshot(request(Method::GET, "/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
}

#[tokio::test]
async fn test_readiness_without_database() {
    let response = app()
        .oneshot(request(Method::GET, "/health/ready", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_orders_require_login() {
    let cases = [
        request(Method::GET, "/orders", None),
        request(
            Method::POST,
            "/orders",
            Some(json!({ "shippingAddress": "221B Baker Street" })),
        ),
        request(Method::GET, "/orders/1/items", None),
        request(Method::GET, "/orders/1/items/2", None),
        request(Method::PUT, "/orders/1", None),
    ];

    for req in cases {
        let uri = req.uri().clone();
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn test_cart_requires_login() {
    let response = app()
        .oneshot(request(Method::GET, "/cart", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_catalogue_writes_require_login() {
    let book = json!({
        "title": "Dune",
        "author": "Frank Herbert",
        "isbn": "978-0441013593",
        "price": "9.99",
        "description": "Desert planet epic",
        "coverImage": "https://covers.example.com/dune.jpg"
    });

    let cases = [
        request(Method::POST, "/books", Some(book.clone())),
        request(Method::PUT, "/books/1", Some(book)),
        request(Method::DELETE, "/books/1", None),
        request(Method::POST, "/categories", Some(json!({ "name": "Fiction" }))),
        request(Method::DELETE, "/categories/1", None),
    ];

    for req in cases {
        let uri = req.uri().clone();
        let response = app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
}

#[tokio::test]
async fn test_error_body_shape() {
    let response = app()
        .oneshot(request(Method::GET, "/orders", None))
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(body["status"], 401);
    assert!(body["timestamp"].is_string());
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_route() {
    let response = app()
        .oneshot(request(Method::GET, "/wishlist", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

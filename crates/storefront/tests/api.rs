//! Router tests that need no database.
//!
//! Sessions live in a `MemoryStore` and the pool connects lazily, so every
//! request here must be answered before any query would run.

#![allow(clippy::unwrap_used)]

use std::path::PathBuf;
use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use async_trait::async_trait;
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;
use tower_sessions::session::{Id, Record};
use tower_sessions::{MemoryStore, SessionStore, session_store};

use yr_shop_storefront::config::{DEFAULT_COOKIE_NAME, StorefrontConfig};
use yr_shop_storefront::middleware::create_session_layer;
use yr_shop_storefront::router;
use yr_shop_storefront::state::AppState;

fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://yr:yr@127.0.0.1:1/yr_shop_test"),
        host: std::net::IpAddr::from([127, 0, 0, 1]),
        port: 5000,
        base_url: "http://localhost:5000".to_string(),
        session_secret: SecretString::from("k3J9$vQ2!xR7@mW4#pL8^tZ1&cB6*nF0"),
        cookie_name: DEFAULT_COOKIE_NAME.to_string(),
        public_dir: PathBuf::from("does-not-exist"),
        sentry_dsn: None,
        sentry_environment: None,
    }
}

fn app() -> Router {
    app_with_store(MemoryStore::default())
}

fn app_with_store<S: SessionStore + Clone>(store: S) -> Router {
    let config = test_config();
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy("postgres://yr:yr@127.0.0.1:1/yr_shop_test")
        .unwrap();
    let session_layer = create_session_layer(store, &config);
    router(AppState::new(config, pool), session_layer)
}

/// Session store whose writes take a while to land.
#[derive(Debug, Clone, Default)]
struct SlowStore {
    inner: MemoryStore,
}

#[async_trait]
impl SessionStore for SlowStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        self.inner.create(record).await
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        tokio::time::sleep(Duration::from_millis(100)).await;
        self.inner.save(record).await
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        self.inner.load(session_id).await
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.inner.delete(session_id).await
    }
}

struct TestResponse {
    status: StatusCode,
    cookie: Option<String>,
    body: Value,
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    cookie: Option<&str>,
    body: Option<&str>,
) -> TestResponse {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    TestResponse {
        status,
        cookie,
        body,
    }
}

#[tokio::test]
async fn test_health_is_ok() {
    let app = app();
    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn test_empty_cart_for_new_visitor() {
    let app = app();
    let response = send(&app, Method::GET, "/api/cart", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "cart": [] }));
}

#[tokio::test]
async fn test_cart_survives_between_requests() {
    let app = app();

    let added = send(
        &app,
        Method::POST,
        "/api/cart/add",
        None,
        Some(r#"{"id": 3, "qty": 2}"#),
    )
    .await;
    assert_eq!(added.status, StatusCode::OK);
    assert_eq!(added.body, json!({ "ok": true, "cart": [{ "id": 3, "qty": 2 }] }));
    let cookie = added.cookie.expect("session cookie");
    assert!(cookie.starts_with(&format!("{DEFAULT_COOKIE_NAME}=")));

    let again = send(
        &app,
        Method::POST,
        "/api/cart/add",
        Some(&cookie),
        Some(r#"{"id": 3}"#),
    )
    .await;
    assert_eq!(again.body["cart"], json!([{ "id": 3, "qty": 3 }]));

    let updated = send(
        &app,
        Method::POST,
        "/api/cart/update",
        Some(&cookie),
        Some(r#"{"id": 3, "qty": 0}"#),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["cart"], json!([]));

    let shown = send(&app, Method::GET, "/api/cart", Some(&cookie), None).await;
    assert_eq!(shown.body, json!({ "cart": [] }));
}

#[tokio::test]
async fn test_cart_rejects_bad_quantity() {
    let app = app();
    let response = send(
        &app,
        Method::POST,
        "/api/cart/add",
        None,
        Some(r#"{"id": 1, "qty": 0}"#),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body,
        json!({ "error": "Quantity must be between 1 and 99" })
    );
}

#[tokio::test]
async fn test_cart_requires_product_id() {
    let app = app();
    let response = send(&app, Method::POST, "/api/cart/add", None, Some("{}")).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "error": "Missing id" }));
}

#[tokio::test]
async fn test_malformed_json_is_a_json_400() {
    let app = app();
    let response = send(
        &app,
        Method::POST,
        "/api/cart/add",
        None,
        Some(r#"{"id": "#),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].is_string());
}

#[tokio::test]
async fn test_checkout_with_empty_cart() {
    let app = app();
    let response = send(
        &app,
        Method::POST,
        "/api/checkout",
        None,
        Some(r#"{"name": "A", "phone": "1", "address": "X", "paymentMethod": "COD"}"#),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "error": "Cart is empty" }));
}

#[tokio::test]
async fn test_checkout_requires_delivery_details() {
    let app = app();
    let added = send(
        &app,
        Method::POST,
        "/api/cart/add",
        None,
        Some(r#"{"id": 1, "qty": 1}"#),
    )
    .await;
    let cookie = added.cookie.unwrap();

    let response = send(
        &app,
        Method::POST,
        "/api/checkout",
        Some(&cookie),
        Some(r#"{"name": "A", "phone": "  ", "address": "X"}"#),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "error": "Missing delivery details" }));

    let shown = send(&app, Method::GET, "/api/cart", Some(&cookie), None).await;
    assert_eq!(shown.body["cart"], json!([{ "id": 1, "qty": 1 }]));
}

#[tokio::test]
async fn test_checkout_without_body_reports_empty_cart() {
    let app = app();
    let response = send(&app, Method::POST, "/api/checkout", None, None).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "error": "Cart is empty" }));
}

#[tokio::test]
async fn test_checkout_with_malformed_body_and_empty_cart() {
    let app = app();
    let response = send(
        &app,
        Method::POST,
        "/api/checkout",
        None,
        Some(r#"{"name": "#),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "error": "Cart is empty" }));
}

#[tokio::test]
async fn test_checkout_without_body_needs_delivery_details() {
    let app = app();
    let added = send(
        &app,
        Method::POST,
        "/api/cart/add",
        None,
        Some(r#"{"id": 1, "qty": 1}"#),
    )
    .await;
    let cookie = added.cookie.unwrap();

    let response = send(&app, Method::POST, "/api/checkout", Some(&cookie), None).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "error": "Missing delivery details" }));

    let malformed = send(
        &app,
        Method::POST,
        "/api/checkout",
        Some(&cookie),
        Some(r#"{"name": "#),
    )
    .await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    assert_ne!(malformed.body, json!({ "error": "Cart is empty" }));
    assert!(malformed.body["error"].is_string());
}

#[tokio::test]
async fn test_concurrent_cart_adds_on_one_session_all_persist() {
    let app = app_with_store(SlowStore::default());
    let first = send(
        &app,
        Method::POST,
        "/api/cart/add",
        None,
        Some(r#"{"id": 1, "qty": 1}"#),
    )
    .await;
    let cookie = first.cookie.unwrap();

    let (second, third) = tokio::join!(
        send(
            &app,
            Method::POST,
            "/api/cart/add",
            Some(&cookie),
            Some(r#"{"id": 2, "qty": 1}"#),
        ),
        send(
            &app,
            Method::POST,
            "/api/cart/add",
            Some(&cookie),
            Some(r#"{"id": 3, "qty": 1}"#),
        ),
    );
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(third.status, StatusCode::OK);

    let shown = send(&app, Method::GET, "/api/cart", Some(&cookie), None).await;
    let mut ids: Vec<i64> = shown.body["cart"]
        .as_array()
        .unwrap()
        .iter()
        .map(|line| line["id"].as_i64().unwrap())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_anonymous_orders_are_empty() {
    let app = app();
    let response = send(&app, Method::GET, "/api/orders", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "orders": [] }));
}

#[tokio::test]
async fn test_anonymous_me_is_null() {
    let app = app();
    let response = send(&app, Method::GET, "/api/me", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "user": null }));
}

#[tokio::test]
async fn test_logout_without_session() {
    let app = app();
    let response = send(&app, Method::POST, "/api/logout", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "ok": true }));
}

#[tokio::test]
async fn test_login_requires_credentials() {
    let app = app();
    let response = send(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(r#"{"email": "a@b.co"}"#),
    )
    .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body, json!({ "error": "Missing email or password" }));
}

#[tokio::test]
async fn test_admin_requires_login() {
    let app = app();
    let response = send(&app, Method::GET, "/api/admin/orders", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body, json!({ "error": "Not logged in" }));
}

#[tokio::test]
async fn test_unknown_api_route_is_json_404() {
    let app = app();
    let response = send(&app, Method::GET, "/api/nope", None, None).await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body, json!({ "error": "Route not found" }));
}

#[tokio::test]
async fn test_product_page_size_is_validated() {
    let app = app();
    let response = send(&app, Method::GET, "/api/products?pageSize=0", None, None).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body,
        json!({ "error": "pageSize must be between 1 and 100" })
    );
}

#[tokio::test]
async fn test_api_responses_carry_security_headers() {
    let app = app();
    let response = app
        .clone()
        .oneshot(Request::get("/api/cart").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let headers = response.headers();
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-store");
    assert!(headers.contains_key("x-request-id"));
}

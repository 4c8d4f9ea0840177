//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness
//! GET  /health/ready           - Readiness (database)
//!
//! # Auth (rate limited: login, register)
//! POST /api/register           - Create account, log in
//! POST /api/login              - Log in
//! POST /api/logout             - Destroy session
//! GET  /api/me                 - Current profile or null
//!
//! # Catalog
//! GET  /api/products           - Search (q, page, pageSize)
//!
//! # Cart (session)
//! GET  /api/cart               - Current cart
//! POST /api/cart/add           - Add units
//! POST /api/cart/update        - Set quantity (0 removes)
//! POST /api/cart/remove        - Remove line
//!
//! # Orders
//! POST /api/checkout           - Place order from cart
//! GET  /api/orders             - Own order history
//!
//! # Admin (requires is_admin)
//! GET  /api/admin/users        - All accounts
//! GET  /api/admin/orders       - All orders with account email/name
//! ```
//!
//! Anything else is served from the public directory.

pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod health;
pub mod orders;
pub mod products;

use axum::{
    Router,
    middleware::map_response,
    routing::{get, post},
};

use crate::error::AppError;
use crate::middleware::{auth_rate_limiter, json_rate_limit_response};
use crate::state::AppState;

/// Create the rate-limited credential routes.
pub fn credential_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .layer(auth_rate_limiter())
        .layer(map_response(json_rate_limit_response))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::users))
        .route("/orders", get(admin::orders))
}

/// Create all JSON API routes, to be nested under `/api`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(credential_routes())
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route("/products", get(products::index))
        .nest("/cart", cart_routes())
        .route("/checkout", post(checkout::checkout))
        .route("/orders", get(orders::index))
        .nest("/admin", admin_routes())
        .fallback(api_not_found)
}

/// Create the health check routes.
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
}

async fn api_not_found() -> AppError {
    AppError::NotFound("Route".to_string())
}

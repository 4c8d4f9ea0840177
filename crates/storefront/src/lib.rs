//! YR Shop storefront library.
//!
//! A session-authenticated JSON API (accounts, catalog, session cart,
//! checkout) plus a static client served from a public directory.
//!
//! The binary in `main.rs` wires configuration, tracing and Sentry around
//! [`router`]; tests drive [`router`] directly with an in-memory session store.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{
    Router,
    extract::Request,
    middleware::{from_fn, from_fn_with_state},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tower_sessions::{SessionManagerLayer, SessionStore, service::SignedCookie};

use state::AppState;

/// Build the complete application router.
///
/// Layers, outermost first: trace span, request id, CORS, security headers,
/// session lock, session. The session lock sits outside the session layer so
/// it also covers the end-of-request session save.
pub fn router<S>(state: AppState, session_layer: SessionManagerLayer<S, SignedCookie>) -> Router
where
    S: SessionStore + Clone,
{
    let static_files = ServeDir::new(&state.config().public_dir);

    Router::new()
        .nest("/api", routes::api_routes())
        .merge(routes::health_routes())
        .fallback_service(static_files)
        .layer(session_layer)
        .layer(from_fn_with_state(
            state.clone(),
            middleware::session_lock_middleware,
        ))
        .layer(from_fn(middleware::security_headers_middleware))
        .layer(CorsLayer::very_permissive())
        .layer(from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}

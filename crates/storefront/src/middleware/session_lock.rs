//! Per-session request serialization.
//!
//! Wraps the session layer so that for state-changing requests the lock is
//! held until tower-sessions has written the record back. Requests without
//! a session cookie start a fresh session and are never locked.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method, header},
    middleware::Next,
    response::Response,
};
use tower_sessions::cookie::Cookie;

use crate::state::AppState;

/// Raw value of the named cookie, if the request carries one.
fn session_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_owned())
        .filter(|value| !value.is_empty())
}

/// Whether a request may write the session.
fn writes_session(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Run state-changing requests for one session one at a time.
pub async fn session_lock_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let key = if writes_session(request.method()) {
        session_cookie(request.headers(), &state.config().cookie_name)
    } else {
        None
    };

    let _guard = state.session_locks().acquire_optional(key.as_deref()).await;
    next.run(request).await
}

//! Authentication route handlers.
//!
//! Registration, login, logout and the current profile. Identity lives in the
//! session; the cart rides along in the same record.

use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_sessions::Session;
use tracing::instrument;

use yr_shop_core::{Cart, Email, UserId};

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{OptionalAuth, end_session, set_current_user};
use crate::models::{CurrentUser, User};
use crate::services::auth::{AuthError, AuthService, Registration};
use crate::services::cart::{CartSession, SessionError};
use crate::state::AppState;

// =============================================================================
// Request Types
// =============================================================================

/// Body of `POST /api/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub pass: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Body of `POST /api/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub pass: Option<String>,
}

/// Account summary returned after register and login.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    pub email: Email,
    pub name: Option<String>,
}

/// Email and password, both present and non-empty.
fn credentials<'r>(email: Option<&'r str>, pass: Option<&'r str>) -> Result<(&'r str, &'r str)> {
    match (email.map(str::trim), pass) {
        (Some(email), Some(pass)) if !email.is_empty() && !pass.is_empty() => Ok((email, pass)),
        _ => Err(AuthError::MissingCredentials.into()),
    }
}

async fn start_user_session(session: &Session, user: &User) -> Result<()> {
    set_current_user(
        session,
        &CurrentUser {
            id: user.id,
            email: user.email.clone(),
        },
    )
    .await
    .map_err(SessionError::from)?;

    set_sentry_user(&user.id, Some(user.email.as_str()));
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

/// Create an account and log it in with an empty cart.
///
/// # Route
///
/// `POST /api/register`
#[instrument(skip(state, session, body))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    body: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>)> {
    let Json(body) = body?;
    let (email, password) = credentials(body.email.as_deref(), body.pass.as_deref())?;

    let user = AuthService::new(state.pool())
        .register(Registration {
            email,
            password,
            name: body.name.as_deref(),
            phone: body.phone.as_deref(),
            address: body.address.as_deref(),
        })
        .await?;

    start_user_session(&session, &user).await?;
    session.store_cart(&Cart::new()).await?;

    tracing::info!(user_id = %user.id, uid = %user.uid, "Account registered");

    let summary = UserSummary {
        id: Some(user.id),
        email: user.email,
        name: user.name,
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({ "ok": true, "user": summary })),
    ))
}

/// Log in with email and password. The existing session cart is kept.
///
/// # Route
///
/// `POST /api/login`
#[instrument(skip(state, session, body))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    body: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<Value>> {
    let Json(body) = body?;
    let (email, password) = credentials(body.email.as_deref(), body.pass.as_deref())?;

    let user = AuthService::new(state.pool())
        .login(email, password)
        .await
        .inspect_err(|e| {
            if matches!(e, AuthError::InvalidCredentials) {
                tracing::info!("Login failed: invalid credentials");
            }
        })?;

    start_user_session(&session, &user).await?;

    tracing::info!(user_id = %user.id, "User logged in");

    let summary = UserSummary {
        id: None,
        email: user.email,
        name: user.name,
    };

    Ok(Json(json!({ "ok": true, "user": summary })))
}

/// Destroy the session.
///
/// # Route
///
/// `POST /api/logout`
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<Value>> {
    end_session(&session).await.map_err(SessionError::from)?;
    clear_sentry_user();

    Ok(Json(json!({ "ok": true })))
}

/// Current user's profile, or `null` when nobody is logged in.
///
/// # Route
///
/// `GET /api/me`
#[instrument(skip(state, user))]
pub async fn me(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> Result<Json<Value>> {
    let Some(current) = user else {
        return Ok(Json(json!({ "user": null })));
    };

    let profile = AuthService::new(state.pool())
        .get_user(current.id)
        .await
        .map_err(AppError::from)?;

    Ok(Json(json!({ "user": profile })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_require_both_fields() {
        assert!(credentials(Some(" a@b.co "), Some("pw")).is_ok());
        assert!(credentials(Some("a@b.co"), None).is_err());
        assert!(credentials(Some("   "), Some("pw")).is_err());
        assert!(credentials(Some("a@b.co"), Some("")).is_err());
        assert!(credentials(None, None).is_err());
    }
}

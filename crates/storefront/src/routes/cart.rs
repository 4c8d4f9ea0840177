//! Cart route handlers.
//!
//! The cart lives in the session as `[{"id", "qty"}]`. Every mutation
//! responds with the updated cart.

use axum::{Json, extract::rejection::JsonRejection};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use yr_shop_core::Cart;

use crate::error::{AppError, Result};
use crate::services::cart::CartService;

/// Body of `POST /api/cart/add`.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub id: Option<i64>,
    pub qty: Option<i64>,
}

/// Body of `POST /api/cart/update`.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub id: Option<i64>,
    pub qty: Option<i64>,
}

/// Body of `POST /api/cart/remove`.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub id: Option<i64>,
}

/// `{"cart": [...]}`
#[derive(Debug, Serialize)]
pub struct CartResponse {
    pub cart: Cart,
}

/// `{"ok": true, "cart": [...]}`
#[derive(Debug, Serialize)]
pub struct CartUpdatedResponse {
    pub ok: bool,
    pub cart: Cart,
}

impl From<Cart> for CartUpdatedResponse {
    fn from(cart: Cart) -> Self {
        Self { ok: true, cart }
    }
}

fn required(value: Option<i64>, field: &str) -> Result<i64> {
    value.ok_or_else(|| AppError::BadRequest(format!("Missing {field}")))
}

/// Show the session cart.
///
/// # Route
///
/// `GET /api/cart`
#[instrument(skip(session))]
pub async fn show(session: Session) -> Result<Json<CartResponse>> {
    let cart = CartService::new(&session).get().await?;
    Ok(Json(CartResponse { cart }))
}

/// Add units of a product (default 1).
///
/// # Route
///
/// `POST /api/cart/add`
#[instrument(skip(session, body))]
pub async fn add(
    session: Session,
    body: std::result::Result<Json<AddToCartRequest>, JsonRejection>,
) -> Result<Json<CartUpdatedResponse>> {
    let Json(body) = body?;
    let id = required(body.id, "id")?;

    let cart = CartService::new(&session).add(id, body.qty).await?;

    Ok(Json(cart.into()))
}

/// Set a line's quantity; 0 removes it.
///
/// # Route
///
/// `POST /api/cart/update`
#[instrument(skip(session, body))]
pub async fn update(
    session: Session,
    body: std::result::Result<Json<UpdateCartRequest>, JsonRejection>,
) -> Result<Json<CartUpdatedResponse>> {
    let Json(body) = body?;
    let id = required(body.id, "id")?;
    let qty = required(body.qty, "qty")?;

    let cart = CartService::new(&session).update(id, qty).await?;

    Ok(Json(cart.into()))
}

/// Remove a product's line.
///
/// # Route
///
/// `POST /api/cart/remove`
#[instrument(skip(session, body))]
pub async fn remove(
    session: Session,
    body: std::result::Result<Json<RemoveFromCartRequest>, JsonRejection>,
) -> Result<Json<CartUpdatedResponse>> {
    let Json(body) = body?;
    let id = required(body.id, "id")?;

    let cart = CartService::new(&session).remove(id).await?;

    Ok(Json(cart.into()))
}

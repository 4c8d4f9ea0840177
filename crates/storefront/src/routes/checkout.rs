//! Checkout route handler.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use yr_shop_core::OrderNumber;

use crate::db::{OrderRepository, ProductRepository};
use crate::error::Result;
use crate::services::cart::CartSession;
use crate::services::checkout::{CheckoutError, CheckoutRequest, CheckoutService};
use crate::state::AppState;

/// `{"ok": true, "orderId": "ORD-..."}`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub ok: bool,
    pub order_id: OrderNumber,
}

/// Place an order for the session cart.
///
/// A request without a JSON body counts as one with no delivery details, so
/// an empty cart is reported before anything about the body.
///
/// # Route
///
/// `POST /api/checkout`
#[instrument(skip(state, session, body))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    body: std::result::Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CheckoutResponse>)> {
    let request = match body {
        Ok(Json(request)) => request,
        Err(JsonRejection::MissingJsonContentType(_)) => CheckoutRequest::default(),
        Err(rejection) => {
            if session.load_cart().await?.is_empty() {
                return Err(CheckoutError::EmptyCart.into());
            }
            return Err(rejection.into());
        }
    };

    let catalog = ProductRepository::new(state.pool());
    let orders = OrderRepository::new(state.pool());

    let placed = CheckoutService::new(&catalog, &orders)
        .checkout(&session, &request)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            ok: true,
            order_id: placed.order_number,
        }),
    ))
}

//! Order history route handler.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use yr_shop_core::{OrderId, OrderLine, OrderNumber, OrderStatus};

use crate::db::OrderRepository;
use crate::error::Result;
use crate::middleware::OptionalAuth;
use crate::models::Order;
use crate::state::AppState;

/// One entry of the customer's order history.
#[derive(Debug, Serialize)]
pub struct OrderSummary {
    pub id: OrderId,
    pub order_id: OrderNumber,
    pub items: Vec<OrderLine>,
    pub total: Decimal,
    pub status: OrderStatus,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl From<Order> for OrderSummary {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            order_id: order.order_id,
            items: order.items,
            total: order.total,
            status: order.status,
            created_at: order.placed_at,
        }
    }
}

/// `{"orders": [...]}`
#[derive(Debug, Serialize)]
pub struct OrdersResponse {
    pub orders: Vec<OrderSummary>,
}

/// The logged-in user's orders, newest first. Anonymous visitors get an
/// empty list.
///
/// # Route
///
/// `GET /api/orders`
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> Result<Json<OrdersResponse>> {
    let Some(user) = user else {
        return Ok(Json(OrdersResponse { orders: Vec::new() }));
    };

    let orders = OrderRepository::new(state.pool())
        .list_by_user(user.id)
        .await?
        .into_iter()
        .map(OrderSummary::from)
        .collect();

    Ok(Json(OrdersResponse { orders }))
}

//! Admin route handlers. Every handler takes [`RequireAdmin`].

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use crate::db::{OrderRepository, UserRepository};
use crate::error::Result;
use crate::middleware::RequireAdmin;
use crate::models::{AdminOrder, User};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<User>,
}

#[derive(Debug, Serialize)]
pub struct AdminOrdersResponse {
    pub orders: Vec<AdminOrder>,
}

/// All accounts, newest first.
///
/// # Route
///
/// `GET /api/admin/users`
#[instrument(skip_all)]
pub async fn users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<UsersResponse>> {
    let users = UserRepository::new(state.pool()).list_all().await?;
    Ok(Json(UsersResponse { users }))
}

/// All orders with the placing account's email and name, newest first.
///
/// # Route
///
/// `GET /api/admin/orders`
#[instrument(skip_all)]
pub async fn orders(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<AdminOrdersResponse>> {
    let orders = OrderRepository::new(state.pool()).list_all().await?;
    Ok(Json(AdminOrdersResponse { orders }))
}

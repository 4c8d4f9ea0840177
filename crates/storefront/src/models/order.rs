//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use yr_shop_core::{DeliveryDetails, Email, OrderId, OrderLine, OrderNumber, OrderStatus, UserId};

/// A placed order as stored in `storefront.orders`.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    #[sqlx(try_from = "String")]
    pub order_id: OrderNumber,
    pub user_id: Option<UserId>,
    #[sqlx(json)]
    pub items: Vec<OrderLine>,
    pub total: Decimal,
    pub payment_method: String,
    pub delivery_name: String,
    pub delivery_phone: String,
    pub delivery_address: String,
    pub status: OrderStatus,
    pub placed_at: DateTime<Utc>,
}

/// An order joined with the email and name of the account that placed it.
///
/// Guest orders have neither.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AdminOrder {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub order: Order,
    pub email: Option<Email>,
    pub name: Option<String>,
}

/// A priced order ready to be written.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_number: OrderNumber,
    pub user_id: Option<UserId>,
    pub lines: Vec<OrderLine>,
    pub total: Decimal,
    pub delivery: DeliveryDetails,
    pub placed_at: DateTime<Utc>,
}

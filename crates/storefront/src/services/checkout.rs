//! Checkout: turn the session cart into a persisted order.
//!
//! The sequence is read cart, validate, price from the catalog, insert one
//! order row, then clear the cart and flush the session. Nothing is written
//! unless every check passes, and the cart is only cleared after the order
//! row exists. The caller holds the session lock for the whole request.

use std::collections::HashMap;
use std::future::Future;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use yr_shop_core::{
    Cart, DeliveryDetails, DeliveryError, OrderNumber, PricingError, Product, ProductId,
    price_cart,
};

use super::cart::{CartSession, SessionError};
use super::random_base36;
use crate::db::RepositoryError;
use crate::models::order::{NewOrder, Order};

/// Number of random base36 characters at the end of an order number.
const ORDER_SUFFIX_LENGTH: usize = 4;

/// Bulk product lookup used to price a cart.
pub trait ProductCatalog: Send + Sync {
    /// Fetch products by id in one consistent read. Unknown ids are absent
    /// from the result.
    fn fetch_by_ids(
        &self,
        ids: &[ProductId],
    ) -> impl Future<Output = Result<HashMap<ProductId, Product>, RepositoryError>> + Send;
}

/// Durable order storage.
pub trait OrderStore: Send + Sync {
    /// Write an order atomically.
    fn insert(&self, order: &NewOrder) -> impl Future<Output = Result<Order, RepositoryError>> + Send;
}

/// Delivery fields posted to `/api/checkout`.
///
/// Anything else in the body (client-side prices or totals) is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub payment_method: Option<String>,
}

impl CheckoutRequest {
    fn delivery_details(&self) -> Result<DeliveryDetails, DeliveryError> {
        DeliveryDetails::new(
            self.name.as_deref(),
            self.phone.as_deref(),
            self.address.as_deref(),
            self.payment_method.as_deref(),
        )
    }
}

/// A successfully placed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order_number: OrderNumber,
    pub total: Decimal,
}

/// Reasons a checkout fails. None of them leave an order behind.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Cart is empty")]
    EmptyCart,

    #[error("Missing delivery details")]
    MissingDeliveryInfo(DeliveryError),

    /// Cart references products the catalog no longer has.
    #[error("products no longer available: {0:?}")]
    ProductNotFound(Vec<ProductId>),

    #[error("session error: {0}")]
    Session(#[from] SessionError),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),
}

/// Checkout orchestrator.
pub struct CheckoutService<'a, C, O> {
    catalog: &'a C,
    orders: &'a O,
}

impl<'a, C: ProductCatalog, O: OrderStore> CheckoutService<'a, C, O> {
    #[must_use]
    pub const fn new(catalog: &'a C, orders: &'a O) -> Self {
        Self { catalog, orders }
    }

    /// Place an order for the session's cart.
    ///
    /// Totals come only from catalog prices at the time of the call.
    ///
    /// # Errors
    ///
    /// - `CheckoutError::EmptyCart` if the cart has no lines
    /// - `CheckoutError::MissingDeliveryInfo` if name, phone or address is blank
    /// - `CheckoutError::ProductNotFound` if any cart product has vanished
    /// - `CheckoutError::Storage` / `Session` if the lookup or order insert fails;
    ///   the cart is left as it was
    pub async fn checkout<S: CartSession>(
        &self,
        session: &S,
        request: &CheckoutRequest,
    ) -> Result<PlacedOrder, CheckoutError> {
        let session_key = session.session_key();

        let cart = session.load_cart().await?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let delivery = request
            .delivery_details()
            .map_err(CheckoutError::MissingDeliveryInfo)?;

        let user = session.current_user().await?;

        let catalog = self.catalog.fetch_by_ids(&cart.product_ids()).await?;
        let priced = price_cart(&cart, &catalog).map_err(|e| match e {
            PricingError::EmptyCart => CheckoutError::EmptyCart,
            PricingError::MissingProducts(ids) => {
                tracing::warn!(
                    session = ?session_key,
                    user_id = ?user.as_ref().map(|u| u.id),
                    cart = ?cart,
                    missing = ?ids,
                    "Checkout refused, products no longer available"
                );
                CheckoutError::ProductNotFound(ids)
            }
        })?;

        let placed_at = Utc::now();
        let new_order = NewOrder {
            order_number: OrderNumber::generate(placed_at, &random_base36(ORDER_SUFFIX_LENGTH)),
            user_id: user.as_ref().map(|u| u.id),
            lines: priced.lines,
            total: priced.total,
            delivery,
            placed_at,
        };

        let order = self.orders.insert(&new_order).await.inspect_err(|e| {
            tracing::error!(
                session = ?session_key,
                user_id = ?new_order.user_id,
                cart = ?cart,
                error = %e,
                "Order insert failed, cart kept"
            );
        })?;

        tracing::info!(
            order_id = %order.order_id,
            user_id = ?order.user_id,
            total = %order.total,
            "Order placed"
        );

        // The order exists from here on; a failed clear must not turn it into an error.
        if let Err(e) = clear_cart(session).await {
            tracing::error!(
                order_id = %order.order_id,
                session = ?session_key,
                error = %e,
                "Order placed but session cart could not be cleared"
            );
        }

        Ok(PlacedOrder {
            order_number: order.order_id,
            total: order.total,
        })
    }
}

async fn clear_cart<S: CartSession>(session: &S) -> Result<(), SessionError> {
    session.store_cart(&Cart::new()).await?;
    session.flush().await
}

//! Order pricing and delivery details.
//!
//! [`price_cart`] turns a session [`Cart`] into priced [`OrderLine`]s using a
//! catalog snapshot. It is the only place order totals are computed.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cart::Cart;
use super::id::ProductId;
use super::price::Price;
use super::product::Product;

/// Externally visible order identifier, e.g. `ORD-1767225600000-k3x9`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Prefix shared by every order number.
    pub const PREFIX: &'static str = "ORD-";

    /// Build an order number from the placement time and a random suffix.
    ///
    /// The millisecond timestamp keeps numbers roughly sortable by time; the
    /// suffix separates orders placed in the same millisecond.
    #[must_use]
    pub fn generate(placed_at: DateTime<Utc>, suffix: &str) -> Self {
        Self(format!(
            "{}{}-{suffix}",
            Self::PREFIX,
            placed_at.timestamp_millis()
        ))
    }

    /// Wrap a stored order number.
    #[must_use]
    pub const fn new(value: String) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for OrderNumber {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One priced line of an order.
///
/// Serialized as `{"id", "name", "price", "qty", "subtotal"}`, the shape
/// stored in the order's `items` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(rename = "id")]
    pub product_id: ProductId,
    pub name: String,
    pub price: Price,
    pub qty: u32,
    pub subtotal: Decimal,
}

/// Result of pricing a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedCart {
    pub lines: Vec<OrderLine>,
    pub total: Decimal,
}

/// Errors from [`price_cart`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    #[error("cart is empty")]
    EmptyCart,

    /// Products referenced by the cart that the catalog no longer has.
    #[error("products not found: {0:?}")]
    MissingProducts(Vec<ProductId>),
}

/// Price every cart line against a catalog snapshot.
///
/// All-or-nothing: if any product is missing from `catalog` no lines are
/// returned.
///
/// # Errors
///
/// Returns `PricingError::EmptyCart` for an empty cart and
/// `PricingError::MissingProducts` listing every product absent from `catalog`.
pub fn price_cart<S: std::hash::BuildHasher>(
    cart: &Cart,
    catalog: &HashMap<ProductId, Product, S>,
) -> Result<PricedCart, PricingError> {
    if cart.is_empty() {
        return Err(PricingError::EmptyCart);
    }

    let missing: Vec<ProductId> = cart
        .product_ids()
        .into_iter()
        .filter(|id| !catalog.contains_key(id))
        .collect();
    if !missing.is_empty() {
        return Err(PricingError::MissingProducts(missing));
    }

    let lines: Vec<OrderLine> = cart
        .lines()
        .iter()
        .filter_map(|line| {
            catalog.get(&line.product_id).map(|product| OrderLine {
                product_id: product.id,
                name: product.name.clone(),
                price: product.price,
                qty: line.qty,
                subtotal: product.price.times(line.qty),
            })
        })
        .collect();

    let total = lines.iter().map(|line| line.subtotal).sum();

    Ok(PricedCart { lines, total })
}

/// Payment method chosen at checkout. Defaults to cash on delivery (`cod`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaymentMethod(String);

impl PaymentMethod {
    /// Longest accepted payment method code.
    pub const MAX_LENGTH: usize = 32;

    /// Cash on delivery.
    #[must_use]
    pub fn cash_on_delivery() -> Self {
        Self("cod".to_owned())
    }

    /// Normalize a client-supplied payment method code.
    ///
    /// Blank or absent input falls back to cash on delivery.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError::InvalidPaymentMethod` if the code is too long
    /// or contains characters other than ASCII letters, digits, `-` and `_`.
    pub fn parse(raw: Option<&str>) -> Result<Self, DeliveryError> {
        let code = raw.map(str::trim).unwrap_or_default();
        if code.is_empty() {
            return Ok(Self::cash_on_delivery());
        }

        let valid = code.len() <= Self::MAX_LENGTH
            && code
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(DeliveryError::InvalidPaymentMethod);
        }

        Ok(Self(code.to_ascii_lowercase()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        Self::cash_on_delivery()
    }
}

/// Errors validating delivery details.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// A required delivery field is absent or blank.
    #[error("missing delivery field: {0}")]
    MissingField(&'static str),

    #[error("invalid payment method")]
    InvalidPaymentMethod,
}

/// Validated delivery details for an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryDetails {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub payment_method: PaymentMethod,
}

impl DeliveryDetails {
    /// Validate raw delivery fields.
    ///
    /// `name`, `phone` and `address` are trimmed and must be non-empty.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError::MissingField` naming the first blank field, or
    /// `DeliveryError::InvalidPaymentMethod`.
    pub fn new(
        name: Option<&str>,
        phone: Option<&str>,
        address: Option<&str>,
        payment_method: Option<&str>,
    ) -> Result<Self, DeliveryError> {
        Ok(Self {
            name: required(name, "name")?,
            phone: required(phone, "phone")?,
            address: required(address, "address")?,
            payment_method: PaymentMethod::parse(payment_method)?,
        })
    }
}

fn required(value: Option<&str>, field: &'static str) -> Result<String, DeliveryError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .ok_or(DeliveryError::MissingField(field))
}

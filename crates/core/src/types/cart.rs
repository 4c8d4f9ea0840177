//! Session cart.
//!
//! A [`Cart`] is an ordered list of `(product, quantity)` pairs kept in the
//! visitor's session. It never carries prices: those are looked up from the
//! catalog at checkout.
//!
//! Invariants maintained by every mutating method:
//! - at most one line per product
//! - every line has `1..=MAX_LINE_QUANTITY` units
//! - insertion order is preserved

use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// Largest quantity a single cart line may hold.
pub const MAX_LINE_QUANTITY: u32 = 99;

/// Errors raised by cart mutations. The cart is left unchanged on error.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    /// The product id is not a positive 32-bit integer.
    #[error("invalid product id: {0}")]
    InvalidProduct(i64),

    /// The requested quantity is outside the accepted range.
    #[error("quantity must be between {min} and {max} (got {qty})")]
    InvalidQuantity {
        /// Quantity sent by the client.
        qty: i64,
        /// Smallest accepted value.
        min: u32,
        /// Largest accepted value.
        max: u32,
    },

    /// Adding would push the line past `MAX_LINE_QUANTITY`.
    #[error("cart line for product {product_id} cannot exceed {max} units")]
    LineLimit {
        /// Product whose line is full.
        product_id: ProductId,
        /// Largest accepted line quantity.
        max: u32,
    },
}

/// One product in the cart.
///
/// Serialized as `{"id": 3, "qty": 2}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(rename = "id")]
    pub product_id: ProductId,
    pub qty: u32,
}

/// The visitor's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.qty).sum()
    }

    /// Distinct product ids, in cart order.
    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        let mut ids: Vec<ProductId> = Vec::with_capacity(self.lines.len());
        for line in &self.lines {
            if !ids.contains(&line.product_id) {
                ids.push(line.product_id);
            }
        }
        ids
    }

    /// Add `qty` units of a product.
    ///
    /// Increments the existing line for `product_id` or appends a new one.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` if `qty` is zero or above
    /// `MAX_LINE_QUANTITY`, and `CartError::LineLimit` if the line would
    /// exceed `MAX_LINE_QUANTITY`.
    pub fn add(&mut self, product_id: ProductId, qty: u32) -> Result<(), CartError> {
        check_quantity(i64::from(qty), 1)?;

        if let Some(line) = self.line_mut(product_id) {
            let total = line.qty + qty;
            if total > MAX_LINE_QUANTITY {
                return Err(CartError::LineLimit {
                    product_id,
                    max: MAX_LINE_QUANTITY,
                });
            }
            line.qty = total;
        } else {
            self.lines.push(CartLine { product_id, qty });
        }

        Ok(())
    }

    /// Set the quantity of an existing line. Zero removes the line.
    ///
    /// Unknown products are ignored.
    ///
    /// # Errors
    ///
    /// Returns `CartError::InvalidQuantity` if `qty` exceeds `MAX_LINE_QUANTITY`.
    pub fn set_quantity(&mut self, product_id: ProductId, qty: u32) -> Result<(), CartError> {
        check_quantity(i64::from(qty), 0)?;

        if qty == 0 {
            self.remove(product_id);
        } else if let Some(line) = self.line_mut(product_id) {
            line.qty = qty;
        }

        Ok(())
    }

    /// Remove the line for a product. Returns whether a line was removed.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| line.product_id != product_id);
        self.lines.len() != before
    }

    /// Drop every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| line.product_id == product_id)
    }
}

/// Validate an untrusted product id from a request body.
///
/// # Errors
///
/// Returns `CartError::InvalidProduct` unless `raw` is a positive `i32`.
pub fn product_id_from_client(raw: i64) -> Result<ProductId, CartError> {
    ProductId::from_client(raw).ok_or(CartError::InvalidProduct(raw))
}

/// Validate an untrusted quantity from a request body.
///
/// # Errors
///
/// Returns `CartError::InvalidQuantity` unless `min <= raw <= MAX_LINE_QUANTITY`.
pub fn quantity_from_client(raw: i64, min: u32) -> Result<u32, CartError> {
    check_quantity(raw, min)
}

fn check_quantity(raw: i64, min: u32) -> Result<u32, CartError> {
    u32::try_from(raw)
        .ok()
        .filter(|qty| (min..=MAX_LINE_QUANTITY).contains(qty))
        .ok_or(CartError::InvalidQuantity {
            qty: raw,
            min,
            max: MAX_LINE_QUANTITY,
        })
}

//! Core types for YR Shop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod email;
pub mod id;
pub mod order;
pub mod price;
pub mod product;
pub mod status;

pub use cart::{
    Cart, CartError, CartLine, MAX_LINE_QUANTITY, product_id_from_client, quantity_from_client,
};
pub use email::{Email, EmailError};
pub use id::*;
pub use order::{
    DeliveryDetails, DeliveryError, OrderLine, OrderNumber, PaymentMethod, PricedCart,
    PricingError, price_cart,
};
pub use price::{Price, PriceError};
pub use product::Product;
pub use status::OrderStatus;

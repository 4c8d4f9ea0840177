//! Catalog product.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A catalog product, the source of truth for names and prices.
///
/// The JSON shape (`img` rather than `image`) is what the storefront client
/// renders directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub description: Option<String>,
    #[serde(rename = "img")]
    #[cfg_attr(feature = "postgres", sqlx(rename = "img"))]
    pub image: Option<String>,
}

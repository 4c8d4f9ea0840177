//! Product catalog route handlers.

use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use yr_shop_core::Product;

use crate::db::ProductRepository;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Default number of products per page.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

/// Largest accepted page size.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Query string of `GET /api/products`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    pub q: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl ProductQuery {
    /// Validated `(page, page_size)`.
    fn paging(&self) -> Result<(u32, u32)> {
        let page = self.page.unwrap_or(1);
        let page_size = self.page_size.unwrap_or(DEFAULT_PAGE_SIZE);

        if page == 0 {
            return Err(AppError::BadRequest("page must be at least 1".to_string()));
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(AppError::BadRequest(format!(
                "pageSize must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }

        Ok((page, page_size))
    }
}

/// A page of search results.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductListResponse {
    pub products: Vec<Product>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
}

/// Search the catalog.
///
/// # Route
///
/// `GET /api/products?q=&page=1&pageSize=12`
#[instrument(skip(state, query))]
pub async fn index(
    State(state): State<AppState>,
    query: std::result::Result<Query<ProductQuery>, QueryRejection>,
) -> Result<Json<ProductListResponse>> {
    let Query(query) = query?;
    let (page, page_size) = query.paging()?;

    let result = ProductRepository::new(state.pool())
        .search(query.q.as_deref().unwrap_or_default(), page, page_size)
        .await?;

    Ok(Json(ProductListResponse {
        products: result.products,
        total: result.total,
        page,
        page_size,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_paging_defaults() {
        assert_eq!(ProductQuery::default().paging().unwrap(), (1, 12));
    }

    #[test]
    fn test_paging_bounds() {
        let query = ProductQuery {
            page: Some(0),
            ..ProductQuery::default()
        };
        assert!(query.paging().is_err());

        let query = ProductQuery {
            page_size: Some(101),
            ..ProductQuery::default()
        };
        assert!(query.paging().is_err());

        let query = ProductQuery {
            page: Some(3),
            page_size: Some(100),
            ..ProductQuery::default()
        };
        assert_eq!(query.paging().unwrap(), (3, 100));
    }
}

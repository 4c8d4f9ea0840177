//! Product repository for database operations.

use std::collections::HashMap;

use sqlx::PgPool;

use yr_shop_core::{Price, Product, ProductId};

use super::RepositoryError;
use crate::services::checkout::ProductCatalog;

/// A page of catalog search results.
#[derive(Debug, Clone)]
pub struct ProductPage {
    pub products: Vec<Product>,
    /// Number of products matching the query across all pages.
    pub total: i64,
}

/// Fields for inserting a catalog product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: Price,
    pub description: Option<String>,
    pub image: Option<String>,
}

/// Repository for catalog database operations.
#[derive(Clone, Copy)]
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Search the catalog by case-insensitive substring over name and description.
    ///
    /// A blank query matches every product. Results are ordered by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search(
        &self,
        query: &str,
        page: u32,
        page_size: u32,
    ) -> Result<ProductPage, RepositoryError> {
        let query = query.trim();
        let pattern = (!query.is_empty()).then(|| format!("%{}%", escape_like(query)));
        let offset = i64::from(page.saturating_sub(1)) * i64::from(page_size);

        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT id, name, price, description, img
            FROM storefront.products
            WHERE $1::text IS NULL OR name ILIKE $1 OR description ILIKE $1
            ORDER BY id
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(pattern.as_deref())
        .bind(i64::from(page_size))
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(
            r"
            SELECT COUNT(*)
            FROM storefront.products
            WHERE $1::text IS NULL OR name ILIKE $1 OR description ILIKE $1
            ",
        )
        .bind(pattern.as_deref())
        .fetch_one(self.pool)
        .await?;

        Ok(ProductPage { products, total })
    }

    /// Fetch the given products in one query.
    ///
    /// Ids with no matching row are absent from the map.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_many(
        &self,
        ids: &[ProductId],
    ) -> Result<HashMap<ProductId, Product>, RepositoryError> {
        let products = sqlx::query_as::<_, Product>(
            r"
            SELECT id, name, price, description, img
            FROM storefront.products
            WHERE id = ANY($1)
            ",
        )
        .bind(ids)
        .fetch_all(self.pool)
        .await?;

        Ok(products.into_iter().map(|p| (p.id, p)).collect())
    }

    /// Insert a catalog product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        sqlx::query_as::<_, Product>(
            r"
            INSERT INTO storefront.products (name, price, description, img)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, price, description, img
            ",
        )
        .bind(&product.name)
        .bind(product.price)
        .bind(product.description.as_deref())
        .bind(product.image.as_deref())
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "product"))
    }
}

impl ProductCatalog for ProductRepository<'_> {
    async fn fetch_by_ids(
        &self,
        ids: &[ProductId],
    ) -> Result<HashMap<ProductId, Product>, RepositoryError> {
        self.get_many(ids).await
    }
}

/// Escape `ILIKE` wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("mug"), "mug");
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }
}

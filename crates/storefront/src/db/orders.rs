//! Order repository for database operations.

use sqlx::PgPool;
use sqlx::types::Json;

use yr_shop_core::{OrderStatus, UserId};

use super::RepositoryError;
use crate::models::order::{AdminOrder, NewOrder, Order};
use crate::services::checkout::OrderStore;

/// Repository for order database operations.
#[derive(Clone, Copy)]
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Write a placed order as a single row.
    ///
    /// Line items go into the `items` JSONB column of the same insert, so an
    /// order is either fully visible or absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order number already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        sqlx::query_as::<_, Order>(
            r"
            INSERT INTO storefront.orders
                (order_id, user_id, items, total, payment_method,
                 delivery_name, delivery_phone, delivery_address, status, placed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, order_id, user_id, items, total, payment_method,
                      delivery_name, delivery_phone, delivery_address, status, placed_at
            ",
        )
        .bind(order.order_number.as_str())
        .bind(order.user_id)
        .bind(Json(&order.lines))
        .bind(order.total)
        .bind(order.delivery.payment_method.as_str())
        .bind(&order.delivery.name)
        .bind(&order.delivery.phone)
        .bind(&order.delivery.address)
        .bind(OrderStatus::Placed)
        .bind(order.placed_at)
        .fetch_one(self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "order"))
    }

    /// List a user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as::<_, Order>(
            r"
            SELECT id, order_id, user_id, items, total, payment_method,
                   delivery_name, delivery_phone, delivery_address, status, placed_at
            FROM storefront.orders
            WHERE user_id = $1
            ORDER BY placed_at DESC
            ",
        )
        .bind(user_id)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// List every order with the placing account's email and name, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<AdminOrder>, RepositoryError> {
        let orders = sqlx::query_as::<_, AdminOrder>(
            r"
            SELECT o.id, o.order_id, o.user_id, o.items, o.total, o.payment_method,
                   o.delivery_name, o.delivery_phone, o.delivery_address, o.status,
                   o.placed_at, u.email, u.name
            FROM storefront.orders o
            LEFT JOIN storefront.users u ON o.user_id = u.id
            ORDER BY o.placed_at DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }
}

impl OrderStore for OrderRepository<'_> {
    async fn insert(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        self.create(order).await
    }
}

#[cfg(test)]
mod tests {
    const ORDERS_MIGRATION: &str = include_str!("../../migrations/20260301000002_create_orders.sql");

    fn column_definition(name: &str) -> Option<&'static str> {
        ORDERS_MIGRATION
            .lines()
            .map(str::trim)
            .find(|line| line.split_whitespace().next() == Some(name))
    }

    #[test]
    fn test_order_total_column_has_no_precision_cap() {
        let total = column_definition("total").unwrap_or_default();
        assert!(total.starts_with("total"), "{total}");
        assert!(total.contains("NUMERIC NOT NULL"), "{total}");
        assert!(!total.contains("NUMERIC("), "{total}");
    }
}

//! Order repository.
//!
//! Line items are owned by their order and replaced wholesale on every
//! upsert.

use sqlx::{PgConnection, PgPool};

use shop_insights_core::{OrderId, StoreId};

use super::{Page, RepositoryError};
use crate::models::{NewOrder, Order, OrderLineItem};

const ORDER_COLUMNS: &str = "id, store_id, external_id, name, email, customer_external_id, \
                             financial_status, fulfillment_status, total_price, currency_code, \
                             processed_at, shopify_created_at, synced_at";

/// Repository for synced orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert or update an order keyed by `(store_id, external_id)` and
    /// replace its line items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn upsert(
        conn: &mut PgConnection,
        store_id: StoreId,
        order: &NewOrder,
    ) -> Result<OrderId, RepositoryError> {
        let id: OrderId = sqlx::query_scalar(
            r"
            INSERT INTO orders (
                store_id, external_id, name, email, customer_external_id, financial_status,
                fulfillment_status, total_price, currency_code, processed_at, shopify_created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (store_id, external_id) DO UPDATE SET
                name = EXCLUDED.name,
                email = EXCLUDED.email,
                customer_external_id = EXCLUDED.customer_external_id,
                financial_status = EXCLUDED.financial_status,
                fulfillment_status = EXCLUDED.fulfillment_status,
                total_price = EXCLUDED.total_price,
                currency_code = EXCLUDED.currency_code,
                processed_at = EXCLUDED.processed_at,
                shopify_created_at = EXCLUDED.shopify_created_at,
                synced_at = NOW()
            RETURNING id
            ",
        )
        .bind(store_id)
        .bind(&order.external_id)
        .bind(&order.name)
        .bind(&order.email)
        .bind(&order.customer_external_id)
        .bind(&order.financial_status)
        .bind(&order.fulfillment_status)
        .bind(order.total_price)
        .bind(&order.currency_code)
        .bind(order.processed_at)
        .bind(order.shopify_created_at)
        .fetch_one(&mut *conn)
        .await?;

        sqlx::query("DELETE FROM order_line_items WHERE order_id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        for item in &order.line_items {
            sqlx::query(
                r"
                INSERT INTO order_line_items (
                    order_id, external_id, title, sku, quantity, unit_price,
                    product_external_id, variant_external_id
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ",
            )
            .bind(id)
            .bind(&item.external_id)
            .bind(&item.title)
            .bind(&item.sku)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(&item.product_external_id)
            .bind(&item.variant_external_id)
            .execute(&mut *conn)
            .await?;
        }

        Ok(id)
    }

    /// List a store's orders, newest first. Line items are not loaded.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, store_id: StoreId, page: Page) -> Result<Vec<Order>, RepositoryError> {
        let orders = sqlx::query_as(&format!(
            r"
            SELECT {ORDER_COLUMNS} FROM orders
            WHERE store_id = $1
            ORDER BY shopify_created_at DESC NULLS LAST, id DESC
            LIMIT $2 OFFSET $3
            "
        ))
        .bind(store_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool)
        .await?;

        Ok(orders)
    }

    /// Get an order with its line items by Shopify ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get(
        &self,
        store_id: StoreId,
        external_id: &str,
    ) -> Result<Option<Order>, RepositoryError> {
        let order: Option<Order> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE store_id = $1 AND external_id = $2"
        ))
        .bind(store_id)
        .bind(external_id)
        .fetch_optional(self.pool)
        .await?;

        let Some(mut order) = order else {
            return Ok(None);
        };

        order.line_items = sqlx::query_as::<_, OrderLineItem>(
            r"
            SELECT id, order_id, external_id, title, sku, quantity, unit_price,
                   product_external_id, variant_external_id
            FROM order_line_items
            WHERE order_id = $1
            ORDER BY id
            ",
        )
        .bind(order.id)
        .fetch_all(self.pool)
        .await?;

        Ok(Some(order))
    }

    /// Count a store's orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, store_id: StoreId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE store_id = $1")
            .bind(store_id)
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }
}

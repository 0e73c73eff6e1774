//! Customer repository.

use sqlx::{PgConnection, PgPool};

use shop_insights_core::{CustomerId, StoreId};

use super::{Page, RepositoryError};
use crate::models::{Customer, NewCustomer};

const CUSTOMER_COLUMNS: &str = "id, store_id, external_id, first_name, last_name, email, phone, \
                                orders_count, total_spent, currency_code, shopify_created_at, \
                                synced_at";

/// Repository for synced customers.
pub struct CustomerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert or update a customer keyed by `(store_id, external_id)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(
        conn: &mut PgConnection,
        store_id: StoreId,
        customer: &NewCustomer,
    ) -> Result<CustomerId, RepositoryError> {
        let id: CustomerId = sqlx::query_scalar(
            r"
            INSERT INTO customers (
                store_id, external_id, first_name, last_name, email, phone,
                orders_count, total_spent, currency_code, shopify_created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (store_id, external_id) DO UPDATE SET
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                email = EXCLUDED.email,
                phone = EXCLUDED.phone,
                orders_count = EXCLUDED.orders_count,
                total_spent = EXCLUDED.total_spent,
                currency_code = EXCLUDED.currency_code,
                shopify_created_at = EXCLUDED.shopify_created_at,
                synced_at = NOW()
            RETURNING id
            ",
        )
        .bind(store_id)
        .bind(&customer.external_id)
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(customer.orders_count)
        .bind(customer.total_spent)
        .bind(&customer.currency_code)
        .bind(customer.shopify_created_at)
        .fetch_one(conn)
        .await?;

        Ok(id)
    }

    /// List a store's customers, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        store_id: StoreId,
        page: Page,
    ) -> Result<Vec<Customer>, RepositoryError> {
        let customers = sqlx::query_as(&format!(
            r"
            SELECT {CUSTOMER_COLUMNS} FROM customers
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

        Ok(customers)
    }

    /// Get a customer by its Shopify ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        store_id: StoreId,
        external_id: &str,
    ) -> Result<Option<Customer>, RepositoryError> {
        let customer = sqlx::query_as(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE store_id = $1 AND external_id = $2"
        ))
        .bind(store_id)
        .bind(external_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(customer)
    }

    /// Count a store's customers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, store_id: StoreId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM customers WHERE store_id = $1")
            .bind(store_id)
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }
}

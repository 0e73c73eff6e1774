//! Product repository.

use sqlx::{PgConnection, PgPool};

use shop_insights_core::{ProductId, StoreId};

use super::{Page, RepositoryError};
use crate::models::{NewProduct, Product};

const PRODUCT_COLUMNS: &str = "id, store_id, external_id, title, handle, vendor, product_type, \
                               status, price, currency_code, inventory_quantity, \
                               shopify_created_at, shopify_updated_at, synced_at";

/// Repository for synced products.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert or update a product keyed by `(store_id, external_id)`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(
        conn: &mut PgConnection,
        store_id: StoreId,
        product: &NewProduct,
    ) -> Result<ProductId, RepositoryError> {
        let id: ProductId = sqlx::query_scalar(
            r"
            INSERT INTO products (
                store_id, external_id, title, handle, vendor, product_type, status,
                price, currency_code, inventory_quantity, shopify_created_at, shopify_updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            ON CONFLICT (store_id, external_id) DO UPDATE SET
                title = EXCLUDED.title,
                handle = EXCLUDED.handle,
                vendor = EXCLUDED.vendor,
                product_type = EXCLUDED.product_type,
                status = EXCLUDED.status,
                price = EXCLUDED.price,
                currency_code = EXCLUDED.currency_code,
                inventory_quantity = EXCLUDED.inventory_quantity,
                shopify_created_at = EXCLUDED.shopify_created_at,
                shopify_updated_at = EXCLUDED.shopify_updated_at,
                synced_at = NOW()
            RETURNING id
            ",
        )
        .bind(store_id)
        .bind(&product.external_id)
        .bind(&product.title)
        .bind(&product.handle)
        .bind(&product.vendor)
        .bind(&product.product_type)
        .bind(&product.status)
        .bind(product.price)
        .bind(&product.currency_code)
        .bind(product.inventory_quantity)
        .bind(product.shopify_created_at)
        .bind(product.shopify_updated_at)
        .fetch_one(conn)
        .await?;

        Ok(id)
    }

    /// List a store's products by title.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, store_id: StoreId, page: Page) -> Result<Vec<Product>, RepositoryError> {
        let products = sqlx::query_as(&format!(
            r"
            SELECT {PRODUCT_COLUMNS} FROM products
            WHERE store_id = $1
            ORDER BY title, id
            LIMIT $2 OFFSET $3
            "
        ))
        .bind(store_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(self.pool)
        .await?;

        Ok(products)
    }

    /// Get a product by its Shopify ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(
        &self,
        store_id: StoreId,
        external_id: &str,
    ) -> Result<Option<Product>, RepositoryError> {
        let product = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE store_id = $1 AND external_id = $2"
        ))
        .bind(store_id)
        .bind(external_id)
        .fetch_optional(self.pool)
        .await?;

        Ok(product)
    }

    /// Count a store's products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, store_id: StoreId) -> Result<i64, RepositoryError> {
        let count = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE store_id = $1")
            .bind(store_id)
            .fetch_one(self.pool)
            .await?;

        Ok(count)
    }
}

//! Database operations for Shop Insights `PostgreSQL`.
//!
//! ## Tables
//!
//! - `stores` - Registered Shopify stores and their access tokens
//! - `products`, `orders`, `order_line_items`, `customers` - Synced Admin API data
//! - `sync_runs` - One row per sync invocation
//! - `brands` and `brand_*` - Scraped public storefront data
//! - `competitor_links` - Directed brand → competitor pairs
//! - `crawl_logs` - Outcome of each storefront fetch
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p shop-insights-cli -- migrate
//! ```

pub mod brands;
pub mod competitors;
pub mod customers;
pub mod orders;
pub mod products;
pub mod stores;
pub mod sync_runs;

use std::time::Duration;

use secrecy::ExposeSecret;
use serde::Deserialize;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use brands::BrandRepository;
pub use competitors::CompetitorRepository;
pub use customers::CustomerRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use stores::StoreRepository;
pub use sync_runs::SyncRunRepository;

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate shop domain).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl RepositoryError {
    /// Map a unique violation to `Conflict`, anything else to `Database`.
    pub(crate) fn conflict_or_database(err: sqlx::Error, what: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err
            && db_err.is_unique_violation()
        {
            return Self::Conflict(format!("{what} already exists"));
        }
        Self::Database(err)
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Apply any pending migrations.
///
/// # Errors
///
/// Returns `sqlx::migrate::MigrateError` if a migration fails.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Limit/offset pagination for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 250;

    /// Build a page, clamping the limit to `1..=250` and the offset to `>= 0`.
    #[must_use]
    pub fn new(limit: i64, offset: i64) -> Self {
        Self {
            limit: limit.clamp(1, Self::MAX_LIMIT),
            offset: offset.max(0),
        }
    }

    /// Re-apply the bounds (query strings bypass [`Page::new`]).
    #[must_use]
    pub fn clamped(self) -> Self {
        Self::new(self.limit, self.offset)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            limit: Self::DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults_and_clamping() {
        assert_eq!(Page::default(), Page::new(50, 0));
        assert_eq!(Page::new(0, -5), Page { limit: 1, offset: 0 });
        assert_eq!(Page::new(10_000, 20), Page { limit: 250, offset: 20 });
    }

    #[test]
    fn test_page_deserializes_partial_query() {
        let page: Page = serde_json::from_str(r#"{"offset": 100}"#).unwrap_or_default();
        assert_eq!(page.clamped(), Page::new(50, 100));
    }

    #[test]
    fn test_repository_error_display() {
        assert_eq!(RepositoryError::NotFound.to_string(), "not found");
        assert_eq!(
            RepositoryError::Conflict("store acme.myshopify.com already exists".to_string())
                .to_string(),
            "constraint violation: store acme.myshopify.com already exists"
        );
    }
}

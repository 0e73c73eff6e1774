//! Store repository.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use sqlx::{PgConnection, PgPool};

use shop_insights_core::{ShopDomain, StoreId};

use super::RepositoryError;
use crate::models::{NewStore, Store};

const STORE_COLUMNS: &str = "id, shop_domain, name, currency_code, access_token, api_version, \
                             last_synced_at, created_at, updated_at";

/// Internal row type for store queries.
#[derive(sqlx::FromRow)]
struct StoreRow {
    id: i32,
    shop_domain: String,
    name: Option<String>,
    currency_code: Option<String>,
    access_token: String,
    api_version: String,
    last_synced_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<StoreRow> for Store {
    type Error = RepositoryError;

    fn try_from(row: StoreRow) -> Result<Self, Self::Error> {
        let shop_domain = ShopDomain::parse(&row.shop_domain).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid shop domain in database: {e}"))
        })?;

        Ok(Self {
            id: StoreId::new(row.id),
            shop_domain,
            name: row.name,
            currency_code: row.currency_code,
            access_token: SecretString::from(row.access_token),
            api_version: row.api_version,
            last_synced_at: row.last_synced_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for registered stores.
pub struct StoreRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> StoreRepository<'a> {
    /// Create a new store repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Register a store.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the shop domain is already registered.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, store: &NewStore) -> Result<Store, RepositoryError> {
        let row: StoreRow = sqlx::query_as(&format!(
            r"
            INSERT INTO stores (shop_domain, name, currency_code, access_token, api_version)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {STORE_COLUMNS}
            "
        ))
        .bind(store.shop_domain.as_str())
        .bind(&store.name)
        .bind(&store.currency_code)
        .bind(store.access_token.expose_secret())
        .bind(&store.api_version)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            RepositoryError::conflict_or_database(e, &format!("store {}", store.shop_domain))
        })?;

        row.try_into()
    }

    /// Get a store by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get(&self, id: StoreId) -> Result<Option<Store>, RepositoryError> {
        let row: Option<StoreRow> =
            sqlx::query_as(&format!("SELECT {STORE_COLUMNS} FROM stores WHERE id = $1"))
                .bind(id)
                .fetch_optional(self.pool)
                .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a store by its shop domain.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_domain(
        &self,
        shop_domain: &ShopDomain,
    ) -> Result<Option<Store>, RepositoryError> {
        let row: Option<StoreRow> = sqlx::query_as(&format!(
            "SELECT {STORE_COLUMNS} FROM stores WHERE shop_domain = $1"
        ))
        .bind(shop_domain.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List all stores, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if any row is invalid.
    pub async fn list(&self) -> Result<Vec<Store>, RepositoryError> {
        let rows: Vec<StoreRow> =
            sqlx::query_as(&format!("SELECT {STORE_COLUMNS} FROM stores ORDER BY id"))
                .fetch_all(self.pool)
                .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Delete a store and everything synced for it.
    ///
    /// Returns `false` if no store had this ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: StoreId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM stores WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Replace a store's access token (and refreshed shop metadata).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the store does not exist.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn update_token(
        &self,
        id: StoreId,
        access_token: &SecretString,
        name: Option<&str>,
        currency_code: Option<&str>,
    ) -> Result<Store, RepositoryError> {
        let row: Option<StoreRow> = sqlx::query_as(&format!(
            r"
            UPDATE stores
            SET access_token = $2,
                name = COALESCE($3, name),
                currency_code = COALESCE($4, currency_code),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {STORE_COLUMNS}
            "
        ))
        .bind(id)
        .bind(access_token.expose_secret())
        .bind(name)
        .bind(currency_code)
        .fetch_optional(self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    /// Record a successful sync. Runs inside the caller's transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn mark_synced(
        conn: &mut PgConnection,
        id: StoreId,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE stores SET last_synced_at = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(at)
            .execute(conn)
            .await?;

        Ok(())
    }
}

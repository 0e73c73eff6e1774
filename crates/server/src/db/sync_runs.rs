//! Sync run repository.

use sqlx::PgPool;

use shop_insights_core::{StoreId, SyncResource, SyncRunId};

use super::RepositoryError;
use crate::models::{SyncOutcome, SyncRun};

const SYNC_RUN_COLUMNS: &str = "id, store_id, resources, status, products_count, orders_count, \
                                customers_count, skipped_count, error, started_at, finished_at";

/// Repository for sync run bookkeeping.
///
/// Runs are written outside the data transaction so a failed sync still
/// leaves a `failed` record behind.
pub struct SyncRunRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SyncRunRepository<'a> {
    /// Create a new sync run repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Record a new `running` sync.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn start(
        &self,
        store_id: StoreId,
        resources: &[SyncResource],
    ) -> Result<SyncRun, RepositoryError> {
        let names: Vec<&str> = resources.iter().map(|r| r.as_str()).collect();

        let run = sqlx::query_as(&format!(
            r"
            INSERT INTO sync_runs (id, store_id, resources)
            VALUES ($1, $2, $3)
            RETURNING {SYNC_RUN_COLUMNS}
            "
        ))
        .bind(SyncRunId::generate())
        .bind(store_id)
        .bind(&names)
        .fetch_one(self.pool)
        .await?;

        Ok(run)
    }

    /// Mark a run finished with its outcome.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the run does not exist.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn finish(
        &self,
        id: SyncRunId,
        outcome: &SyncOutcome,
    ) -> Result<SyncRun, RepositoryError> {
        let counts = outcome.counts();

        let run: Option<SyncRun> = sqlx::query_as(&format!(
            r"
            UPDATE sync_runs SET
                status = $2,
                products_count = $3,
                orders_count = $4,
                customers_count = $5,
                skipped_count = $6,
                error = $7,
                finished_at = NOW()
            WHERE id = $1
            RETURNING {SYNC_RUN_COLUMNS}
            "
        ))
        .bind(id)
        .bind(outcome.status())
        .bind(counts.products)
        .bind(counts.orders)
        .bind(counts.customers)
        .bind(counts.skipped)
        .bind(outcome.error())
        .fetch_optional(self.pool)
        .await?;

        run.ok_or(RepositoryError::NotFound)
    }

    /// Most recent runs for a store, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_store(
        &self,
        store_id: StoreId,
        limit: i64,
    ) -> Result<Vec<SyncRun>, RepositoryError> {
        let runs = sqlx::query_as(&format!(
            r"
            SELECT {SYNC_RUN_COLUMNS} FROM sync_runs
            WHERE store_id = $1
            ORDER BY started_at DESC
            LIMIT $2
            "
        ))
        .bind(store_id)
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        Ok(runs)
    }

    /// Get a run by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: SyncRunId) -> Result<Option<SyncRun>, RepositoryError> {
        let run = sqlx::query_as(&format!(
            "SELECT {SYNC_RUN_COLUMNS} FROM sync_runs WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(run)
    }
}

//! Authenticated store sync: fetch → map → upsert.

use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use shop_insights_core::{StoreId, SyncResource};

use crate::db::{
    CustomerRepository, OrderRepository, ProductRepository, RepositoryError, StoreRepository,
    SyncRunRepository,
};
use crate::models::{Store, SyncCounts, SyncOutcome, SyncRun};
use crate::shopify::{MappingError, ShopifyClient, ShopifyError, map_customer, map_order, map_product};

/// Errors that abort a sync.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Shopify error: {0}")]
    Shopify(#[from] ShopifyError),

    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),
}

impl From<sqlx::Error> for SyncError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(RepositoryError::Database(err))
    }
}

/// Sync the requested resources of one store through `client`.
///
/// `client` is normally [`ShopifyClient::for_store`]; tests point it at a
/// mock endpoint with [`ShopifyClient::with_endpoint`].
///
/// An empty `resources` slice means every resource. Each resource is
/// written in its own transaction, so a failure leaves earlier resources
/// committed. The run is recorded as `failed` before the error is returned.
///
/// # Errors
///
/// Returns `SyncError::Shopify` if a fetch fails and `SyncError::Database`
/// if a write fails.
#[instrument(skip(pool, client, store), fields(store_id = %store.id, shop = %store.shop_domain))]
pub async fn sync_store(
    pool: &PgPool,
    client: &ShopifyClient,
    store: &Store,
    resources: &[SyncResource],
    page_size: u16,
) -> Result<SyncRun, SyncError> {
    let resources = SyncResource::normalize(resources);
    let runs = SyncRunRepository::new(pool);
    let run = runs.start(store.id, &resources).await?;
    info!(sync_run_id = %run.id, ?resources, "Sync started");

    let mut counts = SyncCounts::default();

    let result = sync_resources(pool, client, store.id, &resources, page_size, &mut counts).await;

    match result {
        Ok(()) => {
            let finished = runs.finish(run.id, &SyncOutcome::Succeeded(counts)).await?;
            info!(
                sync_run_id = %run.id,
                products = counts.products,
                orders = counts.orders,
                customers = counts.customers,
                skipped = counts.skipped,
                "Sync finished"
            );
            Ok(finished)
        }
        Err(err) => {
            warn!(sync_run_id = %run.id, error = %err, "Sync failed");
            let outcome = SyncOutcome::Failed {
                counts,
                error: err.to_string(),
            };
            if let Err(finish_err) = runs.finish(run.id, &outcome).await {
                error!(sync_run_id = %run.id, error = %finish_err, "Failed to record sync failure");
            }
            Err(err)
        }
    }
}

async fn sync_resources(
    pool: &PgPool,
    client: &ShopifyClient,
    store_id: StoreId,
    resources: &[SyncResource],
    page_size: u16,
    counts: &mut SyncCounts,
) -> Result<(), SyncError> {
    for &resource in resources {
        let written = match resource {
            SyncResource::Products => {
                let rows = map_all(client.all_products(page_size).await?, map_product, counts);
                let mut tx = pool.begin().await?;
                for row in &rows {
                    ProductRepository::upsert(&mut *tx, store_id, row).await?;
                }
                tx.commit().await?;
                rows.len()
            }
            SyncResource::Orders => {
                let rows = map_all(client.all_orders(page_size).await?, map_order, counts);
                let mut tx = pool.begin().await?;
                for row in &rows {
                    OrderRepository::upsert(&mut *tx, store_id, row).await?;
                }
                tx.commit().await?;
                rows.len()
            }
            SyncResource::Customers => {
                let rows = map_all(client.all_customers(page_size).await?, map_customer, counts);
                let mut tx = pool.begin().await?;
                for row in &rows {
                    CustomerRepository::upsert(&mut *tx, store_id, row).await?;
                }
                tx.commit().await?;
                rows.len()
            }
        };

        info!(resource = %resource, written, "Resource synced");
        counts.add(resource, i32::try_from(written).unwrap_or(i32::MAX));
    }

    let mut conn = pool.acquire().await?;
    StoreRepository::mark_synced(&mut conn, store_id, Utc::now()).await?;

    Ok(())
}

/// Map every node, skipping and counting the ones that fail.
fn map_all<N, R>(
    nodes: Vec<N>,
    map: fn(N) -> Result<R, MappingError>,
    counts: &mut SyncCounts,
) -> Vec<R> {
    nodes
        .into_iter()
        .filter_map(|node| match map(node) {
            Ok(row) => Some(row),
            Err(e) => {
                warn!(error = %e, "Skipping node that failed to map");
                counts.skipped += 1;
                None
            }
        })
        .collect()
}

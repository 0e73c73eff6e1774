//! One-shot store sync.

use shop_insights_core::{ShopDomain, StoreId, SyncResource};
use shop_insights_server::db::StoreRepository;
use shop_insights_server::models::Store;
use shop_insights_server::services::sync_store;
use shop_insights_server::shopify::ShopifyClient;
use shop_insights_server::state::AppState;

use super::{CommandError, connect, print_json};

/// Sync `store` (an ID or shop domain) and print the finished run.
pub async fn run(store: &str, resources: &[SyncResource]) -> Result<(), CommandError> {
    let state = connect().await?;
    let store = find_store(&state, store).await?;

    tracing::info!(store_id = %store.id, shop = %store.shop_domain, "Starting sync");
    let client = ShopifyClient::for_store(state.http().clone(), &store);
    let run = sync_store(
        state.pool(),
        &client,
        &store,
        resources,
        state.config().shopify.page_size,
    )
    .await?;

    tracing::info!(
        run_id = %run.id,
        products = run.products_count,
        orders = run.orders_count,
        customers = run.customers_count,
        skipped = run.skipped_count,
        "Sync complete"
    );
    print_json(&run)
}

async fn find_store(state: &AppState, key: &str) -> Result<Store, CommandError> {
    let stores = StoreRepository::new(state.pool());
    let found = match key.parse::<StoreId>() {
        Ok(id) => stores.get(id).await?,
        Err(_) => {
            let domain =
                ShopDomain::parse(key).map_err(|e| CommandError::Invalid(e.to_string()))?;
            stores.get_by_domain(&domain).await?
        }
    };
    found.ok_or_else(|| CommandError::Invalid(format!("Store {key} not found")))
}

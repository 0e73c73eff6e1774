//! Store sync against a mocked Admin API and a real database.
//!
//! These tests require a `PostgreSQL` database reachable through
//! `TEST_DATABASE_URL`. Run with: `cargo test -p shop-insights-integration-tests -- --ignored`

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shop_insights_core::{SyncResource, SyncStatus};
use shop_insights_integration_tests::{create_test_store, test_pool};
use shop_insights_server::db::{ProductRepository, StoreRepository, SyncRunRepository};
use shop_insights_server::services::{SyncError, sync_store};
use shop_insights_server::shopify::{ShopifyClient, ShopifyError};

fn product(id: u32) -> serde_json::Value {
    json!({
        "id": format!("gid://shopify/Product/{id}"),
        "title": format!("Product {id}"),
        "handle": format!("product-{id}"),
        "vendor": "Acme",
        "productType": null,
        "status": "ACTIVE",
        "totalInventory": 3,
        "createdAt": "2025-01-01T00:00:00Z",
        "updatedAt": "2025-01-02T00:00:00Z",
        "priceRangeV2": { "minVariantPrice": { "amount": "12.50", "currencyCode": "USD" } }
    })
}

async fn mock_products(server: &MockServer) {
    Mock::given(method("POST"))
        .and(body_string_contains("products("))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "products": {
                "nodes": [product(1), product(2)],
                "pageInfo": { "hasNextPage": false, "endCursor": "c2" }
            }}
        })))
        .mount(server)
        .await;
}

fn client_for(server: &MockServer) -> ShopifyClient {
    ShopifyClient::with_endpoint(
        reqwest::Client::new(),
        format!("{}/admin/api/2025-01/graphql.json", server.uri()),
        SecretString::from("shpat_test_9f8e7d6c5b4a3210"),
    )
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_failed_resource_records_failed_run_and_keeps_earlier_writes() {
    let pool = test_pool().await;
    let store_id = create_test_store(&pool).await;
    let store = StoreRepository::new(&pool).get(store_id).await.unwrap().unwrap();

    let server = MockServer::start().await;
    mock_products(&server).await;
    Mock::given(method("POST"))
        .and(body_string_contains("orders("))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = sync_store(
        &pool,
        &client_for(&server),
        &store,
        &[SyncResource::Products, SyncResource::Orders],
        50,
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        SyncError::Shopify(ShopifyError::Api { status: 500, .. })
    ));

    let runs = SyncRunRepository::new(&pool)
        .list_for_store(store_id, 1)
        .await
        .unwrap();
    let run = &runs[0];
    assert_eq!(run.status, SyncStatus::Failed);
    assert_eq!(run.products_count, 2);
    assert_eq!(run.orders_count, 0);
    assert!(run.error.as_deref().unwrap().contains("500"));
    assert!(run.finished_at.is_some());

    // Products were committed before the orders fetch failed.
    let products = ProductRepository::new(&pool).count(store_id).await.unwrap();
    assert_eq!(products, 2);

    let store = StoreRepository::new(&pool).get(store_id).await.unwrap().unwrap();
    assert!(store.last_synced_at.is_none());
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_successful_sync_marks_store_synced() {
    let pool = test_pool().await;
    let store_id = create_test_store(&pool).await;
    let store = StoreRepository::new(&pool).get(store_id).await.unwrap().unwrap();

    let server = MockServer::start().await;
    mock_products(&server).await;

    let run = sync_store(
        &pool,
        &client_for(&server),
        &store,
        &[SyncResource::Products],
        50,
    )
    .await
    .unwrap();
    assert_eq!(run.status, SyncStatus::Succeeded);
    assert_eq!(run.products_count, 2);
    assert!(run.error.is_none());

    let fetched = SyncRunRepository::new(&pool).get(run.id).await.unwrap().unwrap();
    assert_eq!(fetched.store_id, store_id);
    assert_eq!(fetched.status, SyncStatus::Succeeded);

    let store = StoreRepository::new(&pool).get(store_id).await.unwrap().unwrap();
    assert!(store.last_synced_at.is_some());
}

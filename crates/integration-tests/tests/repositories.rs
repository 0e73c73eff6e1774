//! Repository upsert semantics against a real database.
//!
//! These tests require a `PostgreSQL` database reachable through
//! `TEST_DATABASE_URL`. Run with: `cargo test -p shop-insights-integration-tests -- --ignored`

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use chrono::Utc;
use rust_decimal::Decimal;

use shop_insights_core::{PolicyType, SyncResource, SyncStatus};
use shop_insights_integration_tests::{create_test_store, test_pool, unique_suffix};
use shop_insights_server::db::{
    BrandRepository, CompetitorRepository, OrderRepository, Page, ProductRepository,
    RepositoryError, StoreRepository, SyncRunRepository,
};
use shop_insights_server::models::{
    BrandContext, BrandProduct, Faq, NewLineItem, NewOrder, NewProduct, Policy, SyncCounts,
    SyncOutcome,
};

fn product(external_id: &str, title: &str) -> NewProduct {
    NewProduct {
        external_id: external_id.to_string(),
        title: title.to_string(),
        handle: title.to_lowercase().replace(' ', "-"),
        vendor: Some("Acme".to_string()),
        product_type: None,
        status: Some("ACTIVE".to_string()),
        price: Some(Decimal::new(1999, 2)),
        currency_code: Some("USD".to_string()),
        inventory_quantity: 5,
        shopify_created_at: Some(Utc::now()),
        shopify_updated_at: None,
    }
}

fn line_item(external_id: &str) -> NewLineItem {
    NewLineItem {
        external_id: external_id.to_string(),
        title: "Widget".to_string(),
        sku: None,
        quantity: 1,
        unit_price: Some(Decimal::new(500, 2)),
        product_external_id: None,
        variant_external_id: None,
    }
}

fn order(line_items: Vec<NewLineItem>) -> NewOrder {
    NewOrder {
        external_id: "5001".to_string(),
        name: "#1001".to_string(),
        email: None,
        customer_external_id: None,
        financial_status: Some("PAID".to_string()),
        fulfillment_status: None,
        total_price: Decimal::new(1000, 2),
        currency_code: "USD".to_string(),
        processed_at: None,
        shopify_created_at: Some(Utc::now()),
        line_items,
    }
}

fn brand_product(handle: &str) -> BrandProduct {
    BrandProduct {
        shopify_product_id: None,
        title: handle.replace('-', " "),
        url: None,
        handle: Some(handle.to_string()),
        price: None,
        currency: None,
        is_hero: false,
        image_url: None,
        vendor: None,
        product_type: None,
        description: None,
    }
}

fn faq(question: &str) -> Faq {
    Faq {
        question: question.to_string(),
        answer: Some("Yes".to_string()),
        url: None,
    }
}

fn brand_context(website_url: &str) -> BrandContext {
    BrandContext {
        brand_id: None,
        brand_name: Some("Acme".to_string()),
        website_url: website_url.to_string(),
        about: None,
        product_catalog: vec![brand_product("blue-shirt"), brand_product("red-hat")],
        hero_products: Vec::new(),
        policies: vec![Policy {
            policy_type: PolicyType::RefundPolicy,
            url: Some(format!("{website_url}/policies/refund-policy")),
            content: Some("30 day refunds".to_string()),
        }],
        faqs: vec![faq("Do you ship abroad?"), faq("Can I return items?")],
        social_handles: Vec::new(),
        contact_details: Vec::new(),
        important_links: Vec::new(),
        scraped_at: Utc::now(),
    }
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_store_domain_is_unique() {
    let pool = test_pool().await;
    let store_id = create_test_store(&pool).await;
    let stores = StoreRepository::new(&pool);
    let store = stores.get(store_id).await.unwrap().unwrap();

    let duplicate = shop_insights_server::models::NewStore {
        shop_domain: store.shop_domain.clone(),
        name: None,
        currency_code: None,
        access_token: store.access_token.clone(),
        api_version: store.api_version.clone(),
    };
    let err = stores.create(&duplicate).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_product_upsert_is_idempotent() {
    let pool = test_pool().await;
    let store_id = create_test_store(&pool).await;

    let mut conn = pool.acquire().await.unwrap();
    let first = ProductRepository::upsert(&mut *conn, store_id, &product("101", "Blue Shirt"))
        .await
        .unwrap();
    let second = ProductRepository::upsert(&mut *conn, store_id, &product("101", "Blue Tee"))
        .await
        .unwrap();
    drop(conn);

    assert_eq!(first, second);
    let products = ProductRepository::new(&pool);
    assert_eq!(products.count(store_id).await.unwrap(), 1);
    let stored = products.get(store_id, "101").await.unwrap().unwrap();
    assert_eq!(stored.title, "Blue Tee");
    assert_eq!(products.list(store_id, Page::default()).await.unwrap().len(), 1);
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_order_upsert_replaces_line_items() {
    let pool = test_pool().await;
    let store_id = create_test_store(&pool).await;

    let mut conn = pool.acquire().await.unwrap();
    OrderRepository::upsert(&mut *conn, store_id, &order(vec![line_item("1"), line_item("2")]))
        .await
        .unwrap();
    OrderRepository::upsert(&mut *conn, store_id, &order(vec![line_item("3")]))
        .await
        .unwrap();
    drop(conn);

    let stored = OrderRepository::new(&pool)
        .get(store_id, "5001")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.line_items.len(), 1);
    assert_eq!(stored.line_items[0].external_id, "3");
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_sync_run_lifecycle() {
    let pool = test_pool().await;
    let store_id = create_test_store(&pool).await;
    let runs = SyncRunRepository::new(&pool);

    let run = runs.start(store_id, &[SyncResource::Products]).await.unwrap();
    assert_eq!(run.status, SyncStatus::Running);

    let counts = SyncCounts {
        products: 3,
        ..SyncCounts::default()
    };
    let finished = runs
        .finish(run.id, &SyncOutcome::Succeeded(counts))
        .await
        .unwrap();
    assert_eq!(finished.status, SyncStatus::Succeeded);
    assert_eq!(finished.products_count, 3);
    assert!(finished.finished_at.is_some());

    let recent = runs.list_for_store(store_id, 5).await.unwrap();
    assert_eq!(recent.len(), 1);
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_brand_upsert_keys_on_website_and_replaces_faqs() {
    let pool = test_pool().await;
    let url = format!("https://brand-{}.example.com", unique_suffix());

    let mut context = brand_context(&url);
    let mut tx = pool.begin().await.unwrap();
    let first = BrandRepository::upsert_brand_context(&mut *tx, &context)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    // Second crawl: one FAQ left, refund policy only known by URL.
    context.faqs = vec![faq("Do you ship abroad?")];
    context.policies[0].content = None;
    let mut tx = pool.begin().await.unwrap();
    let second = BrandRepository::upsert_brand_context(&mut *tx, &context)
        .await
        .unwrap();
    tx.commit().await.unwrap();

    assert_eq!(first, second);

    let brands = BrandRepository::new(&pool);
    let stored = brands.get_context(first).await.unwrap().unwrap();
    assert_eq!(stored.product_catalog.len(), 2);
    assert_eq!(stored.faqs.len(), 1);
    let refund = stored
        .policies
        .iter()
        .find(|p| p.policy_type == PolicyType::RefundPolicy)
        .unwrap();
    assert_eq!(refund.content.as_deref(), Some("30 day refunds"));
    assert_eq!(brands.find_by_url(&url).await.unwrap(), Some(first));

    assert!(brands.delete(first).await.unwrap());
    assert!(!brands.exists(first).await.unwrap());
}

#[tokio::test]
#[ignore = "Requires TEST_DATABASE_URL"]
async fn test_competitor_links() {
    let pool = test_pool().await;
    let suffix = unique_suffix();

    let mut ids = Vec::new();
    for name in ["one", "two"] {
        let mut tx = pool.begin().await.unwrap();
        let id = BrandRepository::upsert_brand_context(
            &mut *tx,
            &brand_context(&format!("https://{name}-{suffix}.example.com")),
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();
        ids.push(id);
    }

    let competitors = CompetitorRepository::new(&pool);
    assert!(competitors.add(ids[0], ids[1]).await.unwrap());
    assert!(!competitors.add(ids[0], ids[1]).await.unwrap());
    assert_eq!(competitors.competitor_ids(ids[0]).await.unwrap(), vec![ids[1]]);

    let err = competitors.add(ids[0], ids[0]).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));

    assert!(competitors.remove(ids[0], ids[1]).await.unwrap());
    assert!(!competitors.remove(ids[0], ids[1]).await.unwrap());
}

//! REST API behavior against a running server.
//!
//! These tests require:
//! - A migrated `PostgreSQL` database
//! - The server running (cargo run -p shop-insights-server)
//!
//! None of them reach Shopify or a real storefront.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use shop_insights_integration_tests::api_base_url;

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_health_endpoints() {
    let client = Client::new();
    let base_url = api_base_url();

    let resp = client.get(format!("{base_url}/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client
        .get(format!("{base_url}/health/ready"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_fetch_insights_rejects_invalid_url() {
    let resp = Client::new()
        .post(format!("{}/api/brands/fetch-insights", api_base_url()))
        .json(&json!({"website_url": "not a url"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(body["detail"].is_string());
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_unknown_store_is_not_found() {
    let client = Client::new();
    let base_url = api_base_url();

    for path in [
        "",
        "/products",
        "/orders",
        "/customers",
        "/syncs",
        "/syncs/7f1d2c3b-4a5e-4f60-8a9b-0c1d2e3f4a5b",
    ] {
        let resp = client
            .get(format!("{base_url}/api/stores/2147483647{path}"))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "path {path}");
    }
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_competitors_of_unknown_brand() {
    let client = Client::new();
    let base_url = api_base_url();

    let resp = client
        .get(format!("{base_url}/api/competitors/2147483647"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = client
        .post(format!("{base_url}/api/competitors/2147483647/2147483646"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_list_endpoints_return_arrays() {
    let client = Client::new();
    let base_url = api_base_url();

    for path in ["/api/stores", "/api/brands"] {
        let resp = client.get(format!("{base_url}{path}")).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = resp.json().await.unwrap();
        assert!(body.is_array(), "{path} should return an array");
    }
}

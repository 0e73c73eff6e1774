//! Store registration commands.

use secrecy::SecretString;

use shop_insights_core::ShopDomain;
use shop_insights_server::config::validate_access_token;
use shop_insights_server::db::StoreRepository;
use shop_insights_server::models::NewStore;
use shop_insights_server::shopify::ShopifyClient;

use super::{CommandError, connect, print_json};

/// Verify a store's credentials and register it.
pub async fn add(
    shop_domain: &str,
    token: &str,
    api_version: Option<String>,
) -> Result<(), CommandError> {
    let shop_domain =
        ShopDomain::parse(shop_domain).map_err(|e| CommandError::Invalid(e.to_string()))?;
    validate_access_token(token)?;
    let access_token = SecretString::from(token.trim().to_string());

    let state = connect().await?;
    let api_version = api_version
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| state.config().shopify.api_version.clone());

    let stores = StoreRepository::new(state.pool());
    if stores.get_by_domain(&shop_domain).await?.is_some() {
        return Err(CommandError::Invalid(format!(
            "Store {shop_domain} is already registered"
        )));
    }

    tracing::info!(%shop_domain, "Verifying access token...");
    let shop = ShopifyClient::new(
        state.http().clone(),
        &shop_domain,
        &api_version,
        access_token.clone(),
    )
    .shop()
    .await?;

    let store = stores
        .create(&NewStore {
            shop_domain,
            name: Some(shop.name),
            currency_code: Some(shop.currency_code),
            access_token,
            api_version,
        })
        .await?;

    tracing::info!(store_id = %store.id, "Store registered");
    print_json(&store)
}

/// Print every registered store.
pub async fn list() -> Result<(), CommandError> {
    let state = connect().await?;
    let stores = StoreRepository::new(state.pool()).list().await?;
    print_json(&stores)
}

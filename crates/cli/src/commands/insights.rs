//! Brand insight fetch command.

use super::{CommandError, connect, print_json};

/// Scrape a storefront, store its context and print it.
pub async fn fetch(url: &str) -> Result<(), CommandError> {
    let state = connect().await?;
    let context = state.insights().fetch_brand_insights(url).await?;
    tracing::info!(
        brand_id = ?context.brand_id,
        products = context.product_catalog.len(),
        "Brand insights stored"
    );
    print_json(&context)
}

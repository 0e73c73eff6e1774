//! Synced product handlers.

use axum::{Json, Router, extract::State, routing::get};

use shop_insights_core::StoreId;

use super::stores::load_store;
use super::{ApiPath, ApiQuery};
use crate::db::{Page, ProductRepository};
use crate::error::AppError;
use crate::models::{Paged, Product};
use crate::state::AppState;

/// Build the products router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/stores/{id}/products", get(list_products))
        .route("/api/stores/{id}/products/{external_id}", get(get_product))
}

async fn list_products(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<StoreId>,
    ApiQuery(page): ApiQuery<Page>,
) -> Result<Json<Paged<Product>>, AppError> {
    let store = load_store(&state, id).await?;
    let page = page.clamped();
    let products = ProductRepository::new(state.pool());

    Ok(Json(Paged {
        items: products.list(store.id, page).await?,
        total: products.count(store.id).await?,
        limit: page.limit,
        offset: page.offset,
    }))
}

async fn get_product(
    State(state): State<AppState>,
    ApiPath((id, external_id)): ApiPath<(StoreId, String)>,
) -> Result<Json<Product>, AppError> {
    let store = load_store(&state, id).await?;
    ProductRepository::new(state.pool())
        .get(store.id, &external_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Product {external_id} not found")))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use super::super::test_support::send;

    #[tokio::test]
    async fn test_list_rejects_non_numeric_limit() {
        let response = send(Method::GET, "/api/stores/1/products?limit=many", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

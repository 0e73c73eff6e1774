//! Synced order handlers.

use axum::{Json, Router, extract::State, routing::get};

use shop_insights_core::StoreId;

use super::stores::load_store;
use super::{ApiPath, ApiQuery};
use crate::db::{OrderRepository, Page};
use crate::error::AppError;
use crate::models::{Order, Paged};
use crate::state::AppState;

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/stores/{id}/orders", get(list_orders))
        .route("/api/stores/{id}/orders/{external_id}", get(get_order))
}

/// Newest orders first; line items are only included on the detail route.
async fn list_orders(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<StoreId>,
    ApiQuery(page): ApiQuery<Page>,
) -> Result<Json<Paged<Order>>, AppError> {
    let store = load_store(&state, id).await?;
    let page = page.clamped();
    let orders = OrderRepository::new(state.pool());

    Ok(Json(Paged {
        items: orders.list(store.id, page).await?,
        total: orders.count(store.id).await?,
        limit: page.limit,
        offset: page.offset,
    }))
}

async fn get_order(
    State(state): State<AppState>,
    ApiPath((id, external_id)): ApiPath<(StoreId, String)>,
) -> Result<Json<Order>, AppError> {
    let store = load_store(&state, id).await?;
    OrderRepository::new(state.pool())
        .get(store.id, &external_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Order {external_id} not found")))
}

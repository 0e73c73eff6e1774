//! Synced customer handlers.

use axum::{Json, Router, extract::State, routing::get};

use shop_insights_core::StoreId;

use super::stores::load_store;
use super::{ApiPath, ApiQuery};
use crate::db::{CustomerRepository, Page};
use crate::error::AppError;
use crate::models::{Customer, Paged};
use crate::state::AppState;

/// Build the customers router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/stores/{id}/customers", get(list_customers))
        .route("/api/stores/{id}/customers/{external_id}", get(get_customer))
}

async fn list_customers(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<StoreId>,
    ApiQuery(page): ApiQuery<Page>,
) -> Result<Json<Paged<Customer>>, AppError> {
    let store = load_store(&state, id).await?;
    let page = page.clamped();
    let customers = CustomerRepository::new(state.pool());

    Ok(Json(Paged {
        items: customers.list(store.id, page).await?,
        total: customers.count(store.id).await?,
        limit: page.limit,
        offset: page.offset,
    }))
}

async fn get_customer(
    State(state): State<AppState>,
    ApiPath((id, external_id)): ApiPath<(StoreId, String)>,
) -> Result<Json<Customer>, AppError> {
    let store = load_store(&state, id).await?;
    CustomerRepository::new(state.pool())
        .get(store.id, &external_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Customer {external_id} not found")))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};

    use super::super::test_support::send;

    #[tokio::test]
    async fn test_list_rejects_fractional_offset() {
        let response = send(Method::GET, "/api/stores/1/customers?offset=1.5", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

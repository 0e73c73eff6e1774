//! Brand insight handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use shop_insights_core::BrandId;

use super::{ApiJson, ApiPath};
use crate::db::BrandRepository;
use crate::error::AppError;
use crate::models::{BrandContext, BrandSummary};
use crate::state::AppState;

/// Build the brands router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/brands", get(list_brands))
        .route("/api/brands/fetch-insights", post(fetch_insights))
        .route("/api/brands/{id}", get(get_brand).delete(delete_brand))
}

/// Request body for a storefront fetch.
#[derive(Deserialize)]
pub struct FetchInsightsRequest {
    pub website_url: String,
}

/// Scrape a public storefront and return its stored context.
#[instrument(skip(state, body), fields(website_url = %body.website_url))]
async fn fetch_insights(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<FetchInsightsRequest>,
) -> Result<Json<BrandContext>, AppError> {
    let context = state
        .insights()
        .fetch_brand_insights(&body.website_url)
        .await?;
    Ok(Json(context))
}

async fn list_brands(State(state): State<AppState>) -> Result<Json<Vec<BrandSummary>>, AppError> {
    Ok(Json(BrandRepository::new(state.pool()).list().await?))
}

async fn get_brand(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<BrandId>,
) -> Result<Json<BrandContext>, AppError> {
    BrandRepository::new(state.pool())
        .get_context(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Brand {id} not found")))
}

async fn delete_brand(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<BrandId>,
) -> Result<StatusCode, AppError> {
    if BrandRepository::new(state.pool()).delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Brand {id} not found")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use axum::http::{Method, StatusCode};

    use super::super::test_support::{json, send};

    #[tokio::test]
    async fn test_fetch_insights_rejects_blank_url() {
        let response = send(
            Method::POST,
            "/api/brands/fetch-insights",
            Some(r#"{"website_url": "  "}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json(response).await;
        assert!(body["detail"].as_str().unwrap().contains("URL"));
    }

    #[tokio::test]
    async fn test_fetch_insights_requires_website_url() {
        let response = send(Method::POST, "/api/brands/fetch-insights", Some("{}")).await;
        assert!(response.status().is_client_error());
    }
}

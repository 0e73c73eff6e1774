//! Competitor link handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::Serialize;
use tracing::info;

use shop_insights_core::BrandId;

use super::ApiPath;
use crate::db::{BrandRepository, CompetitorRepository};
use crate::error::AppError;
use crate::models::CompetitorResponse;
use crate::services;
use crate::state::AppState;

/// Build the competitors router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/competitors/{brand_id}", get(list_competitors))
        .route(
            "/api/competitors/{brand_id}/{competitor_id}",
            post(add_competitor).delete(remove_competitor),
        )
}

/// Response for a link request.
#[derive(Debug, Serialize)]
pub struct CompetitorLinkResponse {
    pub brand_id: BrandId,
    pub competitor_id: BrandId,
    /// `false` when the link already existed.
    pub created: bool,
}

async fn list_competitors(
    State(state): State<AppState>,
    ApiPath(brand_id): ApiPath<BrandId>,
) -> Result<Json<CompetitorResponse>, AppError> {
    Ok(Json(services::competitors(state.pool(), brand_id).await?))
}

async fn add_competitor(
    State(state): State<AppState>,
    ApiPath((brand_id, competitor_id)): ApiPath<(BrandId, BrandId)>,
) -> Result<(StatusCode, Json<CompetitorLinkResponse>), AppError> {
    if brand_id == competitor_id {
        return Err(AppError::BadRequest(
            "A brand cannot be its own competitor".to_string(),
        ));
    }

    let brands = BrandRepository::new(state.pool());
    for id in [brand_id, competitor_id] {
        if !brands.exists(id).await? {
            return Err(AppError::NotFound(format!("Brand {id} not found")));
        }
    }

    let created = CompetitorRepository::new(state.pool())
        .add(brand_id, competitor_id)
        .await?;
    if created {
        info!(%brand_id, %competitor_id, "Competitor linked");
    }

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((
        status,
        Json(CompetitorLinkResponse {
            brand_id,
            competitor_id,
            created,
        }),
    ))
}

async fn remove_competitor(
    State(state): State<AppState>,
    ApiPath((brand_id, competitor_id)): ApiPath<(BrandId, BrandId)>,
) -> Result<StatusCode, AppError> {
    if CompetitorRepository::new(state.pool())
        .remove(brand_id, competitor_id)
        .await?
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!(
            "Brand {brand_id} has no competitor {competitor_id}"
        )))
    }
}

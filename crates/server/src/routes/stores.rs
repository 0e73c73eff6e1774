//! Store registration and sync handlers.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};
use secrecy::SecretString;
use serde::Deserialize;
use tracing::{info, instrument};

use shop_insights_core::{ShopDomain, StoreId, SyncResource, SyncRunId};

use super::{ApiJson, ApiPath};
use crate::config::validate_access_token;
use crate::db::{StoreRepository, SyncRunRepository};
use crate::error::AppError;
use crate::models::{NewStore, Store, SyncRun};
use crate::services::sync_store;
use crate::shopify::ShopifyClient;
use crate::state::AppState;

/// Number of runs returned by the sync history endpoint.
const RECENT_SYNC_RUNS: i64 = 20;

/// Build the stores router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/stores", post(create_store).get(list_stores))
        .route("/api/stores/{id}", get(get_store).delete(delete_store))
        .route("/api/stores/{id}/token", put(update_token))
        .route("/api/stores/{id}/sync", post(sync))
        .route("/api/stores/{id}/syncs", get(list_syncs))
        .route("/api/stores/{id}/syncs/{run_id}", get(get_sync))
}

/// Request body for registering a store.
#[derive(Deserialize)]
pub struct CreateStoreRequest {
    pub shop_domain: String,
    pub access_token: String,
    pub api_version: Option<String>,
}

/// Request body for replacing a store's token.
#[derive(Deserialize)]
pub struct UpdateTokenRequest {
    pub access_token: String,
}

/// Optional request body for a sync.
#[derive(Debug, Default, Deserialize)]
pub struct SyncRequest {
    #[serde(default)]
    pub resources: Vec<SyncResource>,
}

/// Load a store or fail with 404.
pub(crate) async fn load_store(state: &AppState, id: StoreId) -> Result<Store, AppError> {
    StoreRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Store {id} not found")))
}

fn checked_token(token: &str) -> Result<SecretString, AppError> {
    validate_access_token(token).map_err(|e| AppError::BadRequest(e.to_string()))?;
    Ok(SecretString::from(token.trim().to_string()))
}

/// Register a store after verifying its credentials against Shopify.
#[instrument(skip(state, body), fields(shop = %body.shop_domain))]
async fn create_store(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateStoreRequest>,
) -> Result<(StatusCode, Json<Store>), AppError> {
    let shop_domain =
        ShopDomain::parse(&body.shop_domain).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let access_token = checked_token(&body.access_token)?;
    let api_version = body
        .api_version
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| state.config().shopify.api_version.clone());

    let stores = StoreRepository::new(state.pool());
    if stores.get_by_domain(&shop_domain).await?.is_some() {
        return Err(AppError::Conflict(format!(
            "Store {shop_domain} is already registered"
        )));
    }

    let client = ShopifyClient::new(
        state.http().clone(),
        &shop_domain,
        &api_version,
        access_token.clone(),
    );
    let shop = client.shop().await?;

    let store = stores
        .create(&NewStore {
            shop_domain,
            name: Some(shop.name),
            currency_code: Some(shop.currency_code),
            access_token,
            api_version,
        })
        .await?;

    info!(store_id = %store.id, "Store registered");
    Ok((StatusCode::CREATED, Json(store)))
}

async fn list_stores(State(state): State<AppState>) -> Result<Json<Vec<Store>>, AppError> {
    Ok(Json(StoreRepository::new(state.pool()).list().await?))
}

async fn get_store(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<StoreId>,
) -> Result<Json<Store>, AppError> {
    Ok(Json(load_store(&state, id).await?))
}

/// Replace a store's access token after verifying it.
#[instrument(skip(state, body))]
async fn update_token(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<StoreId>,
    ApiJson(body): ApiJson<UpdateTokenRequest>,
) -> Result<Json<Store>, AppError> {
    let access_token = checked_token(&body.access_token)?;
    let store = load_store(&state, id).await?;

    let client = ShopifyClient::new(
        state.http().clone(),
        &store.shop_domain,
        &store.api_version,
        access_token.clone(),
    );
    let shop = client.shop().await?;

    let updated = StoreRepository::new(state.pool())
        .update_token(id, &access_token, Some(&shop.name), Some(&shop.currency_code))
        .await?;

    info!(store_id = %id, "Store token replaced");
    Ok(Json(updated))
}

async fn delete_store(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<StoreId>,
) -> Result<StatusCode, AppError> {
    if StoreRepository::new(state.pool()).delete(id).await? {
        info!(store_id = %id, "Store deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Store {id} not found")))
    }
}

/// Run a sync. The body is optional; without it every resource is synced.
#[instrument(skip(state, body))]
async fn sync(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<StoreId>,
    body: Bytes,
) -> Result<Json<SyncRun>, AppError> {
    let request: SyncRequest = if body.iter().all(u8::is_ascii_whitespace) {
        SyncRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid sync request: {e}")))?
    };

    let store = load_store(&state, id).await?;
    let client = ShopifyClient::for_store(state.http().clone(), &store);
    let run = sync_store(
        state.pool(),
        &client,
        &store,
        &request.resources,
        state.config().shopify.page_size,
    )
    .await?;

    Ok(Json(run))
}

async fn list_syncs(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<StoreId>,
) -> Result<Json<Vec<SyncRun>>, AppError> {
    let store = load_store(&state, id).await?;
    let runs = SyncRunRepository::new(state.pool())
        .list_for_store(store.id, RECENT_SYNC_RUNS)
        .await?;
    Ok(Json(runs))
}

/// A single run, only when it belongs to the store in the path.
async fn get_sync(
    State(state): State<AppState>,
    ApiPath((id, run_id)): ApiPath<(StoreId, SyncRunId)>,
) -> Result<Json<SyncRun>, AppError> {
    let store = load_store(&state, id).await?;
    SyncRunRepository::new(state.pool())
        .get(run_id)
        .await?
        .filter(|run| run.store_id == store.id)
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Sync run {run_id} not found")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{Method, StatusCode};

    use super::super::test_support::{json, send};

    #[tokio::test]
    async fn test_create_store_rejects_invalid_domain() {
        let response = send(
            Method::POST,
            "/api/stores",
            Some(r#"{"shop_domain": "acme store", "access_token": "shpat_3f9a1c7e5b2d4f60"}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json(response).await;
        assert!(body["detail"].as_str().unwrap().contains("invalid character"));
    }

    #[tokio::test]
    async fn test_create_store_rejects_placeholder_token() {
        let response = send(
            Method::POST,
            "/api/stores",
            Some(r#"{"shop_domain": "acme", "access_token": "changeme"}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_store_rejects_malformed_json() {
        let response = send(Method::POST, "/api/stores", Some(r#"{"shop_domain": 5}"#)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json(response).await["detail"].is_string());
    }

    #[tokio::test]
    async fn test_store_id_must_be_numeric() {
        let response = send(Method::GET, "/api/stores/acme", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json(response).await["detail"].is_string());
    }

    #[tokio::test]
    async fn test_sync_run_id_must_be_uuid() {
        let response = send(Method::GET, "/api/stores/1/syncs/42", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json(response).await["detail"].is_string());
    }

    #[tokio::test]
    async fn test_sync_rejects_unknown_resource() {
        let response = send(
            Method::POST,
            "/api/stores/1/sync",
            Some(r#"{"resources": ["products", "invoices"]}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_token_update_rejects_short_token() {
        let response = send(
            Method::PUT,
            "/api/stores/1/token",
            Some(r#"{"access_token": "short"}"#),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

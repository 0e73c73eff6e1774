//! Unified error handling for the HTTP API.
//!
//! Every handler returns `Result<_, AppError>`; errors render as
//! `{"detail": "..."}` with a matching status code.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::{InsightsError, SyncError};
use crate::shopify::ShopifyError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(RepositoryError),

    /// Shopify API operation failed.
    #[error("External service error: {0}")]
    Shopify(#[from] ShopifyError),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Caller could not be authenticated, or the target storefront refused us.
    #[error("{0}")]
    Unauthorized(String),

    /// Unique constraint or state conflict.
    #[error("{0}")]
    Conflict(String),

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("Not found".to_string()),
            RepositoryError::Conflict(message) => Self::Conflict(message),
            other => Self::Database(other),
        }
    }
}

impl From<SyncError> for AppError {
    fn from(err: SyncError) -> Self {
        match err {
            SyncError::Shopify(e) => Self::Shopify(e),
            SyncError::Database(e) => e.into(),
        }
    }
}

impl From<InsightsError> for AppError {
    fn from(err: InsightsError) -> Self {
        match err {
            InsightsError::InvalidUrl(e) => Self::BadRequest(e.to_string()),
            InsightsError::Unreachable(_) => Self::Unauthorized(
                "Website not reachable or not a valid Shopify storefront".to_string(),
            ),
            InsightsError::NotFound(id) => Self::NotFound(format!("Brand {id} not found")),
            InsightsError::Database(e) => e.into(),
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Shopify(ShopifyError::RateLimited(_)) => StatusCode::TOO_MANY_REQUESTS,
            Self::Shopify(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log server errors with Sentry
        if matches!(self, Self::Database(_) | Self::Shopify(_))
            && !matches!(self, Self::Shopify(ShopifyError::RateLimited(_)))
        {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let detail = match &self {
            Self::Database(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        let mut response = (status, Json(json!({ "detail": detail }))).into_response();
        if let Self::Shopify(ShopifyError::RateLimited(secs)) = self
            && let Ok(value) = HeaderValue::from_str(&secs.to_string())
        {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        response
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    async fn get_detail(err: AppError) -> String {
        let body = axum::body::to_bytes(err.into_response().into_body(), usize::MAX)
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        value["detail"].as_str().unwrap_or_default().to_string()
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Conflict("test".to_string())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::Database(
                sqlx::Error::PoolTimedOut
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Shopify(ShopifyError::Unauthorized(
                "bad token".to_string()
            ))),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_rate_limit_sets_retry_after() {
        let response = AppError::Shopify(ShopifyError::RateLimited(7)).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "7");
    }

    #[test]
    fn test_repository_errors_map_to_client_errors() {
        assert!(matches!(
            AppError::from(RepositoryError::NotFound),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(RepositoryError::Conflict("dup".to_string())),
            AppError::Conflict(_)
        ));
        assert!(matches!(
            AppError::from(RepositoryError::DataCorruption("bad".to_string())),
            AppError::Database(_)
        ));
    }

    #[test]
    fn test_unreachable_storefront_is_unauthorized() {
        let err = AppError::from(InsightsError::Unreachable("https://acme.com".to_string()));
        assert_eq!(get_status(err), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_internal_details_are_hidden() {
        let detail = get_detail(AppError::Database(RepositoryError::DataCorruption(
            "secret".to_string(),
        )))
        .await;
        assert_eq!(detail, "Internal server error");

        let detail = get_detail(AppError::BadRequest("limit must be positive".to_string())).await;
        assert_eq!(detail, "limit must be positive");
    }
}

//! Shopify Admin API fetcher.
//!
//! # Architecture
//!
//! - One [`ShopifyClient`] per registered store, built from the store's
//!   domain, API version and access token
//! - Raw GraphQL documents in [`queries`], deserialized into the wire types
//!   in [`types`]
//! - Cursor pagination through products, orders and customers
//! - [`conversions`] maps wire nodes onto database rows
//!
//! No retries: a 429 or `THROTTLED` error is surfaced as
//! [`ShopifyError::RateLimited`] with the suggested delay.

pub mod client;
pub mod conversions;
pub mod queries;
pub mod types;

pub use client::ShopifyClient;
pub use conversions::{MappingError, map_customer, map_order, map_product, parse_gid};
pub use types::*;

use thiserror::Error;

/// Errors that can occur when interacting with the Shopify Admin API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status without a more specific mapping.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Shop or resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Access token rejected.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

/// A GraphQL error returned by the Shopify Admin API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

impl GraphQLError {
    pub(crate) fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: vec![],
            path: vec![],
        }
    }
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shopify_error_display() {
        let err = ShopifyError::NotFound("acme.myshopify.com".to_string());
        assert_eq!(err.to_string(), "Not found: acme.myshopify.com");

        let err = ShopifyError::Api {
            status: 500,
            message: "oops".to_string(),
        };
        assert_eq!(err.to_string(), "API error (500): oops");
    }

    #[test]
    fn test_graphql_error_formatting() {
        let err = ShopifyError::GraphQL(vec![
            GraphQLError::message("Field not found"),
            GraphQLError::message("Invalid ID"),
        ]);
        assert_eq!(
            err.to_string(),
            "GraphQL errors: Field not found; Invalid ID"
        );
    }

    #[test]
    fn test_rate_limited_error() {
        let err = ShopifyError::RateLimited(2);
        assert_eq!(err.to_string(), "Rate limited, retry after 2 seconds");
    }
}

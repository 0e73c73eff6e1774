//! Shopify Admin GraphQL API client.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::instrument;

use shop_insights_core::ShopDomain;

use super::queries;
use super::types::{
    Connection, CustomerNode, CustomersData, OrderNode, OrdersData, ProductNode, ProductsData,
    ShopData, ShopInfo,
};
use super::{GraphQLError, GraphQLErrorLocation, ShopifyError};
use crate::models::Store;

/// Delay suggested when a 429 carries no `Retry-After` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 2;

/// Authenticated client for one store's Admin API.
///
/// Cheap to clone; the HTTP connection pool is shared with the rest of the
/// application.
#[derive(Clone)]
pub struct ShopifyClient {
    inner: Arc<ShopifyClientInner>,
}

struct ShopifyClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: SecretString,
}

impl std::fmt::Debug for ShopifyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyClient")
            .field("endpoint", &self.inner.endpoint)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// GraphQL response wrapper.
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLErrorResponse>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorResponse {
    message: String,
    #[serde(default)]
    locations: Vec<GraphQLErrorLocationResponse>,
    #[serde(default)]
    path: Vec<serde_json::Value>,
    #[serde(default)]
    extensions: Option<GraphQLErrorExtensions>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorLocationResponse {
    line: i64,
    column: i64,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorExtensions {
    code: Option<String>,
}

impl ShopifyClient {
    /// Create a client for `https://{shop}/admin/api/{version}/graphql.json`.
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        shop: &ShopDomain,
        api_version: &str,
        access_token: SecretString,
    ) -> Self {
        let endpoint = format!("https://{shop}/admin/api/{api_version}/graphql.json");
        Self::with_endpoint(http, endpoint, access_token)
    }

    /// Create a client for an explicit GraphQL endpoint.
    #[must_use]
    pub fn with_endpoint(
        http: reqwest::Client,
        endpoint: impl Into<String>,
        access_token: SecretString,
    ) -> Self {
        Self {
            inner: Arc::new(ShopifyClientInner {
                client: http,
                endpoint: endpoint.into(),
                access_token,
            }),
        }
    }

    /// Create a client from a registered store's credentials.
    #[must_use]
    pub fn for_store(http: reqwest::Client, store: &Store) -> Self {
        Self::new(
            http,
            &store.shop_domain,
            &store.api_version,
            store.access_token.clone(),
        )
    }

    /// The GraphQL endpoint this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    // =========================================================================
    // GraphQL Execution
    // =========================================================================

    /// Execute a GraphQL query.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::RateLimited` on 429 or a `THROTTLED` error.
    /// Returns `ShopifyError::Unauthorized` on 401/403.
    /// Returns `ShopifyError::NotFound` on 404.
    /// Returns `ShopifyError::Api` on any other non-success status.
    /// Returns `ShopifyError::GraphQL` if the query returns errors or no data.
    /// Returns `ShopifyError::Http` on network failures.
    #[instrument(skip(self, query, variables), fields(endpoint = %self.inner.endpoint))]
    pub async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Option<serde_json::Value>,
    ) -> Result<T, ShopifyError> {
        let body = serde_json::json!({
            "query": query,
            "variables": variables.unwrap_or(serde_json::Value::Null)
        });

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header("X-Shopify-Access-Token", self.inner.access_token.expose_secret())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(parse_retry_after)
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(ShopifyError::RateLimited(retry_after));
        }

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            let message = response.text().await.unwrap_or_default();
            return Err(ShopifyError::Unauthorized(non_empty_or(
                message,
                "Access token rejected",
            )));
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ShopifyError::NotFound(self.inner.endpoint.clone()));
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ShopifyError::Api {
                status: status.as_u16(),
                message: non_empty_or(message, status.canonical_reason().unwrap_or("error")),
            });
        }

        let bytes = response.bytes().await?;
        let graphql_response: GraphQLResponse<T> = serde_json::from_slice(&bytes)?;

        if let Some(errors) = graphql_response.errors
            && !errors.is_empty()
        {
            let throttled = errors.iter().any(|e| {
                e.extensions
                    .as_ref()
                    .and_then(|ext| ext.code.as_deref())
                    .is_some_and(|code| code == "THROTTLED")
            });
            if throttled {
                return Err(ShopifyError::RateLimited(DEFAULT_RETRY_AFTER_SECS));
            }

            let converted_errors: Vec<GraphQLError> = errors
                .into_iter()
                .map(|e| GraphQLError {
                    message: e.message,
                    locations: e
                        .locations
                        .into_iter()
                        .map(|l| GraphQLErrorLocation {
                            line: l.line,
                            column: l.column,
                        })
                        .collect(),
                    path: e.path,
                })
                .collect();
            return Err(ShopifyError::GraphQL(converted_errors));
        }

        graphql_response
            .data
            .ok_or_else(|| ShopifyError::GraphQL(vec![GraphQLError::message("No data in response")]))
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Fetch the shop identity. Used to verify credentials.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError` if the request fails.
    #[instrument(skip(self))]
    pub async fn shop(&self) -> Result<ShopInfo, ShopifyError> {
        let data: ShopData = self.execute(queries::SHOP, None).await?;
        Ok(data.shop)
    }

    /// Fetch one page of products.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError` if the request fails.
    pub async fn products_page(
        &self,
        first: u16,
        after: Option<&str>,
    ) -> Result<Connection<ProductNode>, ShopifyError> {
        self.page(queries::PRODUCTS, first, after, |d: ProductsData| d.products)
            .await
    }

    /// Fetch one page of orders (with up to 100 line items each).
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError` if the request fails.
    pub async fn orders_page(
        &self,
        first: u16,
        after: Option<&str>,
    ) -> Result<Connection<OrderNode>, ShopifyError> {
        self.page(queries::ORDERS, first, after, |d: OrdersData| d.orders)
            .await
    }

    /// Fetch one page of customers.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError` if the request fails.
    pub async fn customers_page(
        &self,
        first: u16,
        after: Option<&str>,
    ) -> Result<Connection<CustomerNode>, ShopifyError> {
        self.page(queries::CUSTOMERS, first, after, |d: CustomersData| d.customers)
            .await
    }

    /// Fetch every product, following cursors.
    ///
    /// # Errors
    ///
    /// Returns the first `ShopifyError` encountered; nodes from earlier
    /// pages are discarded.
    #[instrument(skip(self))]
    pub async fn all_products(&self, page_size: u16) -> Result<Vec<ProductNode>, ShopifyError> {
        self.paginate(queries::PRODUCTS, page_size, |d: ProductsData| d.products)
            .await
    }

    /// Fetch every order, following cursors.
    ///
    /// # Errors
    ///
    /// Returns the first `ShopifyError` encountered.
    #[instrument(skip(self))]
    pub async fn all_orders(&self, page_size: u16) -> Result<Vec<OrderNode>, ShopifyError> {
        self.paginate(queries::ORDERS, page_size, |d: OrdersData| d.orders)
            .await
    }

    /// Fetch every customer, following cursors.
    ///
    /// # Errors
    ///
    /// Returns the first `ShopifyError` encountered.
    #[instrument(skip(self))]
    pub async fn all_customers(&self, page_size: u16) -> Result<Vec<CustomerNode>, ShopifyError> {
        self.paginate(queries::CUSTOMERS, page_size, |d: CustomersData| d.customers)
            .await
    }

    async fn page<D, N>(
        &self,
        query: &str,
        first: u16,
        after: Option<&str>,
        extract: fn(D) -> Connection<N>,
    ) -> Result<Connection<N>, ShopifyError>
    where
        D: DeserializeOwned,
    {
        let variables = serde_json::json!({
            "first": first,
            "after": after,
        });
        let data: D = self.execute(query, Some(variables)).await?;
        Ok(extract(data))
    }

    async fn paginate<D, N>(
        &self,
        query: &str,
        page_size: u16,
        extract: fn(D) -> Connection<N>,
    ) -> Result<Vec<N>, ShopifyError>
    where
        D: DeserializeOwned,
    {
        let mut nodes = Vec::new();
        let mut after: Option<String> = None;
        let mut pages = 0_u32;

        loop {
            let page = self.page(query, page_size, after.as_deref(), extract).await?;
            pages += 1;
            nodes.extend(page.nodes);

            if !page.page_info.has_next_page {
                break;
            }
            match page.page_info.end_cursor {
                Some(cursor) => after = Some(cursor),
                None => {
                    tracing::warn!(
                        pages,
                        "Page reports more results but has no end cursor; stopping"
                    );
                    break;
                }
            }
        }

        tracing::debug!(pages, nodes = nodes.len(), "Pagination complete");
        Ok(nodes)
    }
}

/// Parse `Retry-After` seconds; Shopify sometimes sends fractions (`"2.0"`).
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn parse_retry_after(value: &str) -> Option<u64> {
    let secs = value.trim().parse::<f64>().ok()?;
    secs.is_finite().then(|| secs.ceil().max(0.0) as u64)
}

fn non_empty_or(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

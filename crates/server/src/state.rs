//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::services::InsightsService;
use crate::storefront::{PageCache, new_page_cache};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    pool: PgPool,
    http: reqwest::Client,
    page_cache: PageCache,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Builds the shared outbound HTTP client (timeout and `User-Agent`
    /// from the scraper settings) and the storefront page cache.
    ///
    /// # Errors
    ///
    /// Returns `reqwest::Error` if the HTTP client cannot be built.
    pub fn new(config: AppConfig, pool: PgPool) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.scraper.timeout)
            .user_agent(config.scraper.user_agent.clone())
            .build()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                http,
                page_cache: new_page_cache(),
            }),
        })
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the shared outbound HTTP client.
    #[must_use]
    pub fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    /// Brand insights service backed by the shared pool, client and cache.
    #[must_use]
    pub fn insights(&self) -> InsightsService {
        InsightsService::new(
            self.inner.pool.clone(),
            self.inner.http.clone(),
            self.inner.page_cache.clone(),
            self.inner.config.scraper.max_product_pages,
        )
    }
}

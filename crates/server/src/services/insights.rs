//! Public brand insights: scrape → parse → persist.

use sqlx::PgPool;
use thiserror::Error;
use tracing::{info, instrument, warn};

use shop_insights_core::BrandId;

use crate::db::{BrandRepository, CompetitorRepository, RepositoryError};
use crate::models::{BrandContext, CompetitorResponse};
use crate::storefront::{BrandParser, InvalidUrl, PageCache, StorefrontScraper};

/// Errors from fetching or serving brand insights.
#[derive(Debug, Error)]
pub enum InsightsError {
    #[error(transparent)]
    InvalidUrl(#[from] InvalidUrl),

    #[error("website {0} is not reachable")]
    Unreachable(String),

    #[error("brand {0} not found")]
    NotFound(BrandId),

    #[error("database error: {0}")]
    Database(#[from] RepositoryError),
}

impl From<sqlx::Error> for InsightsError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(RepositoryError::Database(err))
    }
}

/// Fetches and persists brand contexts.
#[derive(Clone)]
pub struct InsightsService {
    pool: PgPool,
    http: reqwest::Client,
    cache: PageCache,
    max_product_pages: u32,
}

impl InsightsService {
    /// Create a new insights service.
    #[must_use]
    pub const fn new(
        pool: PgPool,
        http: reqwest::Client,
        cache: PageCache,
        max_product_pages: u32,
    ) -> Self {
        Self {
            pool,
            http,
            cache,
            max_product_pages,
        }
    }

    /// Scrape a storefront and upsert its brand context.
    ///
    /// Every attempt on a known brand is recorded in the crawl log.
    ///
    /// # Errors
    ///
    /// Returns `InsightsError::InvalidUrl` if the URL cannot be normalized,
    /// `InsightsError::Unreachable` if the homepage cannot be fetched and
    /// `InsightsError::Database` if persisting fails.
    #[instrument(skip(self))]
    pub async fn fetch_brand_insights(
        &self,
        website_url: &str,
    ) -> Result<BrandContext, InsightsError> {
        let scraper = StorefrontScraper::new(
            self.http.clone(),
            website_url,
            self.cache.clone(),
            self.max_product_pages,
        )?;
        let brands = BrandRepository::new(&self.pool);

        let mut probe = scraper.probe("/").await;
        if !probe.ok {
            warn!(
                base_url = scraper.base_url(),
                status = ?probe.status_code,
                note = ?probe.note,
                "Storefront unreachable"
            );
            if let Some(brand_id) = brands.find_by_url(scraper.base_url()).await? {
                brands.log_crawl(brand_id, &probe).await?;
            }
            return Err(InsightsError::Unreachable(scraper.base_url().to_string()));
        }

        let bundle = scraper.scrape_all().await;
        let mut context =
            BrandParser::build_brand_context(scraper.base_url(), bundle.title.clone(), &bundle);

        let mut tx = self.pool.begin().await?;
        let brand_id = BrandRepository::upsert_brand_context(&mut *tx, &context).await?;
        tx.commit().await?;

        probe.note = Some(format!(
            "{} products, {} faqs, {} links",
            context.product_catalog.len(),
            context.faqs.len(),
            context.important_links.len()
        ));
        brands.log_crawl(brand_id, &probe).await?;

        info!(
            %brand_id,
            base_url = scraper.base_url(),
            products = context.product_catalog.len(),
            heroes = context.hero_products.len(),
            "Brand insights stored"
        );

        context.brand_id = Some(brand_id);
        Ok(context)
    }
}

/// A brand's stored context together with its linked competitors.
///
/// Competitors deleted since they were linked are left out.
///
/// # Errors
///
/// Returns `InsightsError::NotFound` if the brand does not exist.
/// Returns `InsightsError::Database` if a query fails.
#[instrument(skip(pool))]
pub async fn competitors(
    pool: &PgPool,
    brand_id: BrandId,
) -> Result<CompetitorResponse, InsightsError> {
    let brands = BrandRepository::new(pool);
    let brand = brands
        .get_context(brand_id)
        .await?
        .ok_or(InsightsError::NotFound(brand_id))?;

    let mut competitors = Vec::new();
    for competitor_id in CompetitorRepository::new(pool)
        .competitor_ids(brand_id)
        .await?
    {
        if let Some(context) = brands.get_context(competitor_id).await? {
            competitors.push(context);
        }
    }

    Ok(CompetitorResponse { brand, competitors })
}

//! Brand context scraped from a public storefront.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use shop_insights_core::{BrandId, ContactType, LinkType, PolicyType, SocialPlatform};

/// Everything known about one public storefront.
#[derive(Debug, Clone, Serialize)]
pub struct BrandContext {
    /// Set once the context has been persisted.
    pub brand_id: Option<BrandId>,
    pub brand_name: Option<String>,
    /// Normalized site root, e.g. `https://acme.com`.
    pub website_url: String,
    pub about: Option<String>,
    pub product_catalog: Vec<BrandProduct>,
    /// Subset of the catalog linked from the homepage.
    pub hero_products: Vec<BrandProduct>,
    pub policies: Vec<Policy>,
    pub faqs: Vec<Faq>,
    pub social_handles: Vec<SocialHandle>,
    pub contact_details: Vec<ContactDetail>,
    pub important_links: Vec<ImportantLink>,
    pub scraped_at: DateTime<Utc>,
}

/// A product from the public `/products.json` catalog.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct BrandProduct {
    pub shopify_product_id: Option<String>,
    pub title: String,
    pub url: Option<String>,
    pub handle: Option<String>,
    pub price: Option<Decimal>,
    pub currency: Option<String>,
    pub is_hero: bool,
    pub image_url: Option<String>,
    pub vendor: Option<String>,
    pub product_type: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Policy {
    #[serde(rename = "type")]
    pub policy_type: PolicyType,
    pub url: Option<String>,
    /// Visible page text; `None` for URL-only placeholders.
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Faq {
    pub question: String,
    pub answer: Option<String>,
    /// Page the FAQ was found on.
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct SocialHandle {
    pub platform: SocialPlatform,
    pub handle_or_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ContactDetail {
    #[serde(rename = "type")]
    pub contact_type: ContactType,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct ImportantLink {
    pub link_type: LinkType,
    pub url: String,
    pub label: Option<String>,
}

/// Row in the brand list.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct BrandSummary {
    pub id: BrandId,
    pub name: Option<String>,
    pub website_url: String,
    pub product_count: i64,
    pub updated_at: DateTime<Utc>,
}

/// A brand together with the contexts of its linked competitors.
#[derive(Debug, Clone, Serialize)]
pub struct CompetitorResponse {
    pub brand: BrandContext,
    pub competitors: Vec<BrandContext>,
}

/// Result of one storefront fetch, recorded in the crawl log.
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub source_url: String,
    pub ok: bool,
    pub status_code: Option<i32>,
    pub note: Option<String>,
}

//! Public storefront insights.
//!
//! Any Shopify storefront publishes its catalog at `/products.json` and a
//! handful of conventional pages (policies, FAQ, contact, about). This
//! module fetches those without credentials and maps them onto a
//! [`BrandContext`](crate::models::BrandContext).
//!
//! - [`scraper`] - best-effort page fetcher with a shared `moka` cache
//! - [`html`] - regex-based text, anchor and heading extraction
//! - [`parser`] - scrape bundle → brand context

pub mod html;
pub mod parser;
pub mod scraper;
pub mod types;

pub use parser::BrandParser;
pub use scraper::{InvalidUrl, PageCache, StorefrontScraper, new_page_cache, normalize_base_url};
pub use types::ScrapeBundle;

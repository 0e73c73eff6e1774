//! Brand repository.
//!
//! A brand context is persisted as one `brands` row plus child rows, each
//! child table with its own upsert key:
//!
//! | Child | Key | Strategy |
//! |-------|-----|----------|
//! | products | lowercased handle, else lowercased title | upsert |
//! | policies | policy type | upsert, keeping stored content over a placeholder |
//! | FAQs | - | replace all |
//! | social handles | platform | upsert |
//! | contact details | contact type | upsert |
//! | important links | link type | upsert |

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use shop_insights_core::BrandId;

use super::RepositoryError;
use crate::models::{
    BrandContext, BrandProduct, BrandSummary, ContactDetail, CrawlOutcome, Faq, ImportantLink,
    Policy, SocialHandle,
};

/// Internal row type for the `brands` table.
#[derive(sqlx::FromRow)]
struct BrandRow {
    id: BrandId,
    name: Option<String>,
    website_url: String,
    about: Option<String>,
    updated_at: DateTime<Utc>,
}

/// Upsert key of a catalog product.
#[must_use]
pub fn product_key(product: &BrandProduct) -> String {
    product
        .handle
        .as_deref()
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| product.title.trim())
        .to_lowercase()
}

/// Repository for scraped brands.
pub struct BrandRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BrandRepository<'a> {
    /// Create a new brand repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a brand context and all of its children.
    ///
    /// Intended to run inside a transaction so a partial write never
    /// becomes visible.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails.
    pub async fn upsert_brand_context(
        conn: &mut PgConnection,
        context: &BrandContext,
    ) -> Result<BrandId, RepositoryError> {
        let brand_id: BrandId = sqlx::query_scalar(
            r"
            INSERT INTO brands (website_url, name, about)
            VALUES ($1, $2, $3)
            ON CONFLICT (website_url) DO UPDATE SET
                name = COALESCE(EXCLUDED.name, brands.name),
                about = COALESCE(EXCLUDED.about, brands.about),
                updated_at = NOW()
            RETURNING id
            ",
        )
        .bind(&context.website_url)
        .bind(&context.brand_name)
        .bind(&context.about)
        .fetch_one(&mut *conn)
        .await?;

        for product in &context.product_catalog {
            sqlx::query(
                r"
                INSERT INTO brand_products (
                    brand_id, product_key, shopify_product_id, title, handle, url, price,
                    currency, is_hero, image_url, vendor, product_type, description
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                ON CONFLICT (brand_id, product_key) DO UPDATE SET
                    shopify_product_id = EXCLUDED.shopify_product_id,
                    title = EXCLUDED.title,
                    handle = EXCLUDED.handle,
                    url = EXCLUDED.url,
                    price = EXCLUDED.price,
                    currency = EXCLUDED.currency,
                    is_hero = EXCLUDED.is_hero,
                    image_url = EXCLUDED.image_url,
                    vendor = EXCLUDED.vendor,
                    product_type = EXCLUDED.product_type,
                    description = EXCLUDED.description,
                    updated_at = NOW()
                ",
            )
            .bind(brand_id)
            .bind(product_key(product))
            .bind(&product.shopify_product_id)
            .bind(&product.title)
            .bind(&product.handle)
            .bind(&product.url)
            .bind(product.price)
            .bind(&product.currency)
            .bind(product.is_hero)
            .bind(&product.image_url)
            .bind(&product.vendor)
            .bind(&product.product_type)
            .bind(&product.description)
            .execute(&mut *conn)
            .await?;
        }

        for policy in &context.policies {
            sqlx::query(
                r"
                INSERT INTO brand_policies (brand_id, policy_type, url, content)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (brand_id, policy_type) DO UPDATE SET
                    url = COALESCE(EXCLUDED.url, brand_policies.url),
                    content = COALESCE(EXCLUDED.content, brand_policies.content),
                    updated_at = NOW()
                ",
            )
            .bind(brand_id)
            .bind(policy.policy_type)
            .bind(&policy.url)
            .bind(&policy.content)
            .execute(&mut *conn)
            .await?;
        }

        sqlx::query("DELETE FROM brand_faqs WHERE brand_id = $1")
            .bind(brand_id)
            .execute(&mut *conn)
            .await?;

        for (position, faq) in (0_i32..).zip(&context.faqs) {
            sqlx::query(
                r"
                INSERT INTO brand_faqs (brand_id, position, question, answer, url)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(brand_id)
            .bind(position)
            .bind(&faq.question)
            .bind(&faq.answer)
            .bind(&faq.url)
            .execute(&mut *conn)
            .await?;
        }

        for social in &context.social_handles {
            sqlx::query(
                r"
                INSERT INTO brand_social_handles (brand_id, platform, handle_or_url)
                VALUES ($1, $2, $3)
                ON CONFLICT (brand_id, platform) DO UPDATE SET
                    handle_or_url = EXCLUDED.handle_or_url
                ",
            )
            .bind(brand_id)
            .bind(social.platform)
            .bind(&social.handle_or_url)
            .execute(&mut *conn)
            .await?;
        }

        for contact in &context.contact_details {
            sqlx::query(
                r"
                INSERT INTO brand_contact_details (brand_id, contact_type, value)
                VALUES ($1, $2, $3)
                ON CONFLICT (brand_id, contact_type) DO UPDATE SET
                    value = EXCLUDED.value
                ",
            )
            .bind(brand_id)
            .bind(contact.contact_type)
            .bind(&contact.value)
            .execute(&mut *conn)
            .await?;
        }

        for link in &context.important_links {
            sqlx::query(
                r"
                INSERT INTO brand_links (brand_id, link_type, url, label)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (brand_id, link_type) DO UPDATE SET
                    url = EXCLUDED.url,
                    label = EXCLUDED.label
                ",
            )
            .bind(brand_id)
            .bind(link.link_type)
            .bind(&link.url)
            .bind(&link.label)
            .execute(&mut *conn)
            .await?;
        }

        Ok(brand_id)
    }

    /// Load a stored brand context.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_context(&self, id: BrandId) -> Result<Option<BrandContext>, RepositoryError> {
        let brand: Option<BrandRow> = sqlx::query_as(
            "SELECT id, name, website_url, about, updated_at FROM brands WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        let Some(brand) = brand else {
            return Ok(None);
        };

        let product_catalog: Vec<BrandProduct> = sqlx::query_as(
            r"
            SELECT shopify_product_id, title, url, handle, price, currency, is_hero,
                   image_url, vendor, product_type, description
            FROM brand_products
            WHERE brand_id = $1
            ORDER BY id
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        let policies: Vec<Policy> = sqlx::query_as(
            r"
            SELECT policy_type, url, content FROM brand_policies
            WHERE brand_id = $1
            ORDER BY policy_type
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        let faqs: Vec<Faq> = sqlx::query_as(
            "SELECT question, answer, url FROM brand_faqs WHERE brand_id = $1 ORDER BY position",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        let social_handles: Vec<SocialHandle> = sqlx::query_as(
            r"
            SELECT platform, handle_or_url FROM brand_social_handles
            WHERE brand_id = $1
            ORDER BY platform
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        let contact_details: Vec<ContactDetail> = sqlx::query_as(
            r"
            SELECT contact_type, value FROM brand_contact_details
            WHERE brand_id = $1
            ORDER BY contact_type
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        let important_links: Vec<ImportantLink> = sqlx::query_as(
            "SELECT link_type, url, label FROM brand_links WHERE brand_id = $1 ORDER BY link_type",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        let hero_products = product_catalog
            .iter()
            .filter(|p| p.is_hero)
            .cloned()
            .collect();

        Ok(Some(BrandContext {
            brand_id: Some(brand.id),
            brand_name: brand.name,
            website_url: brand.website_url,
            about: brand.about,
            product_catalog,
            hero_products,
            policies,
            faqs,
            social_handles,
            contact_details,
            important_links,
            scraped_at: brand.updated_at,
        }))
    }

    /// Find a brand ID by its normalized website URL.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_by_url(&self, website_url: &str) -> Result<Option<BrandId>, RepositoryError> {
        let id = sqlx::query_scalar("SELECT id FROM brands WHERE website_url = $1")
            .bind(website_url)
            .fetch_optional(self.pool)
            .await?;

        Ok(id)
    }

    /// Whether a brand with this ID exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: BrandId) -> Result<bool, RepositoryError> {
        let exists = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM brands WHERE id = $1)")
            .bind(id)
            .fetch_one(self.pool)
            .await?;

        Ok(exists)
    }

    /// List brands with their catalog sizes, most recently updated first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<BrandSummary>, RepositoryError> {
        let brands = sqlx::query_as(
            r"
            SELECT b.id, b.name, b.website_url, b.updated_at,
                   (SELECT COUNT(*) FROM brand_products p WHERE p.brand_id = b.id) AS product_count
            FROM brands b
            ORDER BY b.updated_at DESC, b.id DESC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(brands)
    }

    /// Delete a brand and all of its children.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, id: BrandId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM brands WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Append a crawl log entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn log_crawl(
        &self,
        brand_id: BrandId,
        outcome: &CrawlOutcome,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            INSERT INTO crawl_logs (brand_id, source_url, ok, status_code, note)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(brand_id)
        .bind(&outcome.source_url)
        .bind(outcome.ok)
        .bind(outcome.status_code)
        .bind(&outcome.note)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}

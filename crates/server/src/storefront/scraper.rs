//! Fetcher for public Shopify storefront pages.
//!
//! Every fetch is best effort: transport errors, non-200 responses and
//! undecodable bodies all yield `None` and are logged at debug level.
//! Successful bodies are cached by absolute URL in a shared [`PageCache`].

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use moka::future::Cache;
use regex::Regex;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use shop_insights_core::{PolicyType, SocialPlatform};

use super::html;
use super::types::{ProductsPage, RawContact, RawFaq, ScrapeBundle, StorefrontProduct};
use crate::models::CrawlOutcome;

/// Page bodies keyed by absolute URL.
pub type PageCache = Cache<String, Arc<str>>;

/// Products requested per `/products.json` page (Shopify's maximum).
const PRODUCTS_PAGE_LIMIT: u32 = 250;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("Invalid regex")
});

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\+?\d[\d\-\s]{7,}\d").expect("Invalid regex"));

/// A website URL that cannot be scraped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid website URL '{0}'")]
pub struct InvalidUrl(pub String);

/// Build the shared page cache (5-minute TTL, 1000 pages).
#[must_use]
pub fn new_page_cache() -> PageCache {
    Cache::builder()
        .max_capacity(1000)
        .time_to_live(Duration::from_secs(300)) // 5 minutes
        .build()
}

/// Normalize a user-supplied website into a site root.
///
/// Adds `https://` when no scheme is given, lowercases scheme and host, and
/// drops any query, fragment and trailing `/`. Equivalent spellings of a site
/// normalize to the same string, which keys both the cache and brand lookups.
///
/// # Errors
///
/// Returns `InvalidUrl` unless the result is an `http`/`https` URL with a
/// host.
pub fn normalize_base_url(input: &str) -> Result<String, InvalidUrl> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(InvalidUrl(input.to_string()));
    }

    let lower = trimmed.to_ascii_lowercase();
    let with_scheme = if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&with_scheme).map_err(|_| InvalidUrl(input.to_string()))?;
    let host = match url.host_str() {
        Some(host) if !host.is_empty() && matches!(url.scheme(), "http" | "https") => {
            host.to_ascii_lowercase()
        }
        _ => return Err(InvalidUrl(input.to_string())),
    };

    let port = url.port().map(|port| format!(":{port}")).unwrap_or_default();
    let normalized = format!("{}://{host}{port}{}", url.scheme(), url.path());
    Ok(normalized.trim_end_matches('/').to_string())
}

/// Scraper for one storefront.
#[derive(Clone)]
pub struct StorefrontScraper {
    http: reqwest::Client,
    base_url: String,
    base: Url,
    cache: PageCache,
    max_product_pages: u32,
}

impl std::fmt::Debug for StorefrontScraper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorefrontScraper")
            .field("base_url", &self.base_url)
            .field("max_product_pages", &self.max_product_pages)
            .finish_non_exhaustive()
    }
}

impl StorefrontScraper {
    /// Create a scraper for a website.
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl` if the website cannot be normalized.
    pub fn new(
        http: reqwest::Client,
        website_url: &str,
        cache: PageCache,
        max_product_pages: u32,
    ) -> Result<Self, InvalidUrl> {
        let base_url = normalize_base_url(website_url)?;
        let base = Url::parse(&base_url).map_err(|_| InvalidUrl(website_url.to_string()))?;

        Ok(Self {
            http,
            base_url,
            base,
            cache,
            max_product_pages: max_product_pages.max(1),
        })
    }

    /// The normalized site root, without a trailing `/`.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn absolute(&self, path: &str) -> Option<Url> {
        self.base.join(path).ok()
    }

    /// Fetch a page and report how it went.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn probe(&self, path: &str) -> CrawlOutcome {
        let source_url = self
            .absolute(path)
            .map_or_else(|| format!("{}{path}", self.base_url), String::from);

        if self.cache.contains_key(&source_url) {
            return CrawlOutcome {
                source_url,
                ok: true,
                status_code: Some(200),
                note: Some("cached".to_string()),
            };
        }

        match self.http.get(&source_url).send().await {
            Ok(response) => {
                let status = response.status();
                let ok = status == reqwest::StatusCode::OK;
                let note = if ok {
                    match response.text().await {
                        Ok(body) => {
                            self.cache.insert(source_url.clone(), Arc::from(body)).await;
                            None
                        }
                        Err(e) => Some(format!("failed to read body: {e}")),
                    }
                } else {
                    Some(format!("unexpected status {status}"))
                };
                CrawlOutcome {
                    ok: ok && note.is_none(),
                    status_code: Some(i32::from(status.as_u16())),
                    note,
                    source_url,
                }
            }
            Err(e) => {
                debug!(url = %source_url, error = %e, "Storefront request failed");
                CrawlOutcome {
                    source_url,
                    ok: false,
                    status_code: None,
                    note: Some(e.to_string()),
                }
            }
        }
    }

    /// Whether the homepage can be fetched.
    pub async fn is_reachable(&self) -> bool {
        self.probe("/").await.ok
    }

    /// Fetch a page body relative to the site root.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn fetch_html(&self, path: &str) -> Option<Arc<str>> {
        let url = self.absolute(path)?.to_string();

        if let Some(body) = self.cache.get(&url).await {
            debug!(%url, "Cache hit for storefront page");
            return Some(body);
        }

        let response = match self.http.get(&url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!(%url, error = %e, "Storefront request failed");
                return None;
            }
        };

        if response.status() != reqwest::StatusCode::OK {
            debug!(%url, status = %response.status(), "Storefront page unavailable");
            return None;
        }

        let body: Arc<str> = match response.text().await {
            Ok(text) => Arc::from(text),
            Err(e) => {
                debug!(%url, error = %e, "Failed to read storefront body");
                return None;
            }
        };

        self.cache.insert(url, Arc::clone(&body)).await;
        Some(body)
    }

    /// Fetch and decode a JSON document relative to the site root.
    pub async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        let body = self.fetch_html(path).await?;
        serde_json::from_str(&body)
            .map_err(|e| debug!(path, error = %e, "Storefront JSON did not decode"))
            .ok()
    }

    /// First of `paths` that can be fetched.
    async fn fetch_first(&self, paths: &[&str]) -> Option<Arc<str>> {
        for path in paths {
            if let Some(body) = self.fetch_html(path).await {
                return Some(body);
            }
        }
        None
    }

    /// The public catalog, page by page until an empty page or the page cap.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn get_products(&self) -> Vec<StorefrontProduct> {
        let mut products = Vec::new();

        for page in 1..=self.max_product_pages {
            let path = format!("/products.json?limit={PRODUCTS_PAGE_LIMIT}&page={page}");
            let Some(batch) = self.fetch_json::<ProductsPage>(&path).await else {
                break;
            };
            if batch.products.is_empty() {
                break;
            }
            products.extend(batch.products);
        }

        debug!(count = products.len(), "Fetched storefront catalog");
        products
    }

    /// Visible text of a policy page.
    pub async fn get_policy(&self, policy_type: PolicyType) -> Option<String> {
        let body = self.fetch_html(&policy_type.path()).await?;
        Some(html::visible_text(&body)).filter(|text| !text.is_empty())
    }

    /// Every policy page that could be fetched, keyed by type.
    pub async fn get_policies(&self) -> BTreeMap<PolicyType, String> {
        let [a, b, c, d, e] = PolicyType::ALL;
        let (ra, rb, rc, rd, re) = tokio::join!(
            self.get_policy(a),
            self.get_policy(b),
            self.get_policy(c),
            self.get_policy(d),
            self.get_policy(e),
        );

        [(a, ra), (b, rb), (c, rc), (d, rd), (e, re)]
            .into_iter()
            .filter_map(|(policy_type, text)| text.map(|text| (policy_type, text)))
            .collect()
    }

    /// Question/answer pairs from the FAQ page.
    pub async fn get_faqs(&self) -> Vec<RawFaq> {
        let Some(body) = self.fetch_first(&["/pages/faqs", "/pages/faq"]).await else {
            return Vec::new();
        };

        html::heading_paragraphs(&body)
            .into_iter()
            .map(|(question, answer)| RawFaq { question, answer })
            .collect()
    }

    /// Social profile links on the homepage; the last link per platform wins.
    pub async fn get_social_handles(&self) -> BTreeMap<String, String> {
        let Some(body) = self.fetch_html("/").await else {
            return BTreeMap::new();
        };

        html::anchor_hrefs(&body)
            .into_iter()
            .filter_map(|href| {
                SocialPlatform::from_url(&href).map(|platform| (platform.as_str().to_string(), href))
            })
            .collect()
    }

    /// First email address and phone number on the contact page.
    pub async fn get_contact_details(&self) -> RawContact {
        let Some(body) = self.fetch_first(&["/pages/contact", "/contact"]).await else {
            return RawContact::default();
        };

        let text = html::visible_text(&body);
        RawContact {
            email: EMAIL_RE.find(&text).map(|m| m.as_str().to_string()),
            phone: PHONE_RE.find(&text).map(|m| m.as_str().trim().to_string()),
        }
    }

    /// Visible text of the about page.
    pub async fn get_about_page(&self) -> Option<String> {
        let body = self.fetch_first(&["/pages/about", "/about"]).await?;
        Some(html::visible_text(&body)).filter(|text| !text.is_empty())
    }

    /// Unique homepage links, sorted, root-relative ones made absolute.
    pub async fn get_links(&self) -> Vec<String> {
        let Some(body) = self.fetch_html("/").await else {
            return Vec::new();
        };

        html::anchor_hrefs(&body)
            .into_iter()
            .map(|href| {
                if href.starts_with('/') && !href.starts_with("//") {
                    self.absolute(&href).map_or(href, String::from)
                } else {
                    href
                }
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Brand name from the homepage.
    pub async fn get_title(&self) -> Option<String> {
        let body = self.fetch_html("/").await?;
        html::page_title(&body)
    }

    /// Fetch everything concurrently.
    #[instrument(skip(self), fields(base_url = %self.base_url))]
    pub async fn scrape_all(&self) -> ScrapeBundle {
        let (products, policies, faqs, social_handles, contact, about, links, title) = tokio::join!(
            self.get_products(),
            self.get_policies(),
            self.get_faqs(),
            self.get_social_handles(),
            self.get_contact_details(),
            self.get_about_page(),
            self.get_links(),
            self.get_title(),
        );

        ScrapeBundle {
            products,
            policies,
            faqs,
            social_handles,
            contact,
            about,
            links,
            title,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const HOMEPAGE: &str = r#"<html><head><title>Acme Store</title></head><body>
        <a href="/products/blue-tee">Blue tee</a>
        <a href="/pages/faq">FAQ</a>
        <a href="https://www.instagram.com/acme">Instagram</a>
        <a href="https://instagram.com/acme_official">Instagram again</a>
        <a href="https://x.com/acme">X</a>
        <a href="/pages/faq">FAQ again</a>
        <a href="https://example.com/elsewhere">Partner</a>
    </body></html>"#;

    async fn scraper(server: &MockServer, max_pages: u32) -> StorefrontScraper {
        StorefrontScraper::new(reqwest::Client::new(), &server.uri(), new_page_cache(), max_pages)
            .unwrap()
    }

    fn page(body: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_string(body)
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url("acme.com/").unwrap(), "https://acme.com");
        assert_eq!(
            normalize_base_url(" http://shop.acme.com ").unwrap(),
            "http://shop.acme.com"
        );
        assert!(normalize_base_url("").is_err());
        assert!(normalize_base_url("https://").is_err());
        assert!(normalize_base_url("not a url").is_err());
    }

    #[test]
    fn test_normalize_base_url_is_case_insensitive() {
        assert_eq!(
            normalize_base_url("https://ACME.com").unwrap(),
            normalize_base_url("acme.com/").unwrap()
        );
        assert_eq!(
            normalize_base_url("HTTPS://Shop.Acme.COM/?ref=ad#top").unwrap(),
            "https://shop.acme.com"
        );
        assert_eq!(
            normalize_base_url("http://127.0.0.1:8080/").unwrap(),
            "http://127.0.0.1:8080"
        );
        assert_eq!(
            normalize_base_url("acme.com/en-us/").unwrap(),
            "https://acme.com/en-us"
        );
    }

    #[tokio::test]
    async fn test_get_products_follows_pages_until_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products.json"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "products": [{"id": 1, "title": "A"}, {"id": 2, "title": "B"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/products.json"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "products": [{"id": 3, "title": "C"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/products.json"))
            .and(query_param("page", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "products": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let products = scraper(&server, 10).await.get_products().await;
        let ids: Vec<_> = products.iter().filter_map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_get_products_respects_page_cap() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/products.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "products": [{"id": 1, "title": "A"}]
            })))
            .expect(2)
            .mount(&server)
            .await;

        let products = scraper(&server, 2).await.get_products().await;
        assert_eq!(products.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_html_returns_none_on_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pages/about"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let scraper = scraper(&server, 1).await;
        assert!(scraper.fetch_html("/pages/about").await.is_none());
        assert!(scraper.get_about_page().await.is_none());
    }

    #[tokio::test]
    async fn test_fetch_html_caches_bodies() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(page(HOMEPAGE))
            .expect(1)
            .mount(&server)
            .await;

        let scraper = scraper(&server, 1).await;
        assert!(scraper.is_reachable().await);
        assert_eq!(scraper.get_title().await.as_deref(), Some("Acme Store"));
        assert_eq!(scraper.get_links().await.len(), 6);
    }

    #[tokio::test]
    async fn test_probe_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let outcome = scraper(&server, 1).await.probe("/").await;
        assert!(!outcome.ok);
        assert_eq!(outcome.status_code, Some(503));
    }

    #[tokio::test]
    async fn test_get_social_handles_last_match_wins() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(page(HOMEPAGE))
            .mount(&server)
            .await;

        let socials = scraper(&server, 1).await.get_social_handles().await;
        assert_eq!(socials.len(), 2);
        assert_eq!(socials["instagram"], "https://instagram.com/acme_official");
        assert_eq!(socials["twitter"], "https://x.com/acme");
    }

    #[tokio::test]
    async fn test_get_links_absolutizes_and_dedupes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(page(HOMEPAGE))
            .mount(&server)
            .await;

        let links = scraper(&server, 1).await.get_links().await;
        let faq = format!("{}/pages/faq", server.uri());
        assert_eq!(links.iter().filter(|l| **l == faq).count(), 1);
        assert!(links.contains(&format!("{}/products/blue-tee", server.uri())));
        assert!(links.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_get_faqs_falls_back_to_singular_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pages/faqs"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/pages/faq"))
            .respond_with(page(
                "<h3>How long is shipping?</h3><p>3-5 days.</p><h3>Gift wrap?</h3><p>Yes.</p>",
            ))
            .mount(&server)
            .await;

        let faqs = scraper(&server, 1).await.get_faqs().await;
        assert_eq!(faqs.len(), 2);
        assert_eq!(faqs[0].question, "How long is shipping?");
        assert_eq!(faqs[0].answer, "3-5 days.");
    }

    #[tokio::test]
    async fn test_get_contact_details_extracts_email_and_phone() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pages/contact"))
            .respond_with(page(
                "<p>Write to <a href=\"mailto:help@acme.com\">help@acme.com</a></p>\
                 <p>Call +1 555-010-2030 (9am-5pm)</p>",
            ))
            .mount(&server)
            .await;

        let contact = scraper(&server, 1).await.get_contact_details().await;
        assert_eq!(contact.email.as_deref(), Some("help@acme.com"));
        assert_eq!(contact.phone.as_deref(), Some("+1 555-010-2030"));
    }

    #[tokio::test]
    async fn test_get_policies_only_returns_fetched_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/policies/refund-policy"))
            .respond_with(page("<h1>Refund policy</h1><p>30 days.</p>"))
            .mount(&server)
            .await;

        let policies = scraper(&server, 1).await.get_policies().await;
        assert_eq!(policies.len(), 1);
        assert_eq!(
            policies.get(&PolicyType::RefundPolicy).map(String::as_str),
            Some("Refund policy 30 days.")
        );
    }
}

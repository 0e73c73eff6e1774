//! Turns a [`ScrapeBundle`] into a [`BrandContext`].

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use url::Url;

use shop_insights_core::{ContactType, LinkType, PolicyType, SocialPlatform};

use super::html;
use super::types::{RawContact, RawFaq, ScrapeBundle, StorefrontProduct};
use crate::models::{
    BrandContext, BrandProduct, ContactDetail, Faq, ImportantLink, Policy, SocialHandle,
};

/// Products marked as heroes when none are linked from the homepage.
const FALLBACK_HERO_COUNT: usize = 4;

const FAQ_PATHS: [&str; 3] = ["/pages/faq", "/pages/faqs", "/faq"];

/// Stateless mapper from scraped storefront data to a brand context.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrandParser;

impl BrandParser {
    /// Build a brand context.
    ///
    /// `base_url` must already be normalized (see
    /// [`normalize_base_url`](super::normalize_base_url)).
    #[must_use]
    pub fn build_brand_context(
        base_url: &str,
        brand_name: Option<String>,
        bundle: &ScrapeBundle,
    ) -> BrandContext {
        let base_url = base_url.trim_end_matches('/');

        let product_catalog = parse_products(base_url, &bundle.products, &bundle.links);
        let hero_products = product_catalog
            .iter()
            .filter(|p| p.is_hero)
            .cloned()
            .collect();

        BrandContext {
            brand_id: None,
            brand_name: brand_name.filter(|n| !n.trim().is_empty()),
            website_url: base_url.to_string(),
            about: bundle.about.clone(),
            product_catalog,
            hero_products,
            policies: parse_policies(base_url, &bundle.policies),
            faqs: parse_faqs(&bundle.faqs, faq_page_url(base_url, &bundle.links)),
            social_handles: parse_socials(&bundle.social_handles),
            contact_details: parse_contacts(&bundle.contact),
            important_links: parse_links(base_url, &bundle.links),
            scraped_at: Utc::now(),
        }
    }
}

fn parse_products(
    base_url: &str,
    products: &[StorefrontProduct],
    homepage_links: &[String],
) -> Vec<BrandProduct> {
    let homepage_product_paths: BTreeSet<String> = homepage_links
        .iter()
        .filter(|link| link.contains("/products/"))
        .map(|link| canonical_path(link))
        .collect();

    let mut catalog: Vec<BrandProduct> = products
        .iter()
        .map(|p| {
            let handle = p.handle.clone().filter(|h| !h.trim().is_empty());
            let title = p
                .title
                .clone()
                .filter(|t| !t.trim().is_empty())
                .or_else(|| handle.clone())
                .unwrap_or_else(|| "Untitled".to_string());
            let first_variant = p.variants.first();
            let is_hero = handle.as_ref().is_some_and(|h| {
                homepage_product_paths.contains(&format!("/products/{h}").to_lowercase())
            });

            BrandProduct {
                shopify_product_id: p.id.map(|id| id.to_string()),
                url: handle.as_ref().map(|h| format!("{base_url}/products/{h}")),
                price: first_variant
                    .and_then(|v| v.price.as_ref())
                    .and_then(|price| price.to_decimal()),
                currency: first_variant
                    .and_then(|v| v.currency.clone())
                    .filter(|c| !c.trim().is_empty()),
                image_url: p.images.first().and_then(|img| img.src.clone()),
                vendor: p.vendor.clone().filter(|v| !v.is_empty()),
                product_type: p.product_type.clone().filter(|t| !t.is_empty()),
                description: p
                    .body_html
                    .as_deref()
                    .map(html::strip_tags)
                    .filter(|d| !d.is_empty()),
                title,
                handle,
                is_hero,
            }
        })
        .collect();

    if !catalog.iter().any(|p| p.is_hero) {
        for product in catalog.iter_mut().take(FALLBACK_HERO_COUNT) {
            product.is_hero = true;
        }
    }

    catalog
}

/// Fetched policies plus URL-only placeholders for the rest, one per type.
fn parse_policies(base_url: &str, fetched: &BTreeMap<PolicyType, String>) -> Vec<Policy> {
    PolicyType::ALL
        .iter()
        .map(|policy_type| Policy {
            policy_type: *policy_type,
            url: Some(format!("{base_url}{}", policy_type.path())),
            content: fetched
                .get(policy_type)
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty()),
        })
        .collect()
}

fn parse_faqs(raw: &[RawFaq], page_url: Option<String>) -> Vec<Faq> {
    raw.iter()
        .filter_map(|faq| {
            let question = faq.question.trim();
            if question.is_empty() {
                return None;
            }
            let answer = faq.answer.trim();
            Some(Faq {
                question: question.to_string(),
                answer: (!answer.is_empty()).then(|| answer.to_string()),
                url: page_url.clone(),
            })
        })
        .collect()
}

fn parse_socials(raw: &BTreeMap<String, String>) -> Vec<SocialHandle> {
    raw.iter()
        .filter(|(_, url)| !url.trim().is_empty())
        .map(|(key, url)| SocialHandle {
            platform: SocialPlatform::from_key(key),
            handle_or_url: url.trim().to_string(),
        })
        .collect()
}

fn parse_contacts(raw: &RawContact) -> Vec<ContactDetail> {
    [
        (ContactType::Email, raw.email.as_deref()),
        (ContactType::Phone, raw.phone.as_deref()),
    ]
    .into_iter()
    .filter_map(|(contact_type, value)| {
        let value = value?.trim();
        (!value.is_empty()).then(|| ContactDetail {
            contact_type,
            value: value.to_string(),
        })
    })
    .collect()
}

/// First link of each type; a homepage link is always present.
fn parse_links(base_url: &str, links: &[String]) -> Vec<ImportantLink> {
    let base_lower = base_url.to_lowercase();
    let mut result: Vec<ImportantLink> = Vec::new();

    let mut add = |link_type: LinkType, url: &str| {
        if result.iter().any(|l| l.link_type == link_type) {
            return;
        }
        result.push(ImportantLink {
            link_type,
            url: absolutize(base_url, url),
            label: Some(link_type.label().to_string()),
        });
    };

    for href in links {
        if let Some(link_type) = classify_link(&base_lower, href) {
            add(link_type, href);
        }
    }
    add(LinkType::Homepage, base_url);

    result
}

fn classify_link(base_lower: &str, href: &str) -> Option<LinkType> {
    let h = href.to_lowercase();
    if h.contains("order") && h.contains("track") {
        Some(LinkType::OrderTracking)
    } else if h.contains("/contact") {
        Some(LinkType::ContactUs)
    } else if h.contains("/blog") {
        Some(LinkType::Blog)
    } else if FAQ_PATHS.iter().any(|p| h.contains(p)) {
        Some(LinkType::Faq)
    } else if h.contains("/about") {
        Some(LinkType::About)
    } else if h.trim_end_matches('/') == base_lower {
        Some(LinkType::Homepage)
    } else {
        None
    }
}

fn faq_page_url(base_url: &str, links: &[String]) -> Option<String> {
    links
        .iter()
        .find(|href| {
            let lower = href.to_lowercase();
            FAQ_PATHS.iter().any(|p| lower.contains(p))
        })
        .map(|href| absolutize(base_url, href))
}

fn absolutize(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    Url::parse(base_url)
        .and_then(|base| base.join(href))
        .map_or_else(|_| format!("{base_url}{href}"), String::from)
}

/// Lowercased path without a trailing `/`, for product link matching.
fn canonical_path(href: &str) -> String {
    let path = Url::parse(href).map_or_else(
        |_| href.split(['?', '#']).next().unwrap_or(href).to_string(),
        |url| url.path().to_string(),
    );
    path.trim_end_matches('/').to_lowercase()
}

//! Public storefront payloads and the raw scrape bundle.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Deserialize;

use shop_insights_core::PolicyType;

/// One page of `/products.json`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductsPage {
    #[serde(default)]
    pub products: Vec<StorefrontProduct>,
}

/// A product as published by the public storefront JSON endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorefrontProduct {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub body_html: Option<String>,
    #[serde(default)]
    pub variants: Vec<StorefrontVariant>,
    #[serde(default)]
    pub images: Vec<StorefrontImage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorefrontVariant {
    #[serde(default)]
    pub price: Option<RawPrice>,
    /// Rarely present; storefront JSON is priced in the shop currency.
    #[serde(default)]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorefrontImage {
    #[serde(default)]
    pub src: Option<String>,
}

/// Variant prices are usually strings but some themes emit numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    Text(String),
    Number(serde_json::Number),
}

impl RawPrice {
    /// Parse into a decimal; `None` when the value is not a number.
    #[must_use]
    pub fn to_decimal(&self) -> Option<Decimal> {
        let text = match self {
            Self::Text(text) => text.trim().to_string(),
            Self::Number(number) => number.to_string(),
        };
        text.parse::<Decimal>()
            .or_else(|_| Decimal::from_scientific(&text))
            .ok()
    }
}

/// Question and answer text as found on the FAQ page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFaq {
    pub question: String,
    pub answer: String,
}

/// First email and phone number found on the contact page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawContact {
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Everything fetched from one storefront, before parsing.
#[derive(Debug, Clone, Default)]
pub struct ScrapeBundle {
    pub products: Vec<StorefrontProduct>,
    /// Visible text of each policy page that could be fetched.
    pub policies: BTreeMap<PolicyType, String>,
    pub faqs: Vec<RawFaq>,
    /// Platform key → profile URL.
    pub social_handles: BTreeMap<String, String>,
    pub contact: RawContact,
    pub about: Option<String>,
    /// Unique homepage links, root-relative ones made absolute.
    pub links: Vec<String>,
    pub title: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_product_tolerates_missing_fields() {
        let page: ProductsPage = serde_json::from_str(
            r#"{"products": [{"id": 42, "title": "Tee", "variants": [{"price": "19.99"}, {"price": 5}]}, {}]}"#,
        )
        .unwrap();

        assert_eq!(page.products.len(), 2);
        let tee = &page.products[0];
        assert_eq!(tee.id, Some(42));
        assert_eq!(
            tee.variants[0].price.as_ref().and_then(RawPrice::to_decimal),
            Some(Decimal::new(1999, 2))
        );
        assert_eq!(
            tee.variants[1].price.as_ref().and_then(RawPrice::to_decimal),
            Some(Decimal::from(5))
        );
        assert!(page.products[1].title.is_none());
    }

    #[test]
    fn test_raw_price_rejects_text() {
        assert_eq!(RawPrice::Text("call us".to_string()).to_decimal(), None);
    }
}

//! Enums describing what is scraped from a public storefront.

use core::fmt;

use serde::{Deserialize, Serialize};

/// A store policy published under `/policies/{slug}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "policy_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum PolicyType {
    PrivacyPolicy,
    RefundPolicy,
    ReturnPolicy,
    ShippingPolicy,
    TermsOfService,
}

impl PolicyType {
    /// Every policy type, in the order they are reported.
    pub const ALL: [Self; 5] = [
        Self::PrivacyPolicy,
        Self::RefundPolicy,
        Self::ShippingPolicy,
        Self::TermsOfService,
        Self::ReturnPolicy,
    ];

    /// The storefront URL slug, e.g. `privacy-policy`.
    #[must_use]
    pub const fn slug(&self) -> &'static str {
        match self {
            Self::PrivacyPolicy => "privacy-policy",
            Self::RefundPolicy => "refund-policy",
            Self::ReturnPolicy => "return-policy",
            Self::ShippingPolicy => "shipping-policy",
            Self::TermsOfService => "terms-of-service",
        }
    }

    /// The storefront path, e.g. `/policies/privacy-policy`.
    #[must_use]
    pub fn path(&self) -> String {
        format!("/policies/{}", self.slug())
    }
}

/// Kind of contact detail found on a contact page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "contact_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum ContactType {
    Email,
    Phone,
}

/// Social network a brand links to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "social_platform", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum SocialPlatform {
    Instagram,
    Facebook,
    Tiktok,
    Twitter,
    Youtube,
    Pinterest,
    Linkedin,
    Other,
}

impl SocialPlatform {
    /// Hosts recognized for each platform (matched exactly or as a suffix).
    const HOSTS: [(&'static str, Self); 11] = [
        ("instagram.com", Self::Instagram),
        ("facebook.com", Self::Facebook),
        ("fb.com", Self::Facebook),
        ("tiktok.com", Self::Tiktok),
        ("twitter.com", Self::Twitter),
        ("x.com", Self::Twitter),
        ("youtube.com", Self::Youtube),
        ("youtu.be", Self::Youtube),
        ("pinterest.com", Self::Pinterest),
        ("pin.it", Self::Pinterest),
        ("linkedin.com", Self::Linkedin),
    ];

    /// Lowercase name used as a map key.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Instagram => "instagram",
            Self::Facebook => "facebook",
            Self::Tiktok => "tiktok",
            Self::Twitter => "twitter",
            Self::Youtube => "youtube",
            Self::Pinterest => "pinterest",
            Self::Linkedin => "linkedin",
            Self::Other => "other",
        }
    }

    /// Map a loose platform key to a platform. `x` is Twitter; unknown keys
    /// are [`SocialPlatform::Other`].
    #[must_use]
    pub fn from_key(key: &str) -> Self {
        match key.trim().to_ascii_lowercase().as_str() {
            "instagram" => Self::Instagram,
            "facebook" => Self::Facebook,
            "tiktok" => Self::Tiktok,
            "twitter" | "x" => Self::Twitter,
            "youtube" => Self::Youtube,
            "pinterest" => Self::Pinterest,
            "linkedin" => Self::Linkedin,
            _ => Self::Other,
        }
    }

    /// Detect the platform of an absolute or protocol-relative URL by host.
    ///
    /// ```
    /// use shop_insights_core::SocialPlatform;
    ///
    /// assert_eq!(
    ///     SocialPlatform::from_url("https://www.instagram.com/acme"),
    ///     Some(SocialPlatform::Instagram)
    /// );
    /// assert_eq!(SocialPlatform::from_url("/pages/about"), None);
    /// ```
    #[must_use]
    pub fn from_url(url: &str) -> Option<Self> {
        let lowered = url.trim().to_ascii_lowercase();
        let rest = lowered
            .strip_prefix("https://")
            .or_else(|| lowered.strip_prefix("http://"))
            .or_else(|| lowered.strip_prefix("//"))?;
        let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
        let host = authority
            .rsplit('@')
            .next()
            .unwrap_or_default()
            .split(':')
            .next()
            .unwrap_or_default();

        Self::HOSTS.iter().find_map(|(domain, platform)| {
            let matches = host == *domain
                || host
                    .strip_suffix(domain)
                    .is_some_and(|prefix| prefix.ends_with('.'));
            matches.then_some(*platform)
        })
    }
}

impl fmt::Display for SocialPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of an important storefront link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "link_type", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    OrderTracking,
    ContactUs,
    Blog,
    Faq,
    About,
    Homepage,
}

impl LinkType {
    /// Human-readable label stored alongside the link.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::OrderTracking => "Order Tracking",
            Self::ContactUs => "Contact Us",
            Self::Blog => "Blog",
            Self::Faq => "FAQ",
            Self::About => "About",
            Self::Homepage => "Homepage",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_slugs() {
        assert_eq!(PolicyType::PrivacyPolicy.path(), "/policies/privacy-policy");
        assert_eq!(PolicyType::TermsOfService.slug(), "terms-of-service");
        assert_eq!(
            serde_json::to_string(&PolicyType::RefundPolicy).unwrap(),
            "\"refund_policy\""
        );
    }

    #[test]
    fn test_social_platform_from_key() {
        assert_eq!(SocialPlatform::from_key(" X "), SocialPlatform::Twitter);
        assert_eq!(SocialPlatform::from_key("Instagram"), SocialPlatform::Instagram);
        assert_eq!(SocialPlatform::from_key("mastodon"), SocialPlatform::Other);
    }

    #[test]
    fn test_social_platform_from_url() {
        assert_eq!(
            SocialPlatform::from_url("https://m.facebook.com/acme"),
            Some(SocialPlatform::Facebook)
        );
        assert_eq!(
            SocialPlatform::from_url("//x.com/acme"),
            Some(SocialPlatform::Twitter)
        );
        assert_eq!(
            SocialPlatform::from_url("https://youtu.be/abc"),
            Some(SocialPlatform::Youtube)
        );
        // Suffix match only on a label boundary.
        assert_eq!(SocialPlatform::from_url("https://notx.com/acme"), None);
        assert_eq!(SocialPlatform::from_url("https://acme.com/instagram.com"), None);
    }

    #[test]
    fn test_link_type_serde() {
        assert_eq!(
            serde_json::to_string(&LinkType::OrderTracking).unwrap(),
            "\"order_tracking\""
        );
        assert_eq!(LinkType::ContactUs.label(), "Contact Us");
        // Unclassified links are dropped by the parser, never stored.
        assert!(serde_json::from_str::<LinkType>("\"other\"").is_err());
    }
}

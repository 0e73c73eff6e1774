//! Shopify shop domain type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Suffix appended to bare shop handles.
const MYSHOPIFY_SUFFIX: &str = ".myshopify.com";

/// Errors that can occur when parsing a [`ShopDomain`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ShopDomainError {
    /// The input string is empty.
    #[error("shop domain cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("shop domain must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character that cannot appear in a hostname.
    #[error("shop domain contains invalid character '{0}'")]
    InvalidCharacter(char),
    /// A dot-separated label is empty or starts/ends with a hyphen.
    #[error("shop domain has an invalid label: '{0}'")]
    InvalidLabel(String),
}

/// A normalized Shopify shop domain (e.g. `acme.myshopify.com`).
///
/// The domain identifies a store tenant and is unique per store.
///
/// ## Normalization
///
/// - Surrounding whitespace is trimmed and the value is lowercased
/// - A leading `http://` or `https://` and anything after the host is dropped
/// - A bare handle without a dot gets `.myshopify.com` appended
///
/// ## Examples
///
/// ```
/// use shop_insights_core::ShopDomain;
///
/// let domain = ShopDomain::parse("https://Acme.myshopify.com/admin").unwrap();
/// assert_eq!(domain.as_str(), "acme.myshopify.com");
///
/// let domain = ShopDomain::parse("acme").unwrap();
/// assert_eq!(domain.as_str(), "acme.myshopify.com");
///
/// assert!(ShopDomain::parse("").is_err());
/// assert!(ShopDomain::parse("acme store").is_err());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct ShopDomain(String);

impl ShopDomain {
    /// Maximum length of a hostname.
    pub const MAX_LENGTH: usize = 255;

    /// Parse and normalize a `ShopDomain`.
    ///
    /// # Errors
    ///
    /// Returns an error if the input:
    /// - Is empty after trimming
    /// - Is longer than 255 characters
    /// - Contains characters other than ASCII alphanumerics, `-` and `.`
    /// - Has an empty label or a label starting or ending with `-`
    pub fn parse(input: &str) -> Result<Self, ShopDomainError> {
        let lowered = input.trim().to_ascii_lowercase();
        let without_scheme = lowered
            .strip_prefix("https://")
            .or_else(|| lowered.strip_prefix("http://"))
            .unwrap_or(&lowered);
        let host = without_scheme
            .split(['/', '?', '#'])
            .next()
            .unwrap_or_default();

        if host.is_empty() {
            return Err(ShopDomainError::Empty);
        }

        if let Some(c) = host
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '.'))
        {
            return Err(ShopDomainError::InvalidCharacter(c));
        }

        let domain = if host.contains('.') {
            host.to_owned()
        } else {
            format!("{host}{MYSHOPIFY_SUFFIX}")
        };

        if domain.len() > Self::MAX_LENGTH {
            return Err(ShopDomainError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        for label in domain.split('.') {
            if label.is_empty() || label.starts_with('-') || label.ends_with('-') {
                return Err(ShopDomainError::InvalidLabel(label.to_owned()));
            }
        }

        Ok(Self(domain))
    }

    /// Returns the domain as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is a `*.myshopify.com` domain.
    #[must_use]
    pub fn is_myshopify(&self) -> bool {
        self.0.ends_with(MYSHOPIFY_SUFFIX)
    }
}

impl fmt::Display for ShopDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for ShopDomain {
    type Err = ShopDomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ShopDomain {
    type Error = ShopDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ShopDomain> for String {
    fn from(domain: ShopDomain) -> Self {
        domain.0
    }
}

impl AsRef<str> for ShopDomain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_domain() {
        let domain = ShopDomain::parse("acme.myshopify.com").unwrap();
        assert_eq!(domain.as_str(), "acme.myshopify.com");
        assert!(domain.is_myshopify());
    }

    #[test]
    fn test_parse_strips_scheme_path_and_case() {
        let domain = ShopDomain::parse("  HTTPS://Acme.MyShopify.com/admin/products?x=1 ").unwrap();
        assert_eq!(domain.as_str(), "acme.myshopify.com");
    }

    #[test]
    fn test_parse_bare_handle() {
        let domain = ShopDomain::parse("my-store").unwrap();
        assert_eq!(domain.as_str(), "my-store.myshopify.com");
    }

    #[test]
    fn test_parse_custom_domain() {
        let domain = ShopDomain::parse("shop.example.co.uk").unwrap();
        assert_eq!(domain.as_str(), "shop.example.co.uk");
        assert!(!domain.is_myshopify());
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert_eq!(ShopDomain::parse("   "), Err(ShopDomainError::Empty));
        assert_eq!(ShopDomain::parse("https://"), Err(ShopDomainError::Empty));
    }

    #[test]
    fn test_parse_rejects_invalid_characters() {
        assert_eq!(
            ShopDomain::parse("acme_store"),
            Err(ShopDomainError::InvalidCharacter('_'))
        );
    }

    #[test]
    fn test_parse_rejects_bad_labels() {
        assert!(matches!(
            ShopDomain::parse("acme..myshopify.com"),
            Err(ShopDomainError::InvalidLabel(_))
        ));
        assert!(matches!(
            ShopDomain::parse("-acme.myshopify.com"),
            Err(ShopDomainError::InvalidLabel(_))
        ));
    }

    #[test]
    fn test_parse_rejects_too_long() {
        let long = format!("{}.com", "a".repeat(300));
        assert!(matches!(
            ShopDomain::parse(&long),
            Err(ShopDomainError::TooLong { .. })
        ));
    }

    #[test]
    fn test_serde_round_trip_normalizes() {
        let domain: ShopDomain = serde_json::from_str("\"ACME\"").unwrap();
        assert_eq!(domain.as_str(), "acme.myshopify.com");
        assert!(serde_json::from_str::<ShopDomain>("\"bad domain\"").is_err());
    }
}

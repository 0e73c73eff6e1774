//! Registered Shopify store.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::Serialize;

use shop_insights_core::{ShopDomain, StoreId};

/// A Shopify store registered for authenticated sync.
///
/// Implements `Debug` manually to redact the access token. The token is
/// never serialized.
#[derive(Clone, Serialize)]
pub struct Store {
    /// Unique store ID.
    pub id: StoreId,
    /// Normalized shop domain (unique).
    pub shop_domain: ShopDomain,
    /// Display name reported by Shopify.
    pub name: Option<String>,
    /// Shop currency reported by Shopify.
    pub currency_code: Option<String>,
    /// Admin API access token.
    #[serde(skip_serializing)]
    pub access_token: SecretString,
    /// Admin API version used for this store.
    pub api_version: String,
    /// When the last successful sync finished.
    pub last_synced_at: Option<DateTime<Utc>>,
    /// When the store was registered.
    pub created_at: DateTime<Utc>,
    /// When the store was last updated.
    pub updated_at: DateTime<Utc>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("id", &self.id)
            .field("shop_domain", &self.shop_domain)
            .field("name", &self.name)
            .field("access_token", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .field("last_synced_at", &self.last_synced_at)
            .finish_non_exhaustive()
    }
}

/// Input for registering a store.
#[derive(Clone)]
pub struct NewStore {
    pub shop_domain: ShopDomain,
    pub name: Option<String>,
    pub currency_code: Option<String>,
    pub access_token: SecretString,
    pub api_version: String,
}

impl std::fmt::Debug for NewStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewStore")
            .field("shop_domain", &self.shop_domain)
            .field("name", &self.name)
            .field("currency_code", &self.currency_code)
            .field("access_token", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn store() -> Store {
        Store {
            id: StoreId::new(1),
            shop_domain: ShopDomain::parse("acme").unwrap(),
            name: Some("Acme".to_string()),
            currency_code: Some("USD".to_string()),
            access_token: SecretString::from("shpat_0123456789abcdef"),
            api_version: "2026-01".to_string(),
            last_synced_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_store_debug_redacts_token() {
        let debug = format!("{:?}", store());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("shpat_0123456789abcdef"));
    }

    #[test]
    fn test_store_serialization_omits_token() {
        let json = serde_json::to_value(store()).unwrap();
        assert_eq!(json["shop_domain"], "acme.myshopify.com");
        assert!(json.get("access_token").is_none());
    }
}

//! Synced Shopify products.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use shop_insights_core::{ProductId, StoreId};

/// A product row produced by the mapper.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    /// Numeric part of the Shopify product GID.
    pub external_id: String,
    pub title: String,
    pub handle: String,
    pub vendor: Option<String>,
    pub product_type: Option<String>,
    /// Shopify product status (`ACTIVE`, `DRAFT`, `ARCHIVED`).
    pub status: Option<String>,
    /// Minimum variant price.
    pub price: Option<Decimal>,
    pub currency_code: Option<String>,
    /// Total inventory across variants (0 when unknown).
    pub inventory_quantity: i32,
    pub shopify_created_at: Option<DateTime<Utc>>,
    pub shopify_updated_at: Option<DateTime<Utc>>,
}

/// A stored product.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub store_id: StoreId,
    pub external_id: String,
    pub title: String,
    pub handle: String,
    pub vendor: Option<String>,
    pub product_type: Option<String>,
    pub status: Option<String>,
    pub price: Option<Decimal>,
    pub currency_code: Option<String>,
    pub inventory_quantity: i32,
    pub shopify_created_at: Option<DateTime<Utc>>,
    pub shopify_updated_at: Option<DateTime<Utc>>,
    /// When this row was last written by a sync.
    pub synced_at: DateTime<Utc>,
}

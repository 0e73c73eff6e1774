//! Synced Shopify orders and their line items.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use shop_insights_core::{OrderId, StoreId};

/// An order produced by the mapper, with its line items.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    /// Numeric part of the Shopify order GID.
    pub external_id: String,
    /// Display name, e.g. `#1001`.
    pub name: String,
    pub email: Option<String>,
    pub customer_external_id: Option<String>,
    pub financial_status: Option<String>,
    pub fulfillment_status: Option<String>,
    pub total_price: Decimal,
    pub currency_code: String,
    pub processed_at: Option<DateTime<Utc>>,
    pub shopify_created_at: Option<DateTime<Utc>>,
    pub line_items: Vec<NewLineItem>,
}

/// A line item produced by the mapper.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLineItem {
    pub external_id: String,
    pub title: String,
    pub sku: Option<String>,
    pub quantity: i32,
    pub unit_price: Option<Decimal>,
    pub product_external_id: Option<String>,
    pub variant_external_id: Option<String>,
}

/// A stored order.
///
/// `line_items` is only populated when a single order is fetched.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    pub id: OrderId,
    pub store_id: StoreId,
    pub external_id: String,
    pub name: String,
    pub email: Option<String>,
    pub customer_external_id: Option<String>,
    pub financial_status: Option<String>,
    pub fulfillment_status: Option<String>,
    pub total_price: Decimal,
    pub currency_code: String,
    pub processed_at: Option<DateTime<Utc>>,
    pub shopify_created_at: Option<DateTime<Utc>>,
    pub synced_at: DateTime<Utc>,
    #[sqlx(skip)]
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub line_items: Vec<OrderLineItem>,
}

/// A stored order line item.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderLineItem {
    pub id: i32,
    pub order_id: OrderId,
    pub external_id: String,
    pub title: String,
    pub sku: Option<String>,
    pub quantity: i32,
    pub unit_price: Option<Decimal>,
    pub product_external_id: Option<String>,
    pub variant_external_id: Option<String>,
}

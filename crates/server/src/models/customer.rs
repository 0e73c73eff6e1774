//! Synced Shopify customers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use shop_insights_core::{CustomerId, StoreId};

/// A customer row produced by the mapper.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCustomer {
    /// Numeric part of the Shopify customer GID.
    pub external_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub orders_count: i64,
    /// Lifetime spend reported by Shopify.
    pub total_spent: Option<Decimal>,
    pub currency_code: Option<String>,
    pub shopify_created_at: Option<DateTime<Utc>>,
}

/// A stored customer.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Customer {
    pub id: CustomerId,
    pub store_id: StoreId,
    pub external_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub orders_count: i64,
    pub total_spent: Option<Decimal>,
    pub currency_code: Option<String>,
    pub shopify_created_at: Option<DateTime<Utc>>,
    pub synced_at: DateTime<Utc>,
}

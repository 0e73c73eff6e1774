//! Wire types for Admin API responses.
//!
//! Field names follow the GraphQL schema (`camelCase`). Only the fields
//! selected in [`super::queries`] are modelled.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Pagination state of a connection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

/// One page of a connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    pub nodes: Vec<T>,
    #[serde(default)]
    pub page_info: PageInfo,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            page_info: PageInfo::default(),
        }
    }
}

/// `MoneyV2` as returned by the API (amount is a decimal string).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyV2 {
    pub amount: String,
    pub currency_code: String,
}

/// `MoneyBag` wrapper; only the shop currency is selected.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoneyBag {
    pub shop_money: MoneyV2,
}

/// Reference to another node by GID.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeRef {
    pub id: String,
}

/// Shop identity.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopInfo {
    pub name: String,
    pub myshopify_domain: String,
    pub currency_code: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRange {
    pub min_variant_price: MoneyV2,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductNode {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub vendor: Option<String>,
    pub product_type: Option<String>,
    pub status: Option<String>,
    pub total_inventory: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub price_range_v2: Option<PriceRange>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderNode {
    pub id: String,
    pub name: String,
    pub email: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
    pub display_financial_status: Option<String>,
    pub display_fulfillment_status: Option<String>,
    pub total_price_set: MoneyBag,
    pub customer: Option<NodeRef>,
    #[serde(default)]
    pub line_items: Connection<LineItemNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemNode {
    pub id: String,
    pub title: String,
    pub sku: Option<String>,
    pub quantity: i64,
    pub product: Option<NodeRef>,
    pub variant: Option<NodeRef>,
    pub original_unit_price_set: Option<MoneyBag>,
}

/// `UnsignedInt64` counts arrive as strings; older versions sent numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Count {
    Number(i64),
    Text(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerNode {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub number_of_orders: Option<Count>,
    pub created_at: Option<DateTime<Utc>>,
    pub amount_spent: Option<MoneyV2>,
}

// Top-level `data` payloads.

#[derive(Debug, Deserialize)]
pub(crate) struct ShopData {
    pub shop: ShopInfo,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProductsData {
    pub products: Connection<ProductNode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OrdersData {
    pub orders: Connection<OrderNode>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CustomersData {
    pub customers: Connection<CustomerNode>,
}

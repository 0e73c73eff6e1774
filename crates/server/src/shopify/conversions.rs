//! Mapping from Admin API nodes to database rows.
//!
//! Each `map_*` function is pure: it validates money, currency and counts
//! and strips GIDs down to their numeric part. The sync service skips and
//! counts nodes that fail to map.

use shop_insights_core::{Money, MoneyError};
use thiserror::Error;

use super::types::{Count, CustomerNode, LineItemNode, MoneyBag, MoneyV2, OrderNode, ProductNode};
use crate::models::{NewCustomer, NewLineItem, NewOrder, NewProduct};

/// A node that cannot be represented as a row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("{entity} {id}: invalid money amount '{amount}'")]
    InvalidMoney {
        entity: &'static str,
        id: String,
        amount: String,
    },

    #[error("{entity} {id}: invalid currency code '{code}'")]
    InvalidCurrency {
        entity: &'static str,
        id: String,
        code: String,
    },

    #[error("{entity} {id}: invalid number '{value}'")]
    InvalidNumber {
        entity: &'static str,
        id: String,
        value: String,
    },
}

/// Strip a Shopify GID down to its trailing ID.
///
/// `gid://shopify/Product/123` becomes `123`. Query strings (as on some
/// line-item GIDs) are dropped. Input that is not a GID is returned as is.
#[must_use]
pub fn parse_gid(gid: &str) -> String {
    gid.strip_prefix("gid://shopify/")
        .and_then(|rest| rest.rsplit('/').next())
        .map(|id| id.split('?').next().unwrap_or(id))
        .filter(|id| !id.is_empty())
        .unwrap_or(gid)
        .to_string()
}

/// Map a product node.
///
/// # Errors
///
/// Returns `MappingError` if the minimum variant price is malformed.
pub fn map_product(node: ProductNode) -> Result<NewProduct, MappingError> {
    let external_id = parse_gid(&node.id);
    let price = node
        .price_range_v2
        .map(|range| parse_money("product", &external_id, &range.min_variant_price))
        .transpose()?;

    Ok(NewProduct {
        title: node.title,
        handle: node.handle,
        vendor: non_empty(node.vendor),
        product_type: non_empty(node.product_type),
        status: node.status,
        price: price.map(|m| m.amount),
        currency_code: price.map(|m| m.currency_code.to_string()),
        inventory_quantity: clamp_i32(node.total_inventory.unwrap_or(0)),
        shopify_created_at: node.created_at,
        shopify_updated_at: node.updated_at,
        external_id,
    })
}

/// Map an order node and its line items.
///
/// # Errors
///
/// Returns `MappingError` if the order total or any line-item price is
/// malformed.
pub fn map_order(node: OrderNode) -> Result<NewOrder, MappingError> {
    let external_id = parse_gid(&node.id);
    let total = parse_money_bag("order", &external_id, &node.total_price_set)?;

    if node.line_items.page_info.has_next_page {
        tracing::warn!(
            order = %external_id,
            fetched = node.line_items.nodes.len(),
            "Order has more line items than were fetched; storing the first page only"
        );
    }

    let line_items = node
        .line_items
        .nodes
        .into_iter()
        .map(map_line_item)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NewOrder {
        name: node.name,
        email: non_empty(node.email),
        customer_external_id: node.customer.map(|c| parse_gid(&c.id)),
        financial_status: node.display_financial_status,
        fulfillment_status: node.display_fulfillment_status,
        total_price: total.amount,
        currency_code: total.currency_code.to_string(),
        processed_at: node.processed_at,
        shopify_created_at: node.created_at,
        line_items,
        external_id,
    })
}

fn map_line_item(node: LineItemNode) -> Result<NewLineItem, MappingError> {
    let external_id = parse_gid(&node.id);
    let unit_price = node
        .original_unit_price_set
        .as_ref()
        .map(|bag| parse_money_bag("line item", &external_id, bag))
        .transpose()?;
    let quantity = i32::try_from(node.quantity).map_err(|_| MappingError::InvalidNumber {
        entity: "line item",
        id: external_id.clone(),
        value: node.quantity.to_string(),
    })?;

    Ok(NewLineItem {
        title: node.title,
        sku: non_empty(node.sku),
        quantity,
        unit_price: unit_price.map(|m| m.amount),
        product_external_id: node.product.map(|p| parse_gid(&p.id)),
        variant_external_id: node.variant.map(|v| parse_gid(&v.id)),
        external_id,
    })
}

/// Map a customer node.
///
/// # Errors
///
/// Returns `MappingError` if the spend or order count is malformed.
pub fn map_customer(node: CustomerNode) -> Result<NewCustomer, MappingError> {
    let external_id = parse_gid(&node.id);
    let spent = node
        .amount_spent
        .as_ref()
        .map(|money| parse_money("customer", &external_id, money))
        .transpose()?;
    let orders_count = match node.number_of_orders {
        None => 0,
        Some(Count::Number(n)) => n,
        Some(Count::Text(text)) => {
            text.trim()
                .parse::<i64>()
                .map_err(|_| MappingError::InvalidNumber {
                    entity: "customer",
                    id: external_id.clone(),
                    value: text.clone(),
                })?
        }
    };

    Ok(NewCustomer {
        first_name: non_empty(node.first_name),
        last_name: non_empty(node.last_name),
        email: non_empty(node.email),
        phone: non_empty(node.phone),
        orders_count,
        total_spent: spent.map(|m| m.amount),
        currency_code: spent.map(|m| m.currency_code.to_string()),
        shopify_created_at: node.created_at,
        external_id,
    })
}

fn parse_money(entity: &'static str, id: &str, money: &MoneyV2) -> Result<Money, MappingError> {
    Money::parse(&money.amount, &money.currency_code).map_err(|e| match e {
        MoneyError::InvalidAmount(amount) => MappingError::InvalidMoney {
            entity,
            id: id.to_string(),
            amount,
        },
        MoneyError::InvalidCurrency(code) => MappingError::InvalidCurrency {
            entity,
            id: id.to_string(),
            code,
        },
    })
}

fn parse_money_bag(entity: &'static str, id: &str, bag: &MoneyBag) -> Result<Money, MappingError> {
    parse_money(entity, id, &bag.shop_money)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn clamp_i32(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

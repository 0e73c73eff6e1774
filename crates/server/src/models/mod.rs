//! Domain models for Shop Insights.
//!
//! Synced Shopify data (stores, products, orders, customers, sync runs) and
//! scraped storefront data (brand contexts) share this module. `New*` types
//! are produced by the mappers and consumed by the repositories; the other
//! types are read back from the database and serialized by the API.

pub mod brand;
pub mod customer;
pub mod order;
pub mod product;
pub mod store;
pub mod sync_run;

pub use brand::{
    BrandContext, BrandProduct, BrandSummary, CompetitorResponse, ContactDetail, CrawlOutcome,
    Faq, ImportantLink, Policy, SocialHandle,
};
pub use customer::{Customer, NewCustomer};
pub use order::{NewLineItem, NewOrder, Order, OrderLineItem};
pub use product::{NewProduct, Product};
pub use store::{NewStore, Store};
pub use sync_run::{SyncCounts, SyncOutcome, SyncRun};

use serde::Serialize;

/// One page of a list endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

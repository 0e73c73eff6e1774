//! Core types for Shop Insights.
//!
//! This module provides type-safe wrappers for the domain concepts shared by
//! the fetcher, the mapper and the store layer.

pub mod id;
pub mod insight;
pub mod money;
pub mod shop_domain;
pub mod status;

pub use id::*;
pub use insight::{ContactType, LinkType, PolicyType, SocialPlatform};
pub use money::{CurrencyCode, Money, MoneyError};
pub use shop_domain::{ShopDomain, ShopDomainError};
pub use status::{SyncResource, SyncResourceError, SyncStatus};

//! Business logic services.
//!
//! # Services
//!
//! - `sync` - Authenticated Admin API sync of products, orders and customers
//! - `insights` - Public storefront brand insights and competitor views

pub mod insights;
pub mod sync;

pub use insights::{InsightsError, InsightsService, competitors};
pub use sync::{SyncError, sync_store};

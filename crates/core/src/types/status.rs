//! Status enums for sync runs.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a string does not name a [`SyncResource`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown sync resource '{0}' (expected products, orders or customers)")]
pub struct SyncResourceError(pub String);

/// A Shopify resource that a sync run can fetch.
///
/// Variants are declared in sync order: products first so that order line
/// items can reference products that already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncResource {
    Products,
    Orders,
    Customers,
}

impl SyncResource {
    /// Every resource, in sync order.
    pub const ALL: [Self; 3] = [Self::Products, Self::Orders, Self::Customers];

    /// Lowercase name used in the API and database.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Orders => "orders",
            Self::Customers => "customers",
        }
    }

    /// Sort and deduplicate a requested resource list.
    ///
    /// An empty request means every resource.
    #[must_use]
    pub fn normalize(requested: &[Self]) -> Vec<Self> {
        if requested.is_empty() {
            return Self::ALL.to_vec();
        }
        let mut resources = requested.to_vec();
        resources.sort_unstable();
        resources.dedup();
        resources
    }
}

impl fmt::Display for SyncResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncResource {
    type Err = SyncResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "products" | "product" => Ok(Self::Products),
            "orders" | "order" => Ok(Self::Orders),
            "customers" | "customer" => Ok(Self::Customers),
            _ => Err(SyncResourceError(s.to_owned())),
        }
    }
}

/// Lifecycle state of a sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "postgres", derive(sqlx::Type))]
#[cfg_attr(
    feature = "postgres",
    sqlx(type_name = "sync_status", rename_all = "snake_case")
)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    #[default]
    Running,
    Succeeded,
    Failed,
}

impl SyncStatus {
    /// Whether the run has finished, successfully or not.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        })
    }
}

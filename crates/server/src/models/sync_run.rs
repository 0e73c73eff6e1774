//! Sync run bookkeeping.

use chrono::{DateTime, Utc};
use serde::Serialize;

use shop_insights_core::{StoreId, SyncResource, SyncRunId, SyncStatus};

/// Rows written per resource during one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncCounts {
    pub products: i32,
    pub orders: i32,
    pub customers: i32,
    /// Nodes the mapper rejected.
    pub skipped: i32,
}

impl SyncCounts {
    /// Record `written` rows for a resource.
    pub fn add(&mut self, resource: SyncResource, written: i32) {
        match resource {
            SyncResource::Products => self.products += written,
            SyncResource::Orders => self.orders += written,
            SyncResource::Customers => self.customers += written,
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Succeeded(SyncCounts),
    Failed { counts: SyncCounts, error: String },
}

impl SyncOutcome {
    #[must_use]
    pub const fn status(&self) -> SyncStatus {
        match self {
            Self::Succeeded(_) => SyncStatus::Succeeded,
            Self::Failed { .. } => SyncStatus::Failed,
        }
    }

    #[must_use]
    pub const fn counts(&self) -> &SyncCounts {
        match self {
            Self::Succeeded(counts) | Self::Failed { counts, .. } => counts,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Succeeded(_) => None,
            Self::Failed { error, .. } => Some(error),
        }
    }
}

/// One recorded invocation of the sync pipeline.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SyncRun {
    pub id: SyncRunId,
    pub store_id: StoreId,
    /// Requested resources, in sync order.
    pub resources: Vec<String>,
    pub status: SyncStatus,
    pub products_count: i32,
    pub orders_count: i32,
    pub customers_count: i32,
    pub skipped_count: i32,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_add() {
        let mut counts = SyncCounts::default();
        counts.add(SyncResource::Orders, 3);
        counts.add(SyncResource::Orders, 2);
        counts.add(SyncResource::Customers, 1);
        assert_eq!(counts.orders, 5);
        assert_eq!(counts.customers, 1);
        assert_eq!(counts.products, 0);
    }

    #[test]
    fn test_outcome_accessors() {
        let outcome = SyncOutcome::Failed {
            counts: SyncCounts::default(),
            error: "boom".to_string(),
        };
        assert_eq!(outcome.status(), SyncStatus::Failed);
        assert_eq!(outcome.error(), Some("boom"));
        assert!(SyncOutcome::Succeeded(SyncCounts::default()).error().is_none());
    }
}

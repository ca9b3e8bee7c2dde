//! # Dashboard Service
//!
//! One call aggregating everything the dashboard shows.

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use gestio_db::repository::dashboard::{EntityCounts, MonthTotals, StockTotals};
use gestio_db::Database;

use crate::error::AppResult;

/// Everything the dashboard renders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub counts: EntityCounts,
    pub stock: StockTotals,
    /// Gross movement totals for the current calendar month.
    pub current_month: MonthTotals,
}

/// Service for dashboard aggregation.
#[derive(Debug, Clone)]
pub struct DashboardService {
    db: Database,
}

impl DashboardService {
    /// Creates a new DashboardService.
    pub fn new(db: Database) -> Self {
        DashboardService { db }
    }

    /// Builds the dashboard summary for the current month.
    pub async fn summary(&self) -> AppResult<DashboardSummary> {
        let dashboard = self.db.dashboard();

        let counts = dashboard.counts().await?;
        let stock = dashboard.stock_totals().await?;

        let now = Utc::now();
        let current_month = dashboard.month_totals(now.year(), now.month()).await?;

        Ok(DashboardSummary {
            counts,
            stock,
            current_month,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Low-Stock Alert Checker
//!
//! Background task that re-runs the low-stock check on a fixed interval
//! while the app is open (default: every 30 minutes) and pushes alerts to
//! the UI over a channel.
//!
//! ## Task Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    StockAlertChecker                                    │
//! │                                                                         │
//! │  loop {                                                                 │
//! │      select! {                                                          │
//! │          interval tick ──► check() ──► Vec<StockAlert> ──► alert_tx     │
//! │          shutdown      ──► break                                        │
//! │      }                                                                  │
//! │  }                                                                      │
//! │                                                                         │
//! │  The first tick fires immediately, so the user sees alerts right       │
//! │  after startup. A failed check is logged and the loop keeps going;      │
//! │  the next tick retries naturally.                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use gestio_db::Database;

use crate::error::AppResult;

/// Channel capacity for outgoing alert batches.
const ALERT_CHANNEL_CAPACITY: usize = 16;

/// One product at or below its reorder threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAlert {
    pub product_id: String,
    pub code: String,
    pub name: String,
    pub current_stock: i64,
    pub min_stock: i64,
}

/// Periodic low-stock checker.
pub struct StockAlertChecker {
    db: Database,
    interval: Duration,
    alert_tx: mpsc::Sender<Vec<StockAlert>>,
    shutdown_rx: mpsc::Receiver<()>,
}

/// Handle for stopping the checker.
#[derive(Debug, Clone)]
pub struct StockAlertHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl StockAlertHandle {
    /// Triggers graceful shutdown.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(()).await;
    }
}

impl StockAlertChecker {
    /// Creates a checker, its control handle and the alert receiver.
    pub fn new(
        db: Database,
        interval: Duration,
    ) -> (Self, StockAlertHandle, mpsc::Receiver<Vec<StockAlert>>) {
        let (alert_tx, alert_rx) = mpsc::channel(ALERT_CHANNEL_CAPACITY);
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let checker = StockAlertChecker {
            db,
            interval,
            alert_tx,
            shutdown_rx,
        };

        (checker, StockAlertHandle { shutdown_tx }, alert_rx)
    }

    /// Runs the check loop. Spawn this as a background task.
    pub async fn run(mut self) {
        info!(interval_secs = self.interval.as_secs(), "Stock alert checker starting");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match self.check().await {
                        Ok(alerts) if alerts.is_empty() => {
                            debug!("Low-stock check: nothing to report");
                        }
                        Ok(alerts) => {
                            info!(count = alerts.len(), "Low-stock alerts raised");
                            if self.alert_tx.send(alerts).await.is_err() {
                                // Receiver dropped: nobody is listening anymore
                                break;
                            }
                        }
                        Err(e) => {
                            error!(error = %e, "Low-stock check failed");
                        }
                    }
                }

                _ = self.shutdown_rx.recv() => {
                    info!("Stock alert checker shutting down");
                    break;
                }
            }
        }

        info!("Stock alert checker stopped");
    }

    /// Runs the check once: active, live products at or below threshold.
    pub async fn check(&self) -> AppResult<Vec<StockAlert>> {
        let alerts = self
            .db
            .products()
            .list_low_stock()
            .await?
            .into_iter()
            .map(|p| StockAlert {
                product_id: p.id,
                code: p.code,
                name: p.name,
                current_stock: p.current_stock,
                min_stock: p.min_stock,
            })
            .collect();

        Ok(alerts)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gestio_core::{EntityStatus, Product};
    use gestio_db::DbConfig;
    use uuid::Uuid;

    async fn seed_product(db: &Database, code: &str, stock: i64, min_stock: i64) {
        let now = Utc::now();
        db.products()
            .insert(&Product {
                id: Uuid::new_v4().to_string(),
                code: code.to_string(),
                name: format!("Produto {code}"),
                description: None,
                category_name: None,
                purchase_price_cents: 50,
                sale_price_cents: 120,
                current_stock: stock,
                min_stock,
                status: EntityStatus::Active,
                created_at: now,
                updated_at: now,
                deleted_at: None,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_check_reports_only_low_stock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_product(&db, "PRD-001", 2, 10).await;
        seed_product(&db, "PRD-002", 50, 10).await;
        seed_product(&db, "PRD-003", 0, 0).await; // no threshold, never alerts

        let (checker, _handle, _rx) = StockAlertChecker::new(db, Duration::from_secs(1800));

        let alerts = checker.check().await.unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].code, "PRD-001");
        assert_eq!(alerts[0].current_stock, 2);
        assert_eq!(alerts[0].min_stock, 10);
    }

    #[tokio::test]
    async fn test_run_emits_first_batch_immediately() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        seed_product(&db, "PRD-001", 2, 10).await;

        let (checker, handle, mut rx) = StockAlertChecker::new(db, Duration::from_secs(1800));
        let task = tokio::spawn(checker.run());

        // The first interval tick fires right away
        let alerts = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for alerts")
            .expect("alert channel closed");
        assert_eq!(alerts.len(), 1);

        handle.shutdown().await;
        let _ = task.await;
    }
}

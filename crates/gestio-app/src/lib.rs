//! # gestio-app: Application Services for Gestio
//!
//! The orchestration layer between the UI and the store.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Gestio Service Layer                             │
//! │                                                                         │
//! │  Frontend (SPA)                                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   gestio-app (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌────────────┐  ┌────────────┐  ┌────────────┐               │   │
//! │  │   │  services  │  │   state    │  │   alerts   │               │   │
//! │  │   │ catalog    │  │ EntityCache│  │ low-stock  │               │   │
//! │  │   │ orders ... │  │ + listener │  │ checker    │               │   │
//! │  │   └─────┬──────┘  └─────▲──────┘  └─────┬──────┘               │   │
//! │  │         │               │ change feed   │                      │   │
//! │  └─────────┼───────────────┼───────────────┼──────────────────────┘   │
//! │            ▼               │               ▼                           │
//! │  ┌─────────────────────────┴───────────────────────────────────────┐  │
//! │  │                    gestio-db (repositories)                     │  │
//! │  └─────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gestio_app::{App, AppConfig};
//! use gestio_db::DbConfig;
//!
//! let app = App::new(AppConfig::default(), DbConfig::new("./gestio.db")).await?;
//!
//! let summary = app.dashboard().summary().await?;
//! let (exit, items) = app.orders().convert_order(&order_id, None).await?;
//!
//! app.shutdown().await;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod alerts;
pub mod config;
pub mod error;
pub mod services;
pub mod state;

// =============================================================================
// Re-exports
// =============================================================================

pub use alerts::{StockAlert, StockAlertChecker, StockAlertHandle};
pub use config::AppConfig;
pub use error::{AppError, AppResult, ErrorCode};
pub use state::{AppState, EntityCache};

pub use services::catalog::CatalogService;
pub use services::contacts::ContactsService;
pub use services::dashboard::DashboardService;
pub use services::expenses::ExpensesService;
pub use services::orders::OrdersService;
pub use services::recycle_bin::RecycleBinService;
pub use services::stock::StockService;

use std::sync::Arc;

use tokio::sync::mpsc;

use gestio_db::{Database, DbConfig};
use state::ListenerHandle;

// =============================================================================
// App
// =============================================================================

/// The assembled application: database, caches, feed listener.
///
/// Construct once at startup, hand out services from it.
pub struct App {
    db: Database,
    state: Arc<AppState>,
    config: AppConfig,
    listener: ListenerHandle,
}

impl App {
    /// Connects the database, warms the caches (if configured) and starts
    /// the change-feed listener.
    pub async fn new(config: AppConfig, db_config: DbConfig) -> AppResult<Self> {
        let db = Database::new(db_config).await?;
        Self::with_database(config, db).await
    }

    /// Assembles the app around an existing database handle (tests).
    pub async fn with_database(config: AppConfig, db: Database) -> AppResult<Self> {
        let state = AppState::new();

        if config.warm_caches {
            state.warm(&db).await?;
        }

        let listener = AppState::spawn_listener(&state, &db);

        Ok(App {
            db,
            state,
            config,
            listener,
        })
    }

    /// The underlying database handle.
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// The entity caches.
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// The application configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Product and category operations.
    pub fn catalog(&self) -> CatalogService {
        CatalogService::new(self.db.clone())
    }

    /// Client and supplier operations.
    pub fn contacts(&self) -> ContactsService {
        ContactsService::new(self.db.clone())
    }

    /// Order operations, including conversion to stock exits.
    pub fn orders(&self) -> OrdersService {
        OrdersService::new(self.db.clone())
    }

    /// Stock entry/exit operations.
    pub fn stock(&self) -> StockService {
        StockService::new(self.db.clone())
    }

    /// Expense operations.
    pub fn expenses(&self) -> ExpensesService {
        ExpensesService::new(self.db.clone())
    }

    /// Dashboard aggregation.
    pub fn dashboard(&self) -> DashboardService {
        DashboardService::new(self.db.clone())
    }

    /// Recycle-bin operations.
    pub fn recycle_bin(&self) -> RecycleBinService {
        RecycleBinService::new(self.db.clone(), Arc::clone(&self.state))
    }

    /// Spawns the periodic low-stock checker with the configured interval.
    ///
    /// Returns the control handle and the alert receiver.
    pub fn spawn_stock_alerts(
        &self,
    ) -> (StockAlertHandle, mpsc::Receiver<Vec<StockAlert>>) {
        let (checker, handle, rx) =
            StockAlertChecker::new(self.db.clone(), self.config.alert_interval);
        tokio::spawn(checker.run());
        (handle, rx)
    }

    /// Stops the feed listener and closes the database.
    pub async fn shutdown(self) {
        self.listener.shutdown().await;
        self.db.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::catalog::CategoryInput;
    use gestio_core::EntityStatus;

    #[tokio::test]
    async fn test_app_lifecycle() {
        let app = App::new(AppConfig::default(), DbConfig::in_memory())
            .await
            .unwrap();

        let category = app
            .catalog()
            .create_category(CategoryInput {
                name: "Bebidas".to_string(),
                description: None,
                status: EntityStatus::Active,
            })
            .await
            .unwrap();

        // The listener patches the cache from the change feed
        let mut found = false;
        for _ in 0..100 {
            if app.state().categories.get(&category.id).is_some() {
                found = true;
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(found, "cache never saw the insert event");

        let summary = app.dashboard().summary().await.unwrap();
        assert_eq!(summary.counts.categories, 1);

        app.shutdown().await;
    }
}

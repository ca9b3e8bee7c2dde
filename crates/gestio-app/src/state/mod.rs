//! # Application State
//!
//! The eight entity caches plus the background listener that keeps them
//! patched from the change feed.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      State Synchronization                              │
//! │                                                                         │
//! │  startup ──► AppState::warm() ── full lists ──► caches                  │
//! │                                                                         │
//! │  repository write ──► ChangeFeed ──► listener task ──► apply(event)     │
//! │                                          │                              │
//! │                                          └── Lagged? re-warm all        │
//! │                                              caches from the store      │
//! │                                                                         │
//! │  UI reads ──► cache snapshots (no store round trip)                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod cache;

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use gestio_core::{Category, Contact, EntityKind, Expense, Order, Product, StockEntry, StockExit};
use gestio_db::{ChangeEvent, Database};

use crate::error::AppResult;
pub use cache::EntityCache;

/// Normalized caches for every entity table.
#[derive(Debug, Clone)]
pub struct AppState {
    pub products: EntityCache<Product>,
    pub categories: EntityCache<Category>,
    pub clients: EntityCache<Contact>,
    pub suppliers: EntityCache<Contact>,
    pub orders: EntityCache<Order>,
    pub stock_entries: EntityCache<StockEntry>,
    pub stock_exits: EntityCache<StockExit>,
    pub expenses: EntityCache<Expense>,
}

impl AppState {
    /// Creates empty caches.
    pub fn new() -> Arc<Self> {
        Arc::new(AppState {
            products: EntityCache::new(),
            categories: EntityCache::new(),
            clients: EntityCache::new(),
            suppliers: EntityCache::new(),
            orders: EntityCache::new(),
            stock_entries: EntityCache::new(),
            stock_exits: EntityCache::new(),
            expenses: EntityCache::new(),
        })
    }

    /// Loads every entity list from the store into the caches.
    ///
    /// Used at startup and after the listener observes broadcast lag.
    pub async fn warm(&self, db: &Database) -> AppResult<()> {
        debug!("Warming entity caches");

        self.products.replace_all(db.products().list().await?);
        self.categories.replace_all(db.categories().list().await?);
        self.clients.replace_all(db.clients().list().await?);
        self.suppliers.replace_all(db.suppliers().list().await?);
        self.orders.replace_all(db.orders().list().await?);
        self.stock_entries.replace_all(db.stock_entries().list().await?);
        self.stock_exits.replace_all(db.stock_exits().list().await?);
        self.expenses.replace_all(db.expenses().list().await?);

        info!(
            products = self.products.len(),
            orders = self.orders.len(),
            "Entity caches warmed"
        );

        Ok(())
    }

    /// Routes one change event to the matching cache.
    pub fn apply(&self, event: &ChangeEvent) {
        match event.entity {
            EntityKind::Products => self.products.apply(event),
            EntityKind::Categories => self.categories.apply(event),
            EntityKind::Clients => self.clients.apply(event),
            EntityKind::Suppliers => self.suppliers.apply(event),
            EntityKind::Orders => self.orders.apply(event),
            EntityKind::StockEntries => self.stock_entries.apply(event),
            EntityKind::StockExits => self.stock_exits.apply(event),
            EntityKind::Expenses => self.expenses.apply(event),
        }
    }

    /// Spawns the background task that applies feed events to the caches.
    ///
    /// On broadcast lag the task re-warms everything from the store. The
    /// returned handle stops the task gracefully.
    pub fn spawn_listener(state: &Arc<Self>, db: &Database) -> ListenerHandle {
        let state = Arc::clone(state);
        let db = db.clone();
        let mut rx = db.feed().subscribe();
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

        let task = tokio::spawn(async move {
            info!("Change-feed listener starting");

            loop {
                tokio::select! {
                    event = rx.recv() => match event {
                        Ok(event) => {
                            debug!(entity = ?event.entity, action = ?event.action, id = %event.id,
                                   "Applying change event");
                            state.apply(&event);
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(skipped, "Change feed lagged; re-warming caches");
                            if let Err(e) = state.warm(&db).await {
                                warn!(error = %e, "Cache re-warm failed");
                            }
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },

                    _ = shutdown_rx.recv() => {
                        info!("Change-feed listener shutting down");
                        break;
                    }
                }
            }

            info!("Change-feed listener stopped");
        });

        ListenerHandle { shutdown_tx, task }
    }
}

/// Handle for stopping the feed listener.
#[derive(Debug)]
pub struct ListenerHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl ListenerHandle {
    /// Requests shutdown and waits for the task to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        let _ = self.task.await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use gestio_core::EntityStatus;
    use gestio_db::DbConfig;
    use uuid::Uuid;

    fn test_product(code: &str) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4().to_string(),
            code: code.to_string(),
            name: format!("Produto {code}"),
            description: None,
            category_name: None,
            purchase_price_cents: 50,
            sale_price_cents: 120,
            current_stock: 0,
            min_stock: 0,
            status: EntityStatus::Active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn test_warm_loads_lists() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products().insert(&test_product("PRD-001")).await.unwrap();
        db.products().insert(&test_product("PRD-002")).await.unwrap();

        let state = AppState::new();
        state.warm(&db).await.unwrap();

        assert_eq!(state.products.len(), 2);
        assert!(state.orders.is_empty());
    }

    #[tokio::test]
    async fn test_apply_routes_by_entity() {
        let state = AppState::new();
        let product = test_product("PRD-001");

        state.apply(&ChangeEvent::with_record(
            EntityKind::Products,
            gestio_db::ChangeAction::Insert,
            &product.id,
            &product,
        ));

        assert_eq!(state.products.len(), 1);
        assert!(state.categories.is_empty());
    }

    #[tokio::test]
    async fn test_listener_patches_cache_from_writes() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let state = AppState::new();
        let listener = AppState::spawn_listener(&state, &db);

        let product = db.products().insert(&test_product("PRD-001")).await.unwrap();

        // The listener applies events asynchronously; poll briefly
        let mut found = false;
        for _ in 0..100 {
            if state.products.get(&product.id).is_some() {
                found = true;
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(found, "listener never applied the insert event");

        db.products().soft_delete(&product.id).await.unwrap();
        for _ in 0..100 {
            if state.products.get(&product.id).is_none() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(state.products.get(&product.id).is_none());

        listener.shutdown().await;
    }
}

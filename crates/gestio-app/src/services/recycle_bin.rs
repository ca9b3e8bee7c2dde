//! # Recycle Bin Service
//!
//! Lists soft-deleted records across every entity table with retention
//! info, and drives restore / permanent delete.
//!
//! Restore events carry no payload (the generic repository cannot type the
//! row), so this service re-reads the restored record through its typed
//! repository and patches the matching cache itself.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use gestio_core::EntityKind;
use gestio_db::Database;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// One recycle-bin row, with retention fields computed for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecycleBinEntry {
    pub table_type: String,
    pub id: String,
    pub label: String,
    pub deleted_at: DateTime<Utc>,
    pub days_in_bin: i64,
    pub purge_after: DateTime<Utc>,
    pub purge_eligible: bool,
}

/// Service for recycle-bin operations.
#[derive(Debug, Clone)]
pub struct RecycleBinService {
    db: Database,
    state: Arc<AppState>,
}

impl RecycleBinService {
    /// Creates a new RecycleBinService.
    pub fn new(db: Database, state: Arc<AppState>) -> Self {
        RecycleBinService { db, state }
    }

    /// Lists the recycle bin, newest deletions first.
    pub async fn list(&self) -> AppResult<Vec<RecycleBinEntry>> {
        let now = Utc::now();

        let entries = self
            .db
            .recycle_bin()
            .list_deleted()
            .await?
            .into_iter()
            .map(|record| RecycleBinEntry {
                days_in_bin: record.days_in_bin(now),
                purge_after: record.purge_after(),
                purge_eligible: record.purge_eligible(now),
                table_type: record.table_type,
                id: record.id,
                label: record.label,
                deleted_at: record.deleted_at,
            })
            .collect();

        Ok(entries)
    }

    /// Soft-deletes a record by table name (the generic RPC surface).
    pub async fn soft_delete(&self, table_type: &str, id: &str) -> AppResult<()> {
        let kind = resolve_kind(table_type)?;
        self.db.recycle_bin().soft_delete(kind, id).await?;
        Ok(())
    }

    /// Restores a soft-deleted record and patches the matching cache.
    pub async fn restore(&self, table_type: &str, id: &str) -> AppResult<()> {
        let kind = resolve_kind(table_type)?;

        self.db.recycle_bin().restore(kind, id).await?;
        self.refresh_cache_entry(kind, id).await?;

        info!(table = table_type, id = %id, "Record restored from recycle bin");
        Ok(())
    }

    /// Permanently deletes a record. Irreversible.
    pub async fn delete_permanently(&self, table_type: &str, id: &str) -> AppResult<()> {
        let kind = resolve_kind(table_type)?;
        self.db.recycle_bin().purge(kind, id).await?;
        Ok(())
    }

    /// Re-reads one restored record through its typed repository and
    /// upserts it into the cache.
    async fn refresh_cache_entry(&self, kind: EntityKind, id: &str) -> AppResult<()> {
        match kind {
            EntityKind::Products => {
                if let Some(record) = self.db.products().get_by_id(id).await? {
                    self.state.products.upsert(record);
                }
            }
            EntityKind::Categories => {
                if let Some(record) = self.db.categories().get_by_id(id).await? {
                    self.state.categories.upsert(record);
                }
            }
            EntityKind::Clients => {
                if let Some(record) = self.db.clients().get_by_id(id).await? {
                    self.state.clients.upsert(record);
                }
            }
            EntityKind::Suppliers => {
                if let Some(record) = self.db.suppliers().get_by_id(id).await? {
                    self.state.suppliers.upsert(record);
                }
            }
            EntityKind::Orders => {
                if let Some(record) = self.db.orders().get_by_id(id).await? {
                    self.state.orders.upsert(record);
                }
            }
            EntityKind::StockEntries => {
                if let Some(record) = self.db.stock_entries().get_by_id(id).await? {
                    self.state.stock_entries.upsert(record);
                }
            }
            EntityKind::StockExits => {
                if let Some(record) = self.db.stock_exits().get_by_id(id).await? {
                    self.state.stock_exits.upsert(record);
                }
            }
            EntityKind::Expenses => {
                if let Some(record) = self.db.expenses().get_by_id(id).await? {
                    self.state.expenses.upsert(record);
                }
            }
        }

        Ok(())
    }
}

fn resolve_kind(table_type: &str) -> AppResult<EntityKind> {
    EntityKind::from_table_name(table_type)
        .ok_or_else(|| AppError::validation(format!("Unknown entity table: {table_type}")))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::services::catalog::{CatalogService, CategoryInput};
    use gestio_core::EntityStatus;
    use gestio_db::DbConfig;

    async fn fixture() -> (RecycleBinService, CatalogService) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let state = AppState::new();
        (
            RecycleBinService::new(db.clone(), state),
            CatalogService::new(db),
        )
    }

    #[tokio::test]
    async fn test_deleted_category_lands_in_bin_with_retention() {
        let (bin, catalog) = fixture().await;

        let category = catalog
            .create_category(CategoryInput {
                name: "Bebidas".to_string(),
                description: None,
                status: EntityStatus::Active,
            })
            .await
            .unwrap();

        catalog.delete_category(&category.id).await.unwrap();

        let entries = bin.list().await.unwrap();
        assert_eq!(entries.len(), 1);

        let entry = &entries[0];
        assert_eq!(entry.table_type, "categories");
        assert_eq!(entry.label, "Bebidas");
        assert_eq!(entry.days_in_bin, 0);
        assert!(!entry.purge_eligible);
        assert_eq!(
            entry.purge_after,
            entry.deleted_at + chrono::Duration::days(30)
        );
    }

    #[tokio::test]
    async fn test_restore_patches_cache() {
        let (bin, catalog) = fixture().await;

        let category = catalog
            .create_category(CategoryInput {
                name: "Bebidas".to_string(),
                description: None,
                status: EntityStatus::Active,
            })
            .await
            .unwrap();
        catalog.delete_category(&category.id).await.unwrap();

        bin.restore("categories", &category.id).await.unwrap();

        assert!(bin.list().await.unwrap().is_empty());
        assert_eq!(bin.state.categories.get(&category.id).unwrap().name, "Bebidas");
        assert_eq!(catalog.list_categories().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_table_rejected() {
        let (bin, _) = fixture().await;

        let err = bin.restore("sqlite_master", "x").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_permanent_delete_is_final() {
        let (bin, catalog) = fixture().await;

        let category = catalog
            .create_category(CategoryInput {
                name: "Bebidas".to_string(),
                description: None,
                status: EntityStatus::Active,
            })
            .await
            .unwrap();
        catalog.delete_category(&category.id).await.unwrap();

        bin.delete_permanently("categories", &category.id).await.unwrap();

        assert!(bin.list().await.unwrap().is_empty());
        let err = bin.restore("categories", &category.id).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}

//! # Recycle Bin Repository
//!
//! Soft delete, restore and permanent deletion across all entity tables.
//!
//! ## Soft Delete Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Soft Delete Lifecycle                               │
//! │                                                                         │
//! │  live row (deleted_at IS NULL)                                         │
//! │       │                                                                 │
//! │       │ soft_delete: deleted_at = now                                  │
//! │       ▼                                                                 │
//! │  in recycle bin (hidden from standard lists)                           │
//! │       │                                                                 │
//! │       ├── restore: deleted_at = NULL ──► back in standard lists,       │
//! │       │                                  all fields unchanged           │
//! │       │                                                                 │
//! │       └── purge: DELETE (irreversible, line items cascade)             │
//! │                                                                         │
//! │  Retention: 30 days, computed on read (DeletedRecord::purge_after).    │
//! │  Nothing purges automatically.                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Table names are always taken from the [`EntityKind`] allowlist before
//! they reach SQL; callers holding a raw table string go through
//! [`EntityKind::from_table_name`] first.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::events::{ChangeAction, ChangeEvent, ChangeFeed};
use gestio_core::{DeletedRecord, EntityKind};

/// Which column labels a record in the bin listing.
const fn label_column(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Products | EntityKind::Categories | EntityKind::Clients
        | EntityKind::Suppliers => "name",
        EntityKind::Orders | EntityKind::StockEntries | EntityKind::StockExits
        | EntityKind::Expenses => "number",
    }
}

/// Repository for recycle-bin operations.
#[derive(Debug, Clone)]
pub struct RecycleBinRepository {
    pool: SqlitePool,
    feed: ChangeFeed,
}

impl RecycleBinRepository {
    /// Creates a new RecycleBinRepository.
    pub fn new(pool: SqlitePool, feed: ChangeFeed) -> Self {
        RecycleBinRepository { pool, feed }
    }

    /// Lists soft-deleted records across all entity tables, most recently
    /// deleted first.
    pub async fn list_deleted(&self) -> DbResult<Vec<DeletedRecord>> {
        let selects: Vec<String> = EntityKind::ALL
            .iter()
            .map(|kind| {
                format!(
                    "SELECT '{table}' AS table_type, id, {label} AS label, deleted_at \
                     FROM {table} WHERE deleted_at IS NOT NULL",
                    table = kind.table_name(),
                    label = label_column(*kind),
                )
            })
            .collect();

        let sql = format!("{} ORDER BY deleted_at DESC", selects.join(" UNION ALL "));

        let records = sqlx::query_as::<_, DeletedRecord>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(records)
    }

    /// Soft-deletes a record in any entity table.
    ///
    /// Typed repositories call this too; they add their own bookkeeping
    /// (category counts) and publish their own events.
    pub async fn soft_delete(&self, kind: EntityKind, id: &str) -> DbResult<()> {
        debug!(table = kind.table_name(), id = %id, "Soft-deleting record");

        soft_delete_record(&self.pool, kind, id).await?;

        if kind == EntityKind::Products {
            super::product::refresh_category_counts(&self.pool).await?;
        }

        self.feed
            .publish(ChangeEvent::bare(kind, ChangeAction::Delete, id));

        Ok(())
    }

    /// Restores a soft-deleted record: clears `deleted_at`, leaving every
    /// other field as it was.
    ///
    /// The published event has no payload; subscribers re-read the record
    /// by id through its typed repository.
    pub async fn restore(&self, kind: EntityKind, id: &str) -> DbResult<()> {
        info!(table = kind.table_name(), id = %id, "Restoring record");

        let now = Utc::now();

        let result = sqlx::query(&format!(
            "UPDATE {} SET deleted_at = NULL, updated_at = ?2 WHERE id = ?1 AND deleted_at IS NOT NULL",
            kind.table_name()
        ))
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(kind.table_name(), id));
        }

        if kind == EntityKind::Products {
            super::product::refresh_category_counts(&self.pool).await?;
        }

        self.feed
            .publish(ChangeEvent::bare(kind, ChangeAction::Insert, id));

        Ok(())
    }

    /// Permanently deletes a record. Irreversible; only records already in
    /// the bin can be purged. Line items cascade.
    pub async fn purge(&self, kind: EntityKind, id: &str) -> DbResult<()> {
        info!(table = kind.table_name(), id = %id, "Permanently deleting record");

        let result = sqlx::query(&format!(
            "DELETE FROM {} WHERE id = ?1 AND deleted_at IS NOT NULL",
            kind.table_name()
        ))
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found(kind.table_name(), id));
        }

        if kind == EntityKind::Products {
            super::product::refresh_category_counts(&self.pool).await?;
        }

        self.feed
            .publish(ChangeEvent::bare(kind, ChangeAction::Delete, id));

        Ok(())
    }
}

// =============================================================================
// Shared helper
// =============================================================================

/// Marks a live record as deleted on the given executor.
pub(crate) async fn soft_delete_record<'e, E>(
    executor: E,
    kind: EntityKind,
    id: &str,
) -> DbResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let now = Utc::now();

    let result = sqlx::query(&format!(
        "UPDATE {} SET deleted_at = ?2, updated_at = ?2 WHERE id = ?1 AND deleted_at IS NULL",
        kind.table_name()
    ))
    .bind(id)
    .bind(now)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found(kind.table_name(), id));
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use gestio_core::{Category, EntityStatus};
    use uuid::Uuid;

    fn test_category(name: &str) -> Category {
        let now = Utc::now();
        Category {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: None,
            status: EntityStatus::Active,
            product_count: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn test_deleted_record_appears_in_bin() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let category = db.categories().insert(&test_category("Bebidas")).await.unwrap();
        db.categories().soft_delete(&category.id).await.unwrap();

        let bin = db.recycle_bin().list_deleted().await.unwrap();
        assert_eq!(bin.len(), 1);
        assert_eq!(bin[0].table_type, "categories");
        assert_eq!(bin[0].id, category.id);
        assert_eq!(bin[0].label, "Bebidas");
    }

    #[tokio::test]
    async fn test_restore_brings_record_back_unchanged() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut original = test_category("Bebidas");
        original.description = Some("Refrigerantes e águas".to_string());
        let category = db.categories().insert(&original).await.unwrap();

        db.categories().soft_delete(&category.id).await.unwrap();
        assert!(db.categories().get_by_id(&category.id).await.unwrap().is_none());

        db.recycle_bin()
            .restore(EntityKind::Categories, &category.id)
            .await
            .unwrap();

        let restored = db.categories().get_by_id(&category.id).await.unwrap().unwrap();
        assert_eq!(restored.name, "Bebidas");
        assert_eq!(restored.description.as_deref(), Some("Refrigerantes e águas"));
        assert!(restored.deleted_at.is_none());

        assert!(db.recycle_bin().list_deleted().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_purge_only_reaches_binned_records() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let category = db.categories().insert(&test_category("Bebidas")).await.unwrap();

        // Live records cannot be purged
        let err = db
            .recycle_bin()
            .purge(EntityKind::Categories, &category.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        db.categories().soft_delete(&category.id).await.unwrap();
        db.recycle_bin()
            .purge(EntityKind::Categories, &category.id)
            .await
            .unwrap();

        // Gone for good
        assert!(db.recycle_bin().list_deleted().await.unwrap().is_empty());
        let err = db
            .recycle_bin()
            .restore(EntityKind::Categories, &category.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_generic_soft_delete() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let category = db.categories().insert(&test_category("Bebidas")).await.unwrap();
        db.recycle_bin()
            .soft_delete(EntityKind::Categories, &category.id)
            .await
            .unwrap();

        assert!(db.categories().get_by_id(&category.id).await.unwrap().is_none());

        // Double delete fails: the row is no longer live
        let err = db
            .recycle_bin()
            .soft_delete(EntityKind::Categories, &category.id)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}

//! # Stock Entry Repository
//!
//! Database operations for stock entries (inbound movements).
//!
//! Mirrors the exit repository: number allocation, header, items and the
//! stock increment share one transaction. Entries add stock; the MAX(0, …)
//! clamp is a no-op for positive deltas but keeps the single adjustment
//! path.

use chrono::{Datelike, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DbResult;
use crate::events::{ChangeAction, ChangeEvent, ChangeFeed};
use crate::repository::NewLineItem;
use crate::repository::{counter, product};
use gestio_core::{DocumentKind, EntityKind, StockEntry, StockEntryItem};

const COLUMNS: &str = "id, number, supplier_id, supplier_name, entry_date AS date, \
     invoice_number, notes, created_at, updated_at, deleted_at";

const ITEM_COLUMNS: &str =
    "id, entry_id, product_id, product_name, quantity, unit_price_cents, discount_bps, created_at";

/// Input for creating a stock entry.
#[derive(Debug, Clone)]
pub struct NewStockEntry {
    pub supplier_id: String,
    pub supplier_name: String,
    pub date: NaiveDate,
    pub invoice_number: Option<String>,
    pub notes: Option<String>,
    pub items: Vec<NewLineItem>,
}

/// Repository for stock entry database operations.
#[derive(Debug, Clone)]
pub struct StockEntryRepository {
    pool: SqlitePool,
    feed: ChangeFeed,
}

impl StockEntryRepository {
    /// Creates a new StockEntryRepository.
    pub fn new(pool: SqlitePool, feed: ChangeFeed) -> Self {
        StockEntryRepository { pool, feed }
    }

    /// Creates a stock entry with its items, incrementing product stock.
    pub async fn create(&self, new: NewStockEntry) -> DbResult<(StockEntry, Vec<StockEntryItem>)> {
        let now = Utc::now();
        let year = now.year();

        let mut tx = self.pool.begin().await?;

        let seq = counter::next_tx(&mut tx, DocumentKind::StockEntry.counter_type(), year).await?;
        let number = DocumentKind::StockEntry.format_number(year, seq);

        debug!(number = %number, items = new.items.len(), "Creating stock entry");

        let entry = StockEntry {
            id: Uuid::new_v4().to_string(),
            number,
            supplier_id: new.supplier_id,
            supplier_name: new.supplier_name,
            date: new.date,
            invoice_number: new.invoice_number,
            notes: new.notes,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        sqlx::query(
            r#"
            INSERT INTO stock_entries (
                id, number, supplier_id, supplier_name, entry_date,
                invoice_number, notes, created_at, updated_at, deleted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.number)
        .bind(&entry.supplier_id)
        .bind(&entry.supplier_name)
        .bind(entry.date)
        .bind(&entry.invoice_number)
        .bind(&entry.notes)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .bind(entry.deleted_at)
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(new.items.len());
        for line in &new.items {
            let item = StockEntryItem {
                id: Uuid::new_v4().to_string(),
                entry_id: entry.id.clone(),
                product_id: line.product_id.clone(),
                product_name: line.product_name.clone(),
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                discount_bps: line.discount_bps,
                created_at: now,
            };

            sqlx::query(
                r#"
                INSERT INTO stock_entry_items (
                    id, entry_id, product_id, product_name,
                    quantity, unit_price_cents, discount_bps, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&item.id)
            .bind(&item.entry_id)
            .bind(&item.product_id)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.discount_bps)
            .bind(item.created_at)
            .execute(&mut *tx)
            .await?;

            product::adjust_stock_tx(&mut *tx, &line.product_id, line.quantity, now).await?;

            items.push(item);
        }

        tx.commit().await?;

        info!(id = %entry.id, number = %entry.number, items = items.len(), "Stock entry created");

        self.feed.publish(ChangeEvent::with_record(
            EntityKind::StockEntries,
            ChangeAction::Insert,
            &entry.id,
            &entry,
        ));
        let product_ids: Vec<String> = items.iter().map(|i| i.product_id.clone()).collect();
        product::publish_products_updated(&self.pool, &self.feed, &product_ids).await;

        Ok((entry, items))
    }

    /// Lists live stock entries, newest first.
    pub async fn list(&self) -> DbResult<Vec<StockEntry>> {
        let entries = sqlx::query_as::<_, StockEntry>(&format!(
            "SELECT {COLUMNS} FROM stock_entries WHERE deleted_at IS NULL \
             ORDER BY entry_date DESC, number DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Gets a live stock entry by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<StockEntry>> {
        let entry = sqlx::query_as::<_, StockEntry>(&format!(
            "SELECT {COLUMNS} FROM stock_entries WHERE id = ?1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Gets all items of a stock entry.
    pub async fn get_items(&self, entry_id: &str) -> DbResult<Vec<StockEntryItem>> {
        let items = sqlx::query_as::<_, StockEntryItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM stock_entry_items WHERE entry_id = ?1 ORDER BY created_at"
        ))
        .bind(entry_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Soft-deletes a stock entry. The stock effect is not reverted;
    /// corrections are recorded as exits.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting stock entry");

        super::recycle_bin::soft_delete_record(&self.pool, EntityKind::StockEntries, id).await?;

        self.feed.publish(ChangeEvent::bare(
            EntityKind::StockEntries,
            ChangeAction::Delete,
            id,
        ));

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use gestio_core::{EntityStatus, Product};

    async fn seed_product(db: &Database, code: &str, stock: i64) -> Product {
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
                min_stock: 0,
                status: EntityStatus::Active,
                created_at: now,
                updated_at: now,
                deleted_at: None,
            })
            .await
            .unwrap()
    }

    fn new_entry(product: &Product, quantity: i64) -> NewStockEntry {
        NewStockEntry {
            supplier_id: Uuid::new_v4().to_string(),
            supplier_name: "Distribuidora Norte".to_string(),
            date: Utc::now().date_naive(),
            invoice_number: Some("FT 2025/117".to_string()),
            notes: None,
            items: vec![NewLineItem {
                product_id: product.id.clone(),
                product_name: product.name.clone(),
                quantity,
                unit_price_cents: product.purchase_price_cents,
                discount_bps: 0,
            }],
        }
    }

    #[tokio::test]
    async fn test_create_increments_stock_by_exact_quantity() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = seed_product(&db, "PRD-001", 10).await;
        let year = Utc::now().year();

        let (entry, items) = db
            .stock_entries()
            .create(new_entry(&product, 7))
            .await
            .unwrap();

        assert_eq!(entry.number, format!("ENT-{year}/001"));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_name, product.name);

        let after = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.current_stock, 17);
    }

    #[tokio::test]
    async fn test_get_items_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = seed_product(&db, "PRD-001", 0).await;

        let (entry, items) = db
            .stock_entries()
            .create(new_entry(&product, 3))
            .await
            .unwrap();

        let fetched = db.stock_entries().get_items(&entry.id).await.unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].id, items[0].id);
        assert_eq!(fetched[0].quantity, 3);
    }

    #[tokio::test]
    async fn test_soft_delete_keeps_stock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = seed_product(&db, "PRD-001", 0).await;

        let (entry, _) = db
            .stock_entries()
            .create(new_entry(&product, 5))
            .await
            .unwrap();

        db.stock_entries().soft_delete(&entry.id).await.unwrap();

        assert!(db.stock_entries().list().await.unwrap().is_empty());

        // Deleting the document does not revert the movement
        let after = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.current_stock, 5);
    }
}

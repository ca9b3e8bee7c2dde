//! # Stock Exit Repository
//!
//! Database operations for stock exits (outbound movements).
//!
//! ## Creation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Stock Exit Creation (one transaction)                   │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │   1. allocate next SAI counter for the current year                     │
//! │   2. INSERT stock_exits header                                          │
//! │   3. INSERT one stock_exit_items row per line                           │
//! │   4. per line: current_stock = MAX(0, current_stock - quantity)         │
//! │  COMMIT ──► publish change events                                       │
//! │                                                                         │
//! │  Any step failing rolls the whole exit back: the document and its       │
//! │  stock effect are never observable half-applied.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Exits converted from orders are created by
//! [`super::order::OrderRepository::convert_to_stock_exit`], which reuses
//! this module's transaction helpers.

use chrono::{Datelike, NaiveDate, Utc};
use sqlx::{Sqlite, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DbResult;
use crate::events::{ChangeAction, ChangeEvent, ChangeFeed};
use crate::repository::NewLineItem;
use crate::repository::{counter, product};
use gestio_core::{DocumentKind, EntityKind, StockExit, StockExitItem};

pub(crate) const COLUMNS: &str = "id, number, client_id, client_name, exit_date AS date, \
     invoice_number, notes, discount_bps, from_order_id, from_order_number, \
     created_at, updated_at, deleted_at";

const ITEM_COLUMNS: &str =
    "id, exit_id, product_id, product_name, quantity, unit_price_cents, discount_bps, created_at";

/// Input for creating a standalone stock exit.
#[derive(Debug, Clone)]
pub struct NewStockExit {
    pub client_id: String,
    pub client_name: String,
    pub date: NaiveDate,
    pub invoice_number: Option<String>,
    pub notes: Option<String>,
    pub discount_bps: u32,
    pub items: Vec<NewLineItem>,
}

/// Repository for stock exit database operations.
#[derive(Debug, Clone)]
pub struct StockExitRepository {
    pool: SqlitePool,
    feed: ChangeFeed,
}

impl StockExitRepository {
    /// Creates a new StockExitRepository.
    pub fn new(pool: SqlitePool, feed: ChangeFeed) -> Self {
        StockExitRepository { pool, feed }
    }

    /// Creates a stock exit with its items, decrementing product stock.
    ///
    /// Number allocation, header, items and stock effect share one
    /// transaction.
    pub async fn create(&self, new: NewStockExit) -> DbResult<(StockExit, Vec<StockExitItem>)> {
        let now = Utc::now();
        let year = now.year();

        let mut tx = self.pool.begin().await?;

        let seq = counter::next_tx(&mut tx, DocumentKind::StockExit.counter_type(), year).await?;
        let number = DocumentKind::StockExit.format_number(year, seq);

        debug!(number = %number, items = new.items.len(), "Creating stock exit");

        let exit = StockExit {
            id: Uuid::new_v4().to_string(),
            number,
            client_id: new.client_id,
            client_name: new.client_name,
            date: new.date,
            invoice_number: new.invoice_number,
            notes: new.notes,
            discount_bps: new.discount_bps,
            from_order_id: None,
            from_order_number: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        insert_exit_tx(&mut *tx, &exit).await?;

        let mut items = Vec::with_capacity(new.items.len());
        for line in &new.items {
            let item = StockExitItem {
                id: Uuid::new_v4().to_string(),
                exit_id: exit.id.clone(),
                product_id: line.product_id.clone(),
                product_name: line.product_name.clone(),
                quantity: line.quantity,
                unit_price_cents: line.unit_price_cents,
                discount_bps: line.discount_bps,
                created_at: now,
            };

            insert_exit_item_tx(&mut *tx, &item).await?;
            product::adjust_stock_tx(&mut *tx, &line.product_id, -line.quantity, now).await?;

            items.push(item);
        }

        tx.commit().await?;

        info!(id = %exit.id, number = %exit.number, items = items.len(), "Stock exit created");

        self.feed.publish(ChangeEvent::with_record(
            EntityKind::StockExits,
            ChangeAction::Insert,
            &exit.id,
            &exit,
        ));
        let product_ids: Vec<String> = items.iter().map(|i| i.product_id.clone()).collect();
        product::publish_products_updated(&self.pool, &self.feed, &product_ids).await;

        Ok((exit, items))
    }

    /// Lists live stock exits, newest first.
    pub async fn list(&self) -> DbResult<Vec<StockExit>> {
        let exits = sqlx::query_as::<_, StockExit>(&format!(
            "SELECT {COLUMNS} FROM stock_exits WHERE deleted_at IS NULL \
             ORDER BY exit_date DESC, number DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(exits)
    }

    /// Gets a live stock exit by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<StockExit>> {
        let exit = sqlx::query_as::<_, StockExit>(&format!(
            "SELECT {COLUMNS} FROM stock_exits WHERE id = ?1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(exit)
    }

    /// Gets all items of a stock exit.
    pub async fn get_items(&self, exit_id: &str) -> DbResult<Vec<StockExitItem>> {
        let items = sqlx::query_as::<_, StockExitItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM stock_exit_items WHERE exit_id = ?1 ORDER BY created_at"
        ))
        .bind(exit_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Finds the live exit materialized from a given order, if any.
    ///
    /// Used by the conversion workflow to detect an orphan exit left behind
    /// by an earlier conversion whose order update never landed.
    pub async fn find_by_order(&self, order_id: &str) -> DbResult<Option<StockExit>> {
        let exit = sqlx::query_as::<_, StockExit>(&format!(
            "SELECT {COLUMNS} FROM stock_exits WHERE from_order_id = ?1 AND deleted_at IS NULL"
        ))
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(exit)
    }

    /// Soft-deletes a stock exit. The stock effect is not reverted;
    /// corrections are recorded as entries.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting stock exit");

        super::recycle_bin::soft_delete_record(&self.pool, EntityKind::StockExits, id).await?;

        self.feed.publish(ChangeEvent::bare(
            EntityKind::StockExits,
            ChangeAction::Delete,
            id,
        ));

        Ok(())
    }
}

// =============================================================================
// Transaction helpers (shared with the order conversion workflow)
// =============================================================================

/// Inserts a stock exit header on the given executor.
pub(crate) async fn insert_exit_tx<'e, E>(executor: E, exit: &StockExit) -> DbResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO stock_exits (
            id, number, client_id, client_name, exit_date,
            invoice_number, notes, discount_bps,
            from_order_id, from_order_number,
            created_at, updated_at, deleted_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#,
    )
    .bind(&exit.id)
    .bind(&exit.number)
    .bind(&exit.client_id)
    .bind(&exit.client_name)
    .bind(exit.date)
    .bind(&exit.invoice_number)
    .bind(&exit.notes)
    .bind(exit.discount_bps)
    .bind(&exit.from_order_id)
    .bind(&exit.from_order_number)
    .bind(exit.created_at)
    .bind(exit.updated_at)
    .bind(exit.deleted_at)
    .execute(executor)
    .await?;

    Ok(())
}

/// Inserts a stock exit item on the given executor.
pub(crate) async fn insert_exit_item_tx<'e, E>(executor: E, item: &StockExitItem) -> DbResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO stock_exit_items (
            id, exit_id, product_id, product_name,
            quantity, unit_price_cents, discount_bps, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&item.id)
    .bind(&item.exit_id)
    .bind(&item.product_id)
    .bind(&item.product_name)
    .bind(item.quantity)
    .bind(item.unit_price_cents)
    .bind(item.discount_bps)
    .bind(item.created_at)
    .execute(executor)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Expense Repository
//!
//! Database operations for supplier expenses.
//!
//! Expenses are numbered documents (`DES-YYYY/NNN`) with free-text line
//! items and no stock effect. Items are replaced wholesale on edit.

use chrono::{Datelike, NaiveDate, Utc};
use sqlx::{Sqlite, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::events::{ChangeAction, ChangeEvent, ChangeFeed};
use crate::repository::counter;
use crate::repository::NewExpenseItem;
use gestio_core::{DocumentKind, EntityKind, Expense, ExpenseItem};

const COLUMNS: &str = "id, number, supplier_id, supplier_name, expense_date AS date, \
     discount_bps, notes, created_at, updated_at, deleted_at";

const ITEM_COLUMNS: &str =
    "id, expense_id, product_name, quantity, unit_price_cents, discount_bps, created_at";

/// Input for creating an expense.
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub supplier_id: String,
    pub supplier_name: String,
    pub date: NaiveDate,
    pub discount_bps: u32,
    pub notes: Option<String>,
    pub items: Vec<NewExpenseItem>,
}

/// Repository for expense database operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
    feed: ChangeFeed,
}

impl ExpenseRepository {
    /// Creates a new ExpenseRepository.
    pub fn new(pool: SqlitePool, feed: ChangeFeed) -> Self {
        ExpenseRepository { pool, feed }
    }

    /// Creates an expense with its items.
    pub async fn create(&self, new: NewExpense) -> DbResult<(Expense, Vec<ExpenseItem>)> {
        let now = Utc::now();
        let year = now.year();

        let mut tx = self.pool.begin().await?;

        let seq = counter::next_tx(&mut tx, DocumentKind::Expense.counter_type(), year).await?;
        let number = DocumentKind::Expense.format_number(year, seq);

        debug!(number = %number, items = new.items.len(), "Creating expense");

        let expense = Expense {
            id: Uuid::new_v4().to_string(),
            number,
            supplier_id: new.supplier_id,
            supplier_name: new.supplier_name,
            date: new.date,
            discount_bps: new.discount_bps,
            notes: new.notes,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        sqlx::query(
            r#"
            INSERT INTO expenses (
                id, number, supplier_id, supplier_name, expense_date,
                discount_bps, notes, created_at, updated_at, deleted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&expense.id)
        .bind(&expense.number)
        .bind(&expense.supplier_id)
        .bind(&expense.supplier_name)
        .bind(expense.date)
        .bind(expense.discount_bps)
        .bind(&expense.notes)
        .bind(expense.created_at)
        .bind(expense.updated_at)
        .bind(expense.deleted_at)
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(new.items.len());
        for line in &new.items {
            let item = build_item(&expense.id, line, now);
            insert_item_tx(&mut *tx, &item).await?;
            items.push(item);
        }

        tx.commit().await?;

        info!(id = %expense.id, number = %expense.number, items = items.len(), "Expense created");

        self.feed.publish(ChangeEvent::with_record(
            EntityKind::Expenses,
            ChangeAction::Insert,
            &expense.id,
            &expense,
        ));

        Ok((expense, items))
    }

    /// Lists live expenses, newest first.
    pub async fn list(&self) -> DbResult<Vec<Expense>> {
        let expenses = sqlx::query_as::<_, Expense>(&format!(
            "SELECT {COLUMNS} FROM expenses WHERE deleted_at IS NULL \
             ORDER BY expense_date DESC, number DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }

    /// Gets a live expense by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Expense>> {
        let expense = sqlx::query_as::<_, Expense>(&format!(
            "SELECT {COLUMNS} FROM expenses WHERE id = ?1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(expense)
    }

    /// Gets all items of an expense.
    pub async fn get_items(&self, expense_id: &str) -> DbResult<Vec<ExpenseItem>> {
        let items = sqlx::query_as::<_, ExpenseItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM expense_items WHERE expense_id = ?1 ORDER BY created_at"
        ))
        .bind(expense_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Updates an expense's header and, when given, replaces its items
    /// wholesale.
    pub async fn update(&self, expense: &Expense, items: Option<&[NewExpenseItem]>) -> DbResult<()> {
        debug!(id = %expense.id, replace_items = items.is_some(), "Updating expense");

        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE expenses SET
                supplier_id = ?2,
                supplier_name = ?3,
                expense_date = ?4,
                discount_bps = ?5,
                notes = ?6,
                updated_at = ?7
            WHERE id = ?1 AND deleted_at IS NULL
            "#,
        )
        .bind(&expense.id)
        .bind(&expense.supplier_id)
        .bind(&expense.supplier_name)
        .bind(expense.date)
        .bind(expense.discount_bps)
        .bind(&expense.notes)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Expense", &expense.id));
        }

        if let Some(lines) = items {
            sqlx::query("DELETE FROM expense_items WHERE expense_id = ?1")
                .bind(&expense.id)
                .execute(&mut *tx)
                .await?;

            for line in lines {
                let item = build_item(&expense.id, line, now);
                insert_item_tx(&mut *tx, &item).await?;
            }
        }

        tx.commit().await?;

        if let Some(fresh) = self.get_by_id(&expense.id).await? {
            self.feed.publish(ChangeEvent::with_record(
                EntityKind::Expenses,
                ChangeAction::Update,
                &fresh.id,
                &fresh,
            ));
        }

        Ok(())
    }

    /// Soft-deletes an expense.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting expense");

        super::recycle_bin::soft_delete_record(&self.pool, EntityKind::Expenses, id).await?;

        self.feed.publish(ChangeEvent::bare(
            EntityKind::Expenses,
            ChangeAction::Delete,
            id,
        ));

        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn build_item(expense_id: &str, line: &NewExpenseItem, now: chrono::DateTime<Utc>) -> ExpenseItem {
    ExpenseItem {
        id: Uuid::new_v4().to_string(),
        expense_id: expense_id.to_string(),
        product_name: line.product_name.clone(),
        quantity: line.quantity,
        unit_price_cents: line.unit_price_cents,
        discount_bps: line.discount_bps,
        created_at: now,
    }
}

async fn insert_item_tx<'e, E>(executor: E, item: &ExpenseItem) -> DbResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO expense_items (
            id, expense_id, product_name,
            quantity, unit_price_cents, discount_bps, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&item.id)
    .bind(&item.expense_id)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn new_expense() -> NewExpense {
        NewExpense {
            supplier_id: Uuid::new_v4().to_string(),
            supplier_name: "EDP Comercial".to_string(),
            date: Utc::now().date_naive(),
            discount_bps: 0,
            notes: Some("Eletricidade do armazém".to_string()),
            items: vec![NewExpenseItem {
                product_name: "Eletricidade".to_string(),
                quantity: 1,
                unit_price_cents: 8450,
                discount_bps: 0,
            }],
        }
    }

    #[tokio::test]
    async fn test_create_numbers_expenses() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let year = Utc::now().year();

        let (expense, items) = db.expenses().create(new_expense()).await.unwrap();

        assert_eq!(expense.number, format!("DES-{year}/001"));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].line_total().cents(), 8450);
    }

    #[tokio::test]
    async fn test_expenses_do_not_touch_stock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.expenses().create(new_expense()).await.unwrap();

        // No product exists and none is required
        assert!(db.products().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_replaces_items() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let (expense, _) = db.expenses().create(new_expense()).await.unwrap();

        let replacement = [
            NewExpenseItem {
                product_name: "Eletricidade".to_string(),
                quantity: 1,
                unit_price_cents: 9000,
                discount_bps: 0,
            },
            NewExpenseItem {
                product_name: "Água".to_string(),
                quantity: 1,
                unit_price_cents: 2100,
                discount_bps: 0,
            },
        ];
        db.expenses().update(&expense, Some(&replacement)).await.unwrap();

        let items = db.expenses().get_items(&expense.id).await.unwrap();
        assert_eq!(items.len(), 2);
    }
}

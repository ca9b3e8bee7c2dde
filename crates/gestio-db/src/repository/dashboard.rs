//! # Dashboard Repository
//!
//! Aggregation queries backing the dashboard: live counts per entity,
//! stock totals and current-month movement totals.
//!
//! Money sums are gross line totals (line discount applied, document
//! discount not), rounded the same way the pure layer rounds.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::DbResult;

/// Live record counts per entity, plus derived order/stock counts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityCounts {
    pub products: i64,
    pub categories: i64,
    pub clients: i64,
    pub suppliers: i64,
    pub pending_orders: i64,
    pub low_stock_products: i64,
}

/// On-hand stock across all live products.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StockTotals {
    /// Sum of current_stock over live products.
    pub total_units: i64,
    /// Stock valued at sale price, in cents.
    pub retail_value_cents: i64,
}

/// Gross movement totals for one calendar month.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthTotals {
    pub entries_cents: i64,
    pub exits_cents: i64,
    pub expenses_cents: i64,
}

/// Repository for dashboard aggregation.
#[derive(Debug, Clone)]
pub struct DashboardRepository {
    pool: SqlitePool,
}

impl DashboardRepository {
    /// Creates a new DashboardRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DashboardRepository { pool }
    }

    /// Live counts per entity.
    pub async fn counts(&self) -> DbResult<EntityCounts> {
        let products: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        let categories: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        let clients: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM clients WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        let suppliers: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM suppliers WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        let pending_orders: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM orders WHERE deleted_at IS NULL AND status = 'pending'",
        )
        .fetch_one(&self.pool)
        .await?;

        let low_stock_products: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM products
            WHERE deleted_at IS NULL
              AND status = 'active'
              AND min_stock > 0
              AND current_stock <= min_stock
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(EntityCounts {
            products,
            categories,
            clients,
            suppliers,
            pending_orders,
            low_stock_products,
        })
    }

    /// Stock quantity and retail value across live products.
    pub async fn stock_totals(&self) -> DbResult<StockTotals> {
        let row: (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COALESCE(SUM(current_stock), 0),
                COALESCE(SUM(current_stock * sale_price_cents), 0)
            FROM products
            WHERE deleted_at IS NULL
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(StockTotals {
            total_units: row.0,
            retail_value_cents: row.1,
        })
    }

    /// Gross totals for the given month. `year`/`month` select documents by
    /// their document date.
    pub async fn month_totals(&self, year: i32, month: u32) -> DbResult<MonthTotals> {
        let key = format!("{year:04}-{month:02}");

        let entries_cents = self
            .sum_items(
                "stock_entry_items",
                "stock_entries",
                "entry_id",
                "entry_date",
                &key,
            )
            .await?;
        let exits_cents = self
            .sum_items(
                "stock_exit_items",
                "stock_exits",
                "exit_id",
                "exit_date",
                &key,
            )
            .await?;
        let expenses_cents = self
            .sum_items(
                "expense_items",
                "expenses",
                "expense_id",
                "expense_date",
                &key,
            )
            .await?;

        Ok(MonthTotals {
            entries_cents,
            exits_cents,
            expenses_cents,
        })
    }

    /// Sums the discounted line totals of one item table for one month.
    async fn sum_items(
        &self,
        item_table: &str,
        doc_table: &str,
        fk: &str,
        date_column: &str,
        month_key: &str,
    ) -> DbResult<i64> {
        let sql = format!(
            r#"
            SELECT COALESCE(SUM(CAST(ROUND(
                i.quantity * i.unit_price_cents * (10000 - i.discount_bps) / 10000.0
            ) AS INTEGER)), 0)
            FROM {item_table} i
            JOIN {doc_table} d ON d.id = i.{fk}
            WHERE d.deleted_at IS NULL
              AND substr(d.{date_column}, 1, 7) = ?1
            "#
        );

        let total: i64 = sqlx::query_scalar(&sql)
            .bind(month_key)
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::stock_entry::NewStockEntry;
    use crate::repository::NewLineItem;
    use chrono::{Datelike, Utc};
    use gestio_core::{EntityStatus, Product};
    use uuid::Uuid;

    async fn seed_product(db: &Database, code: &str, stock: i64, min_stock: i64) -> Product {
        let now = Utc::now();
        db.products()
            .insert(&Product {
                id: Uuid::new_v4().to_string(),
                code: code.to_string(),
                name: format!("Produto {code}"),
                description: None,
                category_name: None,
                purchase_price_cents: 100,
                sale_price_cents: 250,
                current_stock: stock,
                min_stock,
                status: EntityStatus::Active,
                created_at: now,
                updated_at: now,
                deleted_at: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_counts_and_stock_totals() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        seed_product(&db, "PRD-001", 4, 10).await; // low stock
        seed_product(&db, "PRD-002", 20, 10).await;

        let counts = db.dashboard().counts().await.unwrap();
        assert_eq!(counts.products, 2);
        assert_eq!(counts.low_stock_products, 1);
        assert_eq!(counts.pending_orders, 0);

        let totals = db.dashboard().stock_totals().await.unwrap();
        assert_eq!(totals.total_units, 24);
        assert_eq!(totals.retail_value_cents, 24 * 250);
    }

    #[tokio::test]
    async fn test_month_totals_pick_up_entries() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = seed_product(&db, "PRD-001", 0, 0).await;

        db.stock_entries()
            .create(NewStockEntry {
                supplier_id: Uuid::new_v4().to_string(),
                supplier_name: "Distribuidora Norte".to_string(),
                date: Utc::now().date_naive(),
                invoice_number: None,
                notes: None,
                items: vec![NewLineItem {
                    product_id: product.id.clone(),
                    product_name: product.name.clone(),
                    quantity: 10,
                    unit_price_cents: 100,
                    discount_bps: 1000, // 10% off
                }],
            })
            .await
            .unwrap();

        let now = Utc::now();
        let totals = db
            .dashboard()
            .month_totals(now.year(), now.month())
            .await
            .unwrap();

        assert_eq!(totals.entries_cents, 900);
        assert_eq!(totals.exits_cents, 0);
        assert_eq!(totals.expenses_cents, 0);
    }
}

//! # Order Repository
//!
//! Database operations for orders and the order → stock exit conversion.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. CREATE                                                              │
//! │     └── create() → Order { status: Pending, number: ENC-YYYY/NNN }      │
//! │                                                                         │
//! │  2. EDIT (pending only)                                                 │
//! │     └── update() → header fields, items replaced wholesale              │
//! │                                                                         │
//! │  3a. CANCEL (pending only)                                              │
//! │      └── cancel() → Order { status: Cancelled }                         │
//! │                                                                         │
//! │  3b. CONVERT (pending only, terminal)                                   │
//! │      └── convert_to_stock_exit() → StockExit { from_order_id },         │
//! │          stock decremented, order marked Converted                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Conversion Atomicity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │             convert_to_stock_exit (one transaction)                     │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │   1. read the order and its items                                       │
//! │   2. allocate next SAI counter for the current year                     │
//! │   3. INSERT stock_exits header (client/date/discount copied,            │
//! │      from_order_id/from_order_number set, caller's invoice number)      │
//! │   4. INSERT one stock_exit_items row per order item                     │
//! │   5. per item: current_stock = MAX(0, current_stock - quantity)         │
//! │   6. UPDATE orders SET status = 'converted', converted_to_…             │
//! │      WHERE id = ? AND status = 'pending'    ◄── zero rows aborts        │
//! │  COMMIT ──► publish change events                                       │
//! │                                                                         │
//! │  The status-guarded update in step 6 makes two racing conversions       │
//! │  serialize: the loser matches zero rows and the whole transaction       │
//! │  rolls back, so a duplicate exit can never be committed.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Datelike, NaiveDate, Utc};
use sqlx::{Sqlite, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::events::{ChangeAction, ChangeEvent, ChangeFeed};
use crate::repository::NewLineItem;
use crate::repository::{counter, product, stock_exit};
use gestio_core::{DocumentKind, EntityKind, Order, OrderItem, OrderStatus, StockExit, StockExitItem};

const COLUMNS: &str = "id, number, client_id, client_name, order_date AS date, discount_bps, \
     status, converted_to_stock_exit_id, converted_to_stock_exit_number, notes, \
     created_at, updated_at, deleted_at";

const ITEM_COLUMNS: &str =
    "id, order_id, product_id, product_name, quantity, unit_price_cents, discount_bps, created_at";

/// Input for creating an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub client_id: String,
    pub client_name: String,
    pub date: NaiveDate,
    pub discount_bps: u32,
    pub notes: Option<String>,
    pub items: Vec<NewLineItem>,
}

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
    feed: ChangeFeed,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool, feed: ChangeFeed) -> Self {
        OrderRepository { pool, feed }
    }

    /// Creates a pending order with its items.
    ///
    /// Number allocation, header and items share one transaction.
    pub async fn create(&self, new: NewOrder) -> DbResult<(Order, Vec<OrderItem>)> {
        let now = Utc::now();
        let year = now.year();

        let mut tx = self.pool.begin().await?;

        let seq = counter::next_tx(&mut tx, DocumentKind::Order.counter_type(), year).await?;
        let number = DocumentKind::Order.format_number(year, seq);

        debug!(number = %number, items = new.items.len(), "Creating order");

        let order = Order {
            id: Uuid::new_v4().to_string(),
            number,
            client_id: new.client_id,
            client_name: new.client_name,
            date: new.date,
            discount_bps: new.discount_bps,
            status: OrderStatus::Pending,
            converted_to_stock_exit_id: None,
            converted_to_stock_exit_number: None,
            notes: new.notes,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, number, client_id, client_name, order_date, discount_bps,
                status, converted_to_stock_exit_id, converted_to_stock_exit_number,
                notes, created_at, updated_at, deleted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&order.id)
        .bind(&order.number)
        .bind(&order.client_id)
        .bind(&order.client_name)
        .bind(order.date)
        .bind(order.discount_bps)
        .bind(order.status)
        .bind(&order.converted_to_stock_exit_id)
        .bind(&order.converted_to_stock_exit_number)
        .bind(&order.notes)
        .bind(order.created_at)
        .bind(order.updated_at)
        .bind(order.deleted_at)
        .execute(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(new.items.len());
        for line in &new.items {
            let item = build_item(&order.id, line, now);
            insert_item_tx(&mut *tx, &item).await?;
            items.push(item);
        }

        tx.commit().await?;

        info!(id = %order.id, number = %order.number, items = items.len(), "Order created");

        self.feed.publish(ChangeEvent::with_record(
            EntityKind::Orders,
            ChangeAction::Insert,
            &order.id,
            &order,
        ));

        Ok((order, items))
    }

    /// Lists live orders, newest first.
    pub async fn list(&self) -> DbResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(&format!(
            "SELECT {COLUMNS} FROM orders WHERE deleted_at IS NULL \
             ORDER BY order_date DESC, number DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }

    /// Gets a live order by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {COLUMNS} FROM orders WHERE id = ?1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(order)
    }

    /// Gets all items of an order.
    pub async fn get_items(&self, order_id: &str) -> DbResult<Vec<OrderItem>> {
        let items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ?1 ORDER BY created_at"
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Updates a pending order's header and, when given, replaces its items
    /// wholesale (delete + re-insert, no diffing).
    ///
    /// Converted and cancelled orders match zero rows and fail NotFound.
    pub async fn update(&self, order: &Order, items: Option<&[NewLineItem]>) -> DbResult<()> {
        debug!(id = %order.id, replace_items = items.is_some(), "Updating order");

        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                client_id = ?2,
                client_name = ?3,
                order_date = ?4,
                discount_bps = ?5,
                notes = ?6,
                updated_at = ?7
            WHERE id = ?1 AND status = 'pending' AND deleted_at IS NULL
            "#,
        )
        .bind(&order.id)
        .bind(&order.client_id)
        .bind(&order.client_name)
        .bind(order.date)
        .bind(order.discount_bps)
        .bind(&order.notes)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order (pending)", &order.id));
        }

        if let Some(lines) = items {
            sqlx::query("DELETE FROM order_items WHERE order_id = ?1")
                .bind(&order.id)
                .execute(&mut *tx)
                .await?;

            for line in lines {
                let item = build_item(&order.id, line, now);
                insert_item_tx(&mut *tx, &item).await?;
            }
        }

        tx.commit().await?;

        if let Some(fresh) = self.get_by_id(&order.id).await? {
            self.feed.publish(ChangeEvent::with_record(
                EntityKind::Orders,
                ChangeAction::Update,
                &fresh.id,
                &fresh,
            ));
        }

        Ok(())
    }

    /// Cancels a pending order.
    pub async fn cancel(&self, id: &str) -> DbResult<Order> {
        debug!(id = %id, "Cancelling order");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE orders SET status = 'cancelled', updated_at = ?2
            WHERE id = ?1 AND status = 'pending' AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order (pending)", id));
        }

        let fresh = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", id))?;

        self.feed.publish(ChangeEvent::with_record(
            EntityKind::Orders,
            ChangeAction::Update,
            &fresh.id,
            &fresh,
        ));

        Ok(fresh)
    }

    /// Marks a pending order as converted to an already-existing exit.
    ///
    /// This is the orphan-recovery path: an earlier conversion created the
    /// exit but the order update never landed. Adopting the exit instead of
    /// converting again prevents a duplicate exit.
    pub async fn adopt_exit(&self, order_id: &str, exit: &StockExit) -> DbResult<Order> {
        info!(order_id = %order_id, exit_number = %exit.number, "Adopting orphan exit");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = 'converted',
                converted_to_stock_exit_id = ?2,
                converted_to_stock_exit_number = ?3,
                updated_at = ?4
            WHERE id = ?1 AND status = 'pending' AND deleted_at IS NULL
            "#,
        )
        .bind(order_id)
        .bind(&exit.id)
        .bind(&exit.number)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order (pending)", order_id));
        }

        let fresh = self
            .get_by_id(order_id)
            .await?
            .ok_or_else(|| DbError::not_found("Order", order_id))?;

        self.feed.publish(ChangeEvent::with_record(
            EntityKind::Orders,
            ChangeAction::Update,
            &fresh.id,
            &fresh,
        ));

        Ok(fresh)
    }

    /// Converts a pending order into a stock exit.
    ///
    /// All of it happens in one transaction: exit header and items derived
    /// from the order, clamped stock decrement per item, and the
    /// status-guarded order update. Returns the created exit with items.
    pub async fn convert_to_stock_exit(
        &self,
        order_id: &str,
        invoice_number: Option<&str>,
    ) -> DbResult<(StockExit, Vec<StockExitItem>)> {
        let now = Utc::now();
        let year = now.year();

        let mut tx = self.pool.begin().await?;

        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {COLUMNS} FROM orders WHERE id = ?1 AND deleted_at IS NULL"
        ))
        .bind(order_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("Order", order_id))?;

        let order_items = sqlx::query_as::<_, OrderItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ?1 ORDER BY created_at"
        ))
        .bind(order_id)
        .fetch_all(&mut *tx)
        .await?;

        let seq = counter::next_tx(&mut tx, DocumentKind::StockExit.counter_type(), year).await?;
        let number = DocumentKind::StockExit.format_number(year, seq);

        debug!(order = %order.number, exit_number = %number, items = order_items.len(),
               "Converting order to stock exit");

        let exit = StockExit {
            id: Uuid::new_v4().to_string(),
            number,
            client_id: order.client_id.clone(),
            client_name: order.client_name.clone(),
            date: order.date,
            invoice_number: invoice_number.map(|s| s.to_string()),
            notes: order.notes.clone(),
            discount_bps: order.discount_bps,
            from_order_id: Some(order.id.clone()),
            from_order_number: Some(order.number.clone()),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        stock_exit::insert_exit_tx(&mut *tx, &exit).await?;

        let mut exit_items = Vec::with_capacity(order_items.len());
        for item in &order_items {
            let exit_item = StockExitItem {
                id: Uuid::new_v4().to_string(),
                exit_id: exit.id.clone(),
                product_id: item.product_id.clone(),
                product_name: item.product_name.clone(),
                quantity: item.quantity,
                unit_price_cents: item.unit_price_cents,
                discount_bps: item.discount_bps,
                created_at: now,
            };

            stock_exit::insert_exit_item_tx(&mut *tx, &exit_item).await?;
            product::adjust_stock_tx(&mut *tx, &item.product_id, -item.quantity, now).await?;

            exit_items.push(exit_item);
        }

        // The guard serializes racing conversions: zero rows here means the
        // order is no longer pending and the whole transaction rolls back.
        let result = sqlx::query(
            r#"
            UPDATE orders SET
                status = 'converted',
                converted_to_stock_exit_id = ?2,
                converted_to_stock_exit_number = ?3,
                updated_at = ?4
            WHERE id = ?1 AND status = 'pending' AND deleted_at IS NULL
            "#,
        )
        .bind(&order.id)
        .bind(&exit.id)
        .bind(&exit.number)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order (pending)", order_id));
        }

        let converted = sqlx::query_as::<_, Order>(&format!(
            "SELECT {COLUMNS} FROM orders WHERE id = ?1"
        ))
        .bind(&order.id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(order = %converted.number, exit = %exit.number, items = exit_items.len(),
              "Order converted to stock exit");

        self.feed.publish(ChangeEvent::with_record(
            EntityKind::StockExits,
            ChangeAction::Insert,
            &exit.id,
            &exit,
        ));
        self.feed.publish(ChangeEvent::with_record(
            EntityKind::Orders,
            ChangeAction::Update,
            &converted.id,
            &converted,
        ));
        let product_ids: Vec<String> = exit_items.iter().map(|i| i.product_id.clone()).collect();
        product::publish_products_updated(&self.pool, &self.feed, &product_ids).await;

        Ok((exit, exit_items))
    }

    /// Soft-deletes an order.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting order");

        super::recycle_bin::soft_delete_record(&self.pool, EntityKind::Orders, id).await?;

        self.feed.publish(ChangeEvent::bare(
            EntityKind::Orders,
            ChangeAction::Delete,
            id,
        ));

        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn build_item(order_id: &str, line: &NewLineItem, now: chrono::DateTime<Utc>) -> OrderItem {
    OrderItem {
        id: Uuid::new_v4().to_string(),
        order_id: order_id.to_string(),
        product_id: line.product_id.clone(),
        product_name: line.product_name.clone(),
        quantity: line.quantity,
        unit_price_cents: line.unit_price_cents,
        discount_bps: line.discount_bps,
        created_at: now,
    }
}

async fn insert_item_tx<'e, E>(executor: E, item: &OrderItem) -> DbResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(
        r#"
        INSERT INTO order_items (
            id, order_id, product_id, product_name,
            quantity, unit_price_cents, discount_bps, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
    )
    .bind(&item.id)
    .bind(&item.order_id)
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

    fn line(product: &Product, quantity: i64) -> NewLineItem {
        NewLineItem {
            product_id: product.id.clone(),
            product_name: product.name.clone(),
            quantity,
            unit_price_cents: product.sale_price_cents,
            discount_bps: 0,
        }
    }

    fn new_order(items: Vec<NewLineItem>) -> NewOrder {
        NewOrder {
            client_id: Uuid::new_v4().to_string(),
            client_name: "Mercearia Silva".to_string(),
            date: Utc::now().date_naive(),
            discount_bps: 500,
            notes: None,
            items,
        }
    }

    #[tokio::test]
    async fn test_create_allocates_sequential_numbers() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = seed_product(&db, "PRD-001", 50).await;
        let year = Utc::now().year();

        let (first, _) = db.orders().create(new_order(vec![line(&product, 1)])).await.unwrap();
        let (second, _) = db.orders().create(new_order(vec![line(&product, 2)])).await.unwrap();

        assert_eq!(first.number, format!("ENC-{year}/001"));
        assert_eq!(second.number, format!("ENC-{year}/002"));
        assert_eq!(first.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_update_replaces_items_wholesale() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p1 = seed_product(&db, "PRD-001", 50).await;
        let p2 = seed_product(&db, "PRD-002", 50).await;

        let (order, _) = db
            .orders()
            .create(new_order(vec![line(&p1, 1), line(&p2, 2)]))
            .await
            .unwrap();

        let replacement = [line(&p2, 9)];
        db.orders().update(&order, Some(&replacement)).await.unwrap();

        let items = db.orders().get_items(&order.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_id, p2.id);
        assert_eq!(items[0].quantity, 9);
    }

    #[tokio::test]
    async fn test_cancel_pending_only() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = seed_product(&db, "PRD-001", 50).await;

        let (order, _) = db.orders().create(new_order(vec![line(&product, 1)])).await.unwrap();

        let cancelled = db.orders().cancel(&order.id).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);

        // A second cancel matches nothing
        let err = db.orders().cancel(&order.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_conversion_end_to_end() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let p1 = seed_product(&db, "PRD-001", 10).await;
        let p2 = seed_product(&db, "PRD-002", 10).await;
        let year = Utc::now().year();

        let (order, _) = db
            .orders()
            .create(new_order(vec![line(&p1, 2), line(&p2, 3)]))
            .await
            .unwrap();

        let (exit, exit_items) = db
            .orders()
            .convert_to_stock_exit(&order.id, Some("FT 2025/004"))
            .await
            .unwrap();

        // Exit mirrors the order
        assert_eq!(exit.number, format!("SAI-{year}/001"));
        assert_eq!(exit.from_order_id.as_deref(), Some(order.id.as_str()));
        assert_eq!(exit.from_order_number.as_deref(), Some(order.number.as_str()));
        assert_eq!(exit.client_name, order.client_name);
        assert_eq!(exit.discount_bps, order.discount_bps);
        assert_eq!(exit.invoice_number.as_deref(), Some("FT 2025/004"));
        assert_eq!(exit_items.len(), 2);

        // Stock decremented per item
        let p1_after = db.products().get_by_id(&p1.id).await.unwrap().unwrap();
        let p2_after = db.products().get_by_id(&p2.id).await.unwrap().unwrap();
        assert_eq!(p1_after.current_stock, 8);
        assert_eq!(p2_after.current_stock, 7);

        // Order carries the back-link and terminal status
        let converted = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(converted.status, OrderStatus::Converted);
        assert_eq!(
            converted.converted_to_stock_exit_id.as_deref(),
            Some(exit.id.as_str())
        );
        assert_eq!(
            converted.converted_to_stock_exit_number.as_deref(),
            Some(exit.number.as_str())
        );

        // The exit is findable through the back-reference
        let found = db.stock_exits().find_by_order(&order.id).await.unwrap().unwrap();
        assert_eq!(found.id, exit.id);
    }

    #[tokio::test]
    async fn test_second_conversion_rolls_back_entirely() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = seed_product(&db, "PRD-001", 10).await;

        let (order, _) = db.orders().create(new_order(vec![line(&product, 2)])).await.unwrap();

        db.orders()
            .convert_to_stock_exit(&order.id, None)
            .await
            .unwrap();

        let err = db
            .orders()
            .convert_to_stock_exit(&order.id, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        // No duplicate exit, no double decrement
        assert_eq!(db.stock_exits().list().await.unwrap().len(), 1);
        let after = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.current_stock, 8);
    }

    #[tokio::test]
    async fn test_converting_cancelled_order_fails_clean() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = seed_product(&db, "PRD-001", 10).await;

        let (order, _) = db.orders().create(new_order(vec![line(&product, 2)])).await.unwrap();
        db.orders().cancel(&order.id).await.unwrap();

        let err = db
            .orders()
            .convert_to_stock_exit(&order.id, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        // Nothing leaked out of the rolled-back transaction
        assert!(db.stock_exits().list().await.unwrap().is_empty());
        let after = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(after.current_stock, 10);
    }

    #[tokio::test]
    async fn test_adopt_exit_links_without_new_exit() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = seed_product(&db, "PRD-001", 10).await;

        let (order, _) = db.orders().create(new_order(vec![line(&product, 2)])).await.unwrap();

        // Simulate an orphan: an exit referencing the order already exists
        let (orphan, _) = db
            .stock_exits()
            .create(crate::repository::stock_exit::NewStockExit {
                client_id: order.client_id.clone(),
                client_name: order.client_name.clone(),
                date: order.date,
                invoice_number: None,
                notes: None,
                discount_bps: order.discount_bps,
                items: vec![line(&product, 2)],
            })
            .await
            .unwrap();

        let adopted = db.orders().adopt_exit(&order.id, &orphan).await.unwrap();

        assert_eq!(adopted.status, OrderStatus::Converted);
        assert_eq!(
            adopted.converted_to_stock_exit_id.as_deref(),
            Some(orphan.id.as_str())
        );
        assert_eq!(db.stock_exits().list().await.unwrap().len(), 1);
    }
}

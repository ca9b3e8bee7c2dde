//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Full-text search using FTS5
//! - CRUD operations
//! - Atomic, clamped stock adjustment
//!
//! ## Stock Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                                │
//! │                                                                         │
//! │  ❌ WRONG: read-modify-write (loses updates under concurrency)         │
//! │     let s = SELECT current_stock ...;                                   │
//! │     UPDATE products SET current_stock = s - 3;                          │
//! │                                                                         │
//! │  ✅ CORRECT: one atomic, clamped round trip                             │
//! │     UPDATE products                                                     │
//! │     SET current_stock = MAX(0, current_stock + delta)                   │
//! │                                                                         │
//! │  Entries pass +quantity, exits pass -quantity. The MAX(0, …) floor     │
//! │  keeps current_stock from ever being persisted negative.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `current_stock` is owned by stock movements: `update` deliberately never
//! writes it, so a stale product form cannot clobber inventory.

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::events::{ChangeAction, ChangeEvent, ChangeFeed};
use gestio_core::{EntityKind, Product};

const COLUMNS: &str = "id, code, name, description, category_name, purchase_price_cents, \
     sale_price_cents, current_stock, min_stock, status, created_at, updated_at, deleted_at";

/// Recomputes the denormalized `product_count` of every category from the
/// live products table. One statement, idempotent.
const REFRESH_COUNTS_SQL: &str = r#"
UPDATE categories SET product_count = (
    SELECT COUNT(*) FROM products
    WHERE products.category_name = categories.name
      AND products.deleted_at IS NULL
)
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// // Search products
/// let results = repo.search("agua", 20).await?;
///
/// // Receive stock from a supplier
/// repo.adjust_stock("uuid-here", 10).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
    feed: ChangeFeed,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool, feed: ChangeFeed) -> Self {
        ProductRepository { pool, feed }
    }

    /// Searches products using full-text search.
    ///
    /// ## How It Works
    /// 1. Uses the FTS5 virtual table for indexed search
    /// 2. Searches across: code, name, category name
    /// 3. Appends a wildcard so "agu" matches "Água 1L"
    ///
    /// An empty query returns live products sorted by name.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching products");

        if query.is_empty() {
            return self.list_limited(limit).await;
        }

        // FTS5 prefix matching: "agua" becomes "agua*"
        let fts_query = format!("{}*", query);

        // Columns must be p.-qualified: the FTS table carries code/name/
        // category_name too and bare names would be ambiguous
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                p.id, p.code, p.name, p.description, p.category_name,
                p.purchase_price_cents, p.sale_price_cents,
                p.current_stock, p.min_stock, p.status,
                p.created_at, p.updated_at, p.deleted_at
            FROM products p
            INNER JOIN products_fts fts ON p.rowid = fts.rowid
            WHERE products_fts MATCH ?1
              AND p.deleted_at IS NULL
            ORDER BY rank
            LIMIT ?2
            "#,
        )
        .bind(&fts_query)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Lists all live products, sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {COLUMNS} FROM products WHERE deleted_at IS NULL ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists live products up to a limit (empty-query search).
    async fn list_limited(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {COLUMNS} FROM products WHERE deleted_at IS NULL ORDER BY name LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a live product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {COLUMNS} FROM products WHERE id = ?1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a live product by its business code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {COLUMNS} FROM products WHERE code = ?1 AND deleted_at IS NULL"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product
    /// * `Err(DbError::UniqueViolation)` - Code already exists
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(code = %product.code, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, code, name, description, category_name,
                purchase_price_cents, sale_price_cents,
                current_stock, min_stock, status,
                created_at, updated_at, deleted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&product.id)
        .bind(&product.code)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category_name)
        .bind(product.purchase_price_cents)
        .bind(product.sale_price_cents)
        .bind(product.current_stock)
        .bind(product.min_stock)
        .bind(product.status)
        .bind(product.created_at)
        .bind(product.updated_at)
        .bind(product.deleted_at)
        .execute(&self.pool)
        .await?;

        refresh_category_counts(&self.pool).await?;

        self.feed.publish(ChangeEvent::with_record(
            EntityKind::Products,
            ChangeAction::Insert,
            &product.id,
            product,
        ));

        Ok(product.clone())
    }

    /// Updates an existing product.
    ///
    /// `current_stock` is NOT written: stock belongs to entry/exit
    /// operations. The value in the passed struct is ignored.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                code = ?2,
                name = ?3,
                description = ?4,
                category_name = ?5,
                purchase_price_cents = ?6,
                sale_price_cents = ?7,
                min_stock = ?8,
                status = ?9,
                updated_at = ?10
            WHERE id = ?1 AND deleted_at IS NULL
            "#,
        )
        .bind(&product.id)
        .bind(&product.code)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.category_name)
        .bind(product.purchase_price_cents)
        .bind(product.sale_price_cents)
        .bind(product.min_stock)
        .bind(product.status)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        // Re-categorization moves counts between categories
        refresh_category_counts(&self.pool).await?;

        if let Some(fresh) = self.get_by_id(&product.id).await? {
            self.feed.publish(ChangeEvent::with_record(
                EntityKind::Products,
                ChangeAction::Update,
                &fresh.id,
                &fresh,
            ));
        }

        Ok(())
    }

    /// Adjusts product stock by a signed delta, clamped at zero.
    ///
    /// One atomic round trip; no intermediate read. Returns the product
    /// after the adjustment.
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> DbResult<Product> {
        debug!(id = %id, delta = %delta, "Adjusting stock");

        adjust_stock_tx(&self.pool, id, delta, Utc::now()).await?;

        let fresh = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))?;

        self.feed.publish(ChangeEvent::with_record(
            EntityKind::Products,
            ChangeAction::Update,
            &fresh.id,
            &fresh,
        ));

        Ok(fresh)
    }

    /// Lists active products at or below their reorder threshold.
    pub async fn list_low_stock(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            r#"
            SELECT {COLUMNS} FROM products
            WHERE deleted_at IS NULL
              AND status = 'active'
              AND min_stock > 0
              AND current_stock <= min_stock
            ORDER BY name
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Soft-deletes a product.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        super::recycle_bin::soft_delete_record(&self.pool, EntityKind::Products, id).await?;
        refresh_category_counts(&self.pool).await?;

        self.feed.publish(ChangeEvent::bare(
            EntityKind::Products,
            ChangeAction::Delete,
            id,
        ));

        Ok(())
    }

    /// Counts live products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Transaction helpers (shared with the document workflows)
// =============================================================================

/// Applies a clamped stock adjustment on the given executor.
///
/// Used directly by this repository and inside the entry/exit/conversion
/// transactions so the stock effect commits or rolls back with the document.
pub(crate) async fn adjust_stock_tx<'e, E>(
    executor: E,
    product_id: &str,
    delta: i64,
    now: DateTime<Utc>,
) -> DbResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE products
        SET current_stock = MAX(0, current_stock + ?2),
            updated_at = ?3
        WHERE id = ?1 AND deleted_at IS NULL
        "#,
    )
    .bind(product_id)
    .bind(delta)
    .bind(now)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Product", product_id));
    }

    Ok(())
}

/// Recomputes category product counts on the given executor.
pub(crate) async fn refresh_category_counts<'e, E>(executor: E) -> DbResult<()>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(REFRESH_COUNTS_SQL).execute(executor).await?;
    Ok(())
}

/// Publishes an update event for each product, with its fresh row.
///
/// Called by the document workflows after their transaction commits. The
/// write already succeeded, so a failed post-commit read is logged and
/// skipped rather than surfaced.
pub(crate) async fn publish_products_updated<I>(pool: &SqlitePool, feed: &ChangeFeed, ids: I)
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    for id in ids {
        let id = id.as_ref();

        let row = sqlx::query_as::<_, Product>(&format!(
            "SELECT {COLUMNS} FROM products WHERE id = ?1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await;

        match row {
            Ok(Some(product)) => feed.publish(ChangeEvent::with_record(
                EntityKind::Products,
                ChangeAction::Update,
                id,
                &product,
            )),
            Ok(None) => {}
            Err(e) => tracing::warn!(id = %id, error = %e, "Failed to read product for change event"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use gestio_core::EntityStatus;
    use uuid::Uuid;

    fn test_product(code: &str, name: &str, category: Option<&str>, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4().to_string(),
            code: code.to_string(),
            name: name.to_string(),
            description: None,
            category_name: category.map(|c| c.to_string()),
            purchase_price_cents: 50,
            sale_price_cents: 120,
            current_stock: stock,
            min_stock: 5,
            status: EntityStatus::Active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_by_code() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let product = repo
            .insert(&test_product("PRD-001", "Água 1L", None, 10))
            .await
            .unwrap();

        let fetched = repo.get_by_code("PRD-001").await.unwrap().unwrap();
        assert_eq!(fetched.id, product.id);
        assert_eq!(fetched.current_stock, 10);
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.insert(&test_product("PRD-001", "Água 1L", None, 0))
            .await
            .unwrap();
        let err = repo
            .insert(&test_product("PRD-001", "Outro", None, 0))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_adjust_stock_adds_and_subtracts() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let product = repo
            .insert(&test_product("PRD-001", "Água 1L", None, 10))
            .await
            .unwrap();

        let after = repo.adjust_stock(&product.id, 7).await.unwrap();
        assert_eq!(after.current_stock, 17);

        let after = repo.adjust_stock(&product.id, -4).await.unwrap();
        assert_eq!(after.current_stock, 13);
    }

    #[tokio::test]
    async fn test_adjust_stock_clamps_at_zero() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let product = repo
            .insert(&test_product("PRD-001", "Água 1L", None, 3))
            .await
            .unwrap();

        let after = repo.adjust_stock(&product.id, -10).await.unwrap();
        assert_eq!(after.current_stock, 0);
    }

    #[tokio::test]
    async fn test_update_does_not_touch_stock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let mut product = repo
            .insert(&test_product("PRD-001", "Água 1L", None, 10))
            .await
            .unwrap();

        // A stale form tries to write stock through an edit
        product.name = "Água 1,5L".to_string();
        product.current_stock = 999;
        repo.update(&product).await.unwrap();

        let fetched = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Água 1,5L");
        assert_eq!(fetched.current_stock, 10);
    }

    #[tokio::test]
    async fn test_search_matches_code_and_name() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.insert(&test_product("AGUA-1L", "Água das Pedras", None, 0))
            .await
            .unwrap();
        repo.insert(&test_product("CAFE-250", "Café Moído", None, 0))
            .await
            .unwrap();

        let hits = repo.search("AGUA", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].code, "AGUA-1L");

        let hits = repo.search("Moído", 10).await.unwrap();
        assert_eq!(hits.len(), 1);

        // Empty query lists everything
        let hits = repo.search("", 10).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn test_category_counts_follow_products() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let categories = db.categories();
        let products = db.products();

        let now = Utc::now();
        let category = gestio_core::Category {
            id: Uuid::new_v4().to_string(),
            name: "Bebidas".to_string(),
            description: None,
            status: EntityStatus::Active,
            product_count: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        categories.insert(&category).await.unwrap();

        let p1 = products
            .insert(&test_product("PRD-001", "Água 1L", Some("Bebidas"), 0))
            .await
            .unwrap();
        products
            .insert(&test_product("PRD-002", "Sumo Laranja", Some("Bebidas"), 0))
            .await
            .unwrap();

        let fetched = categories.get_by_name("Bebidas").await.unwrap().unwrap();
        assert_eq!(fetched.product_count, 2);

        products.soft_delete(&p1.id).await.unwrap();
        let fetched = categories.get_by_name("Bebidas").await.unwrap().unwrap();
        assert_eq!(fetched.product_count, 1);
    }

    #[tokio::test]
    async fn test_low_stock_listing() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        // min_stock is 5 in the fixture
        repo.insert(&test_product("PRD-001", "Água 1L", None, 3))
            .await
            .unwrap();
        repo.insert(&test_product("PRD-002", "Sumo", None, 50))
            .await
            .unwrap();

        let low = repo.list_low_stock().await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].code, "PRD-001");
    }
}

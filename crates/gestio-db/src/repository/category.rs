//! # Category Repository
//!
//! Database operations for product categories.
//!
//! `product_count` is denormalized: it is recomputed by the product
//! repository whenever products move in or out of a category, never written
//! by category edits.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::events::{ChangeAction, ChangeEvent, ChangeFeed};
use gestio_core::{Category, EntityKind};

const COLUMNS: &str =
    "id, name, description, status, product_count, created_at, updated_at, deleted_at";

/// Repository for category database operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
    feed: ChangeFeed,
}

impl CategoryRepository {
    /// Creates a new CategoryRepository.
    pub fn new(pool: SqlitePool, feed: ChangeFeed) -> Self {
        CategoryRepository { pool, feed }
    }

    /// Lists live categories, sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(&format!(
            "SELECT {COLUMNS} FROM categories WHERE deleted_at IS NULL ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    /// Gets a live category by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {COLUMNS} FROM categories WHERE id = ?1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Gets a live category by its (unique) name.
    pub async fn get_by_name(&self, name: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(&format!(
            "SELECT {COLUMNS} FROM categories WHERE name = ?1 AND deleted_at IS NULL"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    /// Inserts a new category.
    ///
    /// ## Returns
    /// * `Ok(Category)` - Inserted category
    /// * `Err(DbError::UniqueViolation)` - Name already exists
    pub async fn insert(&self, category: &Category) -> DbResult<Category> {
        debug!(name = %category.name, "Inserting category");

        sqlx::query(
            r#"
            INSERT INTO categories (
                id, name, description, status, product_count,
                created_at, updated_at, deleted_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.status)
        .bind(category.product_count)
        .bind(category.created_at)
        .bind(category.updated_at)
        .bind(category.deleted_at)
        .execute(&self.pool)
        .await?;

        self.feed.publish(ChangeEvent::with_record(
            EntityKind::Categories,
            ChangeAction::Insert,
            &category.id,
            category,
        ));

        Ok(category.clone())
    }

    /// Updates an existing category (name, description, status).
    ///
    /// `product_count` is intentionally not writable here.
    pub async fn update(&self, category: &Category) -> DbResult<()> {
        debug!(id = %category.id, "Updating category");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE categories SET
                name = ?2,
                description = ?3,
                status = ?4,
                updated_at = ?5
            WHERE id = ?1 AND deleted_at IS NULL
            "#,
        )
        .bind(&category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.status)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", &category.id));
        }

        if let Some(fresh) = self.get_by_id(&category.id).await? {
            self.feed.publish(ChangeEvent::with_record(
                EntityKind::Categories,
                ChangeAction::Update,
                &fresh.id,
                &fresh,
            ));
        }

        Ok(())
    }

    /// Soft-deletes a category.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting category");

        super::recycle_bin::soft_delete_record(&self.pool, EntityKind::Categories, id).await?;

        self.feed.publish(ChangeEvent::bare(
            EntityKind::Categories,
            ChangeAction::Delete,
            id,
        ));

        Ok(())
    }

    /// Counts live categories.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM categories WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
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
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.categories();

        let category = repo.insert(&test_category("Bebidas")).await.unwrap();

        let fetched = repo.get_by_id(&category.id).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Bebidas");
        assert_eq!(fetched.product_count, 0);

        let by_name = repo.get_by_name("Bebidas").await.unwrap().unwrap();
        assert_eq!(by_name.id, category.id);
    }

    #[tokio::test]
    async fn test_duplicate_name_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.categories();

        repo.insert(&test_category("Bebidas")).await.unwrap();
        let err = repo.insert(&test_category("Bebidas")).await.unwrap_err();

        assert!(matches!(err, crate::DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_soft_delete_hides_from_list() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.categories();

        let category = repo.insert(&test_category("Bebidas")).await.unwrap();
        repo.insert(&test_category("Limpeza")).await.unwrap();

        repo.soft_delete(&category.id).await.unwrap();

        let names: Vec<String> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Limpeza"]);
        assert!(repo.get_by_id(&category.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_non_existing_fails() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.categories();

        let err = repo.update(&test_category("Fantasma")).await.unwrap_err();
        assert!(matches!(err, crate::DbError::NotFound { .. }));
    }
}

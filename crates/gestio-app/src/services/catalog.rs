//! # Catalog Service
//!
//! Product and category CRUD.
//!
//! Stock is not writable here: products are created with zero stock and
//! product edits never touch `current_stock`. Inventory moves only through
//! the stock service.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use gestio_core::{validation, Category, EntityStatus, Product};
use gestio_db::Database;

use crate::error::{AppError, AppResult};

// =============================================================================
// Inputs
// =============================================================================

/// Input for creating a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    pub purchase_price_cents: i64,
    pub sale_price_cents: i64,
    #[serde(default)]
    pub min_stock: i64,
    #[serde(default)]
    pub status: EntityStatus,
}

/// Input for creating a category.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: EntityStatus,
}

// =============================================================================
// Service
// =============================================================================

/// Service for product and category operations.
#[derive(Debug, Clone)]
pub struct CatalogService {
    db: Database,
}

impl CatalogService {
    /// Creates a new CatalogService.
    pub fn new(db: Database) -> Self {
        CatalogService { db }
    }

    // -------------------------------------------------------------------------
    // Products
    // -------------------------------------------------------------------------

    /// Creates a product. Stock starts at zero; entries fill it.
    pub async fn create_product(&self, input: ProductInput) -> AppResult<Product> {
        validation::validate_code(&input.code)?;
        validation::validate_name("name", &input.name)?;
        validation::validate_price_cents(input.purchase_price_cents)?;
        validation::validate_price_cents(input.sale_price_cents)?;

        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            code: input.code.trim().to_string(),
            name: input.name.trim().to_string(),
            description: input.description,
            category_name: input.category_name,
            purchase_price_cents: input.purchase_price_cents,
            sale_price_cents: input.sale_price_cents,
            current_stock: 0,
            min_stock: input.min_stock.max(0),
            status: input.status,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let product = self.db.products().insert(&product).await?;
        info!(code = %product.code, "Product created");

        Ok(product)
    }

    /// Updates a product. `current_stock` in the passed struct is ignored.
    pub async fn update_product(&self, product: &Product) -> AppResult<Product> {
        validation::validate_code(&product.code)?;
        validation::validate_name("name", &product.name)?;
        validation::validate_price_cents(product.purchase_price_cents)?;
        validation::validate_price_cents(product.sale_price_cents)?;

        self.db.products().update(product).await?;

        self.db
            .products()
            .get_by_id(&product.id)
            .await?
            .ok_or_else(|| AppError::not_found("Product", &product.id))
    }

    /// Soft-deletes a product.
    pub async fn delete_product(&self, id: &str) -> AppResult<()> {
        self.db.products().soft_delete(id).await?;
        Ok(())
    }

    /// Gets a product or fails NotFound.
    pub async fn get_product(&self, id: &str) -> AppResult<Product> {
        self.db
            .products()
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Product", id))
    }

    /// Lists all live products.
    pub async fn list_products(&self) -> AppResult<Vec<Product>> {
        Ok(self.db.products().list().await?)
    }

    /// Full-text product search.
    pub async fn search_products(&self, query: &str, limit: u32) -> AppResult<Vec<Product>> {
        Ok(self.db.products().search(query, limit).await?)
    }

    // -------------------------------------------------------------------------
    // Categories
    // -------------------------------------------------------------------------

    /// Creates a category. An empty name is rejected before any store call.
    pub async fn create_category(&self, input: CategoryInput) -> AppResult<Category> {
        validation::validate_name("name", &input.name)?;

        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            description: input.description,
            status: input.status,
            product_count: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let category = self.db.categories().insert(&category).await?;
        info!(name = %category.name, "Category created");

        Ok(category)
    }

    /// Updates a category.
    pub async fn update_category(&self, category: &Category) -> AppResult<Category> {
        validation::validate_name("name", &category.name)?;

        self.db.categories().update(category).await?;

        self.db
            .categories()
            .get_by_id(&category.id)
            .await?
            .ok_or_else(|| AppError::not_found("Category", &category.id))
    }

    /// Soft-deletes a category.
    pub async fn delete_category(&self, id: &str) -> AppResult<()> {
        self.db.categories().soft_delete(id).await?;
        Ok(())
    }

    /// Gets a category or fails NotFound.
    pub async fn get_category(&self, id: &str) -> AppResult<Category> {
        self.db
            .categories()
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Category", id))
    }

    /// Lists all live categories.
    pub async fn list_categories(&self) -> AppResult<Vec<Category>> {
        Ok(self.db.categories().list().await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use gestio_db::DbConfig;

    async fn service() -> CatalogService {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        CatalogService::new(db)
    }

    fn product_input(code: &str) -> ProductInput {
        ProductInput {
            code: code.to_string(),
            name: "Água das Pedras 25cl".to_string(),
            description: None,
            category_name: None,
            purchase_price_cents: 30,
            sale_price_cents: 80,
            min_stock: 6,
            status: EntityStatus::Active,
        }
    }

    #[tokio::test]
    async fn test_create_product_starts_with_zero_stock() {
        let service = service().await;

        let product = service.create_product(product_input("AGUA-25")).await.unwrap();

        assert_eq!(product.current_stock, 0);
        assert_eq!(product.min_stock, 6);
    }

    #[tokio::test]
    async fn test_create_product_rejects_bad_input_before_store() {
        let service = service().await;

        let mut input = product_input("AGUA-25");
        input.name = "  ".to_string();
        let err = service.create_product(input).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let mut input = product_input("AGUA-25");
        input.sale_price_cents = -1;
        let err = service.create_product(input).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        // Nothing reached the store
        assert!(service.list_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_category_requires_name() {
        let service = service().await;

        let err = service
            .create_category(CategoryInput {
                name: "".to_string(),
                description: None,
                status: EntityStatus::Active,
            })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_create_category_defaults() {
        let service = service().await;

        let category = service
            .create_category(CategoryInput {
                name: "Bebidas".to_string(),
                description: None,
                status: EntityStatus::Active,
            })
            .await
            .unwrap();

        assert!(!category.id.is_empty());
        assert_eq!(category.product_count, 0);
        assert!(category.deleted_at.is_none());
    }
}

//! # Stock Service
//!
//! Stock entry and exit creation, listing and deletion.
//!
//! Movements are immutable documents: a wrong movement is corrected by
//! recording the opposite one, not by editing. Entries freeze the purchase
//! price onto their lines, exits the sale price, unless the caller supplies
//! an explicit price.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use gestio_core::{validation, StockEntry, StockEntryItem, StockExit, StockExitItem};
use gestio_db::repository::stock_entry::NewStockEntry;
use gestio_db::repository::stock_exit::NewStockExit;
use gestio_db::Database;

use crate::error::{AppError, AppResult};
use crate::services::{resolve_lines, LineItemInput, PriceSource};

/// Input for creating a stock entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockEntryInput {
    pub supplier_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    pub items: Vec<LineItemInput>,
}

/// Input for creating a stock exit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockExitInput {
    pub client_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub discount_bps: u32,
    pub items: Vec<LineItemInput>,
}

/// Service for stock movement operations.
#[derive(Debug, Clone)]
pub struct StockService {
    db: Database,
}

impl StockService {
    /// Creates a new StockService.
    pub fn new(db: Database) -> Self {
        StockService { db }
    }

    // -------------------------------------------------------------------------
    // Entries
    // -------------------------------------------------------------------------

    /// Creates a stock entry; each product's stock rises by its quantity.
    pub async fn create_entry(
        &self,
        input: StockEntryInput,
    ) -> AppResult<(StockEntry, Vec<StockEntryItem>)> {
        let lines = resolve_lines(&self.db, &input.items, PriceSource::Purchase).await?;

        let supplier = self
            .db
            .suppliers()
            .get_by_id(&input.supplier_id)
            .await?
            .ok_or_else(|| AppError::not_found("Supplier", &input.supplier_id))?;

        let (entry, items) = self
            .db
            .stock_entries()
            .create(NewStockEntry {
                supplier_id: supplier.id,
                supplier_name: supplier.name,
                date: input.date,
                invoice_number: input.invoice_number,
                notes: input.notes,
                items: lines,
            })
            .await?;

        info!(number = %entry.number, "Stock entry recorded");

        Ok((entry, items))
    }

    /// Lists live stock entries.
    pub async fn list_entries(&self) -> AppResult<Vec<StockEntry>> {
        Ok(self.db.stock_entries().list().await?)
    }

    /// Gets a stock entry with its items.
    pub async fn get_entry(&self, id: &str) -> AppResult<(StockEntry, Vec<StockEntryItem>)> {
        let entry = self
            .db
            .stock_entries()
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Stock entry", id))?;
        let items = self.db.stock_entries().get_items(id).await?;
        Ok((entry, items))
    }

    /// Soft-deletes a stock entry (stock is not reverted).
    pub async fn delete_entry(&self, id: &str) -> AppResult<()> {
        self.db.stock_entries().soft_delete(id).await?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Exits
    // -------------------------------------------------------------------------

    /// Creates a stock exit; each product's stock drops by its quantity,
    /// floored at zero.
    pub async fn create_exit(
        &self,
        input: StockExitInput,
    ) -> AppResult<(StockExit, Vec<StockExitItem>)> {
        validation::validate_discount_bps(input.discount_bps)?;

        let lines = resolve_lines(&self.db, &input.items, PriceSource::Sale).await?;

        let client = self
            .db
            .clients()
            .get_by_id(&input.client_id)
            .await?
            .ok_or_else(|| AppError::not_found("Client", &input.client_id))?;

        let (exit, items) = self
            .db
            .stock_exits()
            .create(NewStockExit {
                client_id: client.id,
                client_name: client.name,
                date: input.date,
                invoice_number: input.invoice_number,
                notes: input.notes,
                discount_bps: input.discount_bps,
                items: lines,
            })
            .await?;

        info!(number = %exit.number, "Stock exit recorded");

        Ok((exit, items))
    }

    /// Lists live stock exits.
    pub async fn list_exits(&self) -> AppResult<Vec<StockExit>> {
        Ok(self.db.stock_exits().list().await?)
    }

    /// Gets a stock exit with its items.
    pub async fn get_exit(&self, id: &str) -> AppResult<(StockExit, Vec<StockExitItem>)> {
        let exit = self
            .db
            .stock_exits()
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Stock exit", id))?;
        let items = self.db.stock_exits().get_items(id).await?;
        Ok((exit, items))
    }

    /// Soft-deletes a stock exit (stock is not reverted).
    pub async fn delete_exit(&self, id: &str) -> AppResult<()> {
        self.db.stock_exits().soft_delete(id).await?;
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::services::catalog::{CatalogService, ProductInput};
    use crate::services::contacts::{ContactInput, ContactsService};
    use chrono::Utc;
    use gestio_core::{EntityStatus, Product};
    use gestio_db::DbConfig;

    struct Fixture {
        db: Database,
        stock: StockService,
        client_id: String,
        supplier_id: String,
        product: Product,
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let contacts = ContactsService::new(db.clone());

        let contact_input = |name: &str| ContactInput {
            name: name.to_string(),
            email: None,
            phone: None,
            address: None,
            tax_id: None,
            notes: None,
            status: EntityStatus::Active,
        };

        let client = contacts.create_client(contact_input("Mercearia Silva")).await.unwrap();
        let supplier = contacts
            .create_supplier(contact_input("Distribuidora Norte"))
            .await
            .unwrap();

        let product = CatalogService::new(db.clone())
            .create_product(ProductInput {
                code: "AGUA-25".to_string(),
                name: "Água das Pedras 25cl".to_string(),
                description: None,
                category_name: None,
                purchase_price_cents: 30,
                sale_price_cents: 80,
                min_stock: 0,
                status: EntityStatus::Active,
            })
            .await
            .unwrap();

        Fixture {
            stock: StockService::new(db.clone()),
            client_id: client.id,
            supplier_id: supplier.id,
            product,
            db,
        }
    }

    fn line(fx: &Fixture, quantity: i64) -> LineItemInput {
        LineItemInput {
            product_id: fx.product.id.clone(),
            quantity,
            unit_price_cents: None,
            discount_bps: 0,
        }
    }

    #[tokio::test]
    async fn test_entry_then_exit_round_trip() {
        let fx = fixture().await;

        let (entry, items) = fx
            .stock
            .create_entry(StockEntryInput {
                supplier_id: fx.supplier_id.clone(),
                date: Utc::now().date_naive(),
                invoice_number: Some("FT 2025/117".to_string()),
                notes: None,
                items: vec![line(&fx, 12)],
            })
            .await
            .unwrap();

        // Entries freeze the purchase price
        assert_eq!(items[0].unit_price_cents, 30);
        assert!(entry.number.starts_with("ENT-"));

        let product = fx.db.products().get_by_id(&fx.product.id).await.unwrap().unwrap();
        assert_eq!(product.current_stock, 12);

        let (_, exit_items) = fx
            .stock
            .create_exit(StockExitInput {
                client_id: fx.client_id.clone(),
                date: Utc::now().date_naive(),
                invoice_number: None,
                notes: None,
                discount_bps: 0,
                items: vec![line(&fx, 5)],
            })
            .await
            .unwrap();

        // Exits freeze the sale price
        assert_eq!(exit_items[0].unit_price_cents, 80);

        let product = fx.db.products().get_by_id(&fx.product.id).await.unwrap().unwrap();
        assert_eq!(product.current_stock, 7);
    }

    #[tokio::test]
    async fn test_exit_clamps_at_zero() {
        let fx = fixture().await;

        fx.stock
            .create_exit(StockExitInput {
                client_id: fx.client_id.clone(),
                date: Utc::now().date_naive(),
                invoice_number: None,
                notes: None,
                discount_bps: 0,
                items: vec![line(&fx, 99)],
            })
            .await
            .unwrap();

        let product = fx.db.products().get_by_id(&fx.product.id).await.unwrap().unwrap();
        assert_eq!(product.current_stock, 0);
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected_before_store() {
        let fx = fixture().await;

        let err = fx
            .stock
            .create_entry(StockEntryInput {
                supplier_id: fx.supplier_id.clone(),
                date: Utc::now().date_naive(),
                invoice_number: None,
                notes: None,
                items: vec![line(&fx, 0)],
            })
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(fx.stock.list_entries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_supplier_rejected() {
        let fx = fixture().await;

        let err = fx
            .stock
            .create_entry(StockEntryInput {
                supplier_id: "missing".to_string(),
                date: Utc::now().date_naive(),
                invoice_number: None,
                notes: None,
                items: vec![line(&fx, 1)],
            })
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::NotFound);
    }
}

//! # Expenses Service
//!
//! Supplier expense CRUD. Expenses carry free-text line items and never
//! touch stock.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use gestio_core::{validation, Expense, ExpenseItem};
use gestio_db::repository::expense::NewExpense;
use gestio_db::repository::NewExpenseItem;
use gestio_db::Database;

use crate::error::{AppError, AppResult};

/// Input for one expense line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseItemInput {
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    #[serde(default)]
    pub discount_bps: u32,
}

/// Input for creating or editing an expense.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseInput {
    pub supplier_id: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub discount_bps: u32,
    #[serde(default)]
    pub notes: Option<String>,
    pub items: Vec<ExpenseItemInput>,
}

/// Service for expense operations.
#[derive(Debug, Clone)]
pub struct ExpensesService {
    db: Database,
}

impl ExpensesService {
    /// Creates a new ExpensesService.
    pub fn new(db: Database) -> Self {
        ExpensesService { db }
    }

    /// Creates an expense.
    pub async fn create_expense(
        &self,
        input: ExpenseInput,
    ) -> AppResult<(Expense, Vec<ExpenseItem>)> {
        let (supplier_id, supplier_name, lines) = self.prepare(&input).await?;

        let (expense, items) = self
            .db
            .expenses()
            .create(NewExpense {
                supplier_id,
                supplier_name,
                date: input.date,
                discount_bps: input.discount_bps,
                notes: input.notes,
                items: lines,
            })
            .await?;

        info!(number = %expense.number, "Expense recorded");

        Ok((expense, items))
    }

    /// Updates an expense, replacing its items wholesale.
    pub async fn update_expense(
        &self,
        expense_id: &str,
        input: ExpenseInput,
    ) -> AppResult<(Expense, Vec<ExpenseItem>)> {
        let existing = self.get(expense_id).await?;
        let (supplier_id, supplier_name, lines) = self.prepare(&input).await?;

        let updated = Expense {
            supplier_id,
            supplier_name,
            date: input.date,
            discount_bps: input.discount_bps,
            notes: input.notes,
            ..existing
        };

        self.db.expenses().update(&updated, Some(&lines)).await?;

        let expense = self.get(expense_id).await?;
        let items = self.db.expenses().get_items(expense_id).await?;
        Ok((expense, items))
    }

    /// Lists live expenses.
    pub async fn list_expenses(&self) -> AppResult<Vec<Expense>> {
        Ok(self.db.expenses().list().await?)
    }

    /// Gets an expense with its items.
    pub async fn get_expense(&self, id: &str) -> AppResult<(Expense, Vec<ExpenseItem>)> {
        let expense = self.get(id).await?;
        let items = self.db.expenses().get_items(id).await?;
        Ok((expense, items))
    }

    /// Soft-deletes an expense.
    pub async fn delete_expense(&self, id: &str) -> AppResult<()> {
        self.db.expenses().soft_delete(id).await?;
        Ok(())
    }

    async fn get(&self, id: &str) -> AppResult<Expense> {
        self.db
            .expenses()
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Expense", id))
    }

    /// Validates the input and resolves the supplier.
    async fn prepare(
        &self,
        input: &ExpenseInput,
    ) -> AppResult<(String, String, Vec<NewExpenseItem>)> {
        validation::validate_discount_bps(input.discount_bps)?;
        validation::validate_item_count(input.items.len())?;

        let mut lines = Vec::with_capacity(input.items.len());
        for item in &input.items {
            validation::validate_name("productName", &item.product_name)?;
            validation::validate_quantity(item.quantity)?;
            validation::validate_price_cents(item.unit_price_cents)?;
            validation::validate_discount_bps(item.discount_bps)?;

            lines.push(NewExpenseItem {
                product_name: item.product_name.trim().to_string(),
                quantity: item.quantity,
                unit_price_cents: item.unit_price_cents,
                discount_bps: item.discount_bps,
            });
        }

        let supplier = self
            .db
            .suppliers()
            .get_by_id(&input.supplier_id)
            .await?
            .ok_or_else(|| AppError::not_found("Supplier", &input.supplier_id))?;

        Ok((supplier.id, supplier.name, lines))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::services::contacts::{ContactInput, ContactsService};
    use chrono::Utc;
    use gestio_core::EntityStatus;
    use gestio_db::DbConfig;

    async fn fixture() -> (ExpensesService, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let supplier = ContactsService::new(db.clone())
            .create_supplier(ContactInput {
                name: "EDP Comercial".to_string(),
                email: None,
                phone: None,
                address: None,
                tax_id: None,
                notes: None,
                status: EntityStatus::Active,
            })
            .await
            .unwrap();

        (ExpensesService::new(db), supplier.id)
    }

    fn input(supplier_id: &str) -> ExpenseInput {
        ExpenseInput {
            supplier_id: supplier_id.to_string(),
            date: Utc::now().date_naive(),
            discount_bps: 0,
            notes: None,
            items: vec![ExpenseItemInput {
                product_name: "Eletricidade".to_string(),
                quantity: 1,
                unit_price_cents: 8450,
                discount_bps: 0,
            }],
        }
    }

    #[tokio::test]
    async fn test_create_and_update() {
        let (service, supplier_id) = fixture().await;

        let (expense, items) = service.create_expense(input(&supplier_id)).await.unwrap();
        assert!(expense.number.starts_with("DES-"));
        assert_eq!(items.len(), 1);

        let mut edited = input(&supplier_id);
        edited.items.push(ExpenseItemInput {
            product_name: "Água".to_string(),
            quantity: 1,
            unit_price_cents: 2100,
            discount_bps: 0,
        });

        let (_, items) = service.update_expense(&expense.id, edited).await.unwrap();
        assert_eq!(items.len(), 2);
    }

    #[tokio::test]
    async fn test_blank_item_name_rejected() {
        let (service, supplier_id) = fixture().await;

        let mut bad = input(&supplier_id);
        bad.items[0].product_name = " ".to_string();

        let err = service.create_expense(bad).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(service.list_expenses().await.unwrap().is_empty());
    }
}

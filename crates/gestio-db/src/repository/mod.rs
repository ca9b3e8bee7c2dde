//! # Repositories
//!
//! One repository per entity, plus counters, recycle bin and dashboard
//! aggregation.
//!
//! ## Conventions
//! - Standard queries filter `deleted_at IS NULL`; the recycle bin is the
//!   only reader of soft-deleted rows.
//! - Every committed write publishes a [`crate::events::ChangeEvent`].
//! - Multi-row workflows (document + items + stock effect) run inside a
//!   single transaction; events are published only after commit.
//! - Simple entities (products, categories, contacts) are built by the
//!   caller and passed in whole. Documents are built inside the repository
//!   because their number is allocated in the same transaction.

pub mod category;
pub mod contact;
pub mod counter;
pub mod dashboard;
pub mod expense;
pub mod order;
pub mod product;
pub mod recycle_bin;
pub mod stock_entry;
pub mod stock_exit;

use serde::{Deserialize, Serialize};

/// Input for a product-backed line item (orders, stock entries, stock
/// exits). The caller resolves and freezes the product name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewLineItem {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub discount_bps: u32,
}

/// Input for an expense line item. Free text, not tied to the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewExpenseItem {
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub discount_bps: u32,
}

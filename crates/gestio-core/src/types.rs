//! # Domain Types
//!
//! Core domain types used throughout Gestio.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Order       │   │   StockExit     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  code (business)│   │  number ENC-…   │   │  number SAI-…   │       │
//! │  │  current_stock  │   │  status         │   │  from_order_id  │       │
//! │  │  min_stock      │   │  items (1:N)    │   │  items (1:N)    │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  DiscountRate   │   │   OrderStatus   │   │  EntityStatus   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  bps (u32)      │   │  Pending        │   │  Active         │       │
//! │  │  1000 = 10%     │   │  Cancelled      │   │  Inactive       │       │
//! │  └─────────────────┘   │  Converted      │   └─────────────────┘       │
//! │                        └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every document entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (product code, document number) - human-readable
//!
//! ## Denormalization Rule
//! Line items freeze the product name at transaction time, and documents
//! freeze the client/supplier name. Historical accuracy wins over
//! referential freshness.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::RECYCLE_RETENTION_DAYS;

// =============================================================================
// Discount Rate
// =============================================================================

/// Discount rate represented in basis points (bps).
///
/// 1 basis point = 0.01% = 1/10000, so 1000 bps = 10%.
/// The valid range for documents and line items is 0..=10000 (0% to 100%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Creates a discount rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        DiscountRate(bps)
    }

    /// Creates a discount rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        DiscountRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero discount.
    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(0)
    }

    /// Checks if the discount is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for DiscountRate {
    fn default() -> Self {
        DiscountRate::zero()
    }
}

// =============================================================================
// Status Enums
// =============================================================================

/// Active/inactive flag carried by catalog and contact entities.
///
/// Distinct from soft delete: an inactive record is still listed, a
/// soft-deleted record is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum EntityStatus {
    Active,
    Inactive,
}

impl Default for EntityStatus {
    fn default() -> Self {
        EntityStatus::Active
    }
}

/// The lifecycle status of an order.
///
/// `Converted` is terminal: a converted order's items are immutable and the
/// order can never be converted again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order has been created and can still be edited or cancelled.
    Pending,
    /// Order was cancelled before conversion.
    Cancelled,
    /// Order was materialized as a stock exit (terminal).
    Converted,
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

// =============================================================================
// Entity Kind
// =============================================================================

/// The eight entity tables of the store.
///
/// Used to scope change-feed events and to validate table names before any
/// dynamic SQL (recycle-bin restore/purge take a table name from the caller).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Products,
    Categories,
    Clients,
    Suppliers,
    Orders,
    StockEntries,
    StockExits,
    Expenses,
}

impl EntityKind {
    /// Every entity kind, in table order.
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Products,
        EntityKind::Categories,
        EntityKind::Clients,
        EntityKind::Suppliers,
        EntityKind::Orders,
        EntityKind::StockEntries,
        EntityKind::StockExits,
        EntityKind::Expenses,
    ];

    /// The SQL table backing this entity.
    pub const fn table_name(&self) -> &'static str {
        match self {
            EntityKind::Products => "products",
            EntityKind::Categories => "categories",
            EntityKind::Clients => "clients",
            EntityKind::Suppliers => "suppliers",
            EntityKind::Orders => "orders",
            EntityKind::StockEntries => "stock_entries",
            EntityKind::StockExits => "stock_exits",
            EntityKind::Expenses => "expenses",
        }
    }

    /// Resolves a table name back to its kind.
    ///
    /// Returns `None` for anything outside the allowlist, which callers
    /// treat as a validation failure.
    pub fn from_table_name(table: &str) -> Option<Self> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.table_name() == table)
    }
}

/// A record that lives in one of the entity tables.
///
/// Gives the cache layer a uniform way to key records without knowing the
/// concrete type.
pub trait EntityRecord {
    /// The record's opaque unique id.
    fn record_id(&self) -> &str;
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Business code - unique, human-entered (e.g. "PRD-001").
    pub code: String,

    /// Display name.
    pub name: String,

    /// Optional description.
    pub description: Option<String>,

    /// Category reference, by name (denormalized).
    pub category_name: Option<String>,

    /// Purchase price in cents.
    pub purchase_price_cents: i64,

    /// Sale price in cents.
    pub sale_price_cents: i64,

    /// On-hand quantity. Maintained only by stock movements; never written
    /// from product edits, never negative.
    pub current_stock: i64,

    /// Reorder threshold for low-stock alerts.
    pub min_stock: i64,

    /// Active/inactive flag.
    pub status: EntityStatus,

    /// When the product was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    /// Soft-delete marker. NULL = live.
    #[ts(as = "Option<String>")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Returns the purchase price as a Money type.
    #[inline]
    pub fn purchase_price(&self) -> Money {
        Money::from_cents(self.purchase_price_cents)
    }

    /// Returns the sale price as a Money type.
    #[inline]
    pub fn sale_price(&self) -> Money {
        Money::from_cents(self.sale_price_cents)
    }

    /// Checks whether the product sits at or below its reorder threshold.
    pub fn is_low_stock(&self) -> bool {
        self.min_stock > 0 && self.current_stock <= self.min_stock
    }
}

impl EntityRecord for Product {
    fn record_id(&self) -> &str {
        &self.id
    }
}

// =============================================================================
// Category
// =============================================================================

/// A product category.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Category {
    pub id: String,

    /// Required, non-empty, unique.
    pub name: String,

    pub description: Option<String>,

    pub status: EntityStatus,

    /// Denormalized count of live products referencing this category.
    pub product_count: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    #[ts(as = "Option<String>")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl EntityRecord for Category {
    fn record_id(&self) -> &str {
        &self.id
    }
}

// =============================================================================
// Contact (Client / Supplier)
// =============================================================================

/// Which contact table a [`Contact`] belongs to.
///
/// Clients and suppliers share the same shape; repositories are scoped by
/// kind instead of duplicating the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
    Client,
    Supplier,
}

impl ContactKind {
    /// The entity kind backing this contact table.
    pub const fn entity_kind(&self) -> EntityKind {
        match self {
            ContactKind::Client => EntityKind::Clients,
            ContactKind::Supplier => EntityKind::Suppliers,
        }
    }

    /// The SQL table backing this contact kind.
    pub const fn table_name(&self) -> &'static str {
        self.entity_kind().table_name()
    }
}

/// A client or supplier.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Contact {
    pub id: String,

    /// Required display name.
    pub name: String,

    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,

    /// Fiscal identifier (NIF/VAT).
    pub tax_id: Option<String>,

    pub notes: Option<String>,

    pub status: EntityStatus,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    #[ts(as = "Option<String>")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl EntityRecord for Contact {
    fn record_id(&self) -> &str {
        &self.id
    }
}

// =============================================================================
// Order
// =============================================================================

/// A client order.
///
/// Lifecycle: created pending, then optionally cancelled, or converted into
/// a stock exit. Conversion is terminal and freezes the items.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,

    /// Sequential document number (`ENC-2025/003`).
    pub number: String,

    pub client_id: String,

    /// Client name at time of creation (denormalized).
    pub client_name: String,

    /// Document date.
    #[ts(as = "String")]
    pub date: NaiveDate,

    /// Document-level discount in basis points.
    pub discount_bps: u32,

    pub status: OrderStatus,

    /// Set when the order is converted into a stock exit.
    pub converted_to_stock_exit_id: Option<String>,
    pub converted_to_stock_exit_number: Option<String>,

    pub notes: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    #[ts(as = "Option<String>")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Returns the document discount.
    #[inline]
    pub fn discount(&self) -> DiscountRate {
        DiscountRate::from_bps(self.discount_bps)
    }

    /// Checks whether the order has been converted.
    #[inline]
    pub fn is_converted(&self) -> bool {
        self.status == OrderStatus::Converted
    }

    /// Checks whether the order was cancelled.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.status == OrderStatus::Cancelled
    }
}

impl EntityRecord for Order {
    fn record_id(&self) -> &str {
        &self.id
    }
}

/// A line item in an order.
/// Uses snapshot pattern to freeze product data at time of ordering.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    /// Product name at time of ordering (frozen).
    pub product_name: String,
    /// Quantity ordered (> 0).
    pub quantity: i64,
    /// Unit sale price in cents at time of ordering (frozen).
    pub unit_price_cents: i64,
    /// Line discount in basis points.
    pub discount_bps: u32,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl OrderItem {
    /// Line total: quantity × price × (1 − discount).
    #[inline]
    pub fn line_total(&self) -> Money {
        line_total(self.quantity, self.unit_price_cents, self.discount_bps)
    }
}

// =============================================================================
// Stock Entry
// =============================================================================

/// An inbound stock movement from a supplier.
///
/// Creating an entry increases each referenced product's stock by the item
/// quantity.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockEntry {
    pub id: String,

    /// Sequential document number (`ENT-2025/003`).
    pub number: String,

    pub supplier_id: String,
    pub supplier_name: String,

    #[ts(as = "String")]
    pub date: NaiveDate,

    pub invoice_number: Option<String>,
    pub notes: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    #[ts(as = "Option<String>")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl EntityRecord for StockEntry {
    fn record_id(&self) -> &str {
        &self.id
    }
}

/// A line item in a stock entry (priced at purchase price).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockEntryItem {
    pub id: String,
    pub entry_id: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub discount_bps: u32,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl StockEntryItem {
    #[inline]
    pub fn line_total(&self) -> Money {
        line_total(self.quantity, self.unit_price_cents, self.discount_bps)
    }
}

// =============================================================================
// Stock Exit
// =============================================================================

/// An outbound stock movement to a client.
///
/// Creating an exit decreases each referenced product's stock by the item
/// quantity, floored at zero.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockExit {
    pub id: String,

    /// Sequential document number (`SAI-2025/003`).
    pub number: String,

    pub client_id: String,
    pub client_name: String,

    #[ts(as = "String")]
    pub date: NaiveDate,

    pub invoice_number: Option<String>,
    pub notes: Option<String>,

    /// Document-level discount in basis points.
    pub discount_bps: u32,

    /// Back-reference to the order this exit was converted from, if any.
    pub from_order_id: Option<String>,
    pub from_order_number: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    #[ts(as = "Option<String>")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl EntityRecord for StockExit {
    fn record_id(&self) -> &str {
        &self.id
    }
}

/// A line item in a stock exit (priced at sale price).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockExitItem {
    pub id: String,
    pub exit_id: String,
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub discount_bps: u32,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl StockExitItem {
    #[inline]
    pub fn line_total(&self) -> Money {
        line_total(self.quantity, self.unit_price_cents, self.discount_bps)
    }
}

// =============================================================================
// Expense
// =============================================================================

/// A supplier expense. Has no effect on stock.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Expense {
    pub id: String,

    /// Sequential document number (`DES-2025/003`).
    pub number: String,

    pub supplier_id: String,
    pub supplier_name: String,

    #[ts(as = "String")]
    pub date: NaiveDate,

    pub discount_bps: u32,
    pub notes: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    #[ts(as = "Option<String>")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl EntityRecord for Expense {
    fn record_id(&self) -> &str {
        &self.id
    }
}

/// A line item in an expense. `product_name` is free text; expenses are not
/// tied to catalog products.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ExpenseItem {
    pub id: String,
    pub expense_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub discount_bps: u32,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl ExpenseItem {
    #[inline]
    pub fn line_total(&self) -> Money {
        line_total(self.quantity, self.unit_price_cents, self.discount_bps)
    }
}

// =============================================================================
// Recycle Bin
// =============================================================================

/// A soft-deleted record as listed by the recycle bin.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DeletedRecord {
    /// Source table (`"products"`, `"categories"`, ...).
    pub table_type: String,

    /// The record's id in its source table.
    pub id: String,

    /// Human-readable label (name or document number).
    pub label: String,

    #[ts(as = "String")]
    pub deleted_at: DateTime<Utc>,
}

impl DeletedRecord {
    /// Whole days this record has spent in the bin.
    pub fn days_in_bin(&self, now: DateTime<Utc>) -> i64 {
        (now - self.deleted_at).num_days().max(0)
    }

    /// The date on which the record becomes eligible for permanent deletion.
    pub fn purge_after(&self) -> DateTime<Utc> {
        self.deleted_at + chrono::Duration::days(RECYCLE_RETENTION_DAYS)
    }

    /// Checks whether the retention window has elapsed.
    pub fn purge_eligible(&self, now: DateTime<Utc>) -> bool {
        now >= self.purge_after()
    }

    /// The source table as an [`EntityKind`], if valid.
    pub fn kind(&self) -> Option<EntityKind> {
        EntityKind::from_table_name(&self.table_type)
    }
}

// =============================================================================
// Shared Helpers
// =============================================================================

/// Line total for any line item: quantity × price × (1 − discount/10000),
/// computed in integer cents with standard rounding.
pub fn line_total(quantity: i64, unit_price_cents: i64, discount_bps: u32) -> Money {
    (Money::from_cents(unit_price_cents) * quantity).apply_discount(DiscountRate::from_bps(discount_bps))
}

/// Document total: sum of line totals with the document discount applied.
pub fn document_total(line_totals: &[Money], document_discount: DiscountRate) -> Money {
    let sum = line_totals
        .iter()
        .fold(Money::zero(), |acc, m| acc + *m);
    sum.apply_discount(document_discount)
}

/// The calendar year of a timestamp, for counter scoping.
#[inline]
pub fn year_of(ts: DateTime<Utc>) -> i32 {
    ts.year()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_rate_from_bps() {
        let rate = DiscountRate::from_bps(1000);
        assert_eq!(rate.bps(), 1000);
        assert!((rate.percentage() - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_discount_rate_from_percentage() {
        let rate = DiscountRate::from_percentage(12.5);
        assert_eq!(rate.bps(), 1250);
    }

    #[test]
    fn test_order_status_default() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
    }

    #[test]
    fn test_entity_kind_table_roundtrip() {
        for kind in EntityKind::ALL {
            assert_eq!(EntityKind::from_table_name(kind.table_name()), Some(kind));
        }
        assert_eq!(EntityKind::from_table_name("sqlite_master"), None);
    }

    #[test]
    fn test_line_total_with_discount() {
        // 3 × 12.50 at 10% off = 33.75
        let total = line_total(3, 1250, 1000);
        assert_eq!(total.cents(), 3375);
    }

    #[test]
    fn test_line_total_without_discount() {
        let total = line_total(2, 999, 0);
        assert_eq!(total.cents(), 1998);
    }

    #[test]
    fn test_document_total_applies_document_discount() {
        let lines = [Money::from_cents(1000), Money::from_cents(500)];
        let total = document_total(&lines, DiscountRate::from_bps(2000));
        assert_eq!(total.cents(), 1200);
    }

    #[test]
    fn test_deleted_record_retention() {
        let deleted_at = Utc::now() - chrono::Duration::days(10);
        let record = DeletedRecord {
            table_type: "categories".to_string(),
            id: "abc".to_string(),
            label: "Bebidas".to_string(),
            deleted_at,
        };

        let now = Utc::now();
        assert_eq!(record.days_in_bin(now), 10);
        assert!(!record.purge_eligible(now));
        assert!(record.purge_eligible(now + chrono::Duration::days(21)));
        assert_eq!(record.kind(), Some(EntityKind::Categories));
    }

    #[test]
    fn test_product_low_stock() {
        let now = Utc::now();
        let mut product = Product {
            id: "p1".to_string(),
            code: "PRD-001".to_string(),
            name: "Água 1L".to_string(),
            description: None,
            category_name: Some("Bebidas".to_string()),
            purchase_price_cents: 30,
            sale_price_cents: 80,
            current_stock: 5,
            min_stock: 10,
            status: EntityStatus::Active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        assert!(product.is_low_stock());

        product.current_stock = 11;
        assert!(!product.is_low_stock());

        // min_stock of zero never alerts
        product.min_stock = 0;
        product.current_stock = 0;
        assert!(!product.is_low_stock());
    }
}

//! # gestio-core: Pure Business Logic for Gestio
//!
//! This crate is the **heart** of Gestio. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Gestio Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Frontend (SPA)                               │   │
//! │  │    List pages ──► Detail pages ──► Forms ──► Dashboard          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  gestio-app (Services)                          │   │
//! │  │    catalog, orders, stock, expenses, recycle bin, alerts        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ gestio-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ numbering │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ ENC/ENT/  │  │   rules   │  │   │
//! │  │   │   Order   │  │ Discount  │  │ SAI/DES   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    gestio-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, StockExit, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`numbering`] - Sequential document numbers (`ENC-2025/003`)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use gestio_core::money::Money;
//! use gestio_core::types::DiscountRate;
//!
//! // Create money from cents (never from floats!)
//! let price = Money::from_cents(1250); // 12.50
//!
//! // Apply a 10% line discount
//! let discount = DiscountRate::from_percentage(10.0);
//! let total = price.apply_discount(discount);
//!
//! assert_eq!(total.cents(), 1125);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod numbering;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use gestio_core::Money` instead of
// `use gestio_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use numbering::DocumentKind;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Days a soft-deleted record stays in the recycle bin before it becomes
/// eligible for permanent deletion.
///
/// Eligibility is computed on read; nothing purges automatically.
pub const RECYCLE_RETENTION_DAYS: i64 = 30;

/// Maximum line items allowed on a single document (order, entry, exit,
/// expense).
///
/// Prevents runaway documents and keeps list rendering reasonable.
pub const MAX_LINE_ITEMS: usize = 100;

//! # gestio-db: Database Layer for Gestio
//!
//! This crate provides database access for the Gestio system.
//! It uses SQLite for local storage with sqlx for async operations, and is
//! the single data-access layer of the application: typed CRUD plus a change
//! feed, per entity.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Gestio Data Flow                                 │
//! │                                                                         │
//! │  Service call (orders.convert_to_stock_exit)                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     gestio-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (per entity)  │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ ProductRepo   │    │ 001_init.sql │  │   │
//! │  │   │ ChangeFeed    │    │ OrderRepo ... │    │ 002_fts.sql  │  │   │
//! │  │   └───────┬───────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           │                                                     │   │
//! │  │           └──► change events (insert/update/delete per table)  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (WAL mode)                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`events`] - Change feed (broadcast of row-level deltas)
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (one per entity, plus
//!   counters, recycle bin and dashboard aggregation)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gestio_db::{Database, DbConfig};
//!
//! // Create database with default config (runs migrations)
//! let db = Database::new(DbConfig::new("path/to/gestio.db")).await?;
//!
//! // Use repositories
//! let products = db.products().list().await?;
//!
//! // Watch for changes
//! let mut rx = db.feed().subscribe();
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod events;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use events::{ChangeAction, ChangeEvent, ChangeFeed};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::contact::ContactRepository;
pub use repository::counter::CounterRepository;
pub use repository::dashboard::DashboardRepository;
pub use repository::expense::ExpenseRepository;
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
pub use repository::recycle_bin::RecycleBinRepository;
pub use repository::stock_entry::StockEntryRepository;
pub use repository::stock_exit::StockExitRepository;

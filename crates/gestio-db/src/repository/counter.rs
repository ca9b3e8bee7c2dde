//! # Document Counter Repository
//!
//! Per-year monotonic counters for document numbers.
//!
//! ## Atomicity
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Counter Allocation                                   │
//! │                                                                         │
//! │  ❌ WRONG: read value, add one, write back                              │
//! │     Two concurrent creates can allocate the same number.                │
//! │                                                                         │
//! │  ✅ CORRECT: single UPSERT..RETURNING round trip                        │
//! │     INSERT INTO counters (counter_type, year, value) VALUES (?, ?, 1)   │
//! │     ON CONFLICT (counter_type, year) DO UPDATE SET value = value + 1    │
//! │     RETURNING value                                                     │
//! │                                                                         │
//! │  The sequence is strictly increasing and gap-free under serial          │
//! │  creation. If allocation fails, document creation aborts; there is     │
//! │  no local fallback sequence.                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;

const NEXT_SQL: &str = r#"
INSERT INTO counters (counter_type, year, value) VALUES (?1, ?2, 1)
ON CONFLICT (counter_type, year) DO UPDATE SET value = value + 1
RETURNING value
"#;

/// Repository for document number counters.
#[derive(Debug, Clone)]
pub struct CounterRepository {
    pool: SqlitePool,
}

impl CounterRepository {
    /// Creates a new CounterRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CounterRepository { pool }
    }

    /// Allocates the next sequence value for (counter_type, year).
    ///
    /// First allocation of a year yields 1.
    pub async fn next(&self, counter_type: &str, year: i32) -> DbResult<i64> {
        let value: i64 = sqlx::query_scalar(NEXT_SQL)
            .bind(counter_type)
            .bind(year)
            .fetch_one(&self.pool)
            .await?;

        debug!(counter_type = %counter_type, year = year, value = value, "Allocated counter value");
        Ok(value)
    }

    /// Returns the current value for (counter_type, year) without
    /// allocating. 0 if the counter does not exist yet.
    pub async fn current(&self, counter_type: &str, year: i32) -> DbResult<i64> {
        let value: Option<i64> = sqlx::query_scalar(
            "SELECT value FROM counters WHERE counter_type = ?1 AND year = ?2",
        )
        .bind(counter_type)
        .bind(year)
        .fetch_optional(&self.pool)
        .await?;

        Ok(value.unwrap_or(0))
    }
}

/// Allocates the next sequence value inside an open transaction.
///
/// Used by the document creation workflows so the number allocation commits
/// or rolls back together with the document itself.
pub(crate) async fn next_tx(
    conn: &mut SqliteConnection,
    counter_type: &str,
    year: i32,
) -> DbResult<i64> {
    let value: i64 = sqlx::query_scalar(NEXT_SQL)
        .bind(counter_type)
        .bind(year)
        .fetch_one(conn)
        .await?;

    Ok(value)
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Document Numbering
//!
//! Sequential, human-readable document numbers, scoped per document type
//! and calendar year.
//!
//! ## Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Document Number Anatomy                             │
//! │                                                                         │
//! │              ENC - 2025 / 003                                           │
//! │              ───   ────   ───                                           │
//! │               │      │     └── sequence within (type, year),            │
//! │               │      │         zero-padded to 3 digits                  │
//! │               │      └──────── calendar year of allocation              │
//! │               └─────────────── document type prefix                     │
//! │                                                                         │
//! │  Prefixes:  ENC = order          ENT = stock entry                      │
//! │             SAI = stock exit     DES = expense                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The sequence itself comes from the store's atomic per-year counter
//! (gestio-db); this module owns only the pure mapping between document
//! kinds, prefixes and the formatted string. If the counter allocation
//! fails, document creation aborts. There is no local fallback sequence.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Document Kind
// =============================================================================

/// The four numbered document types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Order,
    StockEntry,
    StockExit,
    Expense,
}

impl DocumentKind {
    /// The human-readable number prefix.
    pub const fn prefix(&self) -> &'static str {
        match self {
            DocumentKind::Order => "ENC",
            DocumentKind::StockEntry => "ENT",
            DocumentKind::StockExit => "SAI",
            DocumentKind::Expense => "DES",
        }
    }

    /// The counter key in the store. Identical to the prefix; kept separate
    /// so the wire key survives a display-prefix change.
    pub const fn counter_type(&self) -> &'static str {
        self.prefix()
    }

    /// Formats a document number for this kind.
    ///
    /// Sequences above 999 widen naturally (`ENC-2025/1042`).
    pub fn format_number(&self, year: i32, seq: i64) -> String {
        format!("{}-{}/{:03}", self.prefix(), year, seq)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes() {
        assert_eq!(DocumentKind::Order.prefix(), "ENC");
        assert_eq!(DocumentKind::StockEntry.prefix(), "ENT");
        assert_eq!(DocumentKind::StockExit.prefix(), "SAI");
        assert_eq!(DocumentKind::Expense.prefix(), "DES");
    }

    #[test]
    fn test_format_number_pads_to_three_digits() {
        assert_eq!(DocumentKind::Order.format_number(2025, 3), "ENC-2025/003");
        assert_eq!(DocumentKind::StockExit.format_number(2025, 14), "SAI-2025/014");
        assert_eq!(DocumentKind::StockEntry.format_number(2024, 999), "ENT-2024/999");
    }

    #[test]
    fn test_format_number_widens_past_999() {
        assert_eq!(DocumentKind::Expense.format_number(2025, 1042), "DES-2025/1042");
    }
}

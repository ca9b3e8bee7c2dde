//! # Error Types
//!
//! Domain-specific error types for gestio-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  gestio-core errors (this file)                                         │
//! │  ├── CoreError        - Business rule violations                        │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  gestio-db errors (separate crate)                                      │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  gestio-app errors (separate crate)                                     │
//! │  └── AppError         - What callers/the frontend see (serialized)      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → AppError → Frontend      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (document number, id, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. They should be caught
/// and translated to user-friendly messages by the service layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The order is not in a state that allows the requested operation.
    ///
    /// Raised when editing or cancelling a converted order, cancelling a
    /// cancelled order, or converting anything that is not pending.
    #[error("Order {order_id} is {status}, cannot perform operation")]
    InvalidOrderStatus { order_id: String, status: String },

    /// The order has already been materialized as a stock exit.
    #[error("Order {order_id} was already converted to {exit_number}")]
    AlreadyConverted {
        order_id: String,
        exit_number: String,
    },

    /// A document was submitted without line items.
    #[error("Document must have at least one line item")]
    EmptyDocument,

    /// A document exceeded the line item cap.
    #[error("Document cannot have more than {max} line items")]
    TooManyItems { max: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when user input doesn't meet requirements. Used for early
/// validation before any store call is made.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate product code).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InvalidOrderStatus {
            order_id: "ord-1".to_string(),
            status: "converted".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Order ord-1 is converted, cannot perform operation"
        );

        let err = CoreError::AlreadyConverted {
            order_id: "ord-1".to_string(),
            exit_number: "SAI-2025/014".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Order ord-1 was already converted to SAI-2025/014"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}

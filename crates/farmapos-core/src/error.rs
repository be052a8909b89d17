//! # Error Types
//!
//! Domain-specific error types for farmapos-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  farmapos-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  farmapos-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  farmapos-engine errors                                                │
//! │  └── PosError         - What the request handler sees                  │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → PosError → caller                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, available stock, etc.)
//! 3. Errors are enum variants, never String
//! 4. Expected business conditions (InsufficientStock) are errors the caller
//!    can act on, not system failures

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations for the POS engine.
///
/// Every variant is recoverable: the caller adjusts the request (reduce
/// quantity, refresh session state, retry once) and tries again. None of
/// these leave partial state behind.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Not enough stock to complete the sale.
    ///
    /// ## When This Occurs
    /// - The conditional stock decrement matched zero rows
    /// - Two concurrent sales raced for the last units and this one lost
    ///
    /// Carries the offending product and its current stock so the terminal
    /// can tell the cashier exactly what to adjust.
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        name: String,
        available: i64,
        requested: i64,
    },

    /// Product referenced by a line item does not exist in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Session id is unknown.
    #[error("Session not found: {0}")]
    SessionNotFound(String),

    /// Sale id is unknown.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Attempted to sell against a session that is not Open.
    ///
    /// ## When This Occurs
    /// - Session was closed by another terminal between refresh and submit
    #[error("Session {0} is not open")]
    SessionNotOpen(String),

    /// Attempted to open a register that already has an Open session.
    #[error("Register '{name}' already has an open session")]
    SessionAlreadyOpen { name: String },

    /// Attempted to close a session twice. Exactly one of two concurrent
    /// close calls gets this.
    #[error("Session {0} is already closed")]
    SessionAlreadyClosed(String),

    /// Duplicate void attempt. Stock was already restored once and must
    /// not be restored again.
    #[error("Sale {0} is already voided")]
    SaleAlreadyVoided(String),

    /// The owning session closed before the void; post-close corrections
    /// are not permitted.
    #[error("Sale {sale_id} belongs to closed session {session_id} and cannot be voided")]
    SessionClosed {
        sale_id: String,
        session_id: String,
    },

    /// Rare optimistic-concurrency loss (SQLite busy/snapshot conflict).
    /// The caller should retry once.
    #[error("Concurrent modification detected: {0}")]
    ConcurrencyConflict(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when a request doesn't meet requirements and are rejected
/// at the boundary, before any business logic runs.
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

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Collection is empty where at least one element is required.
    #[error("{field} must contain at least one entry")]
    Empty { field: String },

    /// Collection exceeds the allowed size.
    #[error("{field} cannot have more than {max} entries")]
    TooMany { field: String, max: usize },
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
    fn test_insufficient_stock_message() {
        let err = CoreError::InsufficientStock {
            product_id: "p-1".to_string(),
            name: "Ibuprofeno 400mg".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Ibuprofeno 400mg: available 3, requested 5"
        );
    }

    #[test]
    fn test_state_machine_messages() {
        assert_eq!(
            CoreError::SessionAlreadyOpen {
                name: "Farmacia-1".to_string()
            }
            .to_string(),
            "Register 'Farmacia-1' already has an open session"
        );
        assert_eq!(
            CoreError::SaleAlreadyVoided("v-9".to_string()).to_string(),
            "Sale v-9 is already voided"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "registerName".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}

//! # Engine Error Types
//!
//! The error surface that request handlers see.
//!
//! ## Mapping Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Mapping                                        │
//! │                                                                         │
//! │  CoreError (business)  ──────────────► PosError::Business              │
//! │                                                                         │
//! │  DbError (storage)                                                      │
//! │  ├── Busy              ──────────────► Business(ConcurrencyConflict)   │
//! │  └── everything else   ──────────────► PosError::Storage               │
//! │                                                                         │
//! │  Constraint violations that carry business meaning (the open-register  │
//! │  unique index, the completed-status guard) are translated at the       │
//! │  operation site, where the context to name the session or sale exists. │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use farmapos_core::CoreError;
use farmapos_db::DbError;

/// Errors surfaced by engine operations.
#[derive(Debug, Error)]
pub enum PosError {
    /// A business rule rejected the operation. Recoverable: the caller can
    /// adjust the request and retry.
    #[error(transparent)]
    Business(#[from] CoreError),

    /// The storage layer failed in a way with no business meaning.
    #[error("Storage error: {0}")]
    Storage(DbError),
}

impl PosError {
    /// Stable machine-readable code for the transport layer.
    pub fn code(&self) -> &'static str {
        match self {
            PosError::Business(core) => match core {
                CoreError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
                CoreError::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
                CoreError::SessionNotFound(_) => "SESSION_NOT_FOUND",
                CoreError::SaleNotFound(_) => "SALE_NOT_FOUND",
                CoreError::SessionNotOpen(_) => "SESSION_NOT_OPEN",
                CoreError::SessionAlreadyOpen { .. } => "SESSION_ALREADY_OPEN",
                CoreError::SessionAlreadyClosed(_) => "SESSION_ALREADY_CLOSED",
                CoreError::SaleAlreadyVoided(_) => "SALE_ALREADY_VOIDED",
                CoreError::SessionClosed { .. } => "SESSION_CLOSED",
                CoreError::ConcurrencyConflict(_) => "CONCURRENCY_CONFLICT",
                CoreError::Validation(_) => "VALIDATION_ERROR",
            },
            PosError::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Whether a single retry of the same request is reasonable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PosError::Business(CoreError::ConcurrencyConflict(_))
        )
    }
}

impl From<DbError> for PosError {
    fn from(err: DbError) -> Self {
        match err {
            // SQLite busy/locked surfaces as a retryable business condition,
            // not an infrastructure failure.
            DbError::Busy(msg) => PosError::Business(CoreError::ConcurrencyConflict(msg)),
            other => PosError::Storage(other),
        }
    }
}

impl From<farmapos_core::ValidationError> for PosError {
    fn from(err: farmapos_core::ValidationError) -> Self {
        PosError::Business(CoreError::Validation(err))
    }
}

/// Result type for engine operations.
pub type PosResult<T> = Result<T, PosError>;

// =============================================================================
// Unit Tests
// =============================================================================

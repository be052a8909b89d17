//! # Validation Module
//!
//! Boundary validation for POS requests.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (serde)                                      │
//! │  ├── Type checks, missing required fields rejected                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Business-rule validation (amounts, quantities, lengths)           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK constraints (stock >= 0, quantity > 0)                      │
//! │  ├── UNIQUE constraints (invoice number, open register name)           │
//! │  └── Foreign keys                                                      │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::{MAX_ITEM_QUANTITY, MAX_NOTE_LENGTH, MAX_SALE_ITEMS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a register name ("caja" label).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 100 characters
///
/// ## Example
/// ```rust
/// use farmapos_core::validation::validate_register_name;
///
/// assert!(validate_register_name("Farmacia-1").is_ok());
/// assert!(validate_register_name("   ").is_err());
/// ```
pub fn validate_register_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "registerName".to_string(),
        });
    }

    if name.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "registerName".to_string(),
            max: 100,
        });
    }

    Ok(())
}

/// Validates an operator id.
pub fn validate_operator_id(operator_id: &str) -> ValidationResult<()> {
    if operator_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "operatorId".to_string(),
        });
    }
    Ok(())
}

/// Validates a void reason.
///
/// A void without a reason is an audit hole: the reason is mandatory and
/// bounded so it fits the record.
pub fn validate_void_reason(reason: &str) -> ValidationResult<()> {
    let reason = reason.trim();

    if reason.is_empty() {
        return Err(ValidationError::Required {
            field: "reason".to_string(),
        });
    }

    if reason.len() > MAX_NOTE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "reason".to_string(),
            max: MAX_NOTE_LENGTH,
        });
    }

    Ok(())
}

/// Validates optional closing notes.
pub fn validate_notes(notes: Option<&str>) -> ValidationResult<()> {
    if let Some(notes) = notes {
        if notes.len() > MAX_NOTE_LENGTH {
            return Err(ValidationError::TooLong {
                field: "notes".to_string(),
                max: MAX_NOTE_LENGTH,
            });
        }
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a declared cash amount (opening float or closing count).
///
/// Zero is legal (an empty drawer); negative is not.
pub fn validate_declared_amount(field: &str, amount_cents: i64) -> ValidationResult<()> {
    if amount_cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates a line-item quantity.
///
/// ## Example
/// ```rust
/// use farmapos_core::validation::validate_quantity;
///
/// assert!(validate_quantity(5).is_ok());
/// assert!(validate_quantity(0).is_err());
/// assert!(validate_quantity(-2).is_err());
/// assert!(validate_quantity(10_000).is_err());
/// ```
pub fn validate_quantity(quantity: i64) -> ValidationResult<()> {
    if quantity <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if quantity > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates the line-item list of a sale request.
///
/// Quantities are validated per line; product existence is the database's
/// job inside the sale transaction.
pub fn validate_line_items(quantities: &[i64]) -> ValidationResult<()> {
    if quantities.is_empty() {
        return Err(ValidationError::Empty {
            field: "items".to_string(),
        });
    }

    if quantities.len() > MAX_SALE_ITEMS {
        return Err(ValidationError::TooMany {
            field: "items".to_string(),
            max: MAX_SALE_ITEMS,
        });
    }

    for &quantity in quantities {
        validate_quantity(quantity)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_name() {
        assert!(validate_register_name("Farmacia-1").is_ok());
        assert!(validate_register_name("Caja Principal").is_ok());
        assert!(validate_register_name("").is_err());
        assert!(validate_register_name("  ").is_err());
        assert!(validate_register_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_declared_amount() {
        assert!(validate_declared_amount("openingAmount", 0).is_ok());
        assert!(validate_declared_amount("openingAmount", 50_000).is_ok());
        assert!(validate_declared_amount("openingAmount", -1).is_err());
    }

    #[test]
    fn test_quantity_bounds() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY + 1).is_err());
    }

    #[test]
    fn test_line_items() {
        assert!(validate_line_items(&[1, 2, 3]).is_ok());
        assert!(validate_line_items(&[]).is_err());
        assert!(validate_line_items(&[1, 0]).is_err());
        let too_many: Vec<i64> = vec![1; MAX_SALE_ITEMS + 1];
        assert!(validate_line_items(&too_many).is_err());
    }

    #[test]
    fn test_void_reason() {
        assert!(validate_void_reason("cliente canceló").is_ok());
        assert!(validate_void_reason("").is_err());
        assert!(validate_void_reason(&"x".repeat(MAX_NOTE_LENGTH + 1)).is_err());
    }
}

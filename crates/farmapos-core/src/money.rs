//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely, plus the
//! cash-drawer reconciliation arithmetic used at session close.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A cash-register variance computed in floats will drift, and a drawer   │
//! │  that is "off by 0.00000004" is a reconciliation bug report.            │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every amount in the system is an i64 count of the smallest           │
//! │    currency unit. The database, calculations, and API all use cents.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use farmapos_core::money::Money;
//!
//! let price = Money::from_cents(1000);
//! let line = price.multiply_quantity(2);
//! assert_eq!(line.cents(), 2000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: variances are negative when the drawer is short
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies a unit price by a quantity to get a line subtotal.
    ///
    /// ## Example
    /// ```rust
    /// use farmapos_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(1000);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 3000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Drawer Reconciliation
// =============================================================================

/// Result of reconciling a drawer count against the expected cash amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    /// Opening float plus completed cash sales.
    pub expected: Money,
    /// Counted minus expected. Positive = surplus, negative = shortage.
    pub variance: Money,
}

/// Computes the expected closing amount and variance for a session.
///
/// Only cash sales participate: card and transfer amounts never enter the
/// physical drawer, so they are reconciled in their own buckets.
///
/// ## Example
/// ```rust
/// use farmapos_core::money::{reconcile_drawer, Money};
///
/// let r = reconcile_drawer(
///     Money::from_cents(50_000), // opening float
///     Money::from_cents(2_000),  // completed cash sales
///     Money::from_cents(52_000), // counted at close
/// );
/// assert_eq!(r.expected.cents(), 52_000);
/// assert!(r.variance.is_zero());
/// ```
pub fn reconcile_drawer(opening: Money, cash_sales: Money, counted: Money) -> Reconciliation {
    let expected = opening + cash_sales;
    Reconciliation {
        expected,
        variance: counted - expected,
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and debugging. Presentation-layer formatting (thousand
/// separators, currency symbol placement) belongs to the caller.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, (self.0 / 100).abs(), (self.0 % 100).abs())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!(a.multiply_quantity(3).cents(), 3000);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let shortage = Money::from_cents(-100);
        assert!(shortage.is_negative());
        assert_eq!(shortage.abs().cents(), 100);
    }

    #[test]
    fn test_reconcile_exact_drawer() {
        let r = reconcile_drawer(
            Money::from_cents(50_000),
            Money::from_cents(2_000),
            Money::from_cents(52_000),
        );
        assert_eq!(r.expected.cents(), 52_000);
        assert_eq!(r.variance.cents(), 0);
    }

    #[test]
    fn test_reconcile_shortage() {
        let r = reconcile_drawer(
            Money::from_cents(100_000),
            Money::from_cents(35_000),
            Money::from_cents(130_000),
        );
        assert_eq!(r.expected.cents(), 135_000);
        assert_eq!(r.variance.cents(), -5_000);
    }

    #[test]
    fn test_reconcile_surplus() {
        let r = reconcile_drawer(
            Money::from_cents(10_000),
            Money::zero(),
            Money::from_cents(10_500),
        );
        assert_eq!(r.variance.cents(), 500);
        assert!(r.variance.is_positive());
    }
}

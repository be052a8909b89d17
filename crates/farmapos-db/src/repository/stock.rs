//! # Stock Ledger
//!
//! Atomic reserve/release operations on per-product on-hand quantity.
//!
//! ## The One Rule
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                                │
//! │                                                                         │
//! │  ❌ WRONG: read-check-write (races under concurrent sales)             │
//! │     let stock = SELECT stock ...;                                      │
//! │     if stock >= qty { UPDATE products SET stock = stock - qty }        │
//! │                                                                         │
//! │  ✅ CORRECT: one conditional statement                                 │
//! │     UPDATE products SET stock = stock - qty                            │
//! │     WHERE id = ? AND stock >= qty                                      │
//! │                                                                         │
//! │  Zero rows affected means the reservation lost: either the product     │
//! │  doesn't exist or stock is short. Two concurrent reservations for      │
//! │  the last unit can never both succeed.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Release is the inverse increment, used exclusively by void. The caller
//! (sale engine) guarantees release happens at most once per sale by only
//! releasing after winning the Completed→Voided status flip.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};

/// Outcome of a stock reservation attempt.
///
/// `Insufficient` is a normal business outcome, not a system error; it
/// carries the current stock so the caller can report what is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockReservation {
    /// Stock was decremented by the requested quantity.
    Reserved,
    /// Not enough on hand; nothing was changed.
    Insufficient { available: i64 },
    /// The product id does not exist in the catalog.
    UnknownProduct,
}

/// Ledger for product stock movements.
#[derive(Debug, Clone)]
pub struct StockLedger {
    pool: SqlitePool,
}

impl StockLedger {
    /// Creates a new StockLedger.
    pub fn new(pool: SqlitePool) -> Self {
        StockLedger { pool }
    }

    /// Attempts to reserve `quantity` units of a product inside a
    /// transaction.
    ///
    /// The decrement and the availability check are a single statement, so
    /// the "stock never negative" invariant holds under any interleaving.
    pub async fn reserve_in_tx(
        conn: &mut SqliteConnection,
        product_id: &str,
        quantity: i64,
    ) -> DbResult<StockReservation> {
        debug!(product_id = %product_id, quantity = %quantity, "Reserving stock");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock - ?2, updated_at = datetime('now')
            WHERE id = ?1 AND stock >= ?2
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(StockReservation::Reserved);
        }

        // The conditional update matched nothing: distinguish "short" from
        // "unknown product" for the error message.
        let available: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&mut *conn)
            .await?;

        match available {
            Some(available) => Ok(StockReservation::Insufficient { available }),
            None => Ok(StockReservation::UnknownProduct),
        }
    }

    /// Restores `quantity` units of a product inside a transaction.
    ///
    /// Used by void to return exactly the quantities the sale reserved.
    pub async fn release_in_tx(
        conn: &mut SqliteConnection,
        product_id: &str,
        quantity: i64,
    ) -> DbResult<()> {
        debug!(product_id = %product_id, quantity = %quantity, "Releasing stock");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET stock = stock + ?2, updated_at = datetime('now')
            WHERE id = ?1
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", product_id));
        }

        Ok(())
    }

    /// Current on-hand quantity for a product, or None if unknown.
    pub async fn on_hand(&self, product_id: &str) -> DbResult<Option<i64>> {
        let stock: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(stock)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

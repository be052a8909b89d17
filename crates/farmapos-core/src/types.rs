//! # Domain Types
//!
//! Core domain types for the point-of-sale and reconciliation engine.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  CashSession    │   │      Sale       │   │    SaleItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  name ("caja")  │◄──│  session_id     │◄──│  sale_id        │       │
//! │  │  status         │   │  invoice_number │   │  product_id     │       │
//! │  │  opening/close  │   │  status, total  │   │  qty, subtotal  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ SessionStatus   │   │   SaleStatus    │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  Open           │   │  Completed      │   │  Cash           │       │
//! │  │  Closed         │   │  Voided         │   │  Card           │       │
//! │  └─────────────────┘   └─────────────────┘   │  Transfer       │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Sales carry both:
//! - `id`: UUID v4, immutable, used for database relations
//! - `invoice_number`: sequential business identifier printed on receipts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Session Status
// =============================================================================

/// Lifecycle state of a register session. `Closed` is terminal: there is no
/// reopening, and a closed session and its sales are immutable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Session is accepting sales.
    Open,
    /// Session was reconciled and closed. Terminal.
    Closed,
}

// =============================================================================
// Sale Status
// =============================================================================

/// The status of a sale transaction.
///
/// There is no draft state: a sale is persisted atomically with its items
/// and stock reservation, already Completed. Voiding is a status transition,
/// never a delete, so financial history survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Sale went through; counts toward session totals.
    Completed,
    /// Sale was reversed; stock restored, excluded from totals.
    Voided,
}

// =============================================================================
// Payment Method
// =============================================================================

/// Declared payment method for a sale.
///
/// Registers track Efectivo / Tarjeta / Transferencia. Only `Cash`
/// enters the physical drawer, so only cash sales participate in the
/// expected-closing-amount arithmetic; the other methods are reconciled in
/// separate buckets on the session summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash into the drawer.
    Cash,
    /// Card payment on an external terminal.
    Card,
    /// Bank transfer (QR / wire).
    Transfer,
}

// =============================================================================
// Product (catalog adapter)
// =============================================================================

/// A sellable product as seen by this engine.
///
/// The catalog module owns products; this engine reads `price_cents` for
/// snapshotting and mutates `stock` exclusively through the stock ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,
    /// Stock Keeping Unit, the business identifier.
    pub sku: String,
    /// Display name, snapshotted onto sale items.
    pub name: String,
    /// Current unit price in cents.
    pub price_cents: i64,
    /// On-hand quantity. Never negative.
    pub stock: i64,
    /// Soft-delete flag owned by the catalog.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the current price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Cash Register Session
// =============================================================================

/// A bounded operating period for one named register ("caja").
///
/// ## Lifecycle
/// ```text
/// open_session ──► Open ──(sales / voids)──► close_session ──► Closed
///                                                              (terminal)
/// ```
/// The closing figures (`closing_amount_cents`, `expected_amount_cents`,
/// `variance_cents`) are null until the close transition computes them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct CashSession {
    pub id: String,
    /// Register label, e.g. "Farmacia-1". At most one Open session per name.
    pub name: String,
    pub status: SessionStatus,
    /// Who opened (and later closed) the register.
    pub operator_id: String,
    /// Declared cash float at opening.
    pub opening_amount_cents: i64,
    /// Declared cash count at closing.
    pub closing_amount_cents: Option<i64>,
    /// Computed at close: opening + completed cash sales.
    pub expected_amount_cents: Option<i64>,
    /// Computed at close: counted - expected.
    pub variance_cents: Option<i64>,
    /// Free-form closing notes.
    pub notes: Option<String>,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

impl CashSession {
    /// Whether the session still accepts sales.
    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }

    /// Declared opening float as Money.
    #[inline]
    pub fn opening_amount(&self) -> Money {
        Money::from_cents(self.opening_amount_cents)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A single point-of-sale transaction composed of one or more line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    /// Global sequential invoice number. Unique, strictly increasing,
    /// never reissued, even for voided sales.
    pub invoice_number: i64,
    /// Owning session. Always a session that was Open at creation time.
    pub session_id: String,
    pub status: SaleStatus,
    pub payment_method: PaymentMethod,
    /// Sum of line subtotals, computed server-side.
    pub total_cents: i64,
    /// Optional walk-in customer association.
    pub customer_name: Option<String>,
    pub customer_document: Option<String>,
    /// Why the sale was voided, when it was.
    pub void_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub voided_at: Option<DateTime<Utc>>,
}

impl Sale {
    /// Receipt-facing invoice label, e.g. `DR-000042`.
    pub fn invoice_label(&self) -> String {
        format!("DR-{:06}", self.invoice_number)
    }

    /// Sale total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Whether this sale counts toward session totals.
    #[inline]
    pub fn is_completed(&self) -> bool {
        self.status == SaleStatus::Completed
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
///
/// Uses the snapshot pattern: name and unit price are frozen at sale time,
/// immune to later catalog edits. Voiding restores exactly `quantity` units.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Quantity sold. Always positive.
    pub quantity: i64,
    /// quantity × unit_price_cents.
    pub subtotal_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

/// Computes the total of a set of line items.
///
/// All total arithmetic happens here, server-side; client-supplied totals
/// are never trusted.
pub fn sale_total(items: &[SaleItem]) -> Money {
    items
        .iter()
        .fold(Money::zero(), |acc, item| acc + item.subtotal())
}

// =============================================================================
// Aggregates
// =============================================================================

/// Per-payment-method totals over a session's Completed sales.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PaymentTotals {
    pub cash_cents: i64,
    pub card_cents: i64,
    pub transfer_cents: i64,
    /// Number of Completed sales.
    pub completed_count: i64,
    /// Number of Voided sales (audit visibility, excluded from totals).
    pub voided_count: i64,
}

impl PaymentTotals {
    /// Gross revenue across all payment methods.
    #[inline]
    pub fn gross_cents(&self) -> i64 {
        self.cash_cents + self.card_cents + self.transfer_cents
    }

    /// Cash total as Money, the only bucket that enters the drawer.
    #[inline]
    pub fn cash(&self) -> Money {
        Money::from_cents(self.cash_cents)
    }
}

/// Summary returned by the close operation and by session history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub name: String,
    pub operator_id: String,
    pub status: SessionStatus,
    pub opened_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub opening_amount_cents: i64,
    /// Declared count at close.
    pub counted_amount_cents: Option<i64>,
    /// opening + completed cash sales.
    pub expected_amount_cents: Option<i64>,
    /// counted - expected. Positive = surplus ("sobrante"),
    /// negative = shortage ("faltante").
    pub variance_cents: Option<i64>,
    pub sale_count: i64,
    pub voided_count: i64,
    pub cash_total_cents: i64,
    pub card_total_cents: i64,
    pub transfer_total_cents: i64,
    pub gross_total_cents: i64,
    pub notes: Option<String>,
}

impl SessionSummary {
    /// Builds a summary from a session row and its payment totals.
    pub fn from_parts(session: &CashSession, totals: &PaymentTotals) -> Self {
        SessionSummary {
            session_id: session.id.clone(),
            name: session.name.clone(),
            operator_id: session.operator_id.clone(),
            status: session.status,
            opened_at: session.opened_at,
            closed_at: session.closed_at,
            opening_amount_cents: session.opening_amount_cents,
            counted_amount_cents: session.closing_amount_cents,
            expected_amount_cents: session.expected_amount_cents,
            variance_cents: session.variance_cents,
            sale_count: totals.completed_count,
            voided_count: totals.voided_count,
            cash_total_cents: totals.cash_cents,
            card_total_cents: totals.card_cents,
            transfer_total_cents: totals.transfer_cents,
            gross_total_cents: totals.gross_cents(),
            notes: session.notes.clone(),
        }
    }
}

/// Live statistics for the session detail view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub completed_sales: i64,
    pub voided_sales: i64,
    pub cash_total_cents: i64,
    pub card_total_cents: i64,
    pub transfer_total_cents: i64,
    pub gross_total_cents: i64,
    /// opening float + completed cash sales, what should be in the drawer
    /// right now.
    pub cash_in_drawer_cents: i64,
}

impl SessionStats {
    /// Builds the detail-view statistics for an in-flight or closed session.
    pub fn from_parts(session: &CashSession, totals: &PaymentTotals) -> Self {
        SessionStats {
            completed_sales: totals.completed_count,
            voided_sales: totals.voided_count,
            cash_total_cents: totals.cash_cents,
            card_total_cents: totals.card_cents,
            transfer_total_cents: totals.transfer_cents,
            gross_total_cents: totals.gross_cents(),
            cash_in_drawer_cents: session.opening_amount_cents + totals.cash_cents,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

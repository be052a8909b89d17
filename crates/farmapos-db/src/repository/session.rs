//! # Session Repository
//!
//! Database operations for cash-register sessions ("cajas").
//!
//! ## Session Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Session Lifecycle                                   │
//! │                                                                         │
//! │  1. OPEN                                                               │
//! │     └── insert() → status 'open'                                       │
//! │         (partial unique index rejects a second open session for        │
//! │          the same register name)                                       │
//! │                                                                         │
//! │  2. SELL / VOID while open (sale repository)                           │
//! │                                                                         │
//! │  3. CLOSE                                                              │
//! │     └── mark_closed() → conditional flip open→closed                   │
//! │     └── payment_totals_in_tx() → per-method sums                       │
//! │     └── store_close_figures() → expected, counted, variance            │
//! │                                                                         │
//! │  Closed is terminal: no statement in this module ever updates a        │
//! │  closed session again.                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use farmapos_core::{CashSession, PaymentTotals};

const SESSION_COLUMNS: &str = "id, name, status, operator_id, opening_amount_cents, \
     closing_amount_cents, expected_amount_cents, variance_cents, notes, opened_at, closed_at";

/// Filters for the closed-session history listing.
#[derive(Debug, Clone, Default)]
pub struct SessionHistoryFilter {
    /// Only sessions closed at or after this instant.
    pub closed_from: Option<DateTime<Utc>>,
    /// Only sessions closed at or before this instant.
    pub closed_to: Option<DateTime<Utc>>,
    /// Only sessions opened by this operator.
    pub operator_id: Option<String>,
    /// 1-based page number.
    pub page: u32,
    /// Page size.
    pub limit: u32,
}

impl SessionHistoryFilter {
    /// Clamped paging values: page >= 1, 1 <= limit <= 100.
    pub fn paging(&self) -> (u32, u32) {
        let page = self.page.max(1);
        let limit = self.limit.clamp(1, 100);
        (page, limit)
    }
}

/// Repository for register-session database operations.
#[derive(Debug, Clone)]
pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    /// Creates a new SessionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SessionRepository { pool }
    }

    /// Inserts a freshly opened session.
    ///
    /// A `UniqueViolation` here means the register name already has an open
    /// session; the engine maps it to `SessionAlreadyOpen`.
    pub async fn insert(&self, session: &CashSession) -> DbResult<()> {
        debug!(id = %session.id, name = %session.name, "Inserting session");

        sqlx::query(
            r#"
            INSERT INTO register_sessions (
                id, name, status, operator_id, opening_amount_cents,
                closing_amount_cents, expected_amount_cents, variance_cents,
                notes, opened_at, closed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&session.id)
        .bind(&session.name)
        .bind(session.status)
        .bind(&session.operator_id)
        .bind(session.opening_amount_cents)
        .bind(session.closing_amount_cents)
        .bind(session.expected_amount_cents)
        .bind(session.variance_cents)
        .bind(&session.notes)
        .bind(session.opened_at)
        .bind(session.closed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a session by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<CashSession>> {
        let session = sqlx::query_as::<_, CashSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM register_sessions WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Gets a session by id inside a transaction.
    pub async fn fetch_in_tx(
        conn: &mut SqliteConnection,
        id: &str,
    ) -> DbResult<Option<CashSession>> {
        let session = sqlx::query_as::<_, CashSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM register_sessions WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(session)
    }

    /// Flips a session from Open to Closed.
    ///
    /// The status guard makes the flip race-safe: of two concurrent close
    /// calls exactly one update matches, the loser observes `false` and
    /// reports AlreadyClosed.
    pub async fn mark_closed(
        conn: &mut SqliteConnection,
        id: &str,
        closed_at: DateTime<Utc>,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE register_sessions
            SET status = 'closed', closed_at = ?2
            WHERE id = ?1 AND status = 'open'
            "#,
        )
        .bind(id)
        .bind(closed_at)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Persists the reconciliation figures computed at close.
    ///
    /// Only called by the close transaction, after `mark_closed` succeeded
    /// in the same transaction.
    pub async fn store_close_figures(
        conn: &mut SqliteConnection,
        id: &str,
        counted_cents: i64,
        expected_cents: i64,
        variance_cents: i64,
        notes: Option<&str>,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            UPDATE register_sessions
            SET closing_amount_cents = ?2,
                expected_amount_cents = ?3,
                variance_cents = ?4,
                notes = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(counted_cents)
        .bind(expected_cents)
        .bind(variance_cents)
        .bind(notes)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Per-payment-method totals over a session's sales, inside a
    /// transaction.
    ///
    /// Voided sales are counted but excluded from every monetary sum; this
    /// is where "voided sales are excluded from reconciliation arithmetic"
    /// is enforced.
    pub async fn payment_totals_in_tx(
        conn: &mut SqliteConnection,
        session_id: &str,
    ) -> DbResult<PaymentTotals> {
        let totals = sqlx::query_as::<_, PaymentTotals>(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN status = 'completed' AND payment_method = 'cash'
                                  THEN total_cents END), 0) AS cash_cents,
                COALESCE(SUM(CASE WHEN status = 'completed' AND payment_method = 'card'
                                  THEN total_cents END), 0) AS card_cents,
                COALESCE(SUM(CASE WHEN status = 'completed' AND payment_method = 'transfer'
                                  THEN total_cents END), 0) AS transfer_cents,
                COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 END), 0) AS completed_count,
                COALESCE(SUM(CASE WHEN status = 'voided' THEN 1 END), 0) AS voided_count
            FROM sales
            WHERE session_id = ?1
            "#,
        )
        .bind(session_id)
        .fetch_one(conn)
        .await?;

        Ok(totals)
    }

    /// Pool-backed variant of [`Self::payment_totals_in_tx`] for the
    /// reporting reads.
    pub async fn payment_totals(&self, session_id: &str) -> DbResult<PaymentTotals> {
        let mut conn = self.pool.acquire().await?;
        Self::payment_totals_in_tx(&mut conn, session_id).await
    }

    /// Lists all currently open sessions, most recently opened first
    /// (supervisor view).
    pub async fn list_open(&self) -> DbResult<Vec<CashSession>> {
        let sessions = sqlx::query_as::<_, CashSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM register_sessions \
             WHERE status = 'open' ORDER BY opened_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(sessions)
    }

    /// The open session belonging to an operator, if any.
    ///
    /// Operators work one register at a time, but nothing in the schema
    /// forbids more; the most recently opened wins for the terminal's
    /// "my register" view.
    pub async fn find_open_by_operator(
        &self,
        operator_id: &str,
    ) -> DbResult<Option<CashSession>> {
        let session = sqlx::query_as::<_, CashSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM register_sessions \
             WHERE status = 'open' AND operator_id = ?1 \
             ORDER BY opened_at DESC LIMIT 1"
        ))
        .bind(operator_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    /// Lists closed sessions matching the filter, newest close first.
    ///
    /// Returns the page of sessions plus the total match count for the
    /// pagination envelope.
    pub async fn list_closed(
        &self,
        filter: &SessionHistoryFilter,
    ) -> DbResult<(Vec<CashSession>, i64)> {
        let (page, limit) = filter.paging();
        let offset = (page as i64 - 1) * limit as i64;

        // Bind every filter unconditionally; NULL disables the clause.
        // Keeps the statement static instead of string-building WHEREs.
        let where_clause = "status = 'closed' \
             AND (?1 IS NULL OR closed_at >= ?1) \
             AND (?2 IS NULL OR closed_at <= ?2) \
             AND (?3 IS NULL OR operator_id = ?3)";

        let sessions = sqlx::query_as::<_, CashSession>(&format!(
            "SELECT {SESSION_COLUMNS} FROM register_sessions \
             WHERE {where_clause} \
             ORDER BY closed_at DESC LIMIT ?4 OFFSET ?5"
        ))
        .bind(filter.closed_from)
        .bind(filter.closed_to)
        .bind(filter.operator_id.as_deref())
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM register_sessions WHERE {where_clause}"
        ))
        .bind(filter.closed_from)
        .bind(filter.closed_to)
        .bind(filter.operator_id.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok((sessions, total))
    }
}

/// Helper to generate a new session ID.
pub fn generate_session_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

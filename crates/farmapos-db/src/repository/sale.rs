//! # Sale Repository
//!
//! Sales, line items, and the invoice counter.
//!
//! ## Invoice Numbering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Invoice Number Allocation                               │
//! │                                                                         │
//! │  ❌ WRONG: SELECT MAX(invoice_number) then insert MAX + 1              │
//! │     Two concurrent sales read the same MAX and one insert fails        │
//! │     (or worse, duplicates without the unique index).                   │
//! │                                                                         │
//! │  ✅ CORRECT: single-row counter table                                  │
//! │     UPDATE invoice_counter SET last_value = last_value + 1             │
//! │     WHERE id = 1 RETURNING last_value                                  │
//! │                                                                         │
//! │  The update takes the row lock, so allocation serializes and each      │
//! │  sale gets a distinct, strictly increasing number. Numbers are never   │
//! │  reissued: a voided sale keeps its number, leaving an audit-visible    │
//! │  record instead of a gap that looks like tampering.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use farmapos_core::{Sale, SaleItem};

const SALE_COLUMNS: &str = "id, invoice_number, session_id, status, payment_method, \
     total_cents, customer_name, customer_document, void_reason, created_at, voided_at";

const ITEM_COLUMNS: &str =
    "id, sale_id, product_id, name_snapshot, unit_price_cents, quantity, subtotal_cents, created_at";

/// Filters for the store-wide sales listing.
#[derive(Debug, Clone, Default)]
pub struct SaleListFilter {
    /// Only sales created at or after this instant.
    pub created_from: Option<DateTime<Utc>>,
    /// Only sales created at or before this instant.
    pub created_to: Option<DateTime<Utc>>,
    /// Only sales rung up under a session opened by this operator.
    pub operator_id: Option<String>,
    /// 1-based page number.
    pub page: u32,
    /// Page size.
    pub limit: u32,
}

impl SaleListFilter {
    /// Clamped paging values: page >= 1, 1 <= limit <= 100.
    pub fn paging(&self) -> (u32, u32) {
        let page = self.page.max(1);
        let limit = self.limit.clamp(1, 100);
        (page, limit)
    }
}

/// One row of the dashboard top-products ranking.
#[derive(Debug, Clone, sqlx::FromRow, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopProduct {
    pub product_id: String,
    pub name: String,
    pub units_sold: i64,
    pub revenue_cents: i64,
}

/// Today's completed-sales aggregate for the dashboard.
#[derive(Debug, Clone, Copy, Default, sqlx::FromRow, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotals {
    pub sale_count: i64,
    pub revenue_cents: i64,
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    // =========================================================================
    // Invoice counter
    // =========================================================================

    /// Allocates the next invoice number.
    ///
    /// Must run inside the sale-creation transaction so a rolled-back sale
    /// also rolls back its allocation and the stored sequence stays gapless
    /// for committed sales.
    pub async fn allocate_invoice_number(conn: &mut SqliteConnection) -> DbResult<i64> {
        let number: i64 = sqlx::query_scalar(
            "UPDATE invoice_counter SET last_value = last_value + 1 WHERE id = 1 \
             RETURNING last_value",
        )
        .fetch_one(conn)
        .await?;

        debug!(invoice_number = number, "Allocated invoice number");
        Ok(number)
    }

    // =========================================================================
    // Writes (transaction-scoped)
    // =========================================================================

    /// Inserts a sale row inside a transaction.
    pub async fn insert_in_tx(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sales (
                id, invoice_number, session_id, status, payment_method,
                total_cents, customer_name, customer_document, void_reason,
                created_at, voided_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&sale.id)
        .bind(sale.invoice_number)
        .bind(&sale.session_id)
        .bind(sale.status)
        .bind(sale.payment_method)
        .bind(sale.total_cents)
        .bind(&sale.customer_name)
        .bind(&sale.customer_document)
        .bind(&sale.void_reason)
        .bind(sale.created_at)
        .bind(sale.voided_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Inserts a line item inside a transaction.
    pub async fn insert_item_in_tx(conn: &mut SqliteConnection, item: &SaleItem) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sale_items (
                id, sale_id, product_id, name_snapshot, unit_price_cents,
                quantity, subtotal_cents, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&item.id)
        .bind(&item.sale_id)
        .bind(&item.product_id)
        .bind(&item.name_snapshot)
        .bind(item.unit_price_cents)
        .bind(item.quantity)
        .bind(item.subtotal_cents)
        .bind(item.created_at)
        .execute(conn)
        .await?;

        Ok(())
    }

    /// Flips a sale from Completed to Voided.
    ///
    /// The status guard means exactly one of any set of concurrent void
    /// attempts wins; the losers get `false` and report AlreadyVoided.
    /// Stock release only runs for the winner, so stock is restored exactly
    /// once.
    pub async fn mark_voided(
        conn: &mut SqliteConnection,
        id: &str,
        reason: &str,
        voided_at: DateTime<Utc>,
    ) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE sales
            SET status = 'voided', void_reason = ?2, voided_at = ?3
            WHERE id = ?1 AND status = 'completed'
            "#,
        )
        .bind(id)
        .bind(reason)
        .bind(voided_at)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets a sale by id inside a transaction.
    pub async fn fetch_in_tx(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(sale)
    }

    /// Gets the line items of a sale, in insertion order.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY rowid"
        ))
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Gets the line items of a sale inside a transaction (void needs them
    /// to restore stock under the same transaction as the status flip).
    pub async fn items_in_tx(
        conn: &mut SqliteConnection,
        sale_id: &str,
    ) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(&format!(
            "SELECT {ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY rowid"
        ))
        .bind(sale_id)
        .fetch_all(conn)
        .await?;

        Ok(items)
    }

    /// Lists all sales of a session, newest first. Includes voided sales;
    /// the ticket view shows them struck through.
    pub async fn list_for_session(&self, session_id: &str) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE session_id = ?1 ORDER BY created_at DESC, invoice_number DESC"
        ))
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Lists sales across all sessions matching the filter, newest first.
    ///
    /// Operator filtering goes through the owning session: a sale belongs
    /// to whoever opened the register it was rung up on. Returns the page
    /// plus the total match count for the pagination envelope.
    pub async fn list_all(&self, filter: &SaleListFilter) -> DbResult<(Vec<Sale>, i64)> {
        let (page, limit) = filter.paging();
        let offset = (page as i64 - 1) * limit as i64;

        // NULL binds disable clauses, same pattern as the session history.
        let from_and_where = "FROM sales s \
             JOIN register_sessions rs ON rs.id = s.session_id \
             WHERE (?1 IS NULL OR s.created_at >= ?1) \
             AND (?2 IS NULL OR s.created_at <= ?2) \
             AND (?3 IS NULL OR rs.operator_id = ?3)";

        let sales = sqlx::query_as::<_, Sale>(&format!(
            "SELECT s.id, s.invoice_number, s.session_id, s.status, s.payment_method, \
                    s.total_cents, s.customer_name, s.customer_document, s.void_reason, \
                    s.created_at, s.voided_at \
             {from_and_where} \
             ORDER BY s.created_at DESC, s.invoice_number DESC LIMIT ?4 OFFSET ?5"
        ))
        .bind(filter.created_from)
        .bind(filter.created_to)
        .bind(filter.operator_id.as_deref())
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) {from_and_where}"))
            .bind(filter.created_from)
            .bind(filter.created_to)
            .bind(filter.operator_id.as_deref())
            .fetch_one(&self.pool)
            .await?;

        Ok((sales, total))
    }

    // =========================================================================
    // Dashboard aggregates
    // =========================================================================

    /// Completed-sales count and revenue for the current calendar day (UTC).
    pub async fn today_totals(&self) -> DbResult<DailyTotals> {
        let totals = sqlx::query_as::<_, DailyTotals>(
            r#"
            SELECT
                COALESCE(COUNT(*), 0) AS sale_count,
                COALESCE(SUM(total_cents), 0) AS revenue_cents
            FROM sales
            WHERE status = 'completed'
              AND date(created_at) = date('now')
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(totals)
    }

    /// Top products by units sold over completed sales.
    pub async fn top_products(&self, limit: u32) -> DbResult<Vec<TopProduct>> {
        let rows = sqlx::query_as::<_, TopProduct>(
            r#"
            SELECT
                si.product_id AS product_id,
                si.name_snapshot AS name,
                SUM(si.quantity) AS units_sold,
                SUM(si.subtotal_cents) AS revenue_cents
            FROM sale_items si
            JOIN sales s ON s.id = si.sale_id
            WHERE s.status = 'completed'
            GROUP BY si.product_id, si.name_snapshot
            ORDER BY units_sold DESC
            LIMIT ?1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

/// Helper to generate a new sale ID.
pub fn generate_sale_id() -> String {
    Uuid::new_v4().to_string()
}

/// Helper to generate a new sale item ID.
pub fn generate_item_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

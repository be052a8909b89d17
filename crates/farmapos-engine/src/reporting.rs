//! # Reporting
//!
//! Read-only views: open registers, session detail, closed-session
//! history, and the store dashboard.
//!
//! All reads run outside transactions on the pool. Under WAL they see a
//! consistent snapshot and never block the sale path.

use tracing::instrument;

use farmapos_core::{CoreError, SessionStats, SessionSummary};
use farmapos_db::{Database, SaleListFilter, SessionHistoryFilter};

use crate::error::{PosError, PosResult};
use crate::requests::{
    DashboardStats, HistoryRequest, Page, SaleReceipt, SalesListRequest, SessionDetail,
};

/// Default page size for history listings.
const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Products with stock at or below this count show on the dashboard
/// low-stock tile.
const LOW_STOCK_THRESHOLD: i64 = 10;

/// Number of rows in the dashboard top-products ranking.
const TOP_PRODUCTS_LIMIT: u32 = 5;

/// Read-only reporting over sessions and sales.
#[derive(Debug, Clone)]
pub struct Reporting {
    db: Database,
}

impl Reporting {
    pub fn new(db: Database) -> Self {
        Reporting { db }
    }

    /// Lists currently open sessions with their live totals, most recently
    /// opened first.
    #[instrument(skip(self))]
    pub async fn list_open_sessions(&self) -> PosResult<Vec<SessionSummary>> {
        let sessions = self.db.sessions().list_open().await?;

        let mut summaries = Vec::with_capacity(sessions.len());
        for session in &sessions {
            let totals = self.db.sessions().payment_totals(&session.id).await?;
            summaries.push(SessionSummary::from_parts(session, &totals));
        }

        Ok(summaries)
    }

    /// Full detail of one session: summary, live statistics, and every
    /// sale with its items (voided sales included, marked by status).
    #[instrument(skip(self))]
    pub async fn session_detail(&self, session_id: &str) -> PosResult<SessionDetail> {
        let session = self
            .db
            .sessions()
            .get_by_id(session_id)
            .await?
            .ok_or_else(|| {
                PosError::Business(CoreError::SessionNotFound(session_id.to_string()))
            })?;

        let totals = self.db.sessions().payment_totals(session_id).await?;

        let sales = self.db.sales().list_for_session(session_id).await?;
        let mut receipts = Vec::with_capacity(sales.len());
        for sale in sales {
            let items = self.db.sales().get_items(&sale.id).await?;
            receipts.push(SaleReceipt::new(sale, items));
        }

        Ok(SessionDetail {
            summary: SessionSummary::from_parts(&session, &totals),
            stats: SessionStats::from_parts(&session, &totals),
            sales: receipts,
        })
    }

    /// The open session for an operator, with full detail, or None if the
    /// operator has no register open (the terminal's "my register" view).
    #[instrument(skip(self))]
    pub async fn active_session_for_operator(
        &self,
        operator_id: &str,
    ) -> PosResult<Option<SessionDetail>> {
        let session = self.db.sessions().find_open_by_operator(operator_id).await?;

        match session {
            Some(session) => Ok(Some(self.session_detail(&session.id).await?)),
            None => Ok(None),
        }
    }

    /// One sale with its items.
    #[instrument(skip(self))]
    pub async fn sale_detail(&self, sale_id: &str) -> PosResult<SaleReceipt> {
        let sale = self.db.sales().get_by_id(sale_id).await?.ok_or_else(|| {
            PosError::Business(CoreError::SaleNotFound(sale_id.to_string()))
        })?;
        let items = self.db.sales().get_items(&sale.id).await?;
        Ok(SaleReceipt::new(sale, items))
    }

    /// Paginated history of closed sessions, newest close first.
    #[instrument(skip(self, request))]
    pub async fn session_history(
        &self,
        request: HistoryRequest,
    ) -> PosResult<Page<SessionSummary>> {
        let filter = SessionHistoryFilter {
            closed_from: request.closed_from,
            closed_to: request.closed_to,
            operator_id: request.operator_id,
            page: request.page.unwrap_or(1),
            limit: request.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
        };
        let (page, limit) = filter.paging();

        let (sessions, total) = self.db.sessions().list_closed(&filter).await?;

        let mut summaries = Vec::with_capacity(sessions.len());
        for session in &sessions {
            let totals = self.db.sessions().payment_totals(&session.id).await?;
            summaries.push(SessionSummary::from_parts(session, &totals));
        }

        Ok(Page::new(summaries, total, page, limit))
    }

    /// Paginated store-wide sales listing, newest first, filterable by
    /// creation date range and by the operator of the owning session.
    /// Voided sales are included, marked by status.
    #[instrument(skip(self, request))]
    pub async fn list_sales(&self, request: SalesListRequest) -> PosResult<Page<SaleReceipt>> {
        let filter = SaleListFilter {
            created_from: request.created_from,
            created_to: request.created_to,
            operator_id: request.operator_id,
            page: request.page.unwrap_or(1),
            limit: request.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
        };
        let (page, limit) = filter.paging();

        let (sales, total) = self.db.sales().list_all(&filter).await?;

        let mut receipts = Vec::with_capacity(sales.len());
        for sale in sales {
            let items = self.db.sales().get_items(&sale.id).await?;
            receipts.push(SaleReceipt::new(sale, items));
        }

        Ok(Page::new(receipts, total, page, limit))
    }

    /// Store-wide dashboard: today's revenue, open registers, catalog
    /// health, top sellers.
    #[instrument(skip(self))]
    pub async fn dashboard_stats(&self) -> PosResult<DashboardStats> {
        let today = self.db.sales().today_totals().await?;
        let open_sessions = self.db.sessions().list_open().await?;
        let active_products = self.db.products().count_active().await?;
        let low_stock = self.db.products().count_low_stock(LOW_STOCK_THRESHOLD).await?;
        let top_products = self.db.sales().top_products(TOP_PRODUCTS_LIMIT).await?;

        Ok(DashboardStats {
            today_sale_count: today.sale_count,
            today_revenue_cents: today.revenue_cents,
            open_session_count: open_sessions.len() as i64,
            active_product_count: active_products,
            low_stock_count: low_stock,
            top_products,
        })
    }
}

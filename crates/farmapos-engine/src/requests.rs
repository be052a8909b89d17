//! # Request and Response DTOs
//!
//! The serde-facing shapes of every engine operation. Field names are
//! camelCase on the wire to match the terminal frontend.
//!
//! Totals never appear in requests: the engine computes every amount
//! server-side from catalog prices, and clients only declare physical
//! counts (opening float, closing count).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use farmapos_core::{PaymentMethod, Sale, SaleItem, SessionStats, SessionSummary};

// =============================================================================
// Session Requests
// =============================================================================

/// Request to open a register session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSessionRequest {
    /// Register label, e.g. "Farmacia-1".
    pub register_name: String,
    /// Operator opening the drawer.
    pub operator_id: String,
    /// Declared cash float, in cents. Zero is legal.
    pub opening_amount_cents: i64,
}

/// Request to close a register session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseSessionRequest {
    pub session_id: String,
    /// Physically counted cash, in cents.
    pub counted_amount_cents: i64,
    /// Optional closing notes (shift remarks, variance explanation).
    #[serde(default)]
    pub notes: Option<String>,
}

// =============================================================================
// Sale Requests
// =============================================================================

/// One requested line of a sale. Quantity only; prices come from the
/// catalog at execution time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleLineRequest {
    pub product_id: String,
    pub quantity: i64,
}

/// Request to create a sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSaleRequest {
    pub session_id: String,
    pub items: Vec<SaleLineRequest>,
    pub payment_method: PaymentMethod,
    /// Optional walk-in customer association.
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_document: Option<String>,
}

/// Request to void a completed sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoidSaleRequest {
    pub sale_id: String,
    /// Mandatory audit reason.
    pub reason: String,
}

// =============================================================================
// Reporting Requests
// =============================================================================

/// Filters for the closed-session history listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRequest {
    #[serde(default)]
    pub closed_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closed_to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub operator_id: Option<String>,
    /// 1-based page number. Defaults to 1.
    #[serde(default)]
    pub page: Option<u32>,
    /// Page size. Defaults to 20, capped at 100.
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Filters for the store-wide sales listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesListRequest {
    #[serde(default)]
    pub created_from: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_to: Option<DateTime<Utc>>,
    /// Operator who opened the owning session.
    #[serde(default)]
    pub operator_id: Option<String>,
    /// 1-based page number. Defaults to 1.
    #[serde(default)]
    pub page: Option<u32>,
    /// Page size. Defaults to 20, capped at 100.
    #[serde(default)]
    pub limit: Option<u32>,
}

// =============================================================================
// Responses
// =============================================================================

/// A sale together with its line items, as returned by create/void/detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleReceipt {
    #[serde(flatten)]
    pub sale: Sale,
    /// Receipt-facing label, e.g. "DR-000042".
    pub invoice_label: String,
    pub items: Vec<SaleItem>,
}

impl SaleReceipt {
    pub fn new(sale: Sale, items: Vec<SaleItem>) -> Self {
        let invoice_label = sale.invoice_label();
        SaleReceipt {
            sale,
            invoice_label,
            items,
        }
    }
}

/// Session detail view: the summary row plus live statistics and the
/// session's sales.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDetail {
    #[serde(flatten)]
    pub summary: SessionSummary,
    pub stats: SessionStats,
    pub sales: Vec<SaleReceipt>,
}

/// Paginated listing envelope.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: i64,
}

impl<T> Page<T> {
    /// Builds the envelope, deriving totalPages from total and limit.
    pub fn new(data: Vec<T>, total: i64, page: u32, limit: u32) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            (total + limit as i64 - 1) / limit as i64
        };
        Page {
            data,
            total,
            page,
            limit,
            total_pages,
        }
    }
}

/// Store-wide dashboard statistics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Completed sales today (UTC calendar day).
    pub today_sale_count: i64,
    pub today_revenue_cents: i64,
    pub open_session_count: i64,
    pub active_product_count: i64,
    /// Active products at or below the low-stock threshold.
    pub low_stock_count: i64,
    pub top_products: Vec<farmapos_db::TopProduct>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_math() {
        let page = Page::new(vec![1, 2, 3], 45, 1, 20);
        assert_eq!(page.total_pages, 3);

        let page: Page<i32> = Page::new(vec![], 0, 1, 20);
        assert_eq!(page.total_pages, 0);

        let page: Page<i32> = Page::new(vec![], 40, 2, 20);
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn test_create_sale_request_deserializes_camel_case() {
        let json = r#"{
            "sessionId": "c-1",
            "items": [{"productId": "p-1", "quantity": 2}],
            "paymentMethod": "cash"
        }"#;
        let req: CreateSaleRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.session_id, "c-1");
        assert_eq!(req.items[0].quantity, 2);
        assert_eq!(req.payment_method, farmapos_core::PaymentMethod::Cash);
        assert!(req.customer_name.is_none());
    }
}

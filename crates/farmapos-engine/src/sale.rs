//! # Sale Engine
//!
//! Sale creation and voiding, the two operations that move stock.
//!
//! ## Create-Sale Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    create_sale Transaction                              │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │   1. Load session, require status Open                                 │
//! │   2. Per line: snapshot product (name, price), then                    │
//! │      conditional stock decrement (UPDATE ... WHERE stock >= qty)       │
//! │      └── a short line aborts the whole transaction; earlier            │
//! │          decrements roll back, so there is no partial sale             │
//! │   3. Allocate invoice number from the counter row                      │
//! │   4. INSERT sale + items with computed totals                          │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  The invoice allocation sits after the stock checks so the common      │
//! │  failure (insufficient stock) never touches the counter row.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Voiding is the mirror: win the Completed→Voided flip first, then restore
//! exactly the snapshotted quantities. The flip's status guard makes the
//! restore run at most once however many void requests race.

use chrono::Utc;
use tracing::{info, instrument, warn};

use farmapos_core::validation::{validate_line_items, validate_void_reason};
use farmapos_core::{sale_total, CoreError, Sale, SaleItem, SaleStatus};
use farmapos_db::repository::sale::{generate_item_id, generate_sale_id};
use farmapos_db::{
    Database, DbError, ProductRepository, SaleRepository, SessionRepository, StockLedger,
    StockReservation,
};

use crate::error::{PosError, PosResult};
use crate::requests::{CreateSaleRequest, SaleReceipt, VoidSaleRequest};

/// Orchestrates sale creation and voiding.
#[derive(Debug, Clone)]
pub struct SaleEngine {
    db: Database,
}

impl SaleEngine {
    pub fn new(db: Database) -> Self {
        SaleEngine { db }
    }

    /// Creates a sale: reserves stock, snapshots prices, allocates the
    /// invoice number, and persists everything atomically.
    ///
    /// On any failure the transaction rolls back whole; there is no sale
    /// with missing items, no decremented stock without a sale, and no
    /// consumed invoice number.
    #[instrument(skip(self, request), fields(session_id = %request.session_id))]
    pub async fn create_sale(&self, request: CreateSaleRequest) -> PosResult<SaleReceipt> {
        let quantities: Vec<i64> = request.items.iter().map(|line| line.quantity).collect();
        validate_line_items(&quantities)?;

        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;

        let session = SessionRepository::fetch_in_tx(&mut tx, &request.session_id)
            .await?
            .ok_or_else(|| {
                PosError::Business(CoreError::SessionNotFound(request.session_id.clone()))
            })?;

        if !session.is_open() {
            return Err(PosError::Business(CoreError::SessionNotOpen(session.id)));
        }

        let sale_id = generate_sale_id();
        let now = Utc::now();
        let mut items = Vec::with_capacity(request.items.len());

        for line in &request.items {
            let product = ProductRepository::fetch_in_tx(&mut tx, &line.product_id)
                .await?
                .ok_or_else(|| {
                    PosError::Business(CoreError::ProductNotFound(line.product_id.clone()))
                })?;

            match StockLedger::reserve_in_tx(&mut tx, &line.product_id, line.quantity).await? {
                StockReservation::Reserved => {}
                StockReservation::Insufficient { available } => {
                    warn!(
                        product_id = %line.product_id,
                        available,
                        requested = line.quantity,
                        "Sale rejected: insufficient stock"
                    );
                    return Err(PosError::Business(CoreError::InsufficientStock {
                        product_id: line.product_id.clone(),
                        name: product.name,
                        available,
                        requested: line.quantity,
                    }));
                }
                StockReservation::UnknownProduct => {
                    // Product vanished between the snapshot read and the
                    // decrement. Treat like any unknown id.
                    return Err(PosError::Business(CoreError::ProductNotFound(
                        line.product_id.clone(),
                    )));
                }
            }

            items.push(SaleItem {
                id: generate_item_id(),
                sale_id: sale_id.clone(),
                product_id: product.id,
                name_snapshot: product.name,
                unit_price_cents: product.price_cents,
                quantity: line.quantity,
                subtotal_cents: product.price_cents * line.quantity,
                created_at: now,
            });
        }

        let invoice_number = SaleRepository::allocate_invoice_number(&mut tx).await?;

        let sale = Sale {
            id: sale_id,
            invoice_number,
            session_id: session.id,
            status: SaleStatus::Completed,
            payment_method: request.payment_method,
            total_cents: sale_total(&items).cents(),
            customer_name: request.customer_name.filter(|n| !n.trim().is_empty()),
            customer_document: request.customer_document.filter(|d| !d.trim().is_empty()),
            void_reason: None,
            created_at: now,
            voided_at: None,
        };

        SaleRepository::insert_in_tx(&mut tx, &sale).await?;
        for item in &items {
            SaleRepository::insert_item_in_tx(&mut tx, item).await?;
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            sale_id = %sale.id,
            invoice = %sale.invoice_label(),
            total_cents = sale.total_cents,
            "Sale completed"
        );

        Ok(SaleReceipt::new(sale, items))
    }

    /// Voids a completed sale, restoring the snapshotted quantities to
    /// stock.
    ///
    /// The sale record survives with its invoice number; voiding is a
    /// status transition, never a delete. Sales of closed sessions cannot
    /// be voided: the reconciliation figures are already settled.
    #[instrument(skip(self, request), fields(sale_id = %request.sale_id))]
    pub async fn void_sale(&self, request: VoidSaleRequest) -> PosResult<SaleReceipt> {
        validate_void_reason(&request.reason)?;
        let reason = request.reason.trim();

        let mut tx = self.db.pool().begin().await.map_err(DbError::from)?;

        let sale = SaleRepository::fetch_in_tx(&mut tx, &request.sale_id)
            .await?
            .ok_or_else(|| {
                PosError::Business(CoreError::SaleNotFound(request.sale_id.clone()))
            })?;

        let session = SessionRepository::fetch_in_tx(&mut tx, &sale.session_id)
            .await?
            .ok_or_else(|| DbError::not_found("Session", &sale.session_id))
            .map_err(PosError::from)?;

        if !session.is_open() {
            return Err(PosError::Business(CoreError::SessionClosed {
                sale_id: sale.id,
                session_id: session.id,
            }));
        }

        let voided_at = Utc::now();
        let won = SaleRepository::mark_voided(&mut tx, &sale.id, reason, voided_at).await?;
        if !won {
            // The status guard lost: someone else voided first. Stock was
            // already restored exactly once by the winner.
            return Err(PosError::Business(CoreError::SaleAlreadyVoided(sale.id)));
        }

        let items = SaleRepository::items_in_tx(&mut tx, &sale.id).await?;
        for item in &items {
            StockLedger::release_in_tx(&mut tx, &item.product_id, item.quantity).await?;
        }

        tx.commit().await.map_err(DbError::from)?;

        info!(
            sale_id = %sale.id,
            invoice = %sale.invoice_label(),
            reason = %reason,
            "Sale voided, stock restored"
        );

        let voided = Sale {
            status: SaleStatus::Voided,
            void_reason: Some(reason.to_string()),
            voided_at: Some(voided_at),
            ..sale
        };

        Ok(SaleReceipt::new(voided, items))
    }
}

//! # FarmaPOS Engine
//!
//! The operation layer of the pharmacy point-of-sale and reconciliation
//! engine. Request handlers (HTTP, IPC, CLI) call into this crate; it owns
//! the transactions that keep stock, invoices, and drawer figures
//! consistent.
//!
//! ## Surface
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        farmapos-engine                                  │
//! │                                                                         │
//! │  Pos (facade)                                                           │
//! │  ├── sessions() : SessionManager                                       │
//! │  │     ├── open_session    register name + float → CashSession         │
//! │  │     └── close_session   counted cash → SessionSummary               │
//! │  ├── sales()    : SaleEngine                                           │
//! │  │     ├── create_sale     lines + payment → SaleReceipt               │
//! │  │     └── void_sale       sale id + reason → SaleReceipt              │
//! │  └── reports()  : Reporting                                            │
//! │        ├── list_open_sessions, active_session_for_operator             │
//! │        ├── session_detail, sale_detail                                 │
//! │        ├── session_history, list_sales (paginated)                     │
//! │        └── dashboard_stats                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let pos = Pos::open(DbConfig::new("./farmapos.db")).await?;
//!
//! let session = pos.sessions().open_session(OpenSessionRequest {
//!     register_name: "Farmacia-1".into(),
//!     operator_id: "op-1".into(),
//!     opening_amount_cents: 50_000,
//! }).await?;
//! ```

pub mod error;
pub mod reporting;
pub mod requests;
pub mod sale;
pub mod session;

pub use error::{PosError, PosResult};
pub use reporting::Reporting;
pub use requests::{
    CloseSessionRequest, CreateSaleRequest, DashboardStats, HistoryRequest, OpenSessionRequest,
    Page, SaleLineRequest, SaleReceipt, SalesListRequest, SessionDetail, VoidSaleRequest,
};
pub use sale::SaleEngine;
pub use session::SessionManager;

use farmapos_db::{Database, DbConfig};

/// Facade bundling the three operation groups over one database handle.
#[derive(Debug, Clone)]
pub struct Pos {
    db: Database,
}

impl Pos {
    /// Opens (and migrates) the database and builds the facade.
    pub async fn open(config: DbConfig) -> PosResult<Self> {
        let db = Database::new(config).await?;
        Ok(Pos { db })
    }

    /// Wraps an already-open database handle.
    pub fn with_database(db: Database) -> Self {
        Pos { db }
    }

    /// Register-session lifecycle operations.
    pub fn sessions(&self) -> SessionManager {
        SessionManager::new(self.db.clone())
    }

    /// Sale creation and voiding.
    pub fn sales(&self) -> SaleEngine {
        SaleEngine::new(self.db.clone())
    }

    /// Read-only reporting.
    pub fn reports(&self) -> Reporting {
        Reporting::new(self.db.clone())
    }

    /// The underlying database handle (tests, seeding).
    pub fn database(&self) -> &Database {
        &self.db
    }
}

//! # FarmaPOS Database Layer
//!
//! SQLite persistence for the point-of-sale and reconciliation engine.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      farmapos-db Architecture                           │
//! │                                                                         │
//! │  ┌─────────────┐     ┌──────────────────────────────────────┐          │
//! │  │  Database   │────►│  Repositories                        │          │
//! │  │  (pool.rs)  │     │  - SessionRepository (cajas)         │          │
//! │  └─────────────┘     │  - SaleRepository (ventas, invoices) │          │
//! │         │            │  - StockLedger (reserve / release)   │          │
//! │         │            │  - ProductRepository (catalog reads) │          │
//! │         ▼            └──────────────────────────────────────┘          │
//! │  ┌─────────────┐                                                       │
//! │  │ Migrations  │  Embedded SQL, run automatically on connect           │
//! │  └─────────────┘                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Decisions
//!
//! - **SQLite in WAL mode**: one store, a handful of terminals; reporting
//!   reads never block the sale path.
//! - **Conditional single-statement writes**: stock decrements and status
//!   flips carry their own precondition in the WHERE clause, so invariants
//!   hold without row locks held across round trips.
//! - **Transactions owned by the caller**: multi-step operations compose
//!   `*_in_tx` functions inside one `pool.begin()`; this crate never commits
//!   on behalf of the engine.

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::product::ProductRepository;
pub use repository::sale::{DailyTotals, SaleListFilter, SaleRepository, TopProduct};
pub use repository::session::{SessionHistoryFilter, SessionRepository};
pub use repository::stock::{StockLedger, StockReservation};

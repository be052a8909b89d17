//! # Repository Module
//!
//! Database repository implementations for FarmaPOS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  Engine operation                                                      │
//! │       │                                                                 │
//! │       │  db.sessions().list_open()                                     │
//! │       ▼                                                                 │
//! │  SessionRepository                                                     │
//! │  ├── insert(&self, session)                                            │
//! │  ├── get_by_id(&self, id)                                              │
//! │  └── list_closed(&self, filter)                                        │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Two Calling Conventions
//!
//! Each repository offers pool-backed methods for single-statement reads,
//! plus `*_in_tx` associated functions taking `&mut SqliteConnection` so the
//! engine can compose several writes into one transaction. Every multi-step
//! operation (create sale, void sale, close session) runs through the
//! `_in_tx` variants inside a single `pool.begin()` transaction; partial
//! effects are impossible because failure drops the transaction.
//!
//! ## Available Repositories
//!
//! - [`session::SessionRepository`] - Register session lifecycle and totals
//! - [`sale::SaleRepository`] - Sales, line items, invoice counter
//! - [`stock::StockLedger`] - Atomic reserve/release of product stock
//! - [`product::ProductRepository`] - Catalog adapter (price/name lookup)

pub mod product;
pub mod sale;
pub mod session;
pub mod stock;

//! # Repository Module
//!
//! Database repository implementations for Tillpoint.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories                                         │
//! │                                                                         │
//! │  SaleProcessor                          Callers (reports, back office)  │
//! │       │                                        │                        │
//! │       │ &mut UnitOfWork                        │ &self (pool)           │
//! │       ▼                                        ▼                        │
//! │  InventoryLedger  ── reserve / release   ProductRepository (catalog)   │
//! │  SaleRepository   ── *_in writes         SaleRepository    (queries)   │
//! │       │                                        │                        │
//! │       └──────────────────┬─────────────────────┘                        │
//! │                          ▼                                              │
//! │                   SQLite Database                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog insert, lookup, search, activation
//! - [`SaleRepository`](sale::SaleRepository) - Sale rows, line items, listing, statistics
//! - [`InventoryLedger`](inventory::InventoryLedger) - Stock reservation and release

pub mod inventory;
pub mod product;
pub mod sale;

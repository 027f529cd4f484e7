//! # tillpoint-db: Store and Sale Engine for Tillpoint
//!
//! SQLite storage (via sqlx) plus the sale processor that is the only
//! writer of stock.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tillpoint Data Flow                              │
//! │                                                                         │
//! │  Caller (HTTP handler, CLI, test)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   tillpoint-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   SaleProcessor ──► validate_sale (tillpoint-core)              │   │
//! │  │        │                                                        │   │
//! │  │        ▼                                                        │   │
//! │  │   UnitOfWork ──► InventoryLedger, SaleRepository writes         │   │
//! │  │                                                                 │   │
//! │  │   Database (pool.rs) ──► ProductRepository, SaleRepository      │   │
//! │  │   Migrations (embedded)                                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL)                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`config`] - Environment-driven engine configuration
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and sale error types
//! - [`unit_of_work`] - Atomic write scope
//! - [`repository`] - Catalog, inventory ledger and sale repositories
//! - [`processor`] - Sale creation and cancellation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tillpoint_db::{Database, EngineConfig, SaleProcessor};
//!
//! let config = EngineConfig::load()?;
//! let db = Database::new(config.db_config()).await?;
//! let processor = SaleProcessor::new(db).with_top_products(config.top_products);
//!
//! let detail = processor.create_sale(&request).await?;
//! processor.cancel_sale(detail.sale.id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod processor;
pub mod repository;
pub mod unit_of_work;

// =============================================================================
// Re-exports
// =============================================================================

pub use config::{ConfigError, EngineConfig};
pub use error::{DbError, DbResult, SaleError, SaleResult};
pub use pool::{Database, DbConfig};
pub use processor::SaleProcessor;
pub use unit_of_work::UnitOfWork;

// Repository re-exports for convenience
pub use repository::inventory::{InventoryLedger, Reservation};
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;

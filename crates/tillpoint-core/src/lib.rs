//! # tillpoint-core: Pure Business Logic for the Sale Engine
//!
//! This crate is the **heart** of Tillpoint. It contains the sale types,
//! money arithmetic and the sale validator as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tillpoint Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              Caller (terminal, HTTP handler, CLI)               │   │
//! │  │         SaleRequest ──► create / cancel / query                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ tillpoint-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   error   │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ CoreError │  │   Sale    │  │   │
//! │  │   │   Sale    │  │  (cents)  │  │ ErrorCode │  │ Validator │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 tillpoint-db (Database Layer)                   │   │
//! │  │   unit of work, inventory ledger, sale processor, queries       │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, SaleItem, SaleRequest, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types and machine-readable error codes
//! - [`validation`] - The sale validator
//!
//! ## Example Usage
//!
//! ```rust
//! use tillpoint_core::validation::validate_sale;
//! use tillpoint_core::{PaymentMethod, SaleRequest, SaleRequestItem};
//!
//! let request = SaleRequest {
//!     member_id: None,
//!     items: vec![SaleRequestItem { product_id: 1, quantity: 3, unit_price_cents: 1000 }],
//!     subtotal_cents: 3000,
//!     discount_cents: 0,
//!     total_cents: 3000,
//!     payment_method: PaymentMethod::Cash,
//!     notes: None,
//! };
//!
//! let validated = validate_sale(&request).unwrap();
//! assert_eq!(validated.total().cents(), 3000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ErrorCode, ValidationError, ValidationErrors};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum difference, in cents, tolerated between a client-computed amount
/// and the server recomputation (0.01 in currency units).
pub const AMOUNT_TOLERANCE_CENTS: i64 = 1;

/// Default page size for sale listings.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Hard cap on the page size a caller can request.
pub const MAX_PAGE_SIZE: u32 = 500;

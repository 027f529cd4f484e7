//! # Inventory Ledger
//!
//! The only code that changes `products.stock_current` after a product is
//! created. Both operations take a [`UnitOfWork`], so stock moves only as
//! part of an atomic sale or cancellation.
//!
//! ## Reserve Is Check-and-Decrement in One Statement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UPDATE products                                                        │
//! │     SET stock_current = stock_current - n                               │
//! │   WHERE id = ? AND is_active = 1 AND stock_current >= n                 │
//! │  RETURNING name, stock_current                                          │
//! │                                                                         │
//! │  row returned ──► reserved, stock never observed below n               │
//! │  no row       ──► classify: missing/inactive → ProductNotFound         │
//! │                             otherwise      → InsufficientStock         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two units of work reserving the same product serialize on the SQLite
//! write lock; the second sees the first's decrement or nothing at all.

use chrono::Utc;
use tracing::{debug, warn};

use crate::error::SaleResult;
use crate::unit_of_work::UnitOfWork;
use tillpoint_core::CoreError;

/// Stock taken for one line item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub product_id: i64,
    /// Product name at the moment of reservation.
    pub product_name: String,
    pub quantity: i64,
    /// Stock left after the decrement.
    pub remaining: i64,
}

/// Atomic stock adjustments.
#[derive(Debug, Clone, Copy, Default)]
pub struct InventoryLedger;

impl InventoryLedger {
    /// Takes `quantity` units of an active product.
    ///
    /// ## Returns
    /// * `Ok(Reservation)` - Stock decremented
    /// * `Err(ProductNotFound)` - Unknown or inactive product
    /// * `Err(InsufficientStock)` - Fewer than `quantity` units on hand
    pub async fn reserve(
        uow: &mut UnitOfWork,
        product_id: i64,
        quantity: i64,
    ) -> SaleResult<Reservation> {
        let taken: Option<(String, i64)> = sqlx::query_as(
            "UPDATE products \
             SET stock_current = stock_current - ?2, updated_at = ?3 \
             WHERE id = ?1 AND is_active = 1 AND stock_current >= ?2 \
             RETURNING name, stock_current",
        )
        .bind(product_id)
        .bind(quantity)
        .bind(Utc::now())
        .fetch_optional(uow.conn())
        .await?;

        if let Some((product_name, remaining)) = taken {
            debug!(product_id, quantity, remaining, "Stock reserved");
            return Ok(Reservation {
                product_id,
                product_name,
                quantity,
                remaining,
            });
        }

        let current: Option<(i64, bool)> =
            sqlx::query_as("SELECT stock_current, is_active FROM products WHERE id = ?1")
                .bind(product_id)
                .fetch_optional(uow.conn())
                .await?;

        match current {
            Some((available, true)) => {
                warn!(
                    product_id,
                    requested = quantity,
                    available,
                    "Insufficient stock"
                );
                Err(CoreError::InsufficientStock {
                    product_id,
                    requested: quantity,
                    available,
                }
                .into())
            }
            _ => Err(CoreError::ProductNotFound(product_id).into()),
        }
    }

    /// Returns `quantity` units to stock. Unconditional: cancelled sales
    /// restock even products deactivated since.
    ///
    /// Returns the new stock level, or `ProductNotFound` when the row is gone.
    pub async fn release(uow: &mut UnitOfWork, product_id: i64, quantity: i64) -> SaleResult<i64> {
        let restored: Option<i64> = sqlx::query_scalar(
            "UPDATE products \
             SET stock_current = stock_current + ?2, updated_at = ?3 \
             WHERE id = ?1 \
             RETURNING stock_current",
        )
        .bind(product_id)
        .bind(quantity)
        .bind(Utc::now())
        .fetch_optional(uow.conn())
        .await?;

        match restored {
            Some(stock) => {
                debug!(product_id, quantity, stock, "Stock released");
                Ok(stock)
            }
            None => Err(CoreError::ProductNotFound(product_id).into()),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

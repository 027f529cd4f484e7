//! # Error Types
//!
//! Domain-specific error types for tillpoint-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tillpoint-core errors (this file)                                     │
//! │  ├── CoreError         - Business outcomes of create/cancel            │
//! │  ├── ValidationError   - One violation found by the sale validator     │
//! │  └── ValidationErrors  - All violations of one request                 │
//! │                                                                         │
//! │  tillpoint-db errors (separate crate)                                  │
//! │  ├── DbError           - Infrastructure failures                       │
//! │  └── SaleError         - CoreError | DbError, with an ErrorCode        │
//! │                                                                         │
//! │  Flow: ValidationErrors → CoreError → SaleError → caller               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, quantities, sale id)
//! 3. Errors are enum variants, never String
//! 4. Each error maps to exactly one [`ErrorCode`]

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Core Error
// =============================================================================

/// Business outcomes that abort a sale operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Product id does not resolve to an active product.
    #[error("Product not found: {0}")]
    ProductNotFound(i64),

    /// Not enough stock to reserve a line item.
    ///
    /// ## User Workflow
    /// ```text
    /// Sale request (product 7, qty 5)
    ///      │
    ///      ▼
    /// reserve(7, 5): stock_current = 2
    ///      │
    ///      ▼
    /// InsufficientStock { product_id: 7, requested: 5, available: 2 }
    ///      │
    ///      ▼
    /// Whole sale rejected, no stock touched
    /// ```
    #[error("Insufficient stock for product {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: i64,
        requested: i64,
        available: i64,
    },

    /// Sale id does not exist.
    #[error("Sale not found: {0}")]
    SaleNotFound(i64),

    /// Sale has already been cancelled.
    ///
    /// Cancelling twice is a caller error, not a no-op: it means the caller's
    /// bookkeeping is out of sync with the store.
    #[error("Sale {0} is already cancelled")]
    AlreadyCancelled(i64),

    /// The sale request failed validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),
}

impl CoreError {
    /// Machine-readable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::ProductNotFound(_) => ErrorCode::ProductNotFound,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::SaleNotFound(_) => ErrorCode::SaleNotFound,
            CoreError::AlreadyCancelled(_) => ErrorCode::AlreadyCancelled,
            CoreError::Validation(_) => ErrorCode::ValidationError,
        }
    }
}

// =============================================================================
// Error Codes
// =============================================================================

/// Error codes surfaced to callers of the sale engine.
///
/// ## Serialization
/// ```json
/// "INSUFFICIENT_STOCK"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Request is malformed or its arithmetic does not add up.
    ValidationError,
    /// A line item asked for more than the available stock.
    InsufficientStock,
    /// A referenced product does not exist or is inactive.
    ProductNotFound,
    /// The sale id does not exist.
    SaleNotFound,
    /// The sale was already cancelled.
    AlreadyCancelled,
    /// The store failed; the operation had no effect and may be retried.
    DatabaseError,
}

// =============================================================================
// Validation Error
// =============================================================================

/// A single violation reported by the sale validator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Client-supplied amount disagrees with the server recomputation.
    #[error("{field} mismatch: expected {expected} cents, got {actual} cents")]
    AmountMismatch {
        field: String,
        expected: i64,
        actual: i64,
    },

    /// Arithmetic on the request overflowed.
    #[error("{field} is too large")]
    Overflow { field: String },
}

/// Every violation found in one sale request, in check order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    /// Creates an empty collection.
    pub fn new() -> Self {
        ValidationErrors(Vec::new())
    }

    /// Records a violation.
    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    /// True when no violation was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of recorded violations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The recorded violations.
    pub fn errors(&self) -> &[ValidationError] {
        &self.0
    }

    /// Human-readable messages, one per violation.
    pub fn messages(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl From<ValidationError> for ValidationErrors {
    fn from(err: ValidationError) -> Self {
        ValidationErrors(vec![err])
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_id: 7,
            requested: 5,
            available: 2,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for product 7: available 2, requested 5"
        );
        assert_eq!(err.code(), ErrorCode::InsufficientStock);

        assert_eq!(
            CoreError::AlreadyCancelled(3).to_string(),
            "Sale 3 is already cancelled"
        );
    }

    #[test]
    fn test_validation_errors_join_messages() {
        let mut errors = ValidationErrors::new();
        errors.push(ValidationError::Required {
            field: "items".to_string(),
        });
        errors.push(ValidationError::MustNotBeNegative {
            field: "discount".to_string(),
        });

        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors.to_string(),
            "items is required; discount must not be negative"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let errors: ValidationErrors = ValidationError::Required {
            field: "items".to_string(),
        }
        .into();
        let core_err: CoreError = errors.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.code(), ErrorCode::ValidationError);
    }

    #[test]
    fn test_error_code_serialization() {
        let json = serde_json::to_string(&ErrorCode::AlreadyCancelled).unwrap();
        assert_eq!(json, "\"ALREADY_CANCELLED\"");
    }
}

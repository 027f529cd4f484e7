//! # Sale Validator
//!
//! Checks a proposed sale's shape and arithmetic before any storage mutation.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization                                              │
//! │  └── Typed SaleRequest, closed PaymentMethod enum                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE (pure, no side effects)                          │
//! │  ├── 1. at least one line item                                         │
//! │  ├── 2. positive quantity, unit price, product id                      │
//! │  ├── 3. client subtotal/total == server recomputation (±1 cent)        │
//! │  └── 4. 0 <= discount <= subtotal                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Sale processor unit of work (stock, product existence)       │
//! │                                                                         │
//! │  Layer 4: Database (CHECK constraints, foreign keys)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every violation is collected, in check order, so the caller can fix the
//! whole request in one round trip.

use crate::error::{ValidationError, ValidationErrors};
use crate::money::Money;
use crate::types::{PaymentMethod, SaleRequest, SaleRequestItem};
use crate::AMOUNT_TOLERANCE_CENTS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationErrors>;

// =============================================================================
// Validated Sale
// =============================================================================

/// A line item that passed validation, with its subtotal computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedLine {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: Money,
    pub line_subtotal: Money,
}

/// A sale request accepted by [`validate_sale`].
///
/// Amounts are the server's recomputation, never the caller's. The only way
/// to obtain one is through the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSale {
    member_id: Option<i64>,
    lines: Vec<ValidatedLine>,
    subtotal: Money,
    discount: Money,
    total: Money,
    payment_method: PaymentMethod,
    notes: Option<String>,
}

impl ValidatedSale {
    pub fn member_id(&self) -> Option<i64> {
        self.member_id
    }

    /// Line items in submission order.
    pub fn lines(&self) -> &[ValidatedLine] {
        &self.lines
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn discount(&self) -> Money {
        self.discount
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Trimmed notes; blank notes are dropped.
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Sum of quantities across lines.
    pub fn unit_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

// =============================================================================
// Sale Validation
// =============================================================================

/// Validates a sale request.
///
/// ## Returns
/// * `Ok(ValidatedSale)` - normalized request with server-computed amounts
/// * `Err(ValidationErrors)` - every violation found, in check order
///
/// ## Example
/// ```rust
/// use tillpoint_core::validation::validate_sale;
/// use tillpoint_core::{PaymentMethod, SaleRequest, SaleRequestItem};
///
/// // Client claims 4000 but 5000 - 500 = 4500
/// let request = SaleRequest {
///     member_id: None,
///     items: vec![SaleRequestItem { product_id: 1, quantity: 5, unit_price_cents: 1000 }],
///     subtotal_cents: 5000,
///     discount_cents: 500,
///     total_cents: 4000,
///     payment_method: PaymentMethod::Cash,
///     notes: None,
/// };
/// assert!(validate_sale(&request).is_err());
/// ```
pub fn validate_sale(request: &SaleRequest) -> ValidationResult<ValidatedSale> {
    let mut errors = ValidationErrors::new();

    // 1. Shape
    if request.items.is_empty() {
        errors.push(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    // 2. Line items
    let mut lines = Vec::with_capacity(request.items.len());
    for (index, item) in request.items.iter().enumerate() {
        if let Some(line) = validate_line(index, item, &mut errors) {
            lines.push(line);
        }
    }

    // 3. Arithmetic (only meaningful when every line was usable)
    let server_subtotal = if lines.len() == request.items.len() && !lines.is_empty() {
        sum_lines(&lines, &mut errors)
    } else {
        None
    };

    let discount = Money::from_cents(request.discount_cents);
    let server_total = server_subtotal.and_then(|subtotal| subtotal.checked_sub(discount));

    if let Some(subtotal) = server_subtotal {
        check_amount("subtotal", subtotal, request.subtotal_cents, &mut errors);
    }
    if let Some(total) = server_total {
        check_amount("total", total, request.total_cents, &mut errors);
    }

    // 4. Discount
    if discount.is_negative() {
        errors.push(ValidationError::MustNotBeNegative {
            field: "discount".to_string(),
        });
    } else if let Some(subtotal) = server_subtotal {
        if discount > subtotal {
            errors.push(ValidationError::OutOfRange {
                field: "discount".to_string(),
                min: 0,
                max: subtotal.cents(),
            });
        }
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    // Unreachable in practice: every path that leaves these unset records an error.
    let (Some(subtotal), Some(total)) = (server_subtotal, server_total) else {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        }
        .into());
    };

    Ok(ValidatedSale {
        member_id: request.member_id,
        lines,
        subtotal,
        discount,
        total,
        payment_method: request.payment_method,
        notes: normalize_notes(request.notes.as_deref()),
    })
}

fn validate_line(
    index: usize,
    item: &SaleRequestItem,
    errors: &mut ValidationErrors,
) -> Option<ValidatedLine> {
    let before = errors.len();

    if item.product_id <= 0 {
        errors.push(ValidationError::MustBePositive {
            field: format!("items[{index}].product_id"),
        });
    }
    if item.quantity <= 0 {
        errors.push(ValidationError::MustBePositive {
            field: format!("items[{index}].quantity"),
        });
    }
    if item.unit_price_cents <= 0 {
        errors.push(ValidationError::MustBePositive {
            field: format!("items[{index}].unit_price"),
        });
    }
    if errors.len() > before {
        return None;
    }

    let unit_price = Money::from_cents(item.unit_price_cents);
    let Some(line_subtotal) = unit_price.checked_multiply_quantity(item.quantity) else {
        errors.push(ValidationError::Overflow {
            field: format!("items[{index}].line_subtotal"),
        });
        return None;
    };

    Some(ValidatedLine {
        product_id: item.product_id,
        quantity: item.quantity,
        unit_price,
        line_subtotal,
    })
}

fn sum_lines(lines: &[ValidatedLine], errors: &mut ValidationErrors) -> Option<Money> {
    let subtotal = lines
        .iter()
        .try_fold(Money::zero(), |acc, line| acc.checked_add(line.line_subtotal));

    if subtotal.is_none() {
        errors.push(ValidationError::Overflow {
            field: "subtotal".to_string(),
        });
    }
    subtotal
}

fn check_amount(field: &str, expected: Money, actual_cents: i64, errors: &mut ValidationErrors) {
    if !expected.within_tolerance(Money::from_cents(actual_cents), AMOUNT_TOLERANCE_CENTS) {
        errors.push(ValidationError::AmountMismatch {
            field: field.to_string(),
            expected: expected.cents(),
            actual: actual_cents,
        });
    }
}

fn normalize_notes(notes: Option<&str>) -> Option<String> {
    notes
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product_id: i64, quantity: i64, unit_price_cents: i64) -> SaleRequestItem {
        SaleRequestItem {
            product_id,
            quantity,
            unit_price_cents,
        }
    }

    fn request(items: Vec<SaleRequestItem>, subtotal: i64, discount: i64, total: i64) -> SaleRequest {
        SaleRequest {
            member_id: Some(9),
            items,
            subtotal_cents: subtotal,
            discount_cents: discount,
            total_cents: total,
            payment_method: PaymentMethod::Cash,
            notes: Some("  walk-in  ".to_string()),
        }
    }

    #[test]
    fn test_accepts_consistent_sale() {
        let sale = validate_sale(&request(
            vec![item(1, 3, 1000), item(2, 1, 250)],
            3250,
            250,
            3000,
        ))
        .unwrap();

        assert_eq!(sale.subtotal().cents(), 3250);
        assert_eq!(sale.discount().cents(), 250);
        assert_eq!(sale.total().cents(), 3000);
        assert_eq!(sale.lines()[0].line_subtotal.cents(), 3000);
        assert_eq!(sale.unit_count(), 4);
        assert_eq!(sale.member_id(), Some(9));
        assert_eq!(sale.notes(), Some("walk-in"));
    }

    #[test]
    fn test_uses_server_amounts_within_tolerance() {
        // Client is one cent off on both amounts: accepted, server values kept
        let sale = validate_sale(&request(vec![item(1, 3, 1000)], 3001, 0, 2999)).unwrap();
        assert_eq!(sale.subtotal().cents(), 3000);
        assert_eq!(sale.total().cents(), 3000);
    }

    #[test]
    fn test_rejects_empty_items() {
        let errors = validate_sale(&request(vec![], 0, 0, 0)).unwrap_err();
        assert_eq!(
            errors.errors()[0],
            ValidationError::Required {
                field: "items".to_string()
            }
        );
    }

    #[test]
    fn test_rejects_non_positive_line_fields() {
        let errors = validate_sale(&request(vec![item(0, 0, -5)], 0, 0, 0)).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(
            errors.messages(),
            vec![
                "items[0].product_id must be positive",
                "items[0].quantity must be positive",
                "items[0].unit_price must be positive",
            ]
        );
    }

    #[test]
    fn test_rejects_total_mismatch() {
        // subtotal 5000, discount 500, client total 4000 (expected 4500)
        let errors = validate_sale(&request(vec![item(1, 5, 1000)], 5000, 500, 4000)).unwrap_err();
        assert_eq!(
            errors.errors(),
            &[ValidationError::AmountMismatch {
                field: "total".to_string(),
                expected: 4500,
                actual: 4000,
            }]
        );
    }

    #[test]
    fn test_rejects_subtotal_mismatch() {
        let errors = validate_sale(&request(vec![item(1, 2, 1000)], 2500, 0, 2000)).unwrap_err();
        assert!(matches!(
            &errors.errors()[0],
            ValidationError::AmountMismatch { field, expected: 2000, actual: 2500 } if field == "subtotal"
        ));
    }

    #[test]
    fn test_rejects_bad_discounts() {
        let negative = validate_sale(&request(vec![item(1, 1, 1000)], 1000, -100, 1100)).unwrap_err();
        assert!(negative.errors().contains(&ValidationError::MustNotBeNegative {
            field: "discount".to_string()
        }));

        let excessive = validate_sale(&request(vec![item(1, 1, 1000)], 1000, 1500, -500)).unwrap_err();
        assert!(excessive.errors().contains(&ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: 1000,
        }));
    }

    #[test]
    fn test_discount_equal_to_subtotal_is_allowed() {
        let sale = validate_sale(&request(vec![item(1, 1, 1000)], 1000, 1000, 0)).unwrap();
        assert!(sale.total().is_zero());
    }

    #[test]
    fn test_rejects_overflow() {
        let errors = validate_sale(&request(vec![item(1, i64::MAX, 2)], 0, 0, 0)).unwrap_err();
        assert_eq!(
            errors.errors(),
            &[ValidationError::Overflow {
                field: "items[0].line_subtotal".to_string()
            }]
        );
    }

    #[test]
    fn test_blank_notes_dropped() {
        let mut req = request(vec![item(1, 1, 100)], 100, 0, 100);
        req.notes = Some("   ".to_string());
        assert_eq!(validate_sale(&req).unwrap().notes(), None);
    }
}

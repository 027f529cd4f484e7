//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A sale total compared against a client total with floats can fail    │
//! │  or pass depending on summation order.                                 │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    subtotal = Σ quantity × unit_price_cents   (exact)                  │
//! │    tolerance 0.01 = 1 cent                    (exact)                  │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tillpoint_core::money::Money;
//!
//! let price = Money::from_cents(1000); // 10.00
//! let line = price.checked_multiply_quantity(3).unwrap();
//! assert_eq!(line.cents(), 3000);
//! assert!(line.within_tolerance(Money::from_cents(3001), 1));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: differences (client vs server) can be negative
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Checked helpers**: request arithmetic never panics on overflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use tillpoint_core::money::Money;
    ///
    /// let price = Money::from_cents(1099);
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a quantity, `None` on overflow.
    ///
    /// ## User Workflow
    /// ```text
    /// Line item: unit_price 2.99, quantity 3
    ///      │
    ///      ▼
    /// checked_multiply_quantity(3) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// line_subtotal: 8.97
    /// ```
    #[inline]
    pub fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        self.0.checked_mul(qty).map(Money)
    }

    /// Adds two amounts, `None` on overflow.
    #[inline]
    pub fn checked_add(&self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Subtracts two amounts, `None` on overflow.
    #[inline]
    pub fn checked_sub(&self, other: Money) -> Option<Self> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// True when `self` and `other` differ by at most `tolerance_cents`.
    ///
    /// ## Example
    /// ```rust
    /// use tillpoint_core::money::Money;
    ///
    /// let server = Money::from_cents(4500);
    /// assert!(server.within_tolerance(Money::from_cents(4501), 1));
    /// assert!(!server.within_tolerance(Money::from_cents(4000), 1));
    /// ```
    pub fn within_tolerance(&self, other: Money, tolerance_cents: i64) -> bool {
        (self.0 as i128 - other.0 as i128).abs() <= tolerance_cents as i128
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows money as `major.minor` for logs and messages.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-5.50");
        assert_eq!(format!("{}", Money::zero()), "0.00");
    }

    #[test]
    fn test_checked_add_sub() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!(a.checked_add(b), Some(Money::from_cents(1500)));
        assert_eq!(b.checked_sub(a), Some(Money::from_cents(-500)));
        assert!(Money::from_cents(i64::MAX).checked_add(b).is_none());
        assert!(Money::from_cents(i64::MIN).checked_sub(b).is_none());
    }

    #[test]
    fn test_checked_multiply_overflow() {
        let price = Money::from_cents(i64::MAX / 2);
        assert!(price.checked_multiply_quantity(3).is_none());
        assert_eq!(
            Money::from_cents(299).checked_multiply_quantity(3),
            Some(Money::from_cents(897))
        );
    }

    #[test]
    fn test_within_tolerance() {
        let server = Money::from_cents(3000);
        assert!(server.within_tolerance(Money::from_cents(3000), 1));
        assert!(server.within_tolerance(Money::from_cents(2999), 1));
        assert!(server.within_tolerance(Money::from_cents(3001), 1));
        assert!(!server.within_tolerance(Money::from_cents(3002), 1));

        // Extremes do not overflow the comparison
        assert!(!Money::from_cents(i64::MAX).within_tolerance(Money::from_cents(i64::MIN), 1));
    }

    #[test]
    fn test_zero_and_checks() {
        assert!(Money::zero().is_zero());
        assert!(!Money::from_cents(100).is_negative());
        assert!(Money::from_cents(-100).is_negative());
    }
}

//! # Domain Types
//!
//! Core domain types used throughout Tillpoint.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    SaleItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │   │  id (i64)       │   │  id (i64)       │       │
//! │  │  price_cents    │◄──│  member_id?     │──►│  sale_id (FK)   │       │
//! │  │  stock_current  │   │  status         │   │  product_id     │       │
//! │  │  stock_minimum  │   │  total_cents    │   │  quantity       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  SaleRequest    │   │   SaleStatus    │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  items          │   │  Completed      │   │  Cash           │       │
//! │  │  client totals  │   │  Cancelled      │   │  Card           │       │
//! │  └─────────────────┘   └─────────────────┘   │  MemberAccount  │       │
//! │                                              └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Sale State Machine
//! ```text
//!   create ──► Completed ──cancel──► Cancelled   (terminal)
//! ```

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Integer identifier, immutable once assigned.
    pub id: i64,

    /// Display name.
    pub name: String,

    /// Unit sale price in cents.
    pub price_cents: i64,

    /// Unit purchase cost in cents.
    pub cost_cents: Option<i64>,

    /// Units on hand. Never negative at a committed state.
    pub stock_current: i64,

    /// Advisory reorder threshold.
    pub stock_minimum: i64,

    /// Inactive products cannot be sold.
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// True when stock is at or below the advisory minimum.
    pub fn is_low_stock(&self) -> bool {
        self.stock_current <= self.stock_minimum
    }
}

/// Fields for inserting a product into the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    pub price_cents: i64,
    #[serde(default)]
    pub cost_cents: Option<i64>,
    #[serde(default)]
    pub stock_current: i64,
    #[serde(default)]
    pub stock_minimum: i64,
}

/// Catalog-managed product fields. Stock is deliberately absent: it only
/// changes through the inventory ledger.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductUpdate {
    pub name: String,
    pub price_cents: i64,
    pub cost_cents: Option<i64>,
    pub stock_minimum: i64,
    pub is_active: bool,
}

// =============================================================================
// Sale Status
// =============================================================================

/// The state of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Every sale is born completed.
    Completed,
    /// Terminal; reachable only from `Completed`.
    Cancelled,
}

impl SaleStatus {
    /// Storage/wire representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            SaleStatus::Completed => "completed",
            SaleStatus::Cancelled => "cancelled",
        }
    }

    /// Whether a cancellation may leave this state.
    pub const fn can_cancel(&self) -> bool {
        matches!(self, SaleStatus::Completed)
    }
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Completed
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Card payment on an external terminal.
    Card,
    /// Charged to the member's account.
    MemberAccount,
}

impl PaymentMethod {
    /// Storage/wire representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::MemberAccount => "member_account",
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A persisted sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: i64,
    /// Opaque member reference; `None` for anonymous sales.
    pub member_id: Option<i64>,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub status: SaleStatus,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Sale {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// True once the sale has been cancelled.
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.status == SaleStatus::Cancelled
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
/// Price and name are frozen at the time of sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: i64,
    pub sale_id: i64,
    pub product_id: i64,
    /// Product name at time of sale (frozen).
    pub product_name: String,
    pub quantity: i64,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// `quantity × unit_price_cents`.
    pub line_subtotal_cents: i64,
}

/// A sale with its line items attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleDetail {
    pub sale: Sale,
    /// Name from the member directory, when the member is known there.
    pub member_name: Option<String>,
    pub items: Vec<SaleItem>,
}

impl SaleDetail {
    /// Total units across all line items.
    pub fn unit_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

// =============================================================================
// Sale Request
// =============================================================================

/// A proposed sale as submitted by a caller.
///
/// `subtotal_cents` and `total_cents` are the caller's own computation; the
/// validator rejects the request if they drift from the server's.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleRequest {
    #[serde(default)]
    pub member_id: Option<i64>,
    pub items: Vec<SaleRequestItem>,
    pub subtotal_cents: i64,
    #[serde(default)]
    pub discount_cents: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub notes: Option<String>,
}

/// One requested line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleRequestItem {
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price_cents: i64,
}

// =============================================================================
// Query Types
// =============================================================================

/// Filters for listing sales. All criteria combine with AND.
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use tillpoint_core::SaleFilter;
///
/// let filter = SaleFilter::default()
///     .on_date(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap())
///     .for_member(42)
///     .page(20, 40);
/// assert_eq!(filter.effective_limit(), 20);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleFilter {
    /// Inclusive lower bound on `created_at`.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `created_at`.
    #[serde(default)]
    #[ts(as = "Option<String>")]
    pub to: Option<DateTime<Utc>>,
    pub member_id: Option<i64>,
    /// Free text matched against sale id, member name, product names, notes.
    pub query: Option<String>,
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: u32,
}

impl SaleFilter {
    /// Restricts to one calendar day (UTC).
    pub fn on_date(mut self, date: NaiveDate) -> Self {
        let (from, to) = day_bounds(date);
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    /// Restricts to `[from, to)`.
    pub fn between(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn for_member(mut self, member_id: i64) -> Self {
        self.member_id = Some(member_id);
        self
    }

    pub fn matching(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn page(mut self, limit: u32, offset: u32) -> Self {
        self.limit = Some(limit);
        self.offset = offset;
        self
    }

    /// Page size after defaulting and capping.
    pub fn effective_limit(&self) -> u32 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// Trimmed search text, `None` when blank.
    pub fn search_text(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }
}

/// `[midnight, next midnight)` of `date` in UTC.
pub fn day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_time(chrono::NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

// =============================================================================
// Statistics
// =============================================================================

/// Sale count and total for one payment method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PaymentMethodSummary {
    pub payment_method: PaymentMethod,
    pub sale_count: i64,
    pub total_cents: i64,
}

/// A best-selling product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TopProduct {
    pub product_id: i64,
    pub product_name: String,
    pub quantity_sold: i64,
    pub revenue_cents: i64,
}

/// Aggregate statistics over completed sales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleStatistics {
    /// Day the statistics are scoped to; `None` for all time.
    #[ts(as = "Option<String>")]
    pub date: Option<NaiveDate>,
    pub completed_count: i64,
    pub cancelled_count: i64,
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub revenue_cents: i64,
    pub by_payment_method: Vec<PaymentMethodSummary>,
    pub top_products: Vec<TopProduct>,
}

impl SaleStatistics {
    /// Average ticket over completed sales, zero when there are none.
    pub fn average_ticket(&self) -> Money {
        if self.completed_count == 0 {
            return Money::zero();
        }
        Money::from_cents(self.revenue_cents / self.completed_count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_status_transitions() {
        assert_eq!(SaleStatus::default(), SaleStatus::Completed);
        assert!(SaleStatus::Completed.can_cancel());
        assert!(!SaleStatus::Cancelled.can_cancel());
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::MemberAccount).unwrap(),
            "\"member_account\""
        );
        assert_eq!(PaymentMethod::MemberAccount.as_str(), "member_account");
        assert_eq!(
            serde_json::to_string(&SaleStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
    }

    #[test]
    fn test_sale_request_optional_fields_default() {
        let json = r#"{
            "items": [{ "product_id": 1, "quantity": 2, "unit_price_cents": 500 }],
            "subtotal_cents": 1000,
            "total_cents": 1000,
            "payment_method": "card"
        }"#;
        let request: SaleRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.member_id, None);
        assert_eq!(request.discount_cents, 0);
        assert_eq!(request.notes, None);
        assert_eq!(request.payment_method, PaymentMethod::Card);
    }

    #[test]
    fn test_filter_limits() {
        assert_eq!(SaleFilter::default().effective_limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(SaleFilter::default().page(0, 0).effective_limit(), 1);
        assert_eq!(
            SaleFilter::default().page(10_000, 0).effective_limit(),
            MAX_PAGE_SIZE
        );
        assert_eq!(SaleFilter::default().matching("   ").search_text(), None);
        assert_eq!(
            SaleFilter::default().matching(" cola ").search_text(),
            Some("cola")
        );
    }

    #[test]
    fn test_filter_between_sets_window() {
        let from = NaiveDate::from_ymd_opt(2026, 10, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
            .and_utc();
        let to = from + Duration::hours(8);

        let filter = SaleFilter::default().between(from, to).for_member(3);
        assert_eq!(filter.from, Some(from));
        assert_eq!(filter.to, Some(to));
        assert_eq!(filter.member_id, Some(3));

        // Optional fields may be omitted on the wire
        let parsed: SaleFilter = serde_json::from_str(r#"{ "member_id": 3 }"#).unwrap();
        assert_eq!(parsed, SaleFilter::default().for_member(3));
    }

    #[test]
    fn test_day_bounds() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let (from, to) = day_bounds(date);
        assert_eq!(from.to_rfc3339(), "2026-10-16T00:00:00+00:00");
        assert_eq!(to - from, Duration::days(1));
    }

    #[test]
    fn test_average_ticket() {
        let stats = SaleStatistics {
            date: None,
            completed_count: 4,
            cancelled_count: 1,
            subtotal_cents: 10_500,
            discount_cents: 500,
            revenue_cents: 10_000,
            by_payment_method: vec![],
            top_products: vec![],
        };
        assert_eq!(stats.average_ticket().cents(), 2500);
    }
}

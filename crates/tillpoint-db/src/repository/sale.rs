//! # Sale Repository
//!
//! Database operations for sales and sale items.
//!
//! ## Two Surfaces
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Repository                                   │
//! │                                                                         │
//! │  WRITES (crate-private, inside a UnitOfWork, used by SaleProcessor)    │
//! │  ├── insert_sale_in()      sales row, status = completed               │
//! │  ├── insert_item_in()      one line item with frozen name + price      │
//! │  ├── mark_cancelled_in()   completed → cancelled, or nothing           │
//! │  ├── status_in()           classify a failed cancellation              │
//! │  ├── items_in()            line items to restock                       │
//! │  └── member_name_in()      member read model lookup                    │
//! │                                                                         │
//! │  QUERIES (public, on the pool, no side effects)                        │
//! │  ├── get_by_id() / get_items() / get_detail()                          │
//! │  ├── list(filter)          newest first, paginated                     │
//! │  ├── count(filter)                                                     │
//! │  └── statistics(date, n)   totals, payment mix, top products           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::product::like_pattern;
use crate::unit_of_work::UnitOfWork;
use tillpoint_core::validation::{ValidatedLine, ValidatedSale};
use tillpoint_core::{
    day_bounds, PaymentMethodSummary, Sale, SaleDetail, SaleFilter, SaleItem, SaleStatistics,
    SaleStatus, TopProduct,
};

const SALE_COLUMNS: &str = "id, member_id, subtotal_cents, discount_cents, total_cents, \
     payment_method, status, notes, created_at, updated_at, cancelled_at";

/// Sale columns qualified for queries that join `sales s`.
const SALE_COLUMNS_S: &str = "s.id AS id, s.member_id AS member_id, \
     s.subtotal_cents AS subtotal_cents, s.discount_cents AS discount_cents, \
     s.total_cents AS total_cents, s.payment_method AS payment_method, \
     s.status AS status, s.notes AS notes, s.created_at AS created_at, \
     s.updated_at AS updated_at, s.cancelled_at AS cancelled_at";

const ITEM_COLUMNS: &str =
    "id, sale_id, product_id, product_name, quantity, unit_price_cents, line_subtotal_cents";

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct SaleTotals {
    completed_count: i64,
    cancelled_count: i64,
    subtotal_cents: i64,
    discount_cents: i64,
    revenue_cents: i64,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    // =========================================================================
    // Unit-of-work writes
    // =========================================================================

    /// Inserts the sales row for a validated sale.
    pub(crate) async fn insert_sale_in(
        uow: &mut UnitOfWork,
        sale: &ValidatedSale,
        now: DateTime<Utc>,
    ) -> DbResult<Sale> {
        let sql = format!(
            "INSERT INTO sales (member_id, subtotal_cents, discount_cents, total_cents, \
             payment_method, status, notes, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8) \
             RETURNING {SALE_COLUMNS}"
        );

        let inserted = sqlx::query_as::<_, Sale>(&sql)
            .bind(sale.member_id())
            .bind(sale.subtotal().cents())
            .bind(sale.discount().cents())
            .bind(sale.total().cents())
            .bind(sale.payment_method())
            .bind(SaleStatus::Completed)
            .bind(sale.notes())
            .bind(now)
            .fetch_one(uow.conn())
            .await?;

        debug!(sale_id = inserted.id, "Sale row inserted");
        Ok(inserted)
    }

    /// Inserts one line item with the product name as reserved.
    pub(crate) async fn insert_item_in(
        uow: &mut UnitOfWork,
        sale_id: i64,
        line: &ValidatedLine,
        product_name: &str,
    ) -> DbResult<SaleItem> {
        let sql = format!(
            "INSERT INTO sale_items (sale_id, product_id, product_name, quantity, \
             unit_price_cents, line_subtotal_cents) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6) \
             RETURNING {ITEM_COLUMNS}"
        );

        let item = sqlx::query_as::<_, SaleItem>(&sql)
            .bind(sale_id)
            .bind(line.product_id)
            .bind(product_name)
            .bind(line.quantity)
            .bind(line.unit_price.cents())
            .bind(line.line_subtotal.cents())
            .fetch_one(uow.conn())
            .await?;

        Ok(item)
    }

    /// Moves a completed sale to cancelled.
    ///
    /// Returns `None` when the sale is missing or not completed; nothing
    /// was written in that case.
    pub(crate) async fn mark_cancelled_in(
        uow: &mut UnitOfWork,
        sale_id: i64,
        now: DateTime<Utc>,
    ) -> DbResult<Option<Sale>> {
        let sql = format!(
            "UPDATE sales SET status = ?2, cancelled_at = ?3, updated_at = ?3 \
             WHERE id = ?1 AND status = ?4 \
             RETURNING {SALE_COLUMNS}"
        );

        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(sale_id)
            .bind(SaleStatus::Cancelled)
            .bind(now)
            .bind(SaleStatus::Completed)
            .fetch_optional(uow.conn())
            .await?;

        Ok(sale)
    }

    pub(crate) async fn status_in(
        uow: &mut UnitOfWork,
        sale_id: i64,
    ) -> DbResult<Option<SaleStatus>> {
        let status = sqlx::query_scalar::<_, SaleStatus>("SELECT status FROM sales WHERE id = ?1")
            .bind(sale_id)
            .fetch_optional(uow.conn())
            .await?;

        Ok(status)
    }

    pub(crate) async fn items_in(uow: &mut UnitOfWork, sale_id: i64) -> DbResult<Vec<SaleItem>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY id");

        let items = sqlx::query_as::<_, SaleItem>(&sql)
            .bind(sale_id)
            .fetch_all(uow.conn())
            .await?;

        Ok(items)
    }

    pub(crate) async fn member_name_in(
        uow: &mut UnitOfWork,
        member_id: Option<i64>,
    ) -> DbResult<Option<String>> {
        let Some(member_id) = member_id else {
            return Ok(None);
        };

        let name = sqlx::query_scalar::<_, String>("SELECT name FROM members WHERE id = ?1")
            .bind(member_id)
            .fetch_optional(uow.conn())
            .await?;

        Ok(name)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1");

        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Gets all items for a sale, in insertion order.
    pub async fn get_items(&self, sale_id: i64) -> DbResult<Vec<SaleItem>> {
        let sql = format!("SELECT {ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY id");

        let items = sqlx::query_as::<_, SaleItem>(&sql)
            .bind(sale_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Gets a sale with its line items and member name.
    pub async fn get_detail(&self, id: i64) -> DbResult<Option<SaleDetail>> {
        let Some(sale) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let member_name = match sale.member_id {
            Some(member_id) => {
                sqlx::query_scalar::<_, String>("SELECT name FROM members WHERE id = ?1")
                    .bind(member_id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => None,
        };

        let items = self.get_items(id).await?;

        Ok(Some(SaleDetail {
            sale,
            member_name,
            items,
        }))
    }

    /// Lists sales matching `filter`, most recent first.
    ///
    /// ## Free-Text Search
    /// `filter.query` matches any of:
    /// - the sale id, exactly
    /// - the member's name
    /// - a line item's product name, as sold or as currently named
    /// - the sale notes
    pub async fn list(&self, filter: &SaleFilter) -> DbResult<Vec<Sale>> {
        let limit = filter.effective_limit();

        debug!(
            limit,
            offset = filter.offset,
            query = ?filter.search_text(),
            "Listing sales"
        );

        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {SALE_COLUMNS_S} "));
        push_filtered_from(&mut qb, filter);
        qb.push(" ORDER BY s.created_at DESC, s.id DESC LIMIT ")
            .push_bind(i64::from(limit))
            .push(" OFFSET ")
            .push_bind(i64::from(filter.offset));

        let sales = qb.build_query_as::<Sale>().fetch_all(&self.pool).await?;

        Ok(sales)
    }

    /// Counts sales matching `filter`, ignoring pagination.
    pub async fn count(&self, filter: &SaleFilter) -> DbResult<i64> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) ");
        push_filtered_from(&mut qb, filter);

        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;

        Ok(count)
    }

    /// Aggregates sales for one UTC day, or for all time when `date` is `None`.
    ///
    /// Money totals, the payment breakdown and top products cover completed
    /// sales only; cancelled sales are only counted.
    pub async fn statistics(
        &self,
        date: Option<NaiveDate>,
        top_n: u32,
    ) -> DbResult<SaleStatistics> {
        let (from, to) = match date.map(day_bounds) {
            Some((from, to)) => (Some(from), Some(to)),
            None => (None, None),
        };

        debug!(?date, top_n, "Computing sale statistics");

        let totals = sqlx::query_as::<_, SaleTotals>(
            "SELECT \
                 COALESCE(SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END), 0) AS completed_count, \
                 COALESCE(SUM(CASE WHEN status = 'cancelled' THEN 1 ELSE 0 END), 0) AS cancelled_count, \
                 COALESCE(SUM(CASE WHEN status = 'completed' THEN subtotal_cents ELSE 0 END), 0) AS subtotal_cents, \
                 COALESCE(SUM(CASE WHEN status = 'completed' THEN discount_cents ELSE 0 END), 0) AS discount_cents, \
                 COALESCE(SUM(CASE WHEN status = 'completed' THEN total_cents ELSE 0 END), 0) AS revenue_cents \
             FROM sales \
             WHERE (?1 IS NULL OR created_at >= ?1) AND (?2 IS NULL OR created_at < ?2)",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        let by_payment_method = sqlx::query_as::<_, PaymentMethodSummary>(
            "SELECT payment_method, COUNT(*) AS sale_count, COALESCE(SUM(total_cents), 0) AS total_cents \
             FROM sales \
             WHERE status = 'completed' \
               AND (?1 IS NULL OR created_at >= ?1) AND (?2 IS NULL OR created_at < ?2) \
             GROUP BY payment_method \
             ORDER BY total_cents DESC, payment_method",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        let top_products = sqlx::query_as::<_, TopProduct>(
            "SELECT si.product_id AS product_id, p.name AS product_name, \
                    SUM(si.quantity) AS quantity_sold, \
                    SUM(si.line_subtotal_cents) AS revenue_cents \
             FROM sale_items si \
             JOIN sales s ON s.id = si.sale_id \
             JOIN products p ON p.id = si.product_id \
             WHERE s.status = 'completed' \
               AND (?1 IS NULL OR s.created_at >= ?1) AND (?2 IS NULL OR s.created_at < ?2) \
             GROUP BY si.product_id, p.name \
             ORDER BY quantity_sold DESC, revenue_cents DESC, si.product_id \
             LIMIT ?3",
        )
        .bind(from)
        .bind(to)
        .bind(i64::from(top_n))
        .fetch_all(&self.pool)
        .await?;

        Ok(SaleStatistics {
            date,
            completed_count: totals.completed_count,
            cancelled_count: totals.cancelled_count,
            subtotal_cents: totals.subtotal_cents,
            discount_cents: totals.discount_cents,
            revenue_cents: totals.revenue_cents,
            by_payment_method,
            top_products,
        })
    }
}

/// Appends `FROM ... WHERE ...` for `filter` (no ordering or paging).
fn push_filtered_from(qb: &mut QueryBuilder<'_, Sqlite>, filter: &SaleFilter) {
    qb.push("FROM sales s LEFT JOIN members m ON m.id = s.member_id WHERE 1 = 1");

    if let Some(from) = filter.from {
        qb.push(" AND s.created_at >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        qb.push(" AND s.created_at < ").push_bind(to);
    }
    if let Some(member_id) = filter.member_id {
        qb.push(" AND s.member_id = ").push_bind(member_id);
    }
    if let Some(text) = filter.search_text() {
        let pattern = like_pattern(text);
        qb.push(" AND (CAST(s.id AS TEXT) = ")
            .push_bind(text.trim_start_matches('#').to_string())
            .push(" OR m.name LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR s.notes LIKE ")
            .push_bind(pattern.clone())
            .push(
                " ESCAPE '\\' OR EXISTS (SELECT 1 FROM sale_items si \
                 JOIN products p ON p.id = si.product_id \
                 WHERE si.sale_id = s.id AND (si.product_name LIKE ",
            )
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR p.name LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')))");
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

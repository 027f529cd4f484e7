//! # Sale Processor
//!
//! Creates and cancels sales. Each operation runs in a single unit of work:
//! stock, the sale row and its line items change together or not at all.
//!
//! ## Create
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  SaleRequest                                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate_sale()          no store access; rejects with every problem  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌──────────────── UnitOfWork ────────────────┐                        │
//! │  │ reserve(line 1) ... reserve(line n)        │  first failure aborts  │
//! │  │ insert sale (completed)                    │                        │
//! │  │ insert line items (name + price frozen)    │                        │
//! │  └──────────────── commit ────────────────────┘                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SaleDetail                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Cancel
//! ```text
//!   UnitOfWork { completed → cancelled; release every line item } commit
//! ```
//! The status flip comes first so the unit takes the write lock before it
//! reads the line items; both happen before commit.

use chrono::Utc;
use tracing::{debug, info};

use crate::error::{SaleError, SaleResult};
use crate::pool::Database;
use crate::repository::inventory::InventoryLedger;
use crate::repository::sale::SaleRepository;
use crate::unit_of_work::UnitOfWork;
use tillpoint_core::validation::{validate_sale, ValidatedSale};
use tillpoint_core::{CoreError, Sale, SaleDetail, SaleFilter, SaleRequest, SaleStatistics};

/// Default number of rows in the top-products statistic.
pub const DEFAULT_TOP_PRODUCTS: u32 = 10;

/// Entry point for sale mutations and sale queries.
///
/// ## Usage
/// ```rust,ignore
/// let processor = SaleProcessor::new(db.clone());
///
/// let detail = processor.create_sale(&request).await?;
/// let cancelled = processor.cancel_sale(detail.sale.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SaleProcessor {
    db: Database,
    top_products: u32,
}

impl SaleProcessor {
    pub fn new(db: Database) -> Self {
        SaleProcessor {
            db,
            top_products: DEFAULT_TOP_PRODUCTS,
        }
    }

    /// Sets how many rows `statistics` reports as top products.
    pub fn with_top_products(mut self, top_products: u32) -> Self {
        self.top_products = top_products;
        self
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Validates and records a sale, decrementing stock for every line.
    ///
    /// ## Returns
    /// * `Ok(SaleDetail)` - The completed sale with its line items
    /// * `Err(Rejected(Validation))` - Nothing touched the store
    /// * `Err(Rejected(ProductNotFound | InsufficientStock))` - First failing line; no change
    /// * `Err(Store(_))` - Infrastructure failure; no change
    pub async fn create_sale(&self, request: &SaleRequest) -> SaleResult<SaleDetail> {
        let validated = validate_sale(request)?;

        debug!(
            lines = validated.lines().len(),
            units = validated.unit_count(),
            total = %validated.total(),
            "Sale validated"
        );

        let mut uow = self.db.begin().await?;
        let outcome = record_sale(&mut uow, &validated).await;
        let detail = uow.finish(outcome).await?;

        info!(
            sale_id = detail.sale.id,
            total = %detail.sale.total(),
            payment_method = detail.sale.payment_method.as_str(),
            items = detail.items.len(),
            "Sale created"
        );

        Ok(detail)
    }

    /// Cancels a completed sale and returns its stock.
    ///
    /// Not idempotent: cancelling twice fails with `AlreadyCancelled`.
    ///
    /// ## Returns
    /// * `Ok(Sale)` - The sale, now cancelled
    /// * `Err(Rejected(SaleNotFound))` - No such sale
    /// * `Err(Rejected(AlreadyCancelled))` - Sale was not completed
    /// * `Err(Store(_))` - Infrastructure failure; no change
    pub async fn cancel_sale(&self, sale_id: i64) -> SaleResult<Sale> {
        debug!(sale_id, "Cancelling sale");

        let mut uow = self.db.begin().await?;
        let outcome = reverse_sale(&mut uow, sale_id).await;
        let (sale, units) = uow.finish(outcome).await?;

        info!(sale_id, units_restocked = units, "Sale cancelled");

        Ok(sale)
    }

    /// Gets a sale with its line items.
    pub async fn get_sale(&self, sale_id: i64) -> SaleResult<SaleDetail> {
        self.db
            .sales()
            .get_detail(sale_id)
            .await?
            .ok_or_else(|| CoreError::SaleNotFound(sale_id).into())
    }

    /// Lists sales, most recent first.
    pub async fn list_sales(&self, filter: &SaleFilter) -> SaleResult<Vec<Sale>> {
        Ok(self.db.sales().list(filter).await?)
    }

    /// Statistics for one UTC day, or all time.
    pub async fn statistics(
        &self,
        date: Option<chrono::NaiveDate>,
    ) -> SaleResult<SaleStatistics> {
        Ok(self.db.sales().statistics(date, self.top_products).await?)
    }
}

async fn record_sale(uow: &mut UnitOfWork, sale: &ValidatedSale) -> SaleResult<SaleDetail> {
    let mut reservations = Vec::with_capacity(sale.lines().len());
    for line in sale.lines() {
        reservations.push(InventoryLedger::reserve(uow, line.product_id, line.quantity).await?);
    }

    let row = SaleRepository::insert_sale_in(uow, sale, Utc::now()).await?;

    let mut items = Vec::with_capacity(reservations.len());
    for (line, reservation) in sale.lines().iter().zip(&reservations) {
        items.push(
            SaleRepository::insert_item_in(uow, row.id, line, &reservation.product_name).await?,
        );
    }

    let member_name = SaleRepository::member_name_in(uow, row.member_id).await?;

    Ok(SaleDetail {
        sale: row,
        member_name,
        items,
    })
}

async fn reverse_sale(uow: &mut UnitOfWork, sale_id: i64) -> SaleResult<(Sale, i64)> {
    let sale = match SaleRepository::mark_cancelled_in(uow, sale_id, Utc::now()).await? {
        Some(sale) => sale,
        None => {
            let err = match SaleRepository::status_in(uow, sale_id).await? {
                None => CoreError::SaleNotFound(sale_id),
                Some(_) => CoreError::AlreadyCancelled(sale_id),
            };
            return Err(SaleError::from(err));
        }
    };

    let items = SaleRepository::items_in(uow, sale_id).await?;
    let mut units = 0;
    for item in &items {
        InventoryLedger::release(uow, item.product_id, item.quantity).await?;
        units += item.quantity;
    }

    Ok((sale, units))
}

// =============================================================================
// Unit Tests
// =============================================================================

//! # Product Repository
//!
//! Catalog operations for products.
//!
//! ## Key Operations
//! - Insert, lookup, name search
//! - Catalog field updates and activation
//! - Low-stock report
//!
//! ## Stock Is Not Written Here
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Who Changes stock_current                            │
//! │                                                                         │
//! │  ProductRepository                                                     │
//! │  ├── insert()         sets the opening stock                           │
//! │  └── everything else  never touches stock_current                      │
//! │                                                                         │
//! │  InventoryLedger (inside a sale unit of work)                          │
//! │  ├── reserve()        stock_current - n, only if enough on hand        │
//! │  └── release()        stock_current + n                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use tillpoint_core::{NewProduct, Product, ProductUpdate};

pub(crate) const PRODUCT_COLUMNS: &str = "id, name, price_cents, cost_cents, stock_current, \
     stock_minimum, is_active, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let cola = repo.insert(&NewProduct { name: "Cola 330ml".into(), price_cents: 150, .. }).await?;
/// let results = repo.search("cola", 20).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a new product with its opening stock.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product with its assigned id
    /// * `Err(DbError::ConstraintViolation)` - Non-positive price or negative stock
    pub async fn insert(&self, product: &NewProduct) -> DbResult<Product> {
        debug!(name = %product.name, stock = product.stock_current, "Inserting product");

        let now = Utc::now();
        let sql = format!(
            "INSERT INTO products (name, price_cents, cost_cents, stock_current, stock_minimum, \
             is_active, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6) \
             RETURNING {PRODUCT_COLUMNS}"
        );

        let inserted = sqlx::query_as::<_, Product>(&sql)
            .bind(product.name.trim())
            .bind(product.price_cents)
            .bind(product.cost_cents)
            .bind(product.stock_current)
            .bind(product.stock_minimum)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        Ok(inserted)
    }

    /// Gets a product by its ID, active or not.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: i64) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Lists active products sorted by name.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = 1 ORDER BY name, id LIMIT ?1"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Searches active products by name (case-insensitive substring).
    ///
    /// An empty query lists active products.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching products");

        if query.is_empty() {
            return self.list_active(limit).await;
        }

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_active = 1 AND name LIKE ?1 ESCAPE '\\' \
             ORDER BY name, id LIMIT ?2"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(like_pattern(query))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Updates catalog-managed fields. Stock is left untouched.
    ///
    /// ## Returns
    /// * `Ok(Product)` - The updated product
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    pub async fn update_details(&self, id: i64, update: &ProductUpdate) -> DbResult<Product> {
        debug!(id = id, "Updating product details");

        let sql = format!(
            "UPDATE products SET \
                 name = ?2, \
                 price_cents = ?3, \
                 cost_cents = ?4, \
                 stock_minimum = ?5, \
                 is_active = ?6, \
                 updated_at = ?7 \
             WHERE id = ?1 \
             RETURNING {PRODUCT_COLUMNS}"
        );

        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(update.name.trim())
            .bind(update.price_cents)
            .bind(update.cost_cents)
            .bind(update.stock_minimum)
            .bind(update.is_active)
            .bind(Utc::now())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Activates or deactivates a product.
    ///
    /// Deactivated products keep their history but can no longer be sold.
    pub async fn set_active(&self, id: i64, active: bool) -> DbResult<()> {
        debug!(id = id, active = active, "Setting product activation");

        let result = sqlx::query("UPDATE products SET is_active = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(active)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Active products at or below their reorder threshold, emptiest first.
    pub async fn low_stock(&self, limit: u32) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE is_active = 1 AND stock_current <= stock_minimum \
             ORDER BY stock_current, name LIMIT ?1"
        );

        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// `%text%` with LIKE wildcards in `text` escaped by `\`.
pub(crate) fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    fn new_product(name: &str, price_cents: i64, stock: i64) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            price_cents,
            cost_cents: None,
            stock_current: stock,
            stock_minimum: 2,
        }
    }

    async fn setup() -> (Database, ProductRepository) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();
        (db, repo)
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let (_db, repo) = setup().await;

        let inserted = repo.insert(&new_product("  Cola 330ml ", 150, 24)).await.unwrap();
        assert!(inserted.id > 0);
        assert_eq!(inserted.name, "Cola 330ml");
        assert!(inserted.is_active);

        let fetched = repo.get_by_id(inserted.id).await.unwrap().unwrap();
        assert_eq!(fetched, inserted);

        assert!(repo.get_by_id(9_999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_rejects_bad_values() {
        let (_db, repo) = setup().await;

        let err = repo.insert(&new_product("Free", 0, 1)).await.unwrap_err();
        assert!(matches!(err, DbError::ConstraintViolation { .. }));

        let err = repo.insert(&new_product("Owed", 100, -1)).await.unwrap_err();
        assert!(matches!(err, DbError::ConstraintViolation { .. }));
    }

    #[tokio::test]
    async fn test_search_by_name() {
        let (_db, repo) = setup().await;

        repo.insert(&new_product("Cola 330ml", 150, 10)).await.unwrap();
        repo.insert(&new_product("Diet Cola 330ml", 150, 10)).await.unwrap();
        let water = repo.insert(&new_product("Water 500ml", 90, 10)).await.unwrap();

        let hits = repo.search("cola", 20).await.unwrap();
        assert_eq!(hits.len(), 2);

        // Inactive products are not offered for sale
        repo.set_active(water.id, false).await.unwrap();
        assert!(repo.search("water", 20).await.unwrap().is_empty());
        assert_eq!(repo.search("", 20).await.unwrap().len(), 2);

        // Wildcards are literal
        assert!(repo.search("%", 20).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_details_keeps_stock() {
        let (_db, repo) = setup().await;

        let product = repo.insert(&new_product("Chips", 200, 7)).await.unwrap();
        let updated = repo
            .update_details(
                product.id,
                &ProductUpdate {
                    name: "Chips XL".to_string(),
                    price_cents: 250,
                    cost_cents: Some(120),
                    stock_minimum: 5,
                    is_active: true,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Chips XL");
        assert_eq!(updated.price_cents, 250);
        assert_eq!(updated.stock_current, 7);

        let missing = repo
            .update_details(
                404,
                &ProductUpdate {
                    name: "Ghost".to_string(),
                    price_cents: 1,
                    cost_cents: None,
                    stock_minimum: 0,
                    is_active: true,
                },
            )
            .await;
        assert!(matches!(missing, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_low_stock_and_count() {
        let (_db, repo) = setup().await;

        repo.insert(&new_product("Plenty", 100, 50)).await.unwrap();
        let empty = repo.insert(&new_product("Empty", 100, 0)).await.unwrap();
        let low = repo.insert(&new_product("Low", 100, 2)).await.unwrap();

        let report = repo.low_stock(10).await.unwrap();
        let ids: Vec<i64> = report.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![empty.id, low.id]);
        assert!(report.iter().all(Product::is_low_stock));

        assert_eq!(repo.count().await.unwrap(), 3);
        assert!(matches!(
            repo.set_active(12_345, false).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("cola"), "%cola%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}

//! Concurrent sales against an on-disk database with a multi-connection pool.

use std::time::Duration;

use tillpoint_core::{
    CoreError, ErrorCode, NewProduct, PaymentMethod, SaleFilter, SaleRequest, SaleRequestItem,
};
use tillpoint_db::{Database, DbConfig, SaleError, SaleProcessor};

async fn open(dir: &tempfile::TempDir) -> Database {
    let config = DbConfig::new(dir.path().join("tillpoint.db"))
        .max_connections(8)
        .busy_timeout(Duration::from_secs(10));
    Database::new(config).await.unwrap()
}

async fn add_product(db: &Database, stock: i64) -> i64 {
    db.products()
        .insert(&NewProduct {
            name: "Limited Edition".to_string(),
            price_cents: 1_000,
            cost_cents: None,
            stock_current: stock,
            stock_minimum: 0,
        })
        .await
        .unwrap()
        .id
}

fn single_line(product_id: i64, quantity: i64) -> SaleRequest {
    SaleRequest {
        member_id: None,
        items: vec![SaleRequestItem {
            product_id,
            quantity,
            unit_price_cents: 1_000,
        }],
        subtotal_cents: quantity * 1_000,
        discount_cents: 0,
        total_cents: quantity * 1_000,
        payment_method: PaymentMethod::Card,
        notes: None,
    }
}

async fn stock_of(db: &Database, id: i64) -> i64 {
    db.products().get_by_id(id).await.unwrap().unwrap().stock_current
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn last_unit_is_sold_exactly_once() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir).await;
    let product = add_product(&db, 1).await;

    let a = SaleProcessor::new(db.clone());
    let b = SaleProcessor::new(db.clone());
    let request = single_line(product, 1);
    let request_b = request.clone();

    let (first, second) = tokio::join!(
        tokio::spawn(async move { a.create_sale(&request).await }),
        tokio::spawn(async move { b.create_sale(&request_b).await }),
    );
    let outcomes = [first.unwrap(), second.unwrap()];

    let succeeded = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(succeeded, 1);

    let failure = outcomes.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert!(matches!(
        failure,
        SaleError::Rejected(CoreError::InsufficientStock {
            requested: 1,
            available: 0,
            ..
        })
    ));

    assert_eq!(stock_of(&db, product).await, 0);
    assert_eq!(db.sales().count(&SaleFilter::default()).await.unwrap(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_sales_never_oversell() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir).await;
    let product = add_product(&db, 10).await;

    let mut handles = Vec::new();
    for _ in 0..16 {
        let processor = SaleProcessor::new(db.clone());
        let request = single_line(product, 1);
        handles.push(tokio::spawn(async move { processor.create_sale(&request).await }));
    }

    let mut sold = 0;
    let mut rejected = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => sold += 1,
            Err(err) => {
                assert_eq!(err.code(), ErrorCode::InsufficientStock);
                rejected += 1;
            }
        }
    }

    assert_eq!(sold, 10);
    assert_eq!(rejected, 6);
    assert_eq!(stock_of(&db, product).await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_cancels_restore_once() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir).await;
    let product = add_product(&db, 5).await;

    let processor = SaleProcessor::new(db.clone());
    let sale = processor.create_sale(&single_line(product, 3)).await.unwrap();
    assert_eq!(stock_of(&db, product).await, 2);

    let a = processor.clone();
    let b = processor.clone();
    let id = sale.sale.id;
    let (first, second) = tokio::join!(
        tokio::spawn(async move { a.cancel_sale(id).await }),
        tokio::spawn(async move { b.cancel_sale(id).await }),
    );
    let outcomes = [first.unwrap(), second.unwrap()];

    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    let failure = outcomes.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert_eq!(failure.code(), ErrorCode::AlreadyCancelled);

    assert_eq!(stock_of(&db, product).await, 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn readers_see_committed_state_only() {
    let dir = tempfile::tempdir().unwrap();
    let db = open(&dir).await;
    let product = add_product(&db, 100).await;

    let writer = SaleProcessor::new(db.clone());
    let write = tokio::spawn(async move {
        for _ in 0..20 {
            writer.create_sale(&single_line(product, 2)).await.unwrap();
        }
    });

    // Every observed (stock, completed sales) pair must balance
    let reader_db = db.clone();
    let read = tokio::spawn(async move {
        for _ in 0..20 {
            let mut conn = reader_db.pool().begin().await.unwrap();
            let stock: i64 = sqlx::query_scalar("SELECT stock_current FROM products WHERE id = ?1")
                .bind(product)
                .fetch_one(&mut *conn)
                .await
                .unwrap();
            let sold: i64 = sqlx::query_scalar(
                "SELECT COALESCE(SUM(quantity), 0) FROM sale_items WHERE product_id = ?1",
            )
            .bind(product)
            .fetch_one(&mut *conn)
            .await
            .unwrap();
            conn.rollback().await.unwrap();
            assert_eq!(stock + sold, 100);
        }
    });

    write.await.unwrap();
    read.await.unwrap();

    assert_eq!(stock_of(&db, product).await, 60);
}

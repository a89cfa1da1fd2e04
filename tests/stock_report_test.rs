mod common;

use assert_matches::assert_matches;
use chrono::{DateTime, TimeZone, Utc};
use common::{qty, TestApp};
use inventory_api::{
    entities::{stock_transaction, TransactionType},
    errors::ServiceError,
    quantity::Quantity,
    services::stock_report::StockReportService,
};
use sea_orm::{ActiveModelTrait, Set};
use uuid::Uuid;

async fn record(
    app: &TestApp,
    product: Uuid,
    sub_variant: Uuid,
    kind: TransactionType,
    quantity: i64,
    at: DateTime<Utc>,
) -> stock_transaction::Model {
    stock_transaction::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(product),
        sub_variant_id: Set(sub_variant),
        quantity: Set(Quantity::from(quantity)),
        transaction_type: Set(kind.as_str().to_string()),
        transaction_date: Set(at),
    }
    .insert(app.db.as_ref())
    .await
    .expect("insert ledger row")
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
}

/// Product with November movements: IN 10 on the 1st, OUT 3 on the 15th,
/// IN 5 late on the 30th, plus one row on each side of the month.
async fn november(app: &TestApp) {
    let (product, sub_variant) = app.seed_stocked("NOV", 0).await;
    record(app, product, sub_variant, TransactionType::In, 10, at(2025, 11, 1, 9, 0, 0)).await;
    record(app, product, sub_variant, TransactionType::Out, 3, at(2025, 11, 15, 12, 30, 0)).await;
    record(app, product, sub_variant, TransactionType::In, 5, at(2025, 11, 30, 23, 59, 59)).await;
    record(app, product, sub_variant, TransactionType::In, 100, at(2025, 10, 31, 23, 59, 59)).await;
    record(app, product, sub_variant, TransactionType::Out, 100, at(2025, 12, 1, 0, 0, 0)).await;
}

fn report_service(app: &TestApp) -> &StockReportService {
    app.state.services.stock_report.as_ref()
}

#[tokio::test]
async fn november_report_folds_in_and_out() {
    let app = TestApp::new().await;
    november(&app).await;

    let report = report_service(&app)
        .report("2025-11-01", "2025-11-30", None, None)
        .await
        .unwrap();

    assert_eq!(report.transactions.len(), 3);
    assert_eq!(report.total_in, qty("15"));
    assert_eq!(report.total_out, qty("3"));
    assert_eq!(report.net, qty("12"));
    assert_eq!(report.page, 1);
    assert_eq!(report.limit, app.config.report_default_limit);
}

#[tokio::test]
async fn rows_are_newest_first() {
    let app = TestApp::new().await;
    november(&app).await;

    let report = report_service(&app)
        .report("2025-11-01", "2025-11-30", None, None)
        .await
        .unwrap();
    let dates: Vec<_> = report
        .transactions
        .iter()
        .map(|tx| tx.transaction_date)
        .collect();
    assert_eq!(
        dates,
        vec![
            at(2025, 11, 30, 23, 59, 59),
            at(2025, 11, 15, 12, 30, 0),
            at(2025, 11, 1, 9, 0, 0),
        ]
    );
}

#[tokio::test]
async fn last_day_of_the_range_is_included() {
    let app = TestApp::new().await;
    november(&app).await;

    let report = report_service(&app)
        .report("2025-11-30", "2025-11-30", None, None)
        .await
        .unwrap();
    assert_eq!(report.transactions.len(), 1);
    assert_eq!(report.total_in, qty("5"));
    assert!(report.total_out.is_zero());
}

#[tokio::test]
async fn totals_cover_only_the_returned_page() {
    let app = TestApp::new().await;
    november(&app).await;

    let first = report_service(&app)
        .report("2025-11-01", "2025-11-30", Some(1), Some(2))
        .await
        .unwrap();
    assert_eq!(first.transactions.len(), 2);
    assert_eq!(first.total_in, qty("5"));
    assert_eq!(first.total_out, qty("3"));
    assert_eq!(first.net, qty("2"));

    let second = report_service(&app)
        .report("2025-11-01", "2025-11-30", Some(2), Some(2))
        .await
        .unwrap();
    assert_eq!(second.transactions.len(), 1);
    assert_eq!(second.total_in, qty("10"));
    assert_eq!(second.net, qty("10"));
}

#[tokio::test]
async fn out_of_range_paging_is_clamped() {
    let app = TestApp::new().await;
    november(&app).await;

    let report = report_service(&app)
        .report("2025-11-01", "2025-11-30", Some(0), Some(10_000))
        .await
        .unwrap();
    assert_eq!(report.page, 1);
    assert_eq!(report.limit, app.config.report_max_limit);
    assert_eq!(report.transactions.len(), 3);
}

#[tokio::test]
async fn empty_range_reports_zero() {
    let app = TestApp::new().await;
    november(&app).await;

    let report = report_service(&app)
        .report("2024-01-01", "2024-01-31", None, None)
        .await
        .unwrap();
    assert!(report.transactions.is_empty());
    assert!(report.total_in.is_zero());
    assert!(report.total_out.is_zero());
    assert!(report.net.is_zero());
}

#[tokio::test]
async fn explicit_timestamps_are_half_open() {
    let app = TestApp::new().await;
    november(&app).await;

    let report = report_service(&app)
        .report_between(at(2025, 11, 15, 12, 30, 0), at(2025, 11, 30, 23, 59, 59), None, None)
        .await
        .unwrap();
    assert_eq!(report.transactions.len(), 1);
    assert_eq!(report.total_out, qty("3"));
}

#[tokio::test]
async fn invalid_ranges_are_rejected() {
    let app = TestApp::new().await;

    assert_matches!(
        report_service(&app)
            .report("2025-11-30", "2025-11-01", None, None)
            .await,
        Err(ServiceError::InvalidInput(_))
    );
    assert_matches!(
        report_service(&app)
            .report("yesterday", "2025-11-01", None, None)
            .await,
        Err(ServiceError::InvalidInput(_))
    );
}

#[tokio::test]
async fn ledger_movements_show_up_in_todays_report() {
    let app = TestApp::new().await;
    let (product, sub_variant) = app.seed_stocked("TODAY", 6).await;
    app.ledger()
        .remove_stock(&product.to_string(), &sub_variant.to_string(), "2")
        .await
        .unwrap();

    let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
    let report = report_service(&app)
        .report(&today, &today, None, None)
        .await
        .unwrap();
    assert_eq!(report.total_in, qty("6"));
    assert_eq!(report.total_out, qty("2"));
    assert_eq!(report.net, qty("4"));
}

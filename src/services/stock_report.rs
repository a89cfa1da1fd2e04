use crate::{
    config::AppConfig,
    db::DbPool,
    entities::stock_transaction::{self, Entity as StockTransaction, TransactionType},
    errors::ServiceError,
    quantity::Quantity,
    references::DateWindow,
    services::PageWindow,
};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

/// A page of ledger rows with their IN/OUT totals
#[derive(Clone, Debug, Serialize, ToSchema)]
pub struct StockReport {
    pub transactions: Vec<stock_transaction::Model>,
    /// Sum of IN quantities on this page
    #[schema(value_type = String, example = "15")]
    pub total_in: Quantity,
    /// Sum of OUT quantities on this page
    #[schema(value_type = String, example = "3")]
    pub total_out: Quantity,
    /// `total_in - total_out`
    #[schema(value_type = String, example = "12")]
    pub net: Quantity,
    pub page: u64,
    pub limit: u64,
}

/// IN/OUT totals of a set of ledger rows
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Totals {
    pub total_in: Quantity,
    pub total_out: Quantity,
}

impl Totals {
    pub fn net(&self) -> Quantity {
        self.total_in - self.total_out
    }
}

/// Folds ledger rows into IN and OUT totals. Rows with an unknown type are
/// ignored.
pub fn fold_totals(transactions: &[stock_transaction::Model]) -> Totals {
    transactions.iter().fold(Totals::default(), |mut totals, tx| {
        match tx.kind() {
            Some(TransactionType::In) => totals.total_in += tx.quantity,
            Some(TransactionType::Out) => totals.total_out += tx.quantity,
            None => {}
        }
        totals
    })
}

#[derive(Clone)]
pub struct StockReportService {
    db_pool: Arc<DbPool>,
    default_limit: u64,
    max_limit: u64,
}

impl StockReportService {
    pub fn new(db_pool: Arc<DbPool>, default_limit: u64, max_limit: u64) -> Self {
        Self {
            db_pool,
            default_limit,
            max_limit,
        }
    }

    pub fn from_config(db_pool: Arc<DbPool>, config: &AppConfig) -> Self {
        Self::new(db_pool, config.report_default_limit, config.report_max_limit)
    }

    /// Reports the movements dated from `from` through `to`, both
    /// `YYYY-MM-DD` and both days included.
    pub async fn report(
        &self,
        from: &str,
        to: &str,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<StockReport, ServiceError> {
        let window = DateWindow::parse(from, to)?;
        self.report_window(window, page, limit).await
    }

    /// Reports the movements in `[from, to)`.
    pub async fn report_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<StockReport, ServiceError> {
        let window = DateWindow::between(from, to)?;
        self.report_window(window, page, limit).await
    }

    #[instrument(skip(self))]
    pub async fn report_window(
        &self,
        window: DateWindow,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<StockReport, ServiceError> {
        let paging = PageWindow::normalize(page, limit, self.default_limit, self.max_limit);
        let db = self.db_pool.as_ref();

        let transactions = StockTransaction::find()
            .filter(stock_transaction::Column::TransactionDate.gte(window.from))
            .filter(stock_transaction::Column::TransactionDate.lt(window.to))
            .order_by_desc(stock_transaction::Column::TransactionDate)
            .order_by_desc(stock_transaction::Column::Id)
            .limit(paging.limit)
            .offset(paging.offset())
            .all(db)
            .await
            .map_err(ServiceError::from_db)?;

        let totals = fold_totals(&transactions);
        debug!(
            rows = transactions.len(),
            total_in = %totals.total_in,
            total_out = %totals.total_out,
            "Stock report assembled"
        );

        Ok(StockReport {
            transactions,
            total_in: totals.total_in,
            total_out: totals.total_out,
            net: totals.net(),
            page: paging.page,
            limit: paging.limit,
        })
    }
}

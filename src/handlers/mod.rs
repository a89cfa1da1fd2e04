pub mod common;
pub mod products;
pub mod stock;

use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::DbPool,
    services::{
        product_catalog::ProductCatalogService,
        stock_ledger::{LedgerConfig, StockLedger},
        stock_report::StockReportService,
    },
};

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub stock_ledger: Arc<StockLedger>,
    pub stock_report: Arc<StockReportService>,
    pub product_catalog: Arc<ProductCatalogService>,
}

impl AppServices {
    /// Build every service over one shared pool.
    pub fn new(db_pool: Arc<DbPool>, config: &AppConfig) -> Self {
        Self {
            stock_ledger: Arc::new(StockLedger::new(
                db_pool.clone(),
                LedgerConfig::from(config),
            )),
            stock_report: Arc::new(StockReportService::from_config(db_pool.clone(), config)),
            product_catalog: Arc::new(ProductCatalogService::from_config(db_pool, config)),
        }
    }
}

#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use inventory_api::{
    app_router,
    config::AppConfig,
    db::{self, DbConfig, DbPool},
    entities::{product, stock_transaction, sub_variant},
    quantity::Quantity,
    services::{
        product_catalog::{CreateProductInput, OptionValueInput, ProductDetail, SubVariantInput, VariantInput},
        stock_ledger::StockLedger,
    },
    AppState,
};
use sea_orm::{EntityTrait, PaginatorTrait, QueryOrder};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

/// Application state over a throwaway on-disk SQLite database, pooled the
/// way the default config pools it.
pub struct TestApp {
    _dir: TempDir,
    pub db: Arc<DbPool>,
    pub config: AppConfig,
    pub state: AppState,
}

/// Every row the ledger can touch, ordered for comparison.
#[derive(Debug, PartialEq)]
pub struct Snapshot {
    pub products: Vec<product::Model>,
    pub sub_variants: Vec<sub_variant::Model>,
    pub transactions: Vec<stock_transaction::Model>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    pub async fn with_config(tune: impl FnOnce(&mut AppConfig)) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let url = format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("inventory_test.sqlite").display()
        );

        let mut config = AppConfig::new(url, "127.0.0.1".into(), 18_080, "development".into());
        config.db_acquire_timeout_secs = 30;
        tune(&mut config);

        let pool = db::establish_connection_with_config(&DbConfig::from(&config))
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool).await.expect("migrations");

        let db = Arc::new(pool);
        let state = AppState::new(db.clone(), config.clone());
        Self {
            _dir: dir,
            db,
            config,
            state,
        }
    }

    pub fn router(&self) -> Router {
        app_router(self.state.clone())
    }

    pub fn ledger(&self) -> &StockLedger {
        self.state.services.stock_ledger.as_ref()
    }

    /// Creates a product with one `Size` variant and a sub-variant per SKU.
    pub async fn seed_product(&self, code: &str, skus: &[&str]) -> ProductDetail {
        self.state
            .services
            .product_catalog
            .create_product(product_input(code, skus))
            .await
            .expect("seed product")
    }

    /// Product and its first sub-variant, with `stock` already added.
    pub async fn seed_stocked(&self, code: &str, stock: i64) -> (Uuid, Uuid) {
        let detail = self.seed_product(code, &[&format!("{}-1", code)]).await;
        let product_id = detail.product.id;
        let sub_variant_id = detail.sub_variants[0].id;
        if stock > 0 {
            self.ledger()
                .add_stock(
                    &product_id.to_string(),
                    &sub_variant_id.to_string(),
                    &stock.to_string(),
                )
                .await
                .expect("seed stock");
        }
        (product_id, sub_variant_id)
    }

    pub async fn stock_of(&self, sub_variant_id: Uuid) -> Quantity {
        let row = sub_variant::Entity::find_by_id(sub_variant_id)
            .one(self.db.as_ref())
            .await
            .expect("query")
            .expect("sub-variant exists");
        row.stock
    }

    pub async fn total_stock_of(&self, product_id: Uuid) -> Quantity {
        let row = product::Entity::find_by_id(product_id)
            .one(self.db.as_ref())
            .await
            .expect("query")
            .expect("product exists");
        row.total_stock
    }

    pub async fn transaction_count(&self) -> u64 {
        stock_transaction::Entity::find()
            .count(self.db.as_ref())
            .await
            .expect("count")
    }

    pub async fn snapshot(&self) -> Snapshot {
        let db = self.db.as_ref();
        Snapshot {
            products: product::Entity::find()
                .order_by_asc(product::Column::Id)
                .all(db)
                .await
                .expect("products"),
            sub_variants: sub_variant::Entity::find()
                .order_by_asc(sub_variant::Column::Id)
                .all(db)
                .await
                .expect("sub-variants"),
            transactions: stock_transaction::Entity::find()
                .order_by_asc(stock_transaction::Column::Id)
                .all(db)
                .await
                .expect("transactions"),
        }
    }

    /// Sends one request through the full router and decodes the JSON body.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.router().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}

/// Creation input with one `Size` variant and one sub-variant per SKU.
pub fn product_input(code: &str, skus: &[&str]) -> CreateProductInput {
    let options: Vec<String> = (1..=skus.len()).map(|i| format!("O{}", i)).collect();
    let variants = if skus.is_empty() {
        Vec::new()
    } else {
        vec![VariantInput {
            name: "Size".into(),
            options: options.clone(),
        }]
    };
    let sub_variants = skus
        .iter()
        .zip(&options)
        .map(|(sku, option)| SubVariantInput {
            sku: sku.to_string(),
            option_values: vec![OptionValueInput {
                variant_name: "Size".into(),
                value: option.clone(),
            }],
        })
        .collect();

    CreateProductInput {
        product_id: next_product_number(),
        product_code: code.into(),
        product_name: format!("Product {}", code),
        product_image: None,
        created_user: Uuid::new_v4().to_string(),
        is_favourite: false,
        active: true,
        hsn_code: "6109".into(),
        variants,
        sub_variants,
    }
}

fn next_product_number() -> i64 {
    use std::sync::atomic::{AtomicI64, Ordering};
    static NEXT: AtomicI64 = AtomicI64::new(1000);
    NEXT.fetch_add(1, Ordering::Relaxed)
}

pub fn qty(raw: &str) -> Quantity {
    Quantity::parse(raw).expect("valid quantity")
}

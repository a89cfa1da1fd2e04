//! Applies IN/OUT movements to a sub-variant and its product.
//!
//! Every movement is one transaction that row-locks the sub-variant and then
//! the product (always in that order), checks the stock, writes both stock
//! fields, and appends the ledger row. Any error drops the transaction, which
//! rolls it back before the error reaches the caller.

use crate::{
    config::AppConfig,
    db::{self, DbPool},
    entities::{
        product::{self, Entity as Product},
        stock_transaction::{self, TransactionType},
        sub_variant::{self, Entity as SubVariant},
    },
    errors::ServiceError,
    quantity::Quantity,
    references::{ProductRef, StockMovement, SubVariantRef},
};
use chrono::Utc;
use sea_orm::{
    sea_query::{Expr, SimpleExpr},
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, DbBackend, EntityTrait,
    QueryFilter, QuerySelect, Set, TransactionError, TransactionTrait,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

/// Store timeouts applied to each movement
#[derive(Clone, Copy, Debug)]
pub struct LedgerConfig {
    pub lock_timeout: Duration,
    pub statement_timeout: Option<Duration>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
            statement_timeout: None,
        }
    }
}

impl From<&AppConfig> for LedgerConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            lock_timeout: cfg.stock_lock_timeout(),
            statement_timeout: cfg.db_statement_timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Unlocked snapshot of the two stock fields a movement touches
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StockLevel {
    pub stock: Quantity,
    pub total_stock: Quantity,
}

/// Ledger row plus the resulting stock and product total
type Committed = (stock_transaction::Model, Quantity, Quantity);

#[derive(Clone)]
pub struct StockLedger {
    db_pool: Arc<DbPool>,
    config: LedgerConfig,
}

impl StockLedger {
    pub fn new(db_pool: Arc<DbPool>, config: LedgerConfig) -> Self {
        Self { db_pool, config }
    }

    /// Increases stock by `quantity`.
    pub async fn add_stock(
        &self,
        product_id: &str,
        sub_variant_id: &str,
        quantity: &str,
    ) -> Result<stock_transaction::Model, ServiceError> {
        let movement = StockMovement::resolve(product_id, sub_variant_id, quantity)?;
        self.apply_movement(movement, TransactionType::In).await
    }

    /// Decreases stock by `quantity`, failing if that would drive it negative.
    pub async fn remove_stock(
        &self,
        product_id: &str,
        sub_variant_id: &str,
        quantity: &str,
    ) -> Result<stock_transaction::Model, ServiceError> {
        let movement = StockMovement::resolve(product_id, sub_variant_id, quantity)?;
        self.apply_movement(movement, TransactionType::Out).await
    }

    /// Applies one movement atomically and returns the committed ledger row.
    #[instrument(
        skip(self, movement),
        fields(
            product_id = %movement.product,
            sub_variant_id = %movement.sub_variant,
            quantity = %movement.quantity,
        )
    )]
    pub async fn apply_movement(
        &self,
        movement: StockMovement,
        kind: TransactionType,
    ) -> Result<stock_transaction::Model, ServiceError> {
        let quantity = movement.quantity.ensure_positive()?;
        let db = self.db_pool.as_ref();
        let config = self.config;

        let result = db
            .transaction::<_, Committed, ServiceError>(move |txn| {
                Box::pin(async move {
                    db::apply_transaction_timeouts(txn, config.lock_timeout, config.statement_timeout)
                        .await
                        .map_err(ServiceError::from_db)?;
                    claim_sqlite_writer(txn, movement.sub_variant).await?;

                    let sub_variant = lock_sub_variant(txn, movement.sub_variant).await?;
                    if sub_variant.product_id != movement.product.id() {
                        return Err(ServiceError::NotFound(format!(
                            "sub-variant {} does not belong to product {}",
                            movement.sub_variant, movement.product
                        )));
                    }
                    let product = lock_product(txn, movement.product).await?;

                    let stock = sub_variant.stock;
                    let total_stock = product.total_stock;
                    let (new_stock, new_total) = match kind {
                        TransactionType::In => (stock + quantity, total_stock + quantity),
                        TransactionType::Out => {
                            if stock < quantity {
                                warn!(
                                    available = %stock,
                                    requested = %quantity,
                                    "Rejected stock removal: insufficient stock"
                                );
                                return Err(ServiceError::InsufficientStock {
                                    available: stock,
                                    requested: quantity,
                                });
                            }
                            (stock - quantity, total_stock - quantity)
                        }
                    };

                    if new_total.is_negative() {
                        error!(
                            product_id = %movement.product,
                            total_stock = %total_stock,
                            stock = %stock,
                            "Product total stock is out of sync with its sub-variants"
                        );
                        return Err(ServiceError::InternalError(format!(
                            "total stock of product {} would become negative",
                            movement.product
                        )));
                    }

                    let now = Utc::now();

                    let mut sub_variant: sub_variant::ActiveModel = sub_variant.into();
                    sub_variant.stock = Set(new_stock);
                    sub_variant.updated_at = Set(now);
                    sub_variant.update(txn).await.map_err(ServiceError::from_db)?;

                    let mut product: product::ActiveModel = product.into();
                    product.total_stock = Set(new_total);
                    product.updated_date = Set(now);
                    product.update(txn).await.map_err(ServiceError::from_db)?;

                    let record = stock_transaction::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        product_id: Set(movement.product.id()),
                        sub_variant_id: Set(movement.sub_variant.id()),
                        quantity: Set(quantity),
                        transaction_type: Set(kind.as_str().to_string()),
                        transaction_date: Set(now),
                    };
                    let record = record.insert(txn).await.map_err(ServiceError::from_db)?;

                    Ok((record, new_stock, new_total))
                })
            })
            .await
            .map_err(|e| match e {
                TransactionError::Connection(db_err) => ServiceError::from_db(db_err),
                TransactionError::Transaction(service_err) => service_err,
            });

        match result {
            Ok((record, new_stock, new_total)) => {
                info!(
                    transaction_id = %record.id,
                    kind = kind.as_str(),
                    stock = %new_stock,
                    total_stock = %new_total,
                    "Stock movement committed"
                );
                Ok(record)
            }
            Err(err) => {
                if err.is_store_failure() {
                    error!(error = %err, kind = kind.as_str(), "Stock movement failed in the store");
                }
                Err(err)
            }
        }
    }

    /// Reads the current stock of a sub-variant and its product total
    /// without taking locks.
    #[instrument(skip(self))]
    pub async fn stock_level(
        &self,
        product: ProductRef,
        sub_variant: SubVariantRef,
    ) -> Result<StockLevel, ServiceError> {
        let db = self.db_pool.as_ref();

        let row = SubVariant::find_by_id(sub_variant.id())
            .one(db)
            .await
            .map_err(ServiceError::from_db)?
            .filter(|row| row.product_id == product.id())
            .ok_or_else(|| ServiceError::NotFound(format!("sub-variant {}", sub_variant)))?;
        let owner = Product::find_by_id(product.id())
            .one(db)
            .await
            .map_err(ServiceError::from_db)?
            .ok_or_else(|| ServiceError::NotFound(format!("product {}", product)))?;

        Ok(StockLevel {
            stock: row.stock,
            total_stock: owner.total_stock,
        })
    }
}

/// SQLite ignores `FOR UPDATE`, and a transaction that has already read
/// cannot wait for the write lock. Touching the row first makes the write
/// lock the first thing the movement takes, so concurrent movements queue on
/// the busy timeout.
async fn claim_sqlite_writer(
    txn: &DatabaseTransaction,
    sub_variant: SubVariantRef,
) -> Result<(), ServiceError> {
    if txn.get_database_backend() != DbBackend::Sqlite {
        return Ok(());
    }

    SubVariant::update_many()
        .col_expr(
            sub_variant::Column::UpdatedAt,
            SimpleExpr::from(Expr::col(sub_variant::Column::UpdatedAt)),
        )
        .filter(sub_variant::Column::Id.eq(sub_variant.id()))
        .exec(txn)
        .await
        .map_err(ServiceError::from_db)?;
    Ok(())
}

async fn lock_sub_variant(
    txn: &DatabaseTransaction,
    sub_variant: SubVariantRef,
) -> Result<sub_variant::Model, ServiceError> {
    SubVariant::find_by_id(sub_variant.id())
        .lock_exclusive()
        .one(txn)
        .await
        .map_err(ServiceError::from_db)?
        .ok_or_else(|| ServiceError::NotFound(format!("sub-variant {}", sub_variant)))
}

async fn lock_product(
    txn: &DatabaseTransaction,
    product: ProductRef,
) -> Result<product::Model, ServiceError> {
    Product::find_by_id(product.id())
        .lock_exclusive()
        .one(txn)
        .await
        .map_err(ServiceError::from_db)?
        .ok_or_else(|| ServiceError::NotFound(format!("product {}", product)))
}

use crate::quantity::Quantity;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Product entity
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "products")]
#[schema(as = Product)]
pub struct Model {
    /// Primary key
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// External numeric product code
    #[sea_orm(unique)]
    #[serde(rename = "product_id")]
    pub product_number: i64,

    /// Unique textual product code
    #[sea_orm(unique)]
    pub product_code: String,

    pub product_name: String,

    pub product_image: Option<String>,

    /// User that created the product
    pub created_user: Uuid,

    pub is_favourite: bool,

    pub active: bool,

    /// Tax classification code
    pub hsn_code: String,

    /// Sum of the stock of every sub-variant. Only the stock ledger writes it.
    #[sea_orm(column_type = "Text")]
    #[schema(value_type = String, example = "12.50000000")]
    pub total_stock: Quantity,

    pub created_date: DateTime<Utc>,

    pub updated_date: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::variant::Entity")]
    Variants,
    #[sea_orm(has_many = "super::sub_variant::Entity")]
    SubVariants,
    #[sea_orm(has_many = "super::stock_transaction::Entity")]
    StockTransactions,
}

impl Related<super::variant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Variants.def()
    }
}

impl Related<super::sub_variant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubVariants.def()
    }
}

impl Related<super::stock_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StockTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

use crate::quantity::Quantity;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Direction of a stock movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    In,
    Out,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::In => "IN",
            TransactionType::Out => "OUT",
        }
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN" => Ok(TransactionType::In),
            "OUT" => Ok(TransactionType::Out),
            other => Err(format!("unknown transaction type '{}'", other)),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only record of one committed stock movement.
///
/// `quantity` is always the positive magnitude; `transaction_type` carries
/// the direction.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "stock_transactions")]
#[schema(as = StockTransaction)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub product_id: Uuid,
    pub sub_variant_id: Uuid,
    #[sea_orm(column_type = "Text")]
    #[schema(value_type = String, example = "3.00000000")]
    pub quantity: Quantity,
    /// "IN" or "OUT"
    #[schema(example = "IN")]
    pub transaction_type: String,
    pub transaction_date: DateTime<Utc>,
}

impl Model {
    pub fn kind(&self) -> Option<TransactionType> {
        self.transaction_type.parse().ok()
    }

    /// Quantity with the movement direction applied: positive for IN,
    /// negative for OUT.
    pub fn signed_quantity(&self) -> Quantity {
        match self.kind() {
            Some(TransactionType::Out) => -self.quantity,
            _ => self.quantity,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
    #[sea_orm(
        belongs_to = "super::sub_variant::Entity",
        from = "Column::SubVariantId",
        to = "super::sub_variant::Column::Id"
    )]
    SubVariant,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::sub_variant::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SubVariant.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    fn qty(text: &str) -> Quantity {
        Quantity::parse(text).unwrap()
    }

    fn transaction(kind: TransactionType, quantity: Quantity) -> Model {
        Model {
            id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            sub_variant_id: Uuid::new_v4(),
            quantity,
            transaction_type: kind.as_str().to_string(),
            transaction_date: Utc::now(),
        }
    }

    #[test]
    fn transaction_type_round_trips_through_column_text() {
        assert_eq!("IN".parse::<TransactionType>(), Ok(TransactionType::In));
        assert_eq!("OUT".parse::<TransactionType>(), Ok(TransactionType::Out));
        assert!("in".parse::<TransactionType>().is_err());
        assert_eq!(
            serde_json::to_string(&TransactionType::Out).unwrap(),
            "\"OUT\""
        );
    }

    #[test]
    fn signed_quantity_follows_direction() {
        assert_eq!(
            transaction(TransactionType::In, qty("10")).signed_quantity(),
            qty("10")
        );
        assert_eq!(
            transaction(TransactionType::Out, qty("3.5")).signed_quantity(),
            qty("-3.5")
        );
    }
}

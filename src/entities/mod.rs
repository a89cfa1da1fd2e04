pub mod product;
pub mod stock_transaction;
pub mod sub_variant;
pub mod variant;
pub mod variant_option;

pub use stock_transaction::TransactionType;
pub use sub_variant::OptionIds;

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_products_table::Migration),
            Box::new(m20250101_000002_create_variants_table::Migration),
            Box::new(m20250101_000003_create_variant_options_table::Migration),
            Box::new(m20250101_000004_create_sub_variants_table::Migration),
            Box::new(m20250101_000005_create_stock_transactions_table::Migration),
        ]
    }
}

/// Quantity columns hold exact decimal text. Range checks compare the value
/// numerically.
fn as_numeric<T: IntoIden + 'static>(column: T) -> Expr {
    Expr::expr(Func::cast_as(Expr::col(column), Alias::new("NUMERIC")))
}

// Migration implementations

mod m20250101_000001_create_products_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000001_create_products_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Products::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Products::ProductNumber)
                                .big_integer()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Products::ProductCode)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Products::ProductName).string().not_null())
                        .col(ColumnDef::new(Products::ProductImage).string().null())
                        .col(ColumnDef::new(Products::CreatedUser).uuid().not_null())
                        .col(
                            ColumnDef::new(Products::IsFavourite)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(Products::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Products::HsnCode).string().not_null())
                        .col(
                            ColumnDef::new(Products::TotalStock)
                                .text()
                                .not_null()
                                .default("0")
                                .check(super::as_numeric(Products::TotalStock).gte(0)),
                        )
                        .col(
                            ColumnDef::new(Products::CreatedDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Products::UpdatedDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_created_date")
                        .table(Products::Table)
                        .col(Products::CreatedDate)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Products {
        Table,
        Id,
        ProductNumber,
        ProductCode,
        ProductName,
        ProductImage,
        CreatedUser,
        IsFavourite,
        Active,
        HsnCode,
        TotalStock,
        CreatedDate,
        UpdatedDate,
    }
}

mod m20250101_000002_create_variants_table {

    use super::m20250101_000001_create_products_table::Products;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000002_create_variants_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Variants::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Variants::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Variants::ProductId).uuid().not_null())
                        .col(ColumnDef::new(Variants::Name).string().not_null())
                        .col(
                            ColumnDef::new(Variants::Position)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_variants_product_id")
                                .from(Variants::Table, Variants::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_variants_product_name")
                        .table(Variants::Table)
                        .col(Variants::ProductId)
                        .col(Variants::Name)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Variants::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Variants {
        Table,
        Id,
        ProductId,
        Name,
        Position,
    }
}

mod m20250101_000003_create_variant_options_table {

    use super::m20250101_000002_create_variants_table::Variants;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000003_create_variant_options_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(VariantOptions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(VariantOptions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(VariantOptions::VariantId).uuid().not_null())
                        .col(ColumnDef::new(VariantOptions::Value).string().not_null())
                        .col(
                            ColumnDef::new(VariantOptions::Position)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_variant_options_variant_id")
                                .from(VariantOptions::Table, VariantOptions::VariantId)
                                .to(Variants::Table, Variants::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_variant_options_variant_value")
                        .table(VariantOptions::Table)
                        .col(VariantOptions::VariantId)
                        .col(VariantOptions::Value)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(VariantOptions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum VariantOptions {
        Table,
        Id,
        VariantId,
        Value,
        Position,
    }
}

mod m20250101_000004_create_sub_variants_table {

    use super::m20250101_000001_create_products_table::Products;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000004_create_sub_variants_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SubVariants::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(SubVariants::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(SubVariants::ProductId).uuid().not_null())
                        .col(
                            ColumnDef::new(SubVariants::Sku)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(SubVariants::OptionIds).json().not_null())
                        .col(
                            ColumnDef::new(SubVariants::Stock)
                                .text()
                                .not_null()
                                .default("0")
                                .check(super::as_numeric(SubVariants::Stock).gte(0)),
                        )
                        .col(
                            ColumnDef::new(SubVariants::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SubVariants::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_sub_variants_product_id")
                                .from(SubVariants::Table, SubVariants::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_sub_variants_product_id")
                        .table(SubVariants::Table)
                        .col(SubVariants::ProductId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(SubVariants::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum SubVariants {
        Table,
        Id,
        ProductId,
        Sku,
        OptionIds,
        Stock,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000005_create_stock_transactions_table {

    use super::m20250101_000001_create_products_table::Products;
    use super::m20250101_000004_create_sub_variants_table::SubVariants;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000005_create_stock_transactions_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            // Ledger rows outlive product changes, so no cascades here.
            manager
                .create_table(
                    Table::create()
                        .table(StockTransactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(StockTransactions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(StockTransactions::ProductId).uuid().not_null())
                        .col(
                            ColumnDef::new(StockTransactions::SubVariantId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockTransactions::Quantity)
                                .text()
                                .not_null()
                                .check(super::as_numeric(StockTransactions::Quantity).gt(0)),
                        )
                        .col(
                            ColumnDef::new(StockTransactions::TransactionType)
                                .string_len(3)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(StockTransactions::TransactionDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_transactions_product_id")
                                .from(StockTransactions::Table, StockTransactions::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_stock_transactions_sub_variant_id")
                                .from(StockTransactions::Table, StockTransactions::SubVariantId)
                                .to(SubVariants::Table, SubVariants::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            for (name, column) in [
                ("idx_stock_transactions_product_id", StockTransactions::ProductId),
                (
                    "idx_stock_transactions_sub_variant_id",
                    StockTransactions::SubVariantId,
                ),
                (
                    "idx_stock_transactions_transaction_date",
                    StockTransactions::TransactionDate,
                ),
            ] {
                manager
                    .create_index(
                        Index::create()
                            .if_not_exists()
                            .name(name)
                            .table(StockTransactions::Table)
                            .col(column)
                            .to_owned(),
                    )
                    .await?;
            }

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(StockTransactions::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum StockTransactions {
        Table,
        Id,
        ProductId,
        SubVariantId,
        Quantity,
        TransactionType,
        TransactionDate,
    }
}

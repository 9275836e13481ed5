//! Initial schema migration.
//!
//! - `cards`: credit cards with their billing days
//! - `series_plans`: one row per installment plan or recurrence
//! - `transactions`: every stored occurrence, optionally charged on a card
//!   and optionally pointing at its series plan

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Cards {
    Table,
    Id,
    Name,
    LimitMinor,
    ClosingDay,
    DueDay,
    Active,
}

#[derive(Iden)]
enum SeriesPlans {
    Table,
    Id,
    Kind,
    Total,
    AnchorOn,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    OccurredOn,
    Kind,
    Description,
    AmountMinor,
    Category,
    PaymentMethod,
    CardId,
    SeriesId,
    SeriesIndex,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Cards::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Cards::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Cards::Name).string().not_null())
                    .col(ColumnDef::new(Cards::LimitMinor).big_integer())
                    .col(ColumnDef::new(Cards::ClosingDay).small_integer().not_null())
                    .col(ColumnDef::new(Cards::DueDay).small_integer().not_null())
                    .col(
                        ColumnDef::new(Cards::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SeriesPlans::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SeriesPlans::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SeriesPlans::Kind).string().not_null())
                    .col(ColumnDef::new(SeriesPlans::Total).integer().not_null())
                    .col(ColumnDef::new(SeriesPlans::AnchorOn).date().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::OccurredOn).date().not_null())
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(ColumnDef::new(Transactions::Description).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Category).string())
                    .col(
                        ColumnDef::new(Transactions::PaymentMethod)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::CardId).uuid())
                    .col(ColumnDef::new(Transactions::SeriesId).uuid())
                    .col(ColumnDef::new(Transactions::SeriesIndex).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-card_id")
                            .from(Transactions::Table, Transactions::CardId)
                            .to(Cards::Table, Cards::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-transactions-series_id")
                            .from(Transactions::Table, Transactions::SeriesId)
                            .to(SeriesPlans::Table, SeriesPlans::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-card_id-occurred_on")
                    .table(Transactions::Table)
                    .col(Transactions::CardId)
                    .col(Transactions::OccurredOn)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-series_id-series_index")
                    .table(Transactions::Table)
                    .col(Transactions::SeriesId)
                    .col(Transactions::SeriesIndex)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SeriesPlans::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Cards::Table).to_owned())
            .await?;
        Ok(())
    }
}

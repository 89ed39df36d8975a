use sea_orm_migration::prelude::*;

use crate::m20260829_000001_users::Users;
use crate::m20260829_000005_closings::Closings;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum FinancialRecords {
    Table,
    Id,
    Kind,
    UserId,
    TillNumber,
    AmountMinor,
    Description,
    Active,
    CreatedAt,
    ClosingId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FinancialRecords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FinancialRecords::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FinancialRecords::Kind).string().not_null())
                    .col(ColumnDef::new(FinancialRecords::UserId).string().not_null())
                    .col(ColumnDef::new(FinancialRecords::TillNumber).integer())
                    .col(
                        ColumnDef::new(FinancialRecords::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FinancialRecords::Description).string())
                    .col(
                        ColumnDef::new(FinancialRecords::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(FinancialRecords::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(ColumnDef::new(FinancialRecords::ClosingId).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-financial_records-user_id")
                            .from(FinancialRecords::Table, FinancialRecords::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-financial_records-closing_id")
                            .from(FinancialRecords::Table, FinancialRecords::ClosingId)
                            .to(Closings::Table, Closings::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // The aggregation hot path: open records of a till.
        manager
            .create_index(
                Index::create()
                    .name("idx-financial_records-till_number-closing_id")
                    .table(FinancialRecords::Table)
                    .col(FinancialRecords::TillNumber)
                    .col(FinancialRecords::ClosingId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FinancialRecords::Table).to_owned())
            .await
    }
}

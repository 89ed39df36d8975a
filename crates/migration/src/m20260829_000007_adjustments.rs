use sea_orm_migration::prelude::*;

use crate::m20260829_000001_users::Users;
use crate::m20260829_000005_closings::Closings;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum Adjustments {
    Table,
    Id,
    ClosingId,
    UserId,
    AmountMinor,
    PreviousFinalResult,
    NewFinalResult,
    PreviousDifference,
    NewDifference,
    Justification,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Adjustments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Adjustments::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Adjustments::ClosingId).string().not_null())
                    .col(ColumnDef::new(Adjustments::UserId).string().not_null())
                    .col(
                        ColumnDef::new(Adjustments::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Adjustments::PreviousFinalResult)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Adjustments::NewFinalResult)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Adjustments::PreviousDifference)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Adjustments::NewDifference)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Adjustments::Justification)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Adjustments::CreatedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-adjustments-closing_id")
                            .from(Adjustments::Table, Adjustments::ClosingId)
                            .to(Closings::Table, Closings::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-adjustments-user_id")
                            .from(Adjustments::Table, Adjustments::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-adjustments-closing_id-created_at")
                    .table(Adjustments::Table)
                    .col(Adjustments::ClosingId)
                    .col(Adjustments::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Adjustments::Table).to_owned())
            .await
    }
}

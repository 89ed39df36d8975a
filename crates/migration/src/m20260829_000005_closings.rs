use sea_orm_migration::prelude::*;

use crate::m20260829_000001_users::Users;
use crate::m20260829_000003_shift_assignments::ShiftAssignments;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum Closings {
    Table,
    Id,
    UserId,
    TillNumber,
    ShiftAssignmentId,
    InitialCash,
    CountedCash,
    CashSales,
    CreditSales,
    PosSales,
    TransferBancolombia,
    TransferNequi,
    TransferDaviplata,
    HouseAdditional,
    AgentAdditional,
    CreditPayments,
    BalanceSales,
    ProductPayments,
    Expenses,
    AgentLoans,
    TotalSpv,
    EfectivoTotal,
    FaltanteSobrante,
    Notes,
    Active,
    ClosedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let money = |col: Closings| {
            ColumnDef::new(col)
                .big_integer()
                .not_null()
                .default(0)
                .to_owned()
        };

        manager
            .create_table(
                Table::create()
                    .table(Closings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Closings::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Closings::UserId).string().not_null())
                    .col(ColumnDef::new(Closings::TillNumber).integer().not_null())
                    .col(ColumnDef::new(Closings::ShiftAssignmentId).string())
                    .col(money(Closings::InitialCash))
                    .col(money(Closings::CountedCash))
                    .col(money(Closings::CashSales))
                    .col(money(Closings::CreditSales))
                    .col(money(Closings::PosSales))
                    .col(money(Closings::TransferBancolombia))
                    .col(money(Closings::TransferNequi))
                    .col(money(Closings::TransferDaviplata))
                    .col(money(Closings::HouseAdditional))
                    .col(money(Closings::AgentAdditional))
                    .col(money(Closings::CreditPayments))
                    .col(money(Closings::BalanceSales))
                    .col(money(Closings::ProductPayments))
                    .col(money(Closings::Expenses))
                    .col(money(Closings::AgentLoans))
                    .col(money(Closings::TotalSpv))
                    .col(money(Closings::EfectivoTotal))
                    .col(money(Closings::FaltanteSobrante))
                    .col(ColumnDef::new(Closings::Notes).string())
                    .col(
                        ColumnDef::new(Closings::Active)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Closings::ClosedAt).timestamp().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-closings-user_id")
                            .from(Closings::Table, Closings::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-closings-shift_assignment_id")
                            .from(Closings::Table, Closings::ShiftAssignmentId)
                            .to(ShiftAssignments::Table, ShiftAssignments::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-closings-till_number-closed_at")
                    .table(Closings::Table)
                    .col(Closings::TillNumber)
                    .col(Closings::ClosedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Closings::Table).to_owned())
            .await
    }
}

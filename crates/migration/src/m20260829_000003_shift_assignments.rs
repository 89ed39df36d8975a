use sea_orm_migration::prelude::*;

use crate::m20260829_000001_users::Users;
use crate::m20260829_000002_shift_definitions::ShiftDefinitions;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum ShiftAssignments {
    Table,
    Id,
    UserId,
    ShiftDefinitionId,
    Day,
    TillNumber,
    Operation,
    StartedAt,
    EndedAt,
    Active,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ShiftAssignments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShiftAssignments::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ShiftAssignments::UserId).string().not_null())
                    .col(
                        ColumnDef::new(ShiftAssignments::ShiftDefinitionId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ShiftAssignments::Day).date().not_null())
                    .col(ColumnDef::new(ShiftAssignments::TillNumber).integer())
                    .col(ColumnDef::new(ShiftAssignments::Operation).string())
                    .col(ColumnDef::new(ShiftAssignments::StartedAt).timestamp())
                    .col(ColumnDef::new(ShiftAssignments::EndedAt).timestamp())
                    .col(
                        ColumnDef::new(ShiftAssignments::Active)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-shift_assignments-user_id")
                            .from(ShiftAssignments::Table, ShiftAssignments::UserId)
                            .to(Users::Table, Users::Username),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-shift_assignments-shift_definition_id")
                            .from(ShiftAssignments::Table, ShiftAssignments::ShiftDefinitionId)
                            .to(ShiftDefinitions::Table, ShiftDefinitions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-shift_assignments-user_id-active")
                    .table(ShiftAssignments::Table)
                    .col(ShiftAssignments::UserId)
                    .col(ShiftAssignments::Active)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ShiftAssignments::Table).to_owned())
            .await
    }
}

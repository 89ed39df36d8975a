use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum ShiftDefinitions {
    Table,
    Id,
    Name,
    Description,
    ScheduledStart,
    ScheduledEnd,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ShiftDefinitions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShiftDefinitions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ShiftDefinitions::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ShiftDefinitions::Description).string())
                    .col(
                        ColumnDef::new(ShiftDefinitions::ScheduledStart)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShiftDefinitions::ScheduledEnd)
                            .string()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ShiftDefinitions::Table).to_owned())
            .await
    }
}

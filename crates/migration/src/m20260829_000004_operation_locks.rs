use sea_orm::{ConnectionTrait, DbErr};
use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum OperationLocks {
    Table,
    Operation,
    HolderUserId,
    HolderAssignmentId,
    AcquiredAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OperationLocks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OperationLocks::Operation)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OperationLocks::HolderUserId).string())
                    .col(ColumnDef::new(OperationLocks::HolderAssignmentId).string())
                    .col(ColumnDef::new(OperationLocks::AcquiredAt).timestamp())
                    .to_owned(),
            )
            .await?;

        // One free slot per operation type; acquire is a conditional UPDATE
        // on these rows.
        let db = manager.get_connection();
        let backend = db.get_database_backend();
        for operation in ["agent", "super"] {
            let stmt = Query::insert()
                .into_table(OperationLocks::Table)
                .columns([OperationLocks::Operation])
                .values_panic([operation.into()])
                .to_owned();
            db.execute(backend.build(&stmt)).await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OperationLocks::Table).to_owned())
            .await
    }
}

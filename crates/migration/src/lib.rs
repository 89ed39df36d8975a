pub use sea_orm_migration::prelude::*;

mod m20260829_000001_users;
mod m20260829_000002_shift_definitions;
mod m20260829_000003_shift_assignments;
mod m20260829_000004_operation_locks;
mod m20260829_000005_closings;
mod m20260829_000006_financial_records;
mod m20260829_000007_adjustments;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260829_000001_users::Migration),
            Box::new(m20260829_000002_shift_definitions::Migration),
            Box::new(m20260829_000003_shift_assignments::Migration),
            Box::new(m20260829_000004_operation_locks::Migration),
            Box::new(m20260829_000005_closings::Migration),
            Box::new(m20260829_000006_financial_records::Migration),
            Box::new(m20260829_000007_adjustments::Migration),
        ]
    }
}

//! Database-backed permission checker handed to the engine.

use async_trait::async_trait;
use engine::PermissionChecker;
use sea_orm::{DatabaseConnection, DbErr, entity::prelude::*};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "user_permissions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub code: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Looks permission codes up in the `user_permissions` table.
#[derive(Clone, Debug)]
pub struct DbPermissions {
    db: DatabaseConnection,
}

impl DbPermissions {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl PermissionChecker for DbPermissions {
    async fn has_permission(&self, user_id: &str, code: &str) -> Result<bool, DbErr> {
        let row = Entity::find_by_id((user_id.to_string(), code.to_string()))
            .one(&self.db)
            .await?;
        Ok(row.is_some())
    }
}

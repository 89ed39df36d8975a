use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{EngineError, PermissionChecker, ResultEngine, StaticPermissions};

mod adjustments;
mod closings;
mod locks;
mod records;
mod shifts;

pub use adjustments::MIN_JUSTIFICATION_LEN;

/// Run a block inside a DB transaction, committing on success and rolling
/// back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

pub struct Engine {
    database: DatabaseConnection,
    permissions: Arc<dyn PermissionChecker>,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("database", &self.database)
            .finish_non_exhaustive()
    }
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub(crate) fn database(&self) -> &DatabaseConnection {
        &self.database
    }

    pub(super) async fn require_permission(
        &self,
        user_id: &str,
        code: &str,
    ) -> ResultEngine<()> {
        if self.permissions.has_permission(user_id, code).await? {
            return Ok(());
        }
        Err(EngineError::Forbidden(format!(
            "\"{user_id}\" lacks permission \"{code}\""
        )))
    }
}

/// The builder for `Engine`
pub struct EngineBuilder {
    database: DatabaseConnection,
    permissions: Arc<dyn PermissionChecker>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            permissions: Arc::new(StaticPermissions::allow_all()),
        }
    }
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Pass the permission checker gating mutating operations. Defaults to
    /// an allow-all checker for embedded/test use.
    pub fn permissions(mut self, checker: Arc<dyn PermissionChecker>) -> EngineBuilder {
        self.permissions = checker;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            permissions: self.permissions,
        })
    }
}

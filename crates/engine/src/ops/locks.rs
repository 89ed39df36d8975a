//! Operation-lock registry.
//!
//! Two slots exist system-wide, one per [`OperationKind`], stored as seeded
//! rows in `operation_locks`. Acquire is a single conditional UPDATE on the
//! free row; zero affected rows means somebody else holds it.

use chrono::Utc;
use sea_orm::{DatabaseTransaction, QueryFilter, prelude::*, sea_query::Expr};
use uuid::Uuid;

use crate::{Availability, EngineError, LockState, OperationKind, ResultEngine, operation_locks};

use super::Engine;

impl Engine {
    /// Snapshot of both operation slots. Side-effect free.
    pub async fn operations_in_use(&self) -> ResultEngine<Availability> {
        let rows = operation_locks::Entity::find().all(self.database()).await?;
        let mut agent = None;
        let mut super_ = None;
        for row in &rows {
            let state = LockState::try_from(row)?;
            match OperationKind::try_from(row.operation.as_str())? {
                OperationKind::Agent => agent = Some(state),
                OperationKind::Super => super_ = Some(state),
            }
        }
        match (agent, super_) {
            (Some(agent), Some(super_)) => Ok(Availability { agent, super_ }),
            _ => Err(EngineError::InvalidState(
                "operation lock rows are missing; migrations not applied?".to_string(),
            )),
        }
    }

    /// Atomically claim an operation slot for an assignment.
    ///
    /// The availability check and the write are one statement; two
    /// concurrent activations can never both pass.
    pub(super) async fn try_acquire(
        &self,
        db: &DatabaseTransaction,
        operation: OperationKind,
        assignment_id: Uuid,
        user_id: &str,
    ) -> ResultEngine<()> {
        let claimed = operation_locks::Entity::update_many()
            .col_expr(
                operation_locks::Column::HolderUserId,
                Expr::value(user_id.to_string()),
            )
            .col_expr(
                operation_locks::Column::HolderAssignmentId,
                Expr::value(assignment_id.to_string()),
            )
            .col_expr(operation_locks::Column::AcquiredAt, Expr::value(Utc::now()))
            .filter(operation_locks::Column::Operation.eq(operation.as_str()))
            .filter(operation_locks::Column::HolderUserId.is_null())
            .exec(db)
            .await?;

        if claimed.rows_affected > 0 {
            return Ok(());
        }

        let row = operation_locks::Entity::find_by_id(operation.as_str().to_string())
            .one(db)
            .await?
            .ok_or_else(|| {
                EngineError::InvalidState(
                    "operation lock rows are missing; migrations not applied?".to_string(),
                )
            })?;
        let holder = row
            .holder_user_id
            .unwrap_or_else(|| "unknown".to_string());
        Err(EngineError::OperationInUse { operation, holder })
    }

    /// Free any slot held by this assignment. No-op when it holds none.
    pub(super) async fn release_lock(
        &self,
        db: &DatabaseTransaction,
        assignment_id: Uuid,
    ) -> ResultEngine<()> {
        operation_locks::Entity::update_many()
            .col_expr(
                operation_locks::Column::HolderUserId,
                Expr::value(None::<String>),
            )
            .col_expr(
                operation_locks::Column::HolderAssignmentId,
                Expr::value(None::<String>),
            )
            .col_expr(
                operation_locks::Column::AcquiredAt,
                Expr::value(None::<DateTimeUtc>),
            )
            .filter(operation_locks::Column::HolderAssignmentId.eq(assignment_id.to_string()))
            .exec(db)
            .await?;
        Ok(())
    }
}

//! Shift lifecycle: Unassigned → Active → Finished, plus administrative
//! reset.

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    EngineError, OperationKind, RecordKind, ResultEngine, ShiftAssignment, ShiftDefinition,
    ShiftState, codes, financial_records, shift_assignments, shift_definitions,
    util::ensure_valid_till,
};

use super::{Engine, with_tx};

impl Engine {
    /// Create an Unassigned shift assignment for a user and day.
    pub async fn create_assignment(
        &self,
        user_id: &str,
        shift_definition_id: Uuid,
        day: NaiveDate,
    ) -> ResultEngine<Uuid> {
        with_tx!(self, |db_tx| {
            shift_definitions::Entity::find_by_id(shift_definition_id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| {
                    EngineError::KeyNotFound("shift definition not exists".to_string())
                })?;

            let id = Uuid::new_v4();
            shift_assignments::ActiveModel {
                id: ActiveValue::Set(id.to_string()),
                user_id: ActiveValue::Set(user_id.to_string()),
                shift_definition_id: ActiveValue::Set(shift_definition_id.to_string()),
                day: ActiveValue::Set(day),
                till_number: ActiveValue::Set(None),
                operation: ActiveValue::Set(None),
                started_at: ActiveValue::Set(None),
                ended_at: ActiveValue::Set(None),
                active: ActiveValue::Set(false),
            }
            .insert(&db_tx)
            .await?;
            Ok(id)
        })
    }

    /// Start a shift: bind it to a till and claim its operation slot.
    ///
    /// Fails before touching the lock when the caller already runs another
    /// active shift; fails with `OperationInUse` when the slot is held.
    /// Nothing is written on any failure path.
    pub async fn activate_shift(
        &self,
        assignment_id: Uuid,
        till_number: i32,
        operation: OperationKind,
        caller: &str,
    ) -> ResultEngine<ShiftAssignment> {
        self.require_permission(caller, codes::SHIFT_ACTIVATE).await?;
        ensure_valid_till(till_number)?;

        with_tx!(self, |db_tx| {
            let model = self.require_assignment(&db_tx, assignment_id, Some(caller)).await?;
            match ShiftState::try_from(&model)? {
                ShiftState::Unassigned => {}
                ShiftState::Active { .. } => {
                    return Err(EngineError::InvalidState(
                        "shift already started".to_string(),
                    ));
                }
                ShiftState::Finished { .. } => {
                    return Err(EngineError::InvalidState(
                        "shift already finished".to_string(),
                    ));
                }
            }

            // One active shift per user, checked before the system-wide slot.
            let already_active = shift_assignments::Entity::find()
                .filter(shift_assignments::Column::UserId.eq(caller))
                .filter(shift_assignments::Column::Active.eq(true))
                .one(&db_tx)
                .await?;
            if already_active.is_some() {
                return Err(EngineError::AlreadyActive(caller.to_string()));
            }

            self.try_acquire(&db_tx, operation, assignment_id, caller)
                .await?;

            let updated = shift_assignments::ActiveModel {
                id: ActiveValue::Set(assignment_id.to_string()),
                till_number: ActiveValue::Set(Some(till_number)),
                operation: ActiveValue::Set(Some(operation.as_str().to_string())),
                started_at: ActiveValue::Set(Some(Utc::now())),
                active: ActiveValue::Set(true),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            ShiftAssignment::try_from(updated)
        })
    }

    /// Finish an active shift: stamp the end time, free the operation slot,
    /// and soft-close the user's open bill counts so stale counts do not
    /// leak into the next shift.
    pub async fn finalize_shift(
        &self,
        assignment_id: Uuid,
        caller: &str,
    ) -> ResultEngine<ShiftAssignment> {
        self.require_permission(caller, codes::SHIFT_FINALIZE).await?;

        with_tx!(self, |db_tx| {
            let model = self.require_assignment(&db_tx, assignment_id, Some(caller)).await?;
            match ShiftState::try_from(&model)? {
                ShiftState::Active { .. } => {}
                ShiftState::Unassigned => {
                    return Err(EngineError::InvalidState(
                        "shift was never started".to_string(),
                    ));
                }
                ShiftState::Finished { .. } => {
                    return Err(EngineError::InvalidState(
                        "shift already finished".to_string(),
                    ));
                }
            }

            let updated = shift_assignments::ActiveModel {
                id: ActiveValue::Set(assignment_id.to_string()),
                ended_at: ActiveValue::Set(Some(Utc::now())),
                active: ActiveValue::Set(false),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            self.release_lock(&db_tx, assignment_id).await?;

            financial_records::Entity::update_many()
                .col_expr(financial_records::Column::Active, Expr::value(false))
                .filter(financial_records::Column::UserId.eq(model.user_id.as_str()))
                .filter(
                    financial_records::Column::Kind.eq(RecordKind::BillCount.as_str()),
                )
                .filter(financial_records::Column::ClosingId.is_null())
                .filter(financial_records::Column::Active.eq(true))
                .exec(&db_tx)
                .await?;

            ShiftAssignment::try_from(updated)
        })
    }

    /// Administrative reset: clear the timing fields and free the slot,
    /// whatever the prior state. Destroys the shift's timing history.
    pub async fn reset_shift(
        &self,
        assignment_id: Uuid,
        caller: &str,
    ) -> ResultEngine<ShiftAssignment> {
        self.require_permission(caller, codes::SHIFT_RESET).await?;

        with_tx!(self, |db_tx| {
            self.require_assignment(&db_tx, assignment_id, None).await?;

            let updated = shift_assignments::ActiveModel {
                id: ActiveValue::Set(assignment_id.to_string()),
                started_at: ActiveValue::Set(None),
                ended_at: ActiveValue::Set(None),
                till_number: ActiveValue::Set(None),
                operation: ActiveValue::Set(None),
                active: ActiveValue::Set(false),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            self.release_lock(&db_tx, assignment_id).await?;

            ShiftAssignment::try_from(updated)
        })
    }

    /// Current view of one assignment.
    pub async fn shift_assignment(
        &self,
        assignment_id: Uuid,
        caller: &str,
    ) -> ResultEngine<ShiftAssignment> {
        with_tx!(self, |db_tx| {
            let model = self.require_assignment(&db_tx, assignment_id, Some(caller)).await?;
            ShiftAssignment::try_from(model)
        })
    }

    /// All assignments of a user, newest day first.
    pub async fn list_assignments(&self, user_id: &str) -> ResultEngine<Vec<ShiftAssignment>> {
        let models = shift_assignments::Entity::find()
            .filter(shift_assignments::Column::UserId.eq(user_id))
            .order_by_desc(shift_assignments::Column::Day)
            .all(self.database())
            .await?;
        models.into_iter().map(ShiftAssignment::try_from).collect()
    }

    /// Create a shift definition (admin surface).
    pub async fn create_definition(
        &self,
        name: &str,
        description: Option<&str>,
        scheduled_start: &str,
        scheduled_end: &str,
    ) -> ResultEngine<ShiftDefinition> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::Validation(
                "shift definition name must not be empty".to_string(),
            ));
        }
        with_tx!(self, |db_tx| {
            let duplicate = shift_definitions::Entity::find()
                .filter(shift_definitions::Column::Name.eq(name))
                .one(&db_tx)
                .await?;
            if duplicate.is_some() {
                return Err(EngineError::Validation(format!(
                    "shift definition \"{name}\" already exists"
                )));
            }
            let definition = ShiftDefinition {
                id: Uuid::new_v4(),
                name: name.to_string(),
                description: crate::util::normalize_optional_text(description),
                scheduled_start: scheduled_start.to_string(),
                scheduled_end: scheduled_end.to_string(),
            };
            shift_definitions::ActiveModel::from(&definition)
                .insert(&db_tx)
                .await?;
            Ok(definition)
        })
    }

    pub async fn list_definitions(&self) -> ResultEngine<Vec<ShiftDefinition>> {
        let models = shift_definitions::Entity::find()
            .order_by_asc(shift_definitions::Column::Name)
            .all(self.database())
            .await?;
        models.into_iter().map(ShiftDefinition::try_from).collect()
    }

    /// Load an assignment, optionally enforcing that it belongs to the
    /// caller. Out-of-scope rows surface as not-found.
    async fn require_assignment(
        &self,
        db: &DatabaseTransaction,
        assignment_id: Uuid,
        owner: Option<&str>,
    ) -> ResultEngine<shift_assignments::Model> {
        let model = shift_assignments::Entity::find_by_id(assignment_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| {
                EngineError::KeyNotFound("shift assignment not exists".to_string())
            })?;
        if let Some(owner) = owner
            && model.user_id != owner
        {
            return Err(EngineError::KeyNotFound(
                "shift assignment not exists".to_string(),
            ));
        }
        Ok(model)
    }
}

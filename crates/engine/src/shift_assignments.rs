//! Shift assignments: one user's occurrence of a shift on a given day.
//!
//! The row carries two nullable timestamps plus an `active` flag; the engine
//! only ever reads them through [`ShiftState`], which rejects combinations
//! the lifecycle cannot produce.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

/// System-wide operation type a shift can be bound to.
///
/// At most one active shift may hold each kind at any instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Agent,
    Super,
}

impl OperationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Agent => "agent",
            Self::Super => "super",
        }
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for OperationKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "agent" => Ok(Self::Agent),
            "super" => Ok(Self::Super),
            other => Err(EngineError::Validation(format!(
                "invalid operation kind: {other}"
            ))),
        }
    }
}

/// Lifecycle of a shift assignment, derived from its timestamps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum ShiftState {
    Unassigned,
    Active { since: DateTime<Utc> },
    Finished { since: DateTime<Utc>, until: DateTime<Utc> },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShiftAssignment {
    pub id: Uuid,
    pub user_id: String,
    pub shift_definition_id: Uuid,
    pub day: NaiveDate,
    pub till_number: Option<i32>,
    pub operation: Option<OperationKind>,
    pub state: ShiftState,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "shift_assignments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub shift_definition_id: String,
    pub day: Date,
    pub till_number: Option<i32>,
    pub operation: Option<String>,
    pub started_at: Option<DateTimeUtc>,
    pub ended_at: Option<DateTimeUtc>,
    pub active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::shift_definitions::Entity",
        from = "Column::ShiftDefinitionId",
        to = "super::shift_definitions::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    ShiftDefinitions,
}

impl Related<super::shift_definitions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShiftDefinitions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&Model> for ShiftState {
    type Error = EngineError;

    fn try_from(model: &Model) -> Result<Self, Self::Error> {
        match (model.started_at, model.ended_at, model.active) {
            (None, None, false) => Ok(Self::Unassigned),
            (Some(since), None, true) => Ok(Self::Active { since }),
            (Some(since), Some(until), false) => Ok(Self::Finished { since, until }),
            _ => Err(EngineError::InvalidState(format!(
                "shift assignment \"{}\" has inconsistent lifecycle fields",
                model.id
            ))),
        }
    }
}

impl TryFrom<Model> for ShiftAssignment {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let state = ShiftState::try_from(&model)?;
        let operation = model
            .operation
            .as_deref()
            .map(OperationKind::try_from)
            .transpose()?;
        Ok(Self {
            id: parse_uuid(&model.id, "shift assignment")?,
            user_id: model.user_id,
            shift_definition_id: parse_uuid(&model.shift_definition_id, "shift definition")?,
            day: model.day,
            till_number: model.till_number,
            operation,
            state,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_model() -> Model {
        Model {
            id: Uuid::new_v4().to_string(),
            user_id: "alice".to_string(),
            shift_definition_id: Uuid::new_v4().to_string(),
            day: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            till_number: None,
            operation: None,
            started_at: None,
            ended_at: None,
            active: false,
        }
    }

    #[test]
    fn fresh_assignment_is_unassigned() {
        assert_eq!(
            ShiftState::try_from(&base_model()).unwrap(),
            ShiftState::Unassigned
        );
    }

    #[test]
    fn active_with_end_time_is_corrupt() {
        let now = Utc::now();
        let model = Model {
            started_at: Some(now),
            ended_at: Some(now),
            active: true,
            ..base_model()
        };
        assert!(matches!(
            ShiftState::try_from(&model),
            Err(EngineError::InvalidState(_))
        ));
    }

    #[test]
    fn end_without_start_is_corrupt() {
        let model = Model {
            ended_at: Some(Utc::now()),
            ..base_model()
        };
        assert!(matches!(
            ShiftState::try_from(&model),
            Err(EngineError::InvalidState(_))
        ));
    }
}

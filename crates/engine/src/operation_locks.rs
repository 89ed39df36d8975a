//! Operation locks: one row per operation type, seeded by migration.
//!
//! "In use" is a held lock row, not a scan of active assignments. Acquiring
//! is a single conditional UPDATE, so check and set cannot race.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

/// State of one operation-type slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum LockState {
    Free,
    Held {
        user_id: String,
        assignment_id: Uuid,
        since: DateTime<Utc>,
    },
}

impl LockState {
    pub fn holder(&self) -> Option<&str> {
        match self {
            Self::Free => None,
            Self::Held { user_id, .. } => Some(user_id),
        }
    }
}

/// Snapshot of both operation slots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub agent: LockState,
    pub super_: LockState,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "operation_locks")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub operation: String,
    pub holder_user_id: Option<String>,
    pub holder_assignment_id: Option<String>,
    pub acquired_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<&Model> for LockState {
    type Error = EngineError;

    fn try_from(model: &Model) -> Result<Self, Self::Error> {
        match (
            &model.holder_user_id,
            &model.holder_assignment_id,
            model.acquired_at,
        ) {
            (None, None, None) => Ok(Self::Free),
            (Some(user_id), Some(assignment_id), Some(since)) => Ok(Self::Held {
                user_id: user_id.clone(),
                assignment_id: parse_uuid(assignment_id, "shift assignment")?,
                since,
            }),
            _ => Err(EngineError::InvalidState(format!(
                "operation lock \"{}\" has inconsistent holder fields",
                model.operation
            ))),
        }
    }
}

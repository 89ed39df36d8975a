//! Shift definitions: named recurring shift templates (admin managed).

use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ShiftDefinition {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// Scheduled bounds as "HH:MM" wall-clock strings.
    pub scheduled_start: String,
    pub scheduled_end: String,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "shift_definitions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub scheduled_start: String,
    pub scheduled_end: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::shift_assignments::Entity")]
    ShiftAssignments,
}

impl Related<super::shift_assignments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShiftAssignments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for ShiftDefinition {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "shift definition")?,
            name: model.name,
            description: model.description,
            scheduled_start: model.scheduled_start,
            scheduled_end: model.scheduled_end,
        })
    }
}

impl From<&ShiftDefinition> for ActiveModel {
    fn from(definition: &ShiftDefinition) -> Self {
        Self {
            id: ActiveValue::Set(definition.id.to_string()),
            name: ActiveValue::Set(definition.name.clone()),
            description: ActiveValue::Set(definition.description.clone()),
            scheduled_start: ActiveValue::Set(definition.scheduled_start.clone()),
            scheduled_end: ActiveValue::Set(definition.scheduled_end.clone()),
        }
    }
}

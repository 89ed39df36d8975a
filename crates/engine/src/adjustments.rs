//! Post-closing adjustments: append-only before/after snapshots.
//!
//! Each row is self-contained; it never references another adjustment, so
//! the history stays correct no matter how many corrections pile up.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub id: Uuid,
    pub closing_id: Uuid,
    pub user_id: String,
    pub amount_minor: i64,
    pub previous_final_result: i64,
    pub new_final_result: i64,
    pub previous_difference: i64,
    pub new_difference: i64,
    pub justification: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "adjustments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub closing_id: String,
    pub user_id: String,
    pub amount_minor: i64,
    pub previous_final_result: i64,
    pub new_final_result: i64,
    pub previous_difference: i64,
    pub new_difference: i64,
    pub justification: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::closings::Entity",
        from = "Column::ClosingId",
        to = "super::closings::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Closings,
}

impl Related<super::closings::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Closings.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Adjustment {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "adjustment")?,
            closing_id: parse_uuid(&model.closing_id, "closing")?,
            user_id: model.user_id,
            amount_minor: model.amount_minor,
            previous_final_result: model.previous_final_result,
            new_final_result: model.new_final_result,
            previous_difference: model.previous_difference,
            new_difference: model.new_difference,
            justification: model.justification,
            created_at: model.created_at,
        })
    }
}

impl From<&Adjustment> for ActiveModel {
    fn from(adjustment: &Adjustment) -> Self {
        Self {
            id: ActiveValue::Set(adjustment.id.to_string()),
            closing_id: ActiveValue::Set(adjustment.closing_id.to_string()),
            user_id: ActiveValue::Set(adjustment.user_id.clone()),
            amount_minor: ActiveValue::Set(adjustment.amount_minor),
            previous_final_result: ActiveValue::Set(adjustment.previous_final_result),
            new_final_result: ActiveValue::Set(adjustment.new_final_result),
            previous_difference: ActiveValue::Set(adjustment.previous_difference),
            new_difference: ActiveValue::Set(adjustment.new_difference),
            justification: ActiveValue::Set(adjustment.justification.clone()),
            created_at: ActiveValue::Set(adjustment.created_at),
        }
    }
}

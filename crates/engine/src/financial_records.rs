//! Financial records: the raw inputs a closing aggregates.
//!
//! Five kinds share one shape. A record stays `Open` until a closing
//! consumes it; consumption stamps `closing_id` exactly once and every
//! aggregation filters on `closing_id IS NULL`, so a consumed record can
//! never be pulled into a second closing.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Cash loaned out to an agent during the shift.
    Loan,
    Expense,
    /// Snapshot of counted bills in the till; never summed into a closing.
    BillCount,
    /// Outbound balance/product purchase flow.
    BalanceFlow,
    /// Sale of balance (saldo) to a customer.
    BalanceSale,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loan => "loan",
            Self::Expense => "expense",
            Self::BillCount => "bill_count",
            Self::BalanceFlow => "balance_flow",
            Self::BalanceSale => "balance_sale",
        }
    }
}

impl TryFrom<&str> for RecordKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "loan" => Ok(Self::Loan),
            "expense" => Ok(Self::Expense),
            "bill_count" => Ok(Self::BillCount),
            "balance_flow" => Ok(Self::BalanceFlow),
            "balance_sale" => Ok(Self::BalanceSale),
            other => Err(EngineError::Validation(format!(
                "invalid record kind: {other}"
            ))),
        }
    }
}

/// Consumption state of a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum RecordState {
    Open,
    Consumed { closing_id: Uuid },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub id: Uuid,
    pub kind: RecordKind,
    pub user_id: String,
    pub till_number: Option<i32>,
    pub amount_minor: i64,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub state: RecordState,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "financial_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub kind: String,
    pub user_id: String,
    pub till_number: Option<i32>,
    pub amount_minor: i64,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: DateTimeUtc,
    pub closing_id: Option<String>,
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

impl TryFrom<Model> for FinancialRecord {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let state = match &model.closing_id {
            None => RecordState::Open,
            Some(closing_id) => RecordState::Consumed {
                closing_id: parse_uuid(closing_id, "closing")?,
            },
        };
        Ok(Self {
            id: parse_uuid(&model.id, "financial record")?,
            kind: RecordKind::try_from(model.kind.as_str())?,
            user_id: model.user_id,
            till_number: model.till_number,
            amount_minor: model.amount_minor,
            description: model.description,
            active: model.active,
            created_at: model.created_at,
            state,
        })
    }
}

pub(crate) fn new_model(
    kind: RecordKind,
    user_id: &str,
    till_number: Option<i32>,
    amount_minor: i64,
    description: Option<String>,
) -> ActiveModel {
    ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4().to_string()),
        kind: ActiveValue::Set(kind.as_str().to_string()),
        user_id: ActiveValue::Set(user_id.to_string()),
        till_number: ActiveValue::Set(till_number),
        amount_minor: ActiveValue::Set(amount_minor),
        description: ActiveValue::Set(description),
        active: ActiveValue::Set(true),
        created_at: ActiveValue::Set(Utc::now()),
        closing_id: ActiveValue::Set(None),
    }
}

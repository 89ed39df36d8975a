//! Closings: the end-of-shift reconciliation record.
//!
//! A closing mixes operator-typed inputs (sales by payment method, transfers
//! by bank, cash counts) with aggregates pulled from the open financial
//! records of its till. Three derived figures come out of
//! [`compute_derived`]; `efectivo_total` doubles as the closing's final
//! result and is the only field adjustments mutate afterwards.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, util::parse_uuid};

/// Operator-supplied closing inputs, all in minor units.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosingInputs {
    pub till_number: i32,
    pub shift_assignment_id: Option<Uuid>,
    pub initial_cash: i64,
    pub counted_cash: i64,
    pub cash_sales: i64,
    pub credit_sales: i64,
    pub pos_sales: i64,
    pub transfer_bancolombia: i64,
    pub transfer_nequi: i64,
    pub transfer_daviplata: i64,
    pub house_additional: i64,
    pub agent_additional: i64,
    pub credit_payments: i64,
    pub notes: Option<String>,
}

/// Per-kind sums over the open records of the closing's till, captured once
/// at creation time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordAggregates {
    pub balance_sales: i64,
    pub product_payments: i64,
    pub expenses: i64,
    pub agent_loans: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClosingDerived {
    pub total_spv: i64,
    pub efectivo_total: i64,
    pub faltante_sobrante: i64,
}

/// Compute the three derived closing figures.
///
/// `efectivo_total` is the cash the till should contain; `faltante_sobrante`
/// is counted minus expected (negative = missing cash).
pub fn compute_derived(inputs: &ClosingInputs, aggregates: &RecordAggregates) -> ClosingDerived {
    let total_spv = inputs.cash_sales
        + inputs.credit_sales
        + inputs.pos_sales
        + inputs.transfer_bancolombia
        + inputs.transfer_nequi
        + inputs.transfer_daviplata;
    let efectivo_total = inputs.initial_cash
        + inputs.house_additional
        + inputs.agent_additional
        + inputs.cash_sales
        + inputs.credit_payments
        + aggregates.balance_sales
        - aggregates.product_payments
        - aggregates.expenses
        - aggregates.agent_loans;
    ClosingDerived {
        total_spv,
        efectivo_total,
        faltante_sobrante: inputs.counted_cash - efectivo_total,
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Closing {
    pub id: Uuid,
    pub user_id: String,
    pub inputs: ClosingInputs,
    pub aggregates: RecordAggregates,
    pub derived: ClosingDerived,
    pub active: bool,
    pub closed_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "closings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_id: String,
    pub till_number: i32,
    pub shift_assignment_id: Option<String>,
    pub initial_cash: i64,
    pub counted_cash: i64,
    pub cash_sales: i64,
    pub credit_sales: i64,
    pub pos_sales: i64,
    pub transfer_bancolombia: i64,
    pub transfer_nequi: i64,
    pub transfer_daviplata: i64,
    pub house_additional: i64,
    pub agent_additional: i64,
    pub credit_payments: i64,
    pub balance_sales: i64,
    pub product_payments: i64,
    pub expenses: i64,
    pub agent_loans: i64,
    pub total_spv: i64,
    pub efectivo_total: i64,
    pub faltante_sobrante: i64,
    pub notes: Option<String>,
    pub active: bool,
    pub closed_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::financial_records::Entity")]
    FinancialRecords,
    #[sea_orm(has_many = "super::adjustments::Entity")]
    Adjustments,
}

impl Related<super::financial_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FinancialRecords.def()
    }
}

impl Related<super::adjustments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Adjustments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for Closing {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        let shift_assignment_id = model
            .shift_assignment_id
            .as_deref()
            .map(|id| parse_uuid(id, "shift assignment"))
            .transpose()?;
        Ok(Self {
            id: parse_uuid(&model.id, "closing")?,
            user_id: model.user_id,
            inputs: ClosingInputs {
                till_number: model.till_number,
                shift_assignment_id,
                initial_cash: model.initial_cash,
                counted_cash: model.counted_cash,
                cash_sales: model.cash_sales,
                credit_sales: model.credit_sales,
                pos_sales: model.pos_sales,
                transfer_bancolombia: model.transfer_bancolombia,
                transfer_nequi: model.transfer_nequi,
                transfer_daviplata: model.transfer_daviplata,
                house_additional: model.house_additional,
                agent_additional: model.agent_additional,
                credit_payments: model.credit_payments,
                notes: model.notes,
            },
            aggregates: RecordAggregates {
                balance_sales: model.balance_sales,
                product_payments: model.product_payments,
                expenses: model.expenses,
                agent_loans: model.agent_loans,
            },
            derived: ClosingDerived {
                total_spv: model.total_spv,
                efectivo_total: model.efectivo_total,
                faltante_sobrante: model.faltante_sobrante,
            },
            active: model.active,
            closed_at: model.closed_at,
        })
    }
}

pub(crate) fn new_model(
    user_id: &str,
    inputs: &ClosingInputs,
    aggregates: RecordAggregates,
    derived: ClosingDerived,
) -> ActiveModel {
    ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4().to_string()),
        user_id: ActiveValue::Set(user_id.to_string()),
        till_number: ActiveValue::Set(inputs.till_number),
        shift_assignment_id: ActiveValue::Set(
            inputs.shift_assignment_id.map(|id| id.to_string()),
        ),
        initial_cash: ActiveValue::Set(inputs.initial_cash),
        counted_cash: ActiveValue::Set(inputs.counted_cash),
        cash_sales: ActiveValue::Set(inputs.cash_sales),
        credit_sales: ActiveValue::Set(inputs.credit_sales),
        pos_sales: ActiveValue::Set(inputs.pos_sales),
        transfer_bancolombia: ActiveValue::Set(inputs.transfer_bancolombia),
        transfer_nequi: ActiveValue::Set(inputs.transfer_nequi),
        transfer_daviplata: ActiveValue::Set(inputs.transfer_daviplata),
        house_additional: ActiveValue::Set(inputs.house_additional),
        agent_additional: ActiveValue::Set(inputs.agent_additional),
        credit_payments: ActiveValue::Set(inputs.credit_payments),
        balance_sales: ActiveValue::Set(aggregates.balance_sales),
        product_payments: ActiveValue::Set(aggregates.product_payments),
        expenses: ActiveValue::Set(aggregates.expenses),
        agent_loans: ActiveValue::Set(aggregates.agent_loans),
        total_spv: ActiveValue::Set(derived.total_spv),
        efectivo_total: ActiveValue::Set(derived.efectivo_total),
        faltante_sobrante: ActiveValue::Set(derived.faltante_sobrante),
        notes: ActiveValue::Set(inputs.notes.clone()),
        active: ActiveValue::Set(true),
        closed_at: ActiveValue::Set(Utc::now()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_fields_follow_the_reconciliation_law() {
        let inputs = ClosingInputs {
            till_number: 1,
            initial_cash: 10_000,
            counted_cash: 26_000,
            cash_sales: 12_000,
            credit_sales: 3_000,
            pos_sales: 2_000,
            transfer_bancolombia: 1_000,
            transfer_nequi: 500,
            transfer_daviplata: 250,
            house_additional: 4_000,
            agent_additional: 1_500,
            credit_payments: 800,
            ..ClosingInputs::default()
        };
        let aggregates = RecordAggregates {
            balance_sales: 2_200,
            product_payments: 1_100,
            expenses: 900,
            agent_loans: 700,
        };

        let derived = compute_derived(&inputs, &aggregates);
        assert_eq!(derived.total_spv, 12_000 + 3_000 + 2_000 + 1_000 + 500 + 250);
        assert_eq!(
            derived.efectivo_total,
            10_000 + 4_000 + 1_500 + 12_000 + 800 + 2_200 - 1_100 - 900 - 700
        );
        assert_eq!(
            derived.faltante_sobrante,
            inputs.counted_cash - derived.efectivo_total
        );
    }

    #[test]
    fn empty_inputs_reconcile_to_zero() {
        let derived = compute_derived(&ClosingInputs::default(), &RecordAggregates::default());
        assert_eq!(derived.total_spv, 0);
        assert_eq!(derived.efectivo_total, 0);
        assert_eq!(derived.faltante_sobrante, 0);
    }

    #[test]
    fn missing_cash_yields_negative_difference() {
        let inputs = ClosingInputs {
            till_number: 3,
            initial_cash: 5_000,
            counted_cash: 4_500,
            ..ClosingInputs::default()
        };
        let derived = compute_derived(&inputs, &RecordAggregates::default());
        assert_eq!(derived.faltante_sobrante, -500);
    }
}

//! Closing aggregation: pull the till's open records, sum them, persist the
//! closing, and stamp the consumed rows — all inside one transaction.

use chrono::NaiveDate;
use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    Closing, ClosingInputs, EngineError, RecordAggregates, RecordKind, ResultEngine, closings,
    codes, compute_derived, financial_records, util::ensure_valid_till,
};

use super::{Engine, with_tx};

impl Engine {
    /// Create a closing for a till.
    ///
    /// The open-record selection and the consumption stamp run in the same
    /// transaction over the same set of row ids, so no record can be counted
    /// by two closings.
    pub async fn create_closing(
        &self,
        inputs: ClosingInputs,
        caller: &str,
    ) -> ResultEngine<Closing> {
        self.require_permission(caller, codes::CLOSING_CREATE).await?;
        // A closing without a till would aggregate across every till.
        ensure_valid_till(inputs.till_number)?;

        with_tx!(self, |db_tx| {
            let open_records: Vec<financial_records::Model> = financial_records::Entity::find()
                .filter(financial_records::Column::TillNumber.eq(inputs.till_number))
                .filter(financial_records::Column::ClosingId.is_null())
                .filter(financial_records::Column::Active.eq(true))
                .all(&db_tx)
                .await?;

            let mut aggregates = RecordAggregates::default();
            let mut consumed_ids = Vec::with_capacity(open_records.len());
            for record in &open_records {
                match RecordKind::try_from(record.kind.as_str())? {
                    RecordKind::BalanceSale => aggregates.balance_sales += record.amount_minor,
                    RecordKind::BalanceFlow => aggregates.product_payments += record.amount_minor,
                    RecordKind::Expense => aggregates.expenses += record.amount_minor,
                    RecordKind::Loan => aggregates.agent_loans += record.amount_minor,
                    // Bill counts back the count lookup; they are consumed
                    // but never summed.
                    RecordKind::BillCount => {}
                }
                consumed_ids.push(record.id.clone());
            }

            let derived = compute_derived(&inputs, &aggregates);
            let model = closings::new_model(caller, &inputs, aggregates, derived)
                .insert(&db_tx)
                .await?;

            if !consumed_ids.is_empty() {
                financial_records::Entity::update_many()
                    .col_expr(
                        financial_records::Column::ClosingId,
                        Expr::value(model.id.clone()),
                    )
                    .filter(financial_records::Column::Id.is_in(consumed_ids))
                    .exec(&db_tx)
                    .await?;
            }

            Closing::try_from(model)
        })
    }

    /// Update a closing's operator inputs and recompute the derived fields.
    ///
    /// The record aggregates captured at creation stay as they are; the
    /// consumption step never runs again. A finalized closing is rejected:
    /// from then on only adjustments move its figures.
    pub async fn update_closing(
        &self,
        closing_id: Uuid,
        inputs: ClosingInputs,
        caller: &str,
    ) -> ResultEngine<Closing> {
        self.require_permission(caller, codes::CLOSING_UPDATE).await?;

        with_tx!(self, |db_tx| {
            let model = self.require_closing(&db_tx, closing_id).await?;
            if !model.active {
                return Err(EngineError::InvalidState(
                    "closing already finalized".to_string(),
                ));
            }
            if inputs.till_number != model.till_number {
                return Err(EngineError::Validation(
                    "a closing cannot move to another till".to_string(),
                ));
            }

            let aggregates = RecordAggregates {
                balance_sales: model.balance_sales,
                product_payments: model.product_payments,
                expenses: model.expenses,
                agent_loans: model.agent_loans,
            };
            let derived = compute_derived(&inputs, &aggregates);

            let updated = closings::ActiveModel {
                id: ActiveValue::Set(model.id),
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
                total_spv: ActiveValue::Set(derived.total_spv),
                efectivo_total: ActiveValue::Set(derived.efectivo_total),
                faltante_sobrante: ActiveValue::Set(derived.faltante_sobrante),
                notes: ActiveValue::Set(inputs.notes.clone()),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            Closing::try_from(updated)
        })
    }

    /// Mark a closing inactive (finalized). Only inactive closings seed the
    /// next shift's opening cash.
    pub async fn deactivate_closing(&self, closing_id: Uuid, caller: &str) -> ResultEngine<()> {
        self.require_permission(caller, codes::CLOSING_UPDATE).await?;

        with_tx!(self, |db_tx| {
            let model = self.require_closing(&db_tx, closing_id).await?;
            closings::ActiveModel {
                id: ActiveValue::Set(model.id),
                active: ActiveValue::Set(false),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(())
        })
    }

    /// Counted cash of the most recent inactive closing of a till on a day.
    ///
    /// `None` when the till has no finalized closing that day; the caller
    /// falls back to the default opening amount.
    pub async fn last_inactive_closing_of_day(
        &self,
        till_number: i32,
        day: NaiveDate,
    ) -> ResultEngine<Option<i64>> {
        ensure_valid_till(till_number)?;
        let start = day
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| EngineError::Validation("invalid day".to_string()))?
            .and_utc();
        let end = start + chrono::Duration::days(1);

        let model = closings::Entity::find()
            .filter(closings::Column::TillNumber.eq(till_number))
            .filter(closings::Column::Active.eq(false))
            .filter(closings::Column::ClosedAt.gte(start))
            .filter(closings::Column::ClosedAt.lt(end))
            .order_by_desc(closings::Column::ClosedAt)
            .one(self.database())
            .await?;
        Ok(model.map(|m| m.counted_cash))
    }

    pub async fn closing(&self, closing_id: Uuid) -> ResultEngine<Closing> {
        with_tx!(self, |db_tx| {
            let model = self.require_closing(&db_tx, closing_id).await?;
            Closing::try_from(model)
        })
    }

    pub async fn list_closings(&self, till_number: i32) -> ResultEngine<Vec<Closing>> {
        ensure_valid_till(till_number)?;
        let models = closings::Entity::find()
            .filter(closings::Column::TillNumber.eq(till_number))
            .order_by_desc(closings::Column::ClosedAt)
            .all(self.database())
            .await?;
        models.into_iter().map(Closing::try_from).collect()
    }

    pub(super) async fn require_closing(
        &self,
        db: &sea_orm::DatabaseTransaction,
        closing_id: Uuid,
    ) -> ResultEngine<closings::Model> {
        closings::Entity::find_by_id(closing_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("closing not exists".to_string()))
    }
}

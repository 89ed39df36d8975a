//! Financial record store: CRUD for the raw inputs of a closing.
//!
//! Every mutation re-checks the consumption guard: once a closing stamped a
//! record, the row is frozen.

use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    EngineError, FinancialRecord, RecordKind, ResultEngine, codes, financial_records,
    util::{ensure_positive_amount, ensure_valid_till, normalize_optional_text},
};

use super::{Engine, with_tx};

impl Engine {
    /// Record a loan, expense, bill count, balance flow, or balance sale.
    pub async fn create_record(
        &self,
        kind: RecordKind,
        caller: &str,
        till_number: Option<i32>,
        amount_minor: i64,
        description: Option<&str>,
    ) -> ResultEngine<FinancialRecord> {
        self.require_permission(caller, codes::RECORD_WRITE).await?;
        ensure_positive_amount(amount_minor, kind.as_str())?;
        if let Some(till) = till_number {
            ensure_valid_till(till)?;
        }

        with_tx!(self, |db_tx| {
            let model = financial_records::new_model(
                kind,
                caller,
                till_number,
                amount_minor,
                normalize_optional_text(description),
            )
            .insert(&db_tx)
            .await?;
            FinancialRecord::try_from(model)
        })
    }

    /// List active records. With a till the list is till-scoped; without one
    /// it falls back to the caller's own records, never to all tills.
    pub async fn list_records(
        &self,
        kind: Option<RecordKind>,
        till_number: Option<i32>,
        open_only: bool,
        caller: &str,
    ) -> ResultEngine<Vec<FinancialRecord>> {
        let mut query = financial_records::Entity::find()
            .filter(financial_records::Column::Active.eq(true));
        if let Some(kind) = kind {
            query = query.filter(financial_records::Column::Kind.eq(kind.as_str()));
        }
        match till_number {
            Some(till) => {
                ensure_valid_till(till)?;
                query = query.filter(financial_records::Column::TillNumber.eq(till));
            }
            None => {
                query = query.filter(financial_records::Column::UserId.eq(caller));
            }
        }
        if open_only {
            query = query.filter(financial_records::Column::ClosingId.is_null());
        }

        let models = query
            .order_by_desc(financial_records::Column::CreatedAt)
            .all(self.database())
            .await?;
        models.into_iter().map(FinancialRecord::try_from).collect()
    }

    /// Update an open record's amount and/or description.
    pub async fn update_record(
        &self,
        record_id: Uuid,
        amount_minor: Option<i64>,
        description: Option<&str>,
        caller: &str,
    ) -> ResultEngine<FinancialRecord> {
        self.require_permission(caller, codes::RECORD_WRITE).await?;

        with_tx!(self, |db_tx| {
            let model = self.require_open_record(&db_tx, record_id, caller).await?;

            let mut update = financial_records::ActiveModel {
                id: ActiveValue::Set(model.id.clone()),
                ..Default::default()
            };
            if let Some(amount) = amount_minor {
                ensure_positive_amount(amount, &model.kind)?;
                update.amount_minor = ActiveValue::Set(amount);
            }
            if description.is_some() {
                update.description = ActiveValue::Set(normalize_optional_text(description));
            }

            let updated = update.update(&db_tx).await?;
            FinancialRecord::try_from(updated)
        })
    }

    /// Soft-delete an open record.
    pub async fn deactivate_record(&self, record_id: Uuid, caller: &str) -> ResultEngine<()> {
        self.require_permission(caller, codes::RECORD_WRITE).await?;

        with_tx!(self, |db_tx| {
            let model = self.require_open_record(&db_tx, record_id, caller).await?;
            financial_records::ActiveModel {
                id: ActiveValue::Set(model.id),
                active: ActiveValue::Set(false),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;
            Ok(())
        })
    }

    /// Most recent still-open bill count for a till, if any.
    pub async fn latest_bill_count(
        &self,
        till_number: i32,
    ) -> ResultEngine<Option<FinancialRecord>> {
        ensure_valid_till(till_number)?;
        let model = financial_records::Entity::find()
            .filter(financial_records::Column::Kind.eq(RecordKind::BillCount.as_str()))
            .filter(financial_records::Column::TillNumber.eq(till_number))
            .filter(financial_records::Column::Active.eq(true))
            .filter(financial_records::Column::ClosingId.is_null())
            .order_by_desc(financial_records::Column::CreatedAt)
            .one(self.database())
            .await?;
        model.map(FinancialRecord::try_from).transpose()
    }

    /// Load a record owned by the caller and still open for mutation.
    async fn require_open_record(
        &self,
        db: &DatabaseTransaction,
        record_id: Uuid,
        caller: &str,
    ) -> ResultEngine<financial_records::Model> {
        let model = financial_records::Entity::find_by_id(record_id.to_string())
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("financial record not exists".to_string()))?;
        if model.user_id != caller {
            return Err(EngineError::KeyNotFound(
                "financial record not exists".to_string(),
            ));
        }
        if let Some(closing_id) = &model.closing_id {
            return Err(EngineError::Consumed(closing_id.clone()));
        }
        Ok(model)
    }
}

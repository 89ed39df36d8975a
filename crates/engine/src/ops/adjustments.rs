//! Adjustment ledger: correct a closed record's final result while keeping
//! the full before/after history.

use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{Adjustment, EngineError, ResultEngine, adjustments, closings, codes};

use super::{Engine, with_tx};

/// Shortest justification the ledger accepts.
pub const MIN_JUSTIFICATION_LEN: usize = 5;

impl Engine {
    /// Apply a signed correction to a closing's final result.
    ///
    /// The closing update and the ledger append happen in one transaction; a
    /// crash can never leave one without the other.
    pub async fn apply_adjustment(
        &self,
        closing_id: Uuid,
        amount_minor: i64,
        justification: &str,
        caller: &str,
    ) -> ResultEngine<Adjustment> {
        self.require_permission(caller, codes::CLOSING_ADJUST).await?;

        if amount_minor == 0 {
            return Err(EngineError::Validation(
                "an adjustment of zero carries no information".to_string(),
            ));
        }
        let justification = justification.trim();
        if justification.len() < MIN_JUSTIFICATION_LEN {
            return Err(EngineError::Validation(format!(
                "justification must be at least {MIN_JUSTIFICATION_LEN} characters"
            )));
        }

        with_tx!(self, |db_tx| {
            let closing = self.require_closing(&db_tx, closing_id).await?;

            let previous_final_result = closing.efectivo_total;
            let previous_difference = closing.faltante_sobrante;
            let new_final_result = previous_final_result + amount_minor;
            let new_difference = closing.counted_cash - new_final_result;

            closings::ActiveModel {
                id: ActiveValue::Set(closing.id.clone()),
                efectivo_total: ActiveValue::Set(new_final_result),
                faltante_sobrante: ActiveValue::Set(new_difference),
                ..Default::default()
            }
            .update(&db_tx)
            .await?;

            let adjustment = Adjustment {
                id: Uuid::new_v4(),
                closing_id,
                user_id: caller.to_string(),
                amount_minor,
                previous_final_result,
                new_final_result,
                previous_difference,
                new_difference,
                justification: justification.to_string(),
                created_at: Utc::now(),
            };
            adjustments::ActiveModel::from(&adjustment)
                .insert(&db_tx)
                .await?;

            Ok(adjustment)
        })
    }

    /// Adjustment history for a closing, newest first.
    pub async fn list_adjustments(&self, closing_id: Uuid) -> ResultEngine<Vec<Adjustment>> {
        with_tx!(self, |db_tx| {
            self.require_closing(&db_tx, closing_id).await?;
            let models = adjustments::Entity::find()
                .filter(adjustments::Column::ClosingId.eq(closing_id.to_string()))
                .order_by_desc(adjustments::Column::CreatedAt)
                .order_by_desc(adjustments::Column::Id)
                .all(&db_tx)
                .await?;
            models.into_iter().map(Adjustment::try_from).collect()
        })
    }
}

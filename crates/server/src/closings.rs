//! Closing API endpoints.

use api_types::closing::{
    ClosingPayload, ClosingView, DEFAULT_OPENING_CASH_MINOR, LastInactiveQuery,
    LastInactiveResponse,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn map_inputs(payload: ClosingPayload) -> engine::ClosingInputs {
    engine::ClosingInputs {
        till_number: payload.till_number,
        shift_assignment_id: payload.shift_assignment_id,
        initial_cash: payload.initial_cash,
        counted_cash: payload.counted_cash,
        cash_sales: payload.cash_sales,
        credit_sales: payload.credit_sales,
        pos_sales: payload.pos_sales,
        transfer_bancolombia: payload.transfer_bancolombia,
        transfer_nequi: payload.transfer_nequi,
        transfer_daviplata: payload.transfer_daviplata,
        house_additional: payload.house_additional,
        agent_additional: payload.agent_additional,
        credit_payments: payload.credit_payments,
        notes: payload.notes,
    }
}

pub(crate) fn map_closing(closing: engine::Closing) -> ClosingView {
    ClosingView {
        id: closing.id,
        user_id: closing.user_id,
        till_number: closing.inputs.till_number,
        shift_assignment_id: closing.inputs.shift_assignment_id,
        initial_cash: closing.inputs.initial_cash,
        counted_cash: closing.inputs.counted_cash,
        cash_sales: closing.inputs.cash_sales,
        credit_sales: closing.inputs.credit_sales,
        pos_sales: closing.inputs.pos_sales,
        transfer_bancolombia: closing.inputs.transfer_bancolombia,
        transfer_nequi: closing.inputs.transfer_nequi,
        transfer_daviplata: closing.inputs.transfer_daviplata,
        house_additional: closing.inputs.house_additional,
        agent_additional: closing.inputs.agent_additional,
        credit_payments: closing.inputs.credit_payments,
        balance_sales: closing.aggregates.balance_sales,
        product_payments: closing.aggregates.product_payments,
        expenses: closing.aggregates.expenses,
        agent_loans: closing.aggregates.agent_loans,
        total_spv: closing.derived.total_spv,
        efectivo_total: closing.derived.efectivo_total,
        faltante_sobrante: closing.derived.faltante_sobrante,
        notes: closing.inputs.notes,
        active: closing.active,
        closed_at: closing.closed_at,
    }
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<ClosingPayload>,
) -> Result<(StatusCode, Json<ClosingView>), ServerError> {
    let closing = state
        .engine
        .create_closing(map_inputs(payload), &user.username)
        .await?;
    Ok((StatusCode::CREATED, Json(map_closing(closing))))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ClosingPayload>,
) -> Result<Json<ClosingView>, ServerError> {
    let closing = state
        .engine
        .update_closing(id, map_inputs(payload), &user.username)
        .await?;
    Ok(Json(map_closing(closing)))
}

#[derive(Deserialize)]
pub struct ListQuery {
    till: i32,
}

pub async fn list(
    Extension(_): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ClosingView>>, ServerError> {
    let closings = state.engine.list_closings(query.till).await?;
    Ok(Json(closings.into_iter().map(map_closing).collect()))
}

pub async fn get(
    Extension(_): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ClosingView>, ServerError> {
    let closing = state.engine.closing(id).await?;
    Ok(Json(map_closing(closing)))
}

/// Finalize: mark the closing inactive so it can seed the next opening.
pub async fn finalize(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.deactivate_closing(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Opening-cash seed for a till: counted cash of today's most recent
/// finalized closing, or the fixed default when none exists.
pub async fn last_inactive_of_day(
    Extension(_): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<LastInactiveQuery>,
) -> Result<Json<LastInactiveResponse>, ServerError> {
    let day = query.day.unwrap_or_else(|| Utc::now().date_naive());
    let counted = state
        .engine
        .last_inactive_closing_of_day(query.till, day)
        .await?;
    let response = match counted {
        Some(counted_cash_minor) => LastInactiveResponse {
            till_number: query.till,
            counted_cash_minor,
            from_previous_closing: true,
        },
        None => LastInactiveResponse {
            till_number: query.till,
            counted_cash_minor: DEFAULT_OPENING_CASH_MINOR,
            from_previous_closing: false,
        },
    };
    Ok(Json(response))
}

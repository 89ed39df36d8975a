//! Financial record API endpoints.

use api_types::record::{
    LatestBillCount, RecordKind as ApiKind, RecordNew, RecordQuery, RecordUpdate, RecordView,
    RecordsResponse,
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn map_kind(kind: ApiKind) -> engine::RecordKind {
    match kind {
        ApiKind::Loan => engine::RecordKind::Loan,
        ApiKind::Expense => engine::RecordKind::Expense,
        ApiKind::BillCount => engine::RecordKind::BillCount,
        ApiKind::BalanceFlow => engine::RecordKind::BalanceFlow,
        ApiKind::BalanceSale => engine::RecordKind::BalanceSale,
    }
}

fn map_kind_back(kind: engine::RecordKind) -> ApiKind {
    match kind {
        engine::RecordKind::Loan => ApiKind::Loan,
        engine::RecordKind::Expense => ApiKind::Expense,
        engine::RecordKind::BillCount => ApiKind::BillCount,
        engine::RecordKind::BalanceFlow => ApiKind::BalanceFlow,
        engine::RecordKind::BalanceSale => ApiKind::BalanceSale,
    }
}

pub(crate) fn map_record(record: engine::FinancialRecord) -> RecordView {
    let closing_id = match record.state {
        engine::RecordState::Open => None,
        engine::RecordState::Consumed { closing_id } => Some(closing_id),
    };
    RecordView {
        id: record.id,
        kind: map_kind_back(record.kind),
        user_id: record.user_id,
        till_number: record.till_number,
        amount_minor: record.amount_minor,
        description: record.description,
        active: record.active,
        created_at: record.created_at,
        closing_id,
    }
}

pub async fn create(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<RecordNew>,
) -> Result<(StatusCode, Json<RecordView>), ServerError> {
    let record = state
        .engine
        .create_record(
            map_kind(payload.kind),
            &user.username,
            payload.till_number,
            payload.amount_minor,
            payload.description.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(map_record(record))))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<RecordQuery>,
) -> Result<Json<RecordsResponse>, ServerError> {
    let records = state
        .engine
        .list_records(
            query.kind.map(map_kind),
            query.till,
            query.open,
            &user.username,
        )
        .await?;
    Ok(Json(RecordsResponse {
        records: records.into_iter().map(map_record).collect(),
    }))
}

pub async fn update(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecordUpdate>,
) -> Result<Json<RecordView>, ServerError> {
    let record = state
        .engine
        .update_record(
            id,
            payload.amount_minor,
            payload.description.as_deref(),
            &user.username,
        )
        .await?;
    Ok(Json(map_record(record)))
}

pub async fn deactivate(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    state.engine.deactivate_record(id, &user.username).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct TillQuery {
    till: i32,
}

/// Latest open bill count of a till, used to prefill the closing form.
pub async fn latest_bill_count(
    Extension(_): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<TillQuery>,
) -> Result<Json<LatestBillCount>, ServerError> {
    let record = state.engine.latest_bill_count(query.till).await?;
    Ok(Json(LatestBillCount {
        record: record.map(map_record),
    }))
}

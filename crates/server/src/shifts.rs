//! Shift lifecycle API endpoints.

use api_types::shift::{
    AssignmentNew, OperationSlot, OperationType, OperationsInUse, ShiftStart, ShiftStateView,
    ShiftView,
};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use sea_orm::{DatabaseConnection, EntityTrait};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

/// Display name of a user, falling back to the username.
async fn display_name_for(db: &DatabaseConnection, username: &str) -> String {
    match user::Entity::find_by_id(username.to_string()).one(db).await {
        Ok(Some(user)) => user.display_name.unwrap_or(user.username),
        _ => username.to_string(),
    }
}

fn map_operation(op: OperationType) -> engine::OperationKind {
    match op {
        OperationType::Agent => engine::OperationKind::Agent,
        OperationType::Super => engine::OperationKind::Super,
    }
}

fn map_operation_back(op: engine::OperationKind) -> OperationType {
    match op {
        engine::OperationKind::Agent => OperationType::Agent,
        engine::OperationKind::Super => OperationType::Super,
    }
}

fn map_state(state: engine::ShiftState) -> ShiftStateView {
    match state {
        engine::ShiftState::Unassigned => ShiftStateView::Unassigned,
        engine::ShiftState::Active { since } => ShiftStateView::Active { since },
        engine::ShiftState::Finished { since, until } => {
            ShiftStateView::Finished { since, until }
        }
    }
}

pub(crate) fn map_assignment(assignment: engine::ShiftAssignment) -> ShiftView {
    ShiftView {
        id: assignment.id,
        user_id: assignment.user_id,
        shift_definition_id: assignment.shift_definition_id,
        day: assignment.day,
        till_number: assignment.till_number,
        operation_type: assignment.operation.map(map_operation_back),
        state: map_state(assignment.state),
    }
}

async fn map_slot(db: &DatabaseConnection, state: &engine::LockState) -> OperationSlot {
    match state {
        engine::LockState::Free => OperationSlot {
            in_use: false,
            holder: None,
            since: None,
        },
        engine::LockState::Held { user_id, since, .. } => OperationSlot {
            in_use: true,
            holder: Some(display_name_for(db, user_id).await),
            since: Some(*since),
        },
    }
}

pub async fn create_assignment(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<AssignmentNew>,
) -> Result<(StatusCode, Json<ShiftView>), ServerError> {
    let id = state
        .engine
        .create_assignment(&user.username, payload.shift_definition_id, payload.day)
        .await?;
    let assignment = state.engine.shift_assignment(id, &user.username).await?;
    Ok((StatusCode::CREATED, Json(map_assignment(assignment))))
}

pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<ShiftView>>, ServerError> {
    let assignments = state.engine.list_assignments(&user.username).await?;
    Ok(Json(assignments.into_iter().map(map_assignment).collect()))
}

pub async fn get(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ShiftView>, ServerError> {
    let assignment = state.engine.shift_assignment(id, &user.username).await?;
    Ok(Json(map_assignment(assignment)))
}

/// Availability report for both operation types.
pub async fn operations_in_use(
    Extension(_): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<OperationsInUse>, ServerError> {
    let availability = state.engine.operations_in_use().await?;
    Ok(Json(OperationsInUse {
        agent_operation: map_slot(&state.db, &availability.agent).await,
        super_operation: map_slot(&state.db, &availability.super_).await,
    }))
}

pub async fn start(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ShiftStart>,
) -> Result<Json<ShiftView>, ServerError> {
    let assignment = match state
        .engine
        .activate_shift(
            id,
            payload.till_number,
            map_operation(payload.operation_type),
            &user.username,
        )
        .await
    {
        Ok(assignment) => assignment,
        // Conflicts surface the holder's display name, not their login.
        Err(engine::EngineError::OperationInUse { operation, holder }) => {
            let holder = display_name_for(&state.db, &holder).await;
            return Err(engine::EngineError::OperationInUse { operation, holder }.into());
        }
        Err(err) => return Err(err.into()),
    };
    Ok(Json(map_assignment(assignment)))
}

pub async fn finish(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ShiftView>, ServerError> {
    let assignment = state.engine.finalize_shift(id, &user.username).await?;
    Ok(Json(map_assignment(assignment)))
}

pub async fn reset(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ShiftView>, ServerError> {
    let assignment = state.engine.reset_shift(id, &user.username).await?;
    tracing::warn!("shift {id} reset by {}", user.username);
    Ok(Json(map_assignment(assignment)))
}

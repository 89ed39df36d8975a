//! Adjustment API endpoints.

use api_types::adjustment::{AdjustmentNew, AdjustmentView, AdjustmentsResponse};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, user};

fn map_adjustment(adjustment: engine::Adjustment) -> AdjustmentView {
    AdjustmentView {
        id: adjustment.id,
        closing_id: adjustment.closing_id,
        user_id: adjustment.user_id,
        amount_minor: adjustment.amount_minor,
        previous_final_result: adjustment.previous_final_result,
        new_final_result: adjustment.new_final_result,
        previous_difference: adjustment.previous_difference,
        new_difference: adjustment.new_difference,
        justification: adjustment.justification,
        created_at: adjustment.created_at,
    }
}

pub async fn apply(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AdjustmentNew>,
) -> Result<(StatusCode, Json<AdjustmentView>), ServerError> {
    let adjustment = state
        .engine
        .apply_adjustment(
            id,
            payload.amount_minor,
            &payload.justification,
            &user.username,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(map_adjustment(adjustment))))
}

pub async fn list(
    Extension(_): Extension<user::Model>,
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<AdjustmentsResponse>, ServerError> {
    let adjustments = state.engine.list_adjustments(id).await?;
    Ok(Json(AdjustmentsResponse {
        adjustments: adjustments.into_iter().map(map_adjustment).collect(),
    }))
}

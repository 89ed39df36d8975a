//! Shift definition API endpoints (admin surface).

use api_types::definition::{DefinitionNew, DefinitionView};
use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{ServerError, server::ServerState, user};

fn map_definition(definition: engine::ShiftDefinition) -> DefinitionView {
    DefinitionView {
        id: definition.id,
        name: definition.name,
        description: definition.description,
        scheduled_start: definition.scheduled_start,
        scheduled_end: definition.scheduled_end,
    }
}

pub async fn create(
    Extension(_): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<DefinitionNew>,
) -> Result<(StatusCode, Json<DefinitionView>), ServerError> {
    let definition = state
        .engine
        .create_definition(
            &payload.name,
            payload.description.as_deref(),
            &payload.scheduled_start,
            &payload.scheduled_end,
        )
        .await?;
    Ok((StatusCode::CREATED, Json(map_definition(definition))))
}

pub async fn list(
    Extension(_): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<DefinitionView>>, ServerError> {
    let definitions = state.engine.list_definitions().await?;
    Ok(Json(definitions.into_iter().map(map_definition).collect()))
}

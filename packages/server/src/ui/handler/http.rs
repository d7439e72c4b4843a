//! HTTP API endpoint handlers.
//!
//! Read-only views of the registries for health checks and debugging.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::RoomId,
    infrastructure::dto::{
        http::{ConnectionBindingDto, RoomDetailDto},
        websocket::CoordinateDto,
    },
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Dump of every live room, keyed by room id
pub async fn debug_rooms(
    State(state): State<Arc<AppState>>,
) -> Json<BTreeMap<String, RoomDetailDto>> {
    let rooms = state.room_repository.list().await;

    // Domain Model から DTO への変換
    let rooms = rooms
        .iter()
        .map(|room| (room.id.as_str().to_string(), RoomDetailDto::from(room)))
        .collect();
    Json(rooms)
}

/// Dump of every connection binding, keyed by connection id
pub async fn debug_connections(
    State(state): State<Arc<AppState>>,
) -> Json<BTreeMap<String, ConnectionBindingDto>> {
    let bindings = state.connection_repository.list().await;
    let bindings = bindings
        .iter()
        .map(|(connection_id, binding)| {
            (
                connection_id.as_str().to_string(),
                ConnectionBindingDto::from(binding),
            )
        })
        .collect();
    Json(bindings)
}

/// Destination of a room
pub async fn room_destination(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<CoordinateDto>, StatusCode> {
    let room_id = RoomId::new(room_id).map_err(|_| StatusCode::NOT_FOUND)?;
    let room = state
        .room_repository
        .get(&room_id)
        .await
        .ok_or(StatusCode::NOT_FOUND)?;
    room.destination
        .map(|destination| Json(destination.into()))
        .ok_or(StatusCode::NOT_FOUND)
}

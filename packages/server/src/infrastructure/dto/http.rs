//! HTTP diagnostic response DTOs.
//!
//! Timestamps are rendered as RFC 3339 strings here, unlike the WebSocket
//! payloads which carry Unix milliseconds.

use serde::Serialize;
use serde_json::Value;

use super::websocket::CoordinateDto;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDetailDto {
    pub connection_id: String,
    pub name: String,
    pub location: Option<CoordinateDto>,
    pub joined_at: String,
    pub last_updated_at: String,
    pub route: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetailDto {
    pub id: String,
    pub created_at: String,
    pub owner_id: String,
    pub destination: Option<CoordinateDto>,
    pub participants: std::collections::BTreeMap<String, ParticipantDetailDto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionBindingDto {
    pub room_id: String,
    pub participant_id: String,
}

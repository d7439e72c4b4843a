//! WebSocket message DTOs.
//!
//! Every frame in both directions is `{"type": <string>, "payload": <object>}`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

// ========================================
// Shared
// ========================================

/// Coordinate on the wire. Accepts `lat`/`lon`/`lng` on input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateDto {
    #[serde(alias = "lat")]
    pub latitude: f64,
    #[serde(alias = "lon", alias = "lng")]
    pub longitude: f64,
}

// ========================================
// Client → Server
// ========================================

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    r#type: String,
    #[serde(default)]
    payload: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomPayload {
    pub name: String,
    #[serde(default)]
    pub location: Option<CoordinateDto>,
    #[serde(default)]
    pub destination: Option<CoordinateDto>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomPayload {
    pub room_id: String,
    pub name: String,
    #[serde(default)]
    pub location: Option<CoordinateDto>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLocationPayload {
    #[serde(alias = "userId")]
    pub participant_id: String,
    pub location: CoordinateDto,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoutePayload {
    pub room_id: String,
    #[serde(alias = "userId")]
    pub participant_id: String,
    pub route: Value,
}

/// Shared by LEAVE_ROOM and TERMINATE_ROOM.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomMemberPayload {
    pub room_id: String,
    #[serde(alias = "userId")]
    pub participant_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRefPayload {
    pub room_id: String,
}

/// Parsed inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    CreateRoom(CreateRoomPayload),
    JoinRoom(JoinRoomPayload),
    UpdateLocation(UpdateLocationPayload),
    UpdateRoute(UpdateRoutePayload),
    LeaveRoom(RoomMemberPayload),
    GetRoomDetails(RoomRefPayload),
    TerminateRoom(RoomMemberPayload),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed message: {0}")]
    Malformed(String),

    #[error("unknown message type '{0}'")]
    UnknownType(String),
}

impl ClientMessage {
    /// Parse a raw text frame.
    ///
    /// The envelope is decoded first so that an unknown `type` can be told
    /// apart from a known type carrying a bad payload.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let envelope: Envelope =
            serde_json::from_str(text).map_err(|e| ParseError::Malformed(e.to_string()))?;

        fn payload<T: for<'de> Deserialize<'de>>(
            r#type: &str,
            value: Value,
        ) -> Result<T, ParseError> {
            serde_json::from_value(value)
                .map_err(|e| ParseError::Malformed(format!("invalid {} payload: {}", r#type, e)))
        }

        let p = envelope.payload;
        match envelope.r#type.as_str() {
            "CREATE_ROOM" => Ok(Self::CreateRoom(payload("CREATE_ROOM", p)?)),
            "JOIN_ROOM" => Ok(Self::JoinRoom(payload("JOIN_ROOM", p)?)),
            "UPDATE_LOCATION" => Ok(Self::UpdateLocation(payload("UPDATE_LOCATION", p)?)),
            "UPDATE_ROUTE" => Ok(Self::UpdateRoute(payload("UPDATE_ROUTE", p)?)),
            "LEAVE_ROOM" => Ok(Self::LeaveRoom(payload("LEAVE_ROOM", p)?)),
            "GET_ROOM_DETAILS" => Ok(Self::GetRoomDetails(payload("GET_ROOM_DETAILS", p)?)),
            "TERMINATE_ROOM" => Ok(Self::TerminateRoom(payload("TERMINATE_ROOM", p)?)),
            other => Err(ParseError::UnknownType(other.to_string())),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::CreateRoom(_) => "CREATE_ROOM",
            Self::JoinRoom(_) => "JOIN_ROOM",
            Self::UpdateLocation(_) => "UPDATE_LOCATION",
            Self::UpdateRoute(_) => "UPDATE_ROUTE",
            Self::LeaveRoom(_) => "LEAVE_ROOM",
            Self::GetRoomDetails(_) => "GET_ROOM_DETAILS",
            Self::TerminateRoom(_) => "TERMINATE_ROOM",
        }
    }
}

// ========================================
// Server → Client
// ========================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub id: String,
    pub name: String,
    pub location: Option<CoordinateDto>,
    pub joined_at: i64,
    pub last_updated_at: i64,
    pub route: Option<Value>,
}

/// Full room state (everything in a snapshot except the room id).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomStateDto {
    pub participants: BTreeMap<String, ParticipantDto>,
    pub destination: Option<CoordinateDto>,
    pub created_at: i64,
    pub owner_id: String,
}

/// Direct reply to CREATE_ROOM / JOIN_ROOM.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentPayload {
    pub room_id: String,
    pub participant_id: String,
    #[serde(flatten)]
    pub state: RoomStateDto,
}

/// Payload of every room broadcast: `{roomId, ...state?, ...extra}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomEventPayload {
    pub room_id: String,
    #[serde(flatten)]
    pub state: Option<RoomStateDto>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorPayload {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Room broadcast event kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomEventKind {
    /// Full snapshot after join / leave / location change
    UpdatedRoom,
    /// Route-only change
    UpdateRoute,
    /// On-demand refresh for all members
    RoomDetails,
    /// Pre-teardown notice
    RoomTerminated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    CreatedRoom(AssignmentPayload),
    JoinSuccess(AssignmentPayload),
    UpdatedRoom(RoomEventPayload),
    UpdateRoute(RoomEventPayload),
    RoomDetails(RoomEventPayload),
    RoomTerminated(RoomEventPayload),
    Error(ErrorPayload),
}

impl ServerMessage {
    pub fn room_event(kind: RoomEventKind, payload: RoomEventPayload) -> Self {
        match kind {
            RoomEventKind::UpdatedRoom => Self::UpdatedRoom(payload),
            RoomEventKind::UpdateRoute => Self::UpdateRoute(payload),
            RoomEventKind::RoomDetails => Self::RoomDetails(payload),
            RoomEventKind::RoomTerminated => Self::RoomTerminated(payload),
        }
    }

    pub fn error(message: impl Into<String>, code: &str) -> Self {
        Self::Error(ErrorPayload {
            message: message.into(),
            code: Some(code.to_string()),
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_create_room_with_short_coordinate_names() {
        // テスト項目: lat/lon の省略形を含む CREATE_ROOM をパースできる
        // given (前提条件):
        let text = r#"{"type":"CREATE_ROOM","payload":{"name":"A","location":{"lat":10,"lon":20},"destination":{"latitude":12,"longitude":22}}}"#;

        // when (操作):
        let result = ClientMessage::parse(text);

        // then (期待する結果):
        assert_eq!(
            result,
            Ok(ClientMessage::CreateRoom(CreateRoomPayload {
                name: "A".to_string(),
                location: Some(CoordinateDto {
                    latitude: 10.0,
                    longitude: 20.0
                }),
                destination: Some(CoordinateDto {
                    latitude: 12.0,
                    longitude: 22.0
                }),
            }))
        );
    }

    #[test]
    fn test_parse_accepts_legacy_user_id_field() {
        // テスト項目: participantId の代わりに userId を受け付ける
        // given (前提条件):
        let text = r#"{"type":"TERMINATE_ROOM","payload":{"roomId":"123456","userId":"u1"}}"#;

        // when (操作):
        let result = ClientMessage::parse(text);

        // then (期待する結果):
        assert_eq!(
            result,
            Ok(ClientMessage::TerminateRoom(RoomMemberPayload {
                room_id: "123456".to_string(),
                participant_id: "u1".to_string(),
            }))
        );
    }

    #[test]
    fn test_parse_invalid_json_is_malformed() {
        // テスト項目: JSON でない文字列は Malformed になる
        // given (前提条件):
        let text = "not json";

        // when (操作):
        let result = ClientMessage::parse(text);

        // then (期待する結果):
        assert!(matches!(result, Err(ParseError::Malformed(_))));
    }

    #[test]
    fn test_parse_missing_payload_field_is_malformed() {
        // テスト項目: 既知の type でもペイロードが不正なら Malformed になる
        // given (前提条件):
        let text = r#"{"type":"JOIN_ROOM","payload":{"name":"B"}}"#;

        // when (操作):
        let result = ClientMessage::parse(text);

        // then (期待する結果):
        assert!(matches!(result, Err(ParseError::Malformed(_))));
    }

    #[test]
    fn test_parse_unknown_type() {
        // テスト項目: 未知の type は UnknownType になる
        // given (前提条件):
        let text = r#"{"type":"DANCE","payload":{}}"#;

        // when (操作):
        let result = ClientMessage::parse(text);

        // then (期待する結果):
        assert_eq!(result, Err(ParseError::UnknownType("DANCE".to_string())));
    }

    #[test]
    fn test_minimal_room_event_serialization() {
        // テスト項目: 最小ペイロードは roomId と extra のみを含む
        // given (前提条件):
        let mut extra = Map::new();
        extra.insert("reason".to_string(), json!("owner"));
        let message = ServerMessage::room_event(
            RoomEventKind::RoomTerminated,
            RoomEventPayload {
                room_id: "123456".to_string(),
                state: None,
                extra,
            },
        );

        // when (操作):
        let value: Value = serde_json::from_str(&message.to_json().unwrap()).unwrap();

        // then (期待する結果):
        assert_eq!(
            value,
            json!({"type": "ROOM_TERMINATED", "payload": {"roomId": "123456", "reason": "owner"}})
        );
    }

    #[test]
    fn test_error_serialization() {
        // テスト項目: ERROR は message と code を持つ
        // given (前提条件):
        let message = ServerMessage::error("Room not found", "ROOM_NOT_FOUND");

        // when (操作):
        let value: Value = serde_json::from_str(&message.to_json().unwrap()).unwrap();

        // then (期待する結果):
        assert_eq!(
            value,
            json!({"type": "ERROR", "payload": {"message": "Room not found", "code": "ROOM_NOT_FOUND"}})
        );
    }
}

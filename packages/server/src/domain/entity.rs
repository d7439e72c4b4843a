//! Entities
//!
//! Room と Participant。Room Registry だけがこれらのレコードを所有する。

use std::collections::HashMap;

use serde::Serialize;

use super::value_object::{ConnectionId, ParticipantId, RoomId, Timestamp};

/// 緯度経度
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// クライアントが計算した経路のヒント
///
/// サーバーは中身を解釈せず、受け取った JSON をそのまま保存・中継する。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Route(serde_json::Value);

impl Route {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

/// Room 内の参加者
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Participant {
    pub id: ParticipantId,
    /// 現在この参加者にバインドされている接続
    pub connection_id: ConnectionId,
    /// 表示名（一意性・内容の検証はしない）
    pub display_name: String,
    pub location: Option<Coordinate>,
    pub joined_at: Timestamp,
    pub last_updated_at: Timestamp,
    pub route: Option<Route>,
}

impl Participant {
    pub fn new(
        id: ParticipantId,
        connection_id: ConnectionId,
        display_name: String,
        location: Option<Coordinate>,
        joined_at: Timestamp,
    ) -> Self {
        Self {
            id,
            connection_id,
            display_name,
            location,
            joined_at,
            last_updated_at: joined_at,
            route: None,
        }
    }
}

/// 位置情報共有ルーム
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Room {
    pub id: RoomId,
    pub created_at: Timestamp,
    /// 作成者の参加者 ID（ルームの生存期間中は不変）
    pub owner_id: ParticipantId,
    pub destination: Option<Coordinate>,
    pub participants: HashMap<ParticipantId, Participant>,
}

impl Room {
    pub fn new(
        id: RoomId,
        owner_id: ParticipantId,
        destination: Option<Coordinate>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            created_at,
            owner_id,
            destination,
            participants: HashMap::new(),
        }
    }

    pub fn is_owner(&self, participant_id: &ParticipantId) -> bool {
        &self.owner_id == participant_id
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn participant(&self, participant_id: &ParticipantId) -> Option<&Participant> {
        self.participants.get(participant_id)
    }
}

/// 接続のバインディング（Connection Registry のエントリ）
///
/// 参加者データは複製せず、ID だけを参照する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionBinding {
    pub room_id: RoomId,
    pub participant_id: ParticipantId,
}

impl ConnectionBinding {
    pub fn new(room_id: RoomId, participant_id: ParticipantId) -> Self {
        Self {
            room_id,
            participant_id,
        }
    }
}

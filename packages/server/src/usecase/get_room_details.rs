//! UseCase: Room の詳細取得（GET_ROOM_DETAILS）
//!
//! 状態は一切変更せず、Room 全員に最新のスナップショットを送り直す。

use std::sync::Arc;

use serde_json::Map;

use crate::{
    domain::{ConnectionId, ConnectionRepository, RoomRepository},
    infrastructure::dto::websocket::{RoomEventKind, RoomRefPayload},
};

use super::{PayloadShape, RoomBroadcaster, SessionError, ensure_bound_room, parse_room_id};

pub struct GetRoomDetailsUseCase {
    room_repository: Arc<dyn RoomRepository>,
    connection_repository: Arc<dyn ConnectionRepository>,
    broadcaster: Arc<RoomBroadcaster>,
}

impl GetRoomDetailsUseCase {
    pub fn new(
        room_repository: Arc<dyn RoomRepository>,
        connection_repository: Arc<dyn ConnectionRepository>,
        broadcaster: Arc<RoomBroadcaster>,
    ) -> Self {
        Self {
            room_repository,
            connection_repository,
            broadcaster,
        }
    }

    /// `ROOM_DETAILS` をブロードキャストし、配送できた接続数を返す
    ///
    /// 対象は接続自身がいる Room に限る。
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        payload: RoomRefPayload,
    ) -> Result<usize, SessionError> {
        let Some(binding) = self.connection_repository.lookup(connection_id).await else {
            tracing::debug!("Ignoring room details request from {}: not in a room", connection_id);
            return Ok(0);
        };

        let room_id = parse_room_id(payload.room_id)?;
        ensure_bound_room(&binding, &room_id)?;
        if self.room_repository.get(&room_id).await.is_none() {
            return Err(SessionError::RoomNotFound(room_id.into_string()));
        }

        Ok(self
            .broadcaster
            .broadcast(&room_id, RoomEventKind::RoomDetails, Map::new(), PayloadShape::Full)
            .await)
    }
}

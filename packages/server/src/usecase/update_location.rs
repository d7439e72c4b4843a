//! UseCase: 位置情報の更新（UPDATE_LOCATION）
//!
//! Room にいない接続や、Room にいない参加者からの更新は黙って無視する。
//! 高頻度に送られるメッセージなので、エラーは返さない。

use std::sync::Arc;

use serde_json::Map;

use crate::{
    domain::{ConnectionId, ConnectionRepository, ParticipantId, RoomRepository, Timestamp},
    infrastructure::dto::websocket::{RoomEventKind, UpdateLocationPayload},
};

use super::{PayloadShape, RoomBroadcaster};

pub struct UpdateLocationUseCase {
    room_repository: Arc<dyn RoomRepository>,
    connection_repository: Arc<dyn ConnectionRepository>,
    broadcaster: Arc<RoomBroadcaster>,
}

impl UpdateLocationUseCase {
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

    /// 位置情報を更新し、更新できたかを返す
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        payload: UpdateLocationPayload,
        now: Timestamp,
    ) -> bool {
        let Some(binding) = self.connection_repository.lookup(connection_id).await else {
            tracing::debug!("Ignoring location from {}: not in a room", connection_id);
            return false;
        };
        let Ok(participant_id) = ParticipantId::new(payload.participant_id) else {
            tracing::debug!("Ignoring location from {}: empty participant id", connection_id);
            return false;
        };

        if let Err(e) = self
            .room_repository
            .update_location(&binding.room_id, &participant_id, payload.location.into(), now)
            .await
        {
            tracing::debug!("Ignoring location from {}: {}", connection_id, e);
            return false;
        }

        self.broadcaster
            .broadcast(
                &binding.room_id,
                RoomEventKind::UpdatedRoom,
                Map::new(),
                PayloadShape::Full,
            )
            .await;
        true
    }
}

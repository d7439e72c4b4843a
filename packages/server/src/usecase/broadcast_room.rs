//! UseCase: Room へのブロードキャスト（Broadcast Engine）
//!
//! Room のイベントを一度だけシリアライズし、その Room にバインドされている
//! 全ての開いた接続へ配送する。配送の失敗は送信者には返さずログに残すだけ。

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::{
    config::BroadcastStrategy,
    domain::{ConnectionId, ConnectionRepository, MessagePusher, RoomId, RoomRepository},
    infrastructure::dto::websocket::{RoomEventKind, RoomEventPayload, ServerMessage},
};

/// ペイロードの形
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    /// `{roomId, participants, destination, createdAt, ownerId, ...extra}`
    Full,
    /// `{roomId, ...extra}`
    Minimal,
}

pub struct RoomBroadcaster {
    room_repository: Arc<dyn RoomRepository>,
    connection_repository: Arc<dyn ConnectionRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    strategy: BroadcastStrategy,
}

impl RoomBroadcaster {
    pub fn new(
        room_repository: Arc<dyn RoomRepository>,
        connection_repository: Arc<dyn ConnectionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        strategy: BroadcastStrategy,
    ) -> Self {
        Self {
            room_repository,
            connection_repository,
            message_pusher,
            strategy,
        }
    }

    /// Room のイベントをブロードキャストし、配送できた接続数を返す
    ///
    /// Room が存在しない場合は何もせず 0 を返す。
    pub async fn broadcast(
        &self,
        room_id: &RoomId,
        kind: RoomEventKind,
        extra: Map<String, Value>,
        shape: PayloadShape,
    ) -> usize {
        let Some(room) = self.room_repository.get(room_id).await else {
            tracing::debug!("Skipping {:?} broadcast: room '{}' is gone", kind, room_id);
            return 0;
        };

        let payload = RoomEventPayload {
            room_id: room_id.as_str().to_string(),
            state: match shape {
                PayloadShape::Full => Some((&room).into()),
                PayloadShape::Minimal => None,
            },
            extra,
        };
        let json = match ServerMessage::room_event(kind, payload).to_json() {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to serialize {:?} for room '{}': {}", kind, room_id, e);
                return 0;
            }
        };

        let targets = self.targets(room_id).await;
        match self.message_pusher.broadcast(targets, &json).await {
            Ok(delivered) => {
                tracing::debug!(
                    "Broadcast {:?} to {} connection(s) in room '{}'",
                    kind,
                    delivered,
                    room_id
                );
                delivered
            }
            Err(e) => {
                tracing::warn!("Broadcast to room '{}' failed: {}", room_id, e);
                0
            }
        }
    }

    /// 1 つの接続に直接返信する
    pub async fn reply(&self, connection_id: &ConnectionId, message: &ServerMessage) {
        let json = match message.to_json() {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!("Failed to serialize reply to {}: {}", connection_id, e);
                return;
            }
        };
        if let Err(e) = self.message_pusher.push_to(connection_id, &json).await {
            tracing::warn!("Reply to {} dropped: {}", connection_id, e);
        }
    }

    async fn targets(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        match self.strategy {
            BroadcastStrategy::Scan => {
                let mut targets = Vec::new();
                for connection_id in self.message_pusher.connected_ids().await {
                    let bound_here = self
                        .connection_repository
                        .lookup(&connection_id)
                        .await
                        .is_some_and(|binding| &binding.room_id == room_id);
                    if bound_here {
                        targets.push(connection_id);
                    }
                }
                targets
            }
            BroadcastStrategy::Indexed => {
                self.connection_repository.connections_in_room(room_id).await
            }
        }
    }
}

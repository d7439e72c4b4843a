//! UseCase: Room 参加処理（JOIN_ROOM）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - N 人の Room に参加すると N+1 人になり、ID が重複しないことを保証
//! - 同じ Room への二重参加、存在しない Room への参加が拒否されることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：既存 Room への参加
//! - 異常系：存在しない Room、同じ Room への再参加
//! - エッジケース：別の Room にいる接続からの参加（移動）

use std::sync::Arc;

use serde_json::Map;

use crate::{
    domain::{
        ConnectionBinding, ConnectionId, ConnectionRepository, Participant, ParticipantIdFactory,
        RoomRepository, Timestamp,
    },
    infrastructure::dto::websocket::{
        AssignmentPayload, JoinRoomPayload, RoomEventKind, ServerMessage,
    },
};

use super::{
    DisconnectParticipantUseCase, PayloadShape, ReconcileMode, RoomBroadcaster, SessionError,
    parse_room_id,
};

pub struct JoinRoomUseCase {
    room_repository: Arc<dyn RoomRepository>,
    connection_repository: Arc<dyn ConnectionRepository>,
    broadcaster: Arc<RoomBroadcaster>,
    disconnect: Arc<DisconnectParticipantUseCase>,
}

impl JoinRoomUseCase {
    pub fn new(
        room_repository: Arc<dyn RoomRepository>,
        connection_repository: Arc<dyn ConnectionRepository>,
        broadcaster: Arc<RoomBroadcaster>,
        disconnect: Arc<DisconnectParticipantUseCase>,
    ) -> Self {
        Self {
            room_repository,
            connection_repository,
            broadcaster,
            disconnect,
        }
    }

    /// 既存の Room に参加する
    ///
    /// `JOIN_SUCCESS` を返信し、Room に `UPDATED_ROOM` をブロードキャストする。
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        payload: JoinRoomPayload,
        now: Timestamp,
    ) -> Result<ConnectionBinding, SessionError> {
        // 1. Room の存在確認
        let room_id = parse_room_id(payload.room_id)?;
        if self.room_repository.get(&room_id).await.is_none() {
            return Err(SessionError::RoomNotFound(room_id.into_string()));
        }

        // 2. 同じ Room なら拒否、別の Room なら先に離脱
        if let Some(current) = self.connection_repository.lookup(connection_id).await {
            if current.room_id == room_id {
                return Err(SessionError::AlreadyJoined(room_id.into_string()));
            }
            self.disconnect
                .reconcile(connection_id, ReconcileMode::Leave)
                .await;
        }

        // 3. 新しい参加者 ID で参加してバインド
        let participant_id = ParticipantIdFactory::generate();
        let participant = Participant::new(
            participant_id.clone(),
            connection_id.clone(),
            payload.name,
            payload.location.map(Into::into),
            now,
        );
        self.room_repository
            .add_participant(&room_id, participant)
            .await?;
        let binding = ConnectionBinding::new(room_id.clone(), participant_id.clone());
        self.connection_repository
            .bind(connection_id.clone(), binding.clone())
            .await;

        // 4. 返信とブロードキャスト
        let room = self
            .room_repository
            .get(&room_id)
            .await
            .ok_or_else(|| SessionError::RoomNotFound(room_id.to_string()))?;
        let reply = ServerMessage::JoinSuccess(AssignmentPayload {
            room_id: room_id.as_str().to_string(),
            participant_id: participant_id.as_str().to_string(),
            state: (&room).into(),
        });
        self.broadcaster.reply(connection_id, &reply).await;
        self.broadcaster
            .broadcast(&room_id, RoomEventKind::UpdatedRoom, Map::new(), PayloadShape::Full)
            .await;

        tracing::info!(
            "{} joined room '{}' as {} ({} participants)",
            connection_id,
            room_id,
            participant_id,
            room.participants.len()
        );
        Ok(binding)
    }
}

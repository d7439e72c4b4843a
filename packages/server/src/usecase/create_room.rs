//! UseCase: Room 作成処理（CREATE_ROOM）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - CreateRoomUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - 作成者がオーナーとして Room に入り、接続がバインドされることを保証
//! - 既に別の Room にいる接続が作成した場合、前の Room に幽霊参加者が残らないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：位置・目的地付きの作成
//! - エッジケース：Room にいる接続からの再作成
//! - 異常系：Room ID の枯渇（前の Room にはそのまま残る）

use std::sync::Arc;

use serde_json::Map;

use crate::{
    domain::{
        ConnectionBinding, ConnectionId, ConnectionRepository, Participant, ParticipantIdFactory,
        RoomRepository, Timestamp,
    },
    infrastructure::dto::websocket::{
        AssignmentPayload, CreateRoomPayload, RoomEventKind, ServerMessage,
    },
};

use super::{
    DisconnectParticipantUseCase, PayloadShape, ReconcileMode, RoomBroadcaster, SessionError,
};

pub struct CreateRoomUseCase {
    room_repository: Arc<dyn RoomRepository>,
    connection_repository: Arc<dyn ConnectionRepository>,
    broadcaster: Arc<RoomBroadcaster>,
    disconnect: Arc<DisconnectParticipantUseCase>,
}

impl CreateRoomUseCase {
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

    /// Room を作成し、呼び出した接続をオーナーとして参加させる
    ///
    /// `CREATED_ROOM` を返信し、Room に `UPDATED_ROOM` をブロードキャストする。
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        payload: CreateRoomPayload,
        now: Timestamp,
    ) -> Result<ConnectionBinding, SessionError> {
        // 1. オーナーを参加者に含めた Room を作成
        let owner_id = ParticipantIdFactory::generate();
        let owner = Participant::new(
            owner_id.clone(),
            connection_id.clone(),
            payload.name,
            payload.location.map(Into::into),
            now,
        );
        let room_id = self
            .room_repository
            .create(owner, payload.destination.map(Into::into), now)
            .await?;

        // 2. ID を確保できてから前の Room を離脱し、新しい Room にバインド
        self.disconnect
            .reconcile(connection_id, ReconcileMode::Leave)
            .await;
        let binding = ConnectionBinding::new(room_id.clone(), owner_id.clone());
        self.connection_repository
            .bind(connection_id.clone(), binding.clone())
            .await;

        // 3. 返信とブロードキャスト
        let room = self
            .room_repository
            .get(&room_id)
            .await
            .ok_or_else(|| SessionError::RoomNotFound(room_id.to_string()))?;
        let reply = ServerMessage::CreatedRoom(AssignmentPayload {
            room_id: room_id.as_str().to_string(),
            participant_id: owner_id.as_str().to_string(),
            state: (&room).into(),
        });
        self.broadcaster.reply(connection_id, &reply).await;
        self.broadcaster
            .broadcast(&room_id, RoomEventKind::UpdatedRoom, Map::new(), PayloadShape::Full)
            .await;

        tracing::info!(
            "{} created room '{}' as owner {}",
            connection_id,
            room_id,
            owner_id
        );
        Ok(binding)
    }
}

//! UseCase: Room の終了（TERMINATE_ROOM）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - TerminateRoomUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - オーナー以外が Room を終了できないことを保証
//! - 終了後に Room・参加者・バインディングが全て消えることを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：オーナーによる終了
//! - 異常系：オーナー以外の参加者による終了、他人の ID を名乗った終了
//! - 異常系：存在しない Room の終了

use std::sync::Arc;

use serde_json::Map;

use crate::{
    domain::{ConnectionId, ConnectionRepository, RoomRepository},
    infrastructure::dto::websocket::{RoomEventKind, RoomMemberPayload},
};

use super::{
    DisconnectParticipantUseCase, PayloadShape, ReconcileMode, RoomBroadcaster, SessionError,
    parse_room_id,
};

pub struct TerminateRoomUseCase {
    room_repository: Arc<dyn RoomRepository>,
    connection_repository: Arc<dyn ConnectionRepository>,
    broadcaster: Arc<RoomBroadcaster>,
    disconnect: Arc<DisconnectParticipantUseCase>,
}

impl TerminateRoomUseCase {
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

    /// Room を終了し、掃除した接続数を返す
    ///
    /// 名乗った `participantId` がオーナーで、かつ呼び出した接続がそのオーナーに
    /// バインドされている場合だけ終了できる。接続自体は閉じない。
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        payload: RoomMemberPayload,
    ) -> Result<usize, SessionError> {
        // 1. Room の存在確認
        let room_id = parse_room_id(payload.room_id)?;
        let room = self
            .room_repository
            .get(&room_id)
            .await
            .ok_or_else(|| SessionError::RoomNotFound(room_id.to_string()))?;

        // 2. オーナー確認
        let caller_is_owner = self
            .connection_repository
            .lookup(connection_id)
            .await
            .is_some_and(|binding| {
                binding.room_id == room_id
                    && room.is_owner(&binding.participant_id)
                    && binding.participant_id.as_str() == payload.participant_id
            });
        if !caller_is_owner {
            tracing::warn!(
                "{} tried to terminate room '{}' without owning it",
                connection_id,
                room_id
            );
            return Err(SessionError::NotOwner(room_id.into_string()));
        }

        // 3. 終了を通知してから全員を掃除
        self.broadcaster
            .broadcast(
                &room_id,
                RoomEventKind::RoomTerminated,
                Map::new(),
                PayloadShape::Minimal,
            )
            .await;
        let members = self.connection_repository.connections_in_room(&room_id).await;
        for member in &members {
            self.disconnect.reconcile(member, ReconcileMode::Sweep).await;
        }

        // 4. Room を削除
        self.room_repository.delete(&room_id).await;
        tracing::info!(
            "Room '{}' terminated by owner, {} connection(s) released",
            room_id,
            members.len()
        );
        Ok(members.len())
    }
}

//! UseCase: Room からの離脱（LEAVE_ROOM）
//!
//! 接続は開いたまま、Room に入る前の状態に戻る。

use std::sync::Arc;

use crate::{
    domain::{ConnectionBinding, ConnectionId, ConnectionRepository, RoomRepository},
    infrastructure::dto::websocket::RoomMemberPayload,
};

use super::{
    DisconnectParticipantUseCase, ReconcileMode, SessionError, ensure_bound_participant,
    ensure_bound_room, parse_participant_id, parse_room_id,
};

pub struct LeaveRoomUseCase {
    room_repository: Arc<dyn RoomRepository>,
    connection_repository: Arc<dyn ConnectionRepository>,
    disconnect: Arc<DisconnectParticipantUseCase>,
}

impl LeaveRoomUseCase {
    pub fn new(
        room_repository: Arc<dyn RoomRepository>,
        connection_repository: Arc<dyn ConnectionRepository>,
        disconnect: Arc<DisconnectParticipantUseCase>,
    ) -> Self {
        Self {
            room_repository,
            connection_repository,
            disconnect,
        }
    }

    /// 接続自身の離脱だけを受け付け、通常の離脱処理を行う
    ///
    /// Room にいない接続からのメッセージは無視して `Ok(None)` を返す。
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        payload: RoomMemberPayload,
    ) -> Result<Option<ConnectionBinding>, SessionError> {
        let room_id = parse_room_id(payload.room_id)?;
        let participant_id = parse_participant_id(payload.participant_id)?;
        let Some(binding) = self.connection_repository.lookup(connection_id).await else {
            tracing::debug!("Ignoring leave from {}: not in a room", connection_id);
            return Ok(None);
        };
        ensure_bound_room(&binding, &room_id)?;
        ensure_bound_participant(&binding, &participant_id)?;

        let room = self
            .room_repository
            .get(&room_id)
            .await
            .ok_or_else(|| SessionError::RoomNotFound(room_id.to_string()))?;
        if room.participant(&participant_id).is_none() {
            return Err(SessionError::ParticipantNotFound(
                participant_id.into_string(),
            ));
        }

        Ok(self
            .disconnect
            .reconcile(connection_id, ReconcileMode::Leave)
            .await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::ConnectionRepository, usecase::test_support::Fixture};

    fn create_usecase(fixture: &Fixture) -> LeaveRoomUseCase {
        LeaveRoomUseCase::new(
            fixture.room_repository.clone(),
            fixture.connection_repository.clone(),
            fixture.disconnect.clone(),
        )
    }

    fn member(room_id: &str, participant_id: &str) -> RoomMemberPayload {
        RoomMemberPayload {
            room_id: room_id.to_string(),
            participant_id: participant_id.to_string(),
        }
    }

    #[tokio::test]
    async fn test_last_participant_leave_deletes_room() {
        // テスト項目: 唯一の参加者が離脱すると Room が削除される
        // given (前提条件):
        let fixture = Fixture::new();
        let usecase = create_usecase(&fixture);
        let (alice, _rx) = fixture.connect().await;
        let (room_id, alice_id) = fixture.seed_room(&alice, "A").await;

        // when (操作):
        let left = usecase
            .execute(&alice, member(room_id.as_str(), alice_id.as_str()))
            .await
            .unwrap();

        // then (期待する結果):
        assert!(left.is_some());
        assert!(fixture.room_repository.get(&room_id).await.is_none());
        assert!(fixture.connection_repository.lookup(&alice).await.is_none());
    }

    #[tokio::test]
    async fn test_leave_missing_room_or_participant() {
        // テスト項目: 存在しない Room / 参加者の離脱はエラーになり、状態は変わらない
        let fixture = Fixture::new();
        let usecase = create_usecase(&fixture);
        let (alice, _rx) = fixture.connect().await;
        let (room_id, alice_id) = fixture.seed_room(&alice, "A").await;

        let missing_room = usecase
            .execute(&alice, member("000000", alice_id.as_str()))
            .await;
        let missing_participant = usecase
            .execute(&alice, member(room_id.as_str(), "ghost"))
            .await;

        assert_eq!(
            missing_room,
            Err(SessionError::RoomNotFound("000000".to_string()))
        );
        assert_eq!(
            missing_participant,
            Err(SessionError::ParticipantNotFound("ghost".to_string()))
        );
        assert!(fixture.connection_repository.lookup(&alice).await.is_some());
    }

    #[tokio::test]
    async fn test_leave_other_room_or_participant_is_rejected() {
        // テスト項目: 別の Room や別の参加者を指定した離脱は拒否され、誰の状態も変わらない
        // given (前提条件): alice の Room に bob、carol は別の Room のオーナー
        let fixture = Fixture::new();
        let usecase = create_usecase(&fixture);
        let (alice, _alice_rx) = fixture.connect().await;
        let (bob, mut bob_rx) = fixture.connect().await;
        let (carol, mut carol_rx) = fixture.connect().await;
        let (room_x, alice_id) = fixture.seed_room(&alice, "A").await;
        let bob_id = fixture.seed_member(&room_x, &bob, "B").await;
        let (room_y, carol_id) = fixture.seed_room(&carol, "C").await;

        // when (操作):
        let other_room = usecase
            .execute(&bob, member(room_y.as_str(), carol_id.as_str()))
            .await;
        let other_participant = usecase
            .execute(&bob, member(room_x.as_str(), alice_id.as_str()))
            .await;

        // then (期待する結果):
        assert_eq!(
            other_room,
            Err(SessionError::RoomNotFound(room_y.to_string()))
        );
        assert_eq!(
            other_participant,
            Err(SessionError::ParticipantNotFound(alice_id.to_string()))
        );
        assert_eq!(
            fixture.connection_repository.lookup(&bob).await,
            Some(ConnectionBinding::new(room_x.clone(), bob_id))
        );
        let room_x_state = fixture.room_repository.get(&room_x).await.unwrap();
        assert!(room_x_state.participant(&alice_id).is_some());
        let room_y_state = fixture.room_repository.get(&room_y).await.unwrap();
        assert!(room_y_state.participant(&carol_id).is_some());
        assert!(Fixture::drain(&mut bob_rx).is_empty());
        assert!(Fixture::drain(&mut carol_rx).is_empty());
    }

    #[tokio::test]
    async fn test_leave_without_room_is_ignored() {
        // テスト項目: Room にいない接続からの離脱は無視され、指定された参加者は残る
        let fixture = Fixture::new();
        let usecase = create_usecase(&fixture);
        let (alice, _alice_rx) = fixture.connect().await;
        let (stranger, _stranger_rx) = fixture.connect().await;
        let (room_id, alice_id) = fixture.seed_room(&alice, "A").await;

        let result = usecase
            .execute(&stranger, member(room_id.as_str(), alice_id.as_str()))
            .await;

        assert_eq!(result, Ok(None));
        let room = fixture.room_repository.get(&room_id).await.unwrap();
        assert!(room.participant(&alice_id).is_some());
    }
}

//! UseCase: 経路の更新（UPDATE_ROUTE）

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::{
    domain::{ConnectionId, ConnectionRepository, RoomRepository, Route},
    infrastructure::dto::websocket::{RoomEventKind, UpdateRoutePayload},
};

use super::{
    PayloadShape, RoomBroadcaster, SessionError, ensure_bound_participant, ensure_bound_room,
    parse_participant_id, parse_room_id,
};

pub struct UpdateRouteUseCase {
    room_repository: Arc<dyn RoomRepository>,
    connection_repository: Arc<dyn ConnectionRepository>,
    broadcaster: Arc<RoomBroadcaster>,
}

impl UpdateRouteUseCase {
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

    /// 経路をそのまま保存し、`UPDATE_ROUTE` をブロードキャストする
    ///
    /// Room にいない接続からのメッセージは無視して `Ok(false)` を返す。
    /// 更新できるのは接続自身の経路だけで、別の Room や参加者を指定するとエラーになる。
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        payload: UpdateRoutePayload,
    ) -> Result<bool, SessionError> {
        let Some(binding) = self.connection_repository.lookup(connection_id).await else {
            tracing::debug!("Ignoring route from {}: not in a room", connection_id);
            return Ok(false);
        };

        let room_id = parse_room_id(payload.room_id)?;
        let participant_id = parse_participant_id(payload.participant_id)?;
        ensure_bound_room(&binding, &room_id)?;
        ensure_bound_participant(&binding, &participant_id)?;
        self.room_repository
            .update_route(&room_id, &participant_id, Route::new(payload.route.clone()))
            .await?;

        let mut extra = Map::new();
        extra.insert(
            "participantId".to_string(),
            Value::from(participant_id.as_str()),
        );
        extra.insert("route".to_string(), payload.route);
        self.broadcaster
            .broadcast(&room_id, RoomEventKind::UpdateRoute, extra, PayloadShape::Full)
            .await;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::usecase::test_support::Fixture;

    fn create_usecase(fixture: &Fixture) -> UpdateRouteUseCase {
        UpdateRouteUseCase::new(
            fixture.room_repository.clone(),
            fixture.connection_repository.clone(),
            fixture.broadcaster.clone(),
        )
    }

    #[tokio::test]
    async fn test_update_route_relays_route_verbatim() {
        // テスト項目: 経路が加工されずに保存・中継される
        // given (前提条件):
        let fixture = Fixture::new();
        let usecase = create_usecase(&fixture);
        let (alice, _alice_rx) = fixture.connect().await;
        let (bob, mut bob_rx) = fixture.connect().await;
        let (room_id, alice_id) = fixture.seed_room(&alice, "A").await;
        fixture.seed_member(&room_id, &bob, "B").await;
        let route = json!({
            "points": [[10.0, 20.0], [10.5, 20.5]],
            "durationSeconds": 600,
            "distanceMeters": 4200,
            "mode": "drive",
            "vendorExtra": {"anything": true}
        });

        // when (操作):
        let applied = usecase
            .execute(
                &alice,
                UpdateRoutePayload {
                    room_id: room_id.as_str().to_string(),
                    participant_id: alice_id.as_str().to_string(),
                    route: route.clone(),
                },
            )
            .await
            .unwrap();

        // then (期待する結果):
        assert!(applied);
        let room = fixture.room_repository.get(&room_id).await.unwrap();
        assert_eq!(
            room.participant(&alice_id).unwrap().route.as_ref().unwrap().as_value(),
            &route
        );
        let bob_msgs = Fixture::drain(&mut bob_rx);
        assert_eq!(bob_msgs[0]["type"], "UPDATE_ROUTE");
        assert_eq!(bob_msgs[0]["payload"]["participantId"], alice_id.as_str());
        assert_eq!(bob_msgs[0]["payload"]["route"], route);
        assert_eq!(
            bob_msgs[0]["payload"]["participants"][alice_id.as_str()]["route"],
            route
        );
    }

    #[tokio::test]
    async fn test_update_route_unknown_participant() {
        // テスト項目: 存在しない参加者の経路更新は PARTICIPANT_NOT_FOUND
        let fixture = Fixture::new();
        let usecase = create_usecase(&fixture);
        let (alice, _rx) = fixture.connect().await;
        let (room_id, _) = fixture.seed_room(&alice, "A").await;

        let result = usecase
            .execute(
                &alice,
                UpdateRoutePayload {
                    room_id: room_id.as_str().to_string(),
                    participant_id: "ghost".to_string(),
                    route: json!({}),
                },
            )
            .await;

        assert_eq!(
            result,
            Err(SessionError::ParticipantNotFound("ghost".to_string()))
        );
    }

    #[tokio::test]
    async fn test_update_route_unknown_room() {
        // テスト項目: 存在しない Room の経路更新は ROOM_NOT_FOUND
        let fixture = Fixture::new();
        let usecase = create_usecase(&fixture);
        let (alice, _rx) = fixture.connect().await;
        let (_, alice_id) = fixture.seed_room(&alice, "A").await;

        let result = usecase
            .execute(
                &alice,
                UpdateRoutePayload {
                    room_id: "000000".to_string(),
                    participant_id: alice_id.as_str().to_string(),
                    route: json!({}),
                },
            )
            .await;

        assert_eq!(result, Err(SessionError::RoomNotFound("000000".to_string())));
    }

    #[tokio::test]
    async fn test_update_route_rejects_other_room_and_participant() {
        // テスト項目: 別の Room や別の参加者を指定した経路更新は拒否され、何も配送されない
        // given (前提条件): alice の Room に bob、carol は別の Room のオーナー
        let fixture = Fixture::new();
        let usecase = create_usecase(&fixture);
        let (alice, mut alice_rx) = fixture.connect().await;
        let (bob, mut bob_rx) = fixture.connect().await;
        let (carol, mut carol_rx) = fixture.connect().await;
        let (room_x, alice_id) = fixture.seed_room(&alice, "A").await;
        fixture.seed_member(&room_x, &bob, "B").await;
        let (room_y, carol_id) = fixture.seed_room(&carol, "C").await;
        let request = |room_id: &str, participant_id: &str| UpdateRoutePayload {
            room_id: room_id.to_string(),
            participant_id: participant_id.to_string(),
            route: json!({"evil": true}),
        };

        // when (操作):
        let other_room = usecase
            .execute(&bob, request(room_y.as_str(), carol_id.as_str()))
            .await;
        let other_participant = usecase
            .execute(&bob, request(room_x.as_str(), alice_id.as_str()))
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
        let room_y_state = fixture.room_repository.get(&room_y).await.unwrap();
        assert!(room_y_state.participant(&carol_id).unwrap().route.is_none());
        let room_x_state = fixture.room_repository.get(&room_x).await.unwrap();
        assert!(room_x_state.participant(&alice_id).unwrap().route.is_none());
        assert!(Fixture::drain(&mut alice_rx).is_empty());
        assert!(Fixture::drain(&mut bob_rx).is_empty());
        assert!(Fixture::drain(&mut carol_rx).is_empty());
    }
}

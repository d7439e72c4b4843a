//! Session Router
//!
//! 接続ごとの `connected → message* → closed` イベントを受け取り、
//! メッセージ種別ごとのユースケースに振り分ける。エラーを `ERROR` メッセージに
//! 変換して送信者に返すのはここだけ。

use std::sync::Arc;

use convoy_shared::time::Clock;

use crate::{
    config::BroadcastStrategy,
    domain::{
        ConnectionId, ConnectionRepository, MessagePusher, PusherChannel, RoomRepository,
        Timestamp,
    },
    infrastructure::dto::websocket::{ClientMessage, ServerMessage},
};

use super::{
    CreateRoomUseCase, DisconnectParticipantUseCase, GetRoomDetailsUseCase, JoinRoomUseCase,
    LeaveRoomUseCase, ReconcileMode, RoomBroadcaster, SessionError, TerminateRoomUseCase,
    UpdateLocationUseCase, UpdateRouteUseCase,
};

pub struct SessionRouter {
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
    broadcaster: Arc<RoomBroadcaster>,
    disconnect: Arc<DisconnectParticipantUseCase>,
    create_room: CreateRoomUseCase,
    join_room: JoinRoomUseCase,
    update_location: UpdateLocationUseCase,
    update_route: UpdateRouteUseCase,
    leave_room: LeaveRoomUseCase,
    get_room_details: GetRoomDetailsUseCase,
    terminate_room: TerminateRoomUseCase,
}

impl SessionRouter {
    pub fn new(
        room_repository: Arc<dyn RoomRepository>,
        connection_repository: Arc<dyn ConnectionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
        strategy: BroadcastStrategy,
    ) -> Self {
        let broadcaster = Arc::new(RoomBroadcaster::new(
            room_repository.clone(),
            connection_repository.clone(),
            message_pusher.clone(),
            strategy,
        ));
        let disconnect = Arc::new(DisconnectParticipantUseCase::new(
            room_repository.clone(),
            connection_repository.clone(),
            broadcaster.clone(),
        ));

        Self {
            create_room: CreateRoomUseCase::new(
                room_repository.clone(),
                connection_repository.clone(),
                broadcaster.clone(),
                disconnect.clone(),
            ),
            join_room: JoinRoomUseCase::new(
                room_repository.clone(),
                connection_repository.clone(),
                broadcaster.clone(),
                disconnect.clone(),
            ),
            update_location: UpdateLocationUseCase::new(
                room_repository.clone(),
                connection_repository.clone(),
                broadcaster.clone(),
            ),
            update_route: UpdateRouteUseCase::new(
                room_repository.clone(),
                connection_repository.clone(),
                broadcaster.clone(),
            ),
            leave_room: LeaveRoomUseCase::new(
                room_repository.clone(),
                connection_repository.clone(),
                disconnect.clone(),
            ),
            get_room_details: GetRoomDetailsUseCase::new(
                room_repository.clone(),
                connection_repository.clone(),
                broadcaster.clone(),
            ),
            terminate_room: TerminateRoomUseCase::new(
                room_repository,
                connection_repository,
                broadcaster.clone(),
                disconnect.clone(),
            ),
            message_pusher,
            clock,
            broadcaster,
            disconnect,
        }
    }

    /// 新しい接続の送信チャンネルを登録
    pub async fn on_connect(&self, connection_id: ConnectionId, sender: PusherChannel) {
        tracing::info!("{} connected", connection_id);
        self.message_pusher
            .register_client(connection_id, sender)
            .await;
    }

    /// 受信したテキストフレームを処理
    pub async fn handle(&self, connection_id: &ConnectionId, raw: &str) {
        let result = match ClientMessage::parse(raw) {
            Ok(message) => {
                tracing::debug!("{} sent {}", connection_id, message.type_name());
                self.dispatch(connection_id, message).await
            }
            Err(e) => Err(SessionError::from(e)),
        };

        if let Err(e) = result {
            tracing::warn!("Rejected message from {}: {}", connection_id, e);
            self.broadcaster
                .reply(connection_id, &ServerMessage::error(e.to_string(), e.code()))
                .await;
        }
    }

    /// 接続が閉じた（正常・異常どちらも）
    pub async fn on_close(&self, connection_id: &ConnectionId) {
        self.disconnect
            .reconcile(connection_id, ReconcileMode::Disconnect)
            .await;
        self.message_pusher.unregister_client(connection_id).await;
        tracing::info!("{} disconnected", connection_id);
    }

    async fn dispatch(
        &self,
        connection_id: &ConnectionId,
        message: ClientMessage,
    ) -> Result<(), SessionError> {
        let now = Timestamp::new(self.clock.now_millis());
        match message {
            ClientMessage::CreateRoom(payload) => {
                self.create_room.execute(connection_id, payload, now).await?;
            }
            ClientMessage::JoinRoom(payload) => {
                self.join_room.execute(connection_id, payload, now).await?;
            }
            ClientMessage::UpdateLocation(payload) => {
                self.update_location
                    .execute(connection_id, payload, now)
                    .await;
            }
            ClientMessage::UpdateRoute(payload) => {
                self.update_route.execute(connection_id, payload).await?;
            }
            ClientMessage::LeaveRoom(payload) => {
                self.leave_room.execute(connection_id, payload).await?;
            }
            ClientMessage::GetRoomDetails(payload) => {
                self.get_room_details.execute(connection_id, payload).await?;
            }
            ClientMessage::TerminateRoom(payload) => {
                self.terminate_room.execute(connection_id, payload).await?;
            }
        }
        Ok(())
    }
}

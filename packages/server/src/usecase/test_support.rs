//! ユースケースのテストで共有するフィクスチャ

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;

use crate::{
    config::BroadcastStrategy,
    domain::{
        ConnectionBinding, ConnectionId, ConnectionIdFactory, ConnectionRepository,
        MessagePusher, Participant, ParticipantId, ParticipantIdFactory, RandomRoomIdGenerator,
        RoomId, RoomRepository, Timestamp,
    },
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryConnectionRepository, InMemoryRoomRepository},
    },
};

use super::{DisconnectParticipantUseCase, RoomBroadcaster};

pub const T0: i64 = 1_700_000_000_000;

pub struct Fixture {
    pub room_repository: Arc<InMemoryRoomRepository>,
    pub connection_repository: Arc<InMemoryConnectionRepository>,
    pub message_pusher: Arc<WebSocketMessagePusher>,
    pub broadcaster: Arc<RoomBroadcaster>,
    pub disconnect: Arc<DisconnectParticipantUseCase>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_strategy(BroadcastStrategy::Scan)
    }

    pub fn with_strategy(strategy: BroadcastStrategy) -> Self {
        let room_repository = Arc::new(InMemoryRoomRepository::new(Arc::new(
            RandomRoomIdGenerator,
        )));
        let connection_repository = Arc::new(InMemoryConnectionRepository::new());
        let message_pusher = Arc::new(WebSocketMessagePusher::new());
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
            room_repository,
            connection_repository,
            message_pusher,
            broadcaster,
            disconnect,
        }
    }

    /// 新しい接続を登録し、その受信側を返す
    pub async fn connect(&self) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let connection_id = ConnectionIdFactory::generate();
        let (tx, rx) = mpsc::unbounded_channel();
        self.message_pusher
            .register_client(connection_id.clone(), tx)
            .await;
        (connection_id, rx)
    }

    /// 接続をオーナーとする Room を直接作成する
    pub async fn seed_room(&self, connection_id: &ConnectionId, name: &str) -> (RoomId, ParticipantId) {
        let owner_id = ParticipantIdFactory::generate();
        let room_id = self
            .room_repository
            .create(
                Self::participant(owner_id.clone(), connection_id, name),
                None,
                Timestamp::new(T0),
            )
            .await
            .unwrap();
        self.bind(&room_id, owner_id.clone(), connection_id).await;
        (room_id, owner_id)
    }

    /// 既存の Room に接続を参加させる
    pub async fn seed_member(
        &self,
        room_id: &RoomId,
        connection_id: &ConnectionId,
        name: &str,
    ) -> ParticipantId {
        let participant_id = ParticipantIdFactory::generate();
        self.room_repository
            .add_participant(
                room_id,
                Self::participant(participant_id.clone(), connection_id, name),
            )
            .await
            .unwrap();
        self.bind(room_id, participant_id.clone(), connection_id)
            .await;
        participant_id
    }

    fn participant(
        participant_id: ParticipantId,
        connection_id: &ConnectionId,
        name: &str,
    ) -> Participant {
        Participant::new(
            participant_id,
            connection_id.clone(),
            name.to_string(),
            None,
            Timestamp::new(T0),
        )
    }

    async fn bind(
        &self,
        room_id: &RoomId,
        participant_id: ParticipantId,
        connection_id: &ConnectionId,
    ) {
        self.connection_repository
            .bind(
                connection_id.clone(),
                ConnectionBinding::new(room_id.clone(), participant_id),
            )
            .await;
    }

    /// 受信済みのメッセージを全て取り出して JSON にする
    pub fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<Value> {
        let mut messages = Vec::new();
        while let Ok(text) = rx.try_recv() {
            messages.push(serde_json::from_str(&text).unwrap());
        }
        messages
    }
}

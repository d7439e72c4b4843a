//! InMemory Connection Repository 実装
//!
//! 接続 ID → (room, participant) のバインディングに加えて、Room ごとの接続 ID の索引を保持します。
//! 索引は `indexed` ブロードキャスト戦略で使われます。

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionBinding, ConnectionId, ConnectionRepository, RoomId};

#[derive(Default)]
struct Bindings {
    by_connection: HashMap<ConnectionId, ConnectionBinding>,
    by_room: HashMap<RoomId, HashSet<ConnectionId>>,
}

impl Bindings {
    fn detach(&mut self, connection_id: &ConnectionId) -> Option<ConnectionBinding> {
        let previous = self.by_connection.remove(connection_id)?;
        if let Some(members) = self.by_room.get_mut(&previous.room_id) {
            members.remove(connection_id);
            if members.is_empty() {
                self.by_room.remove(&previous.room_id);
            }
        }
        Some(previous)
    }
}

/// インメモリ Connection Repository 実装
#[derive(Default)]
pub struct InMemoryConnectionRepository {
    bindings: Mutex<Bindings>,
}

impl InMemoryConnectionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionRepository for InMemoryConnectionRepository {
    async fn bind(
        &self,
        connection_id: ConnectionId,
        binding: ConnectionBinding,
    ) -> Option<ConnectionBinding> {
        let mut bindings = self.bindings.lock().await;
        // 接続が同時に 2 つの Room に属さないよう、古いバインディングを先に外す
        let previous = bindings.detach(&connection_id);
        bindings
            .by_room
            .entry(binding.room_id.clone())
            .or_default()
            .insert(connection_id.clone());
        bindings.by_connection.insert(connection_id, binding);
        previous
    }

    async fn lookup(&self, connection_id: &ConnectionId) -> Option<ConnectionBinding> {
        let bindings = self.bindings.lock().await;
        bindings.by_connection.get(connection_id).cloned()
    }

    async fn unbind(&self, connection_id: &ConnectionId) -> Option<ConnectionBinding> {
        let mut bindings = self.bindings.lock().await;
        bindings.detach(connection_id)
    }

    async fn connections_in_room(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        let bindings = self.bindings.lock().await;
        bindings
            .by_room
            .get(room_id)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default()
    }

    async fn list(&self) -> Vec<(ConnectionId, ConnectionBinding)> {
        let bindings = self.bindings.lock().await;
        bindings
            .by_connection
            .iter()
            .map(|(id, binding)| (id.clone(), binding.clone()))
            .collect()
    }
}

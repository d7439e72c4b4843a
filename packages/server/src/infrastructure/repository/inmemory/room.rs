//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! HashMap をインメモリ DB として使用します。プロセスが再起動すると全て消えます。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Coordinate, Participant, ParticipantId, RepositoryError, Room, RoomId, RoomIdGenerator,
    RoomRepository, Route, Timestamp,
};

/// ID 衝突時の再生成の上限
pub const MAX_ROOM_ID_ATTEMPTS: usize = 32;

/// インメモリ Room Repository 実装
pub struct InMemoryRoomRepository {
    /// Room ID → Room
    rooms: Mutex<HashMap<RoomId, Room>>,
    /// Room ID の生成器
    id_generator: Arc<dyn RoomIdGenerator>,
}

impl InMemoryRoomRepository {
    /// 新しい InMemoryRoomRepository を作成
    pub fn new(id_generator: Arc<dyn RoomIdGenerator>) -> Self {
        Self {
            rooms: Mutex::new(HashMap::new()),
            id_generator,
        }
    }

    /// ライブな Room と衝突しない ID を生成する
    fn generate_unique_room_id(
        &self,
        existing: &HashMap<RoomId, Room>,
    ) -> Result<RoomId, RepositoryError> {
        for _ in 0..MAX_ROOM_ID_ATTEMPTS {
            let candidate = self.id_generator.generate();
            if !existing.contains_key(&candidate) {
                return Ok(candidate);
            }
            tracing::debug!("Room id '{}' is already live, regenerating", candidate);
        }
        Err(RepositoryError::RoomIdExhausted(MAX_ROOM_ID_ATTEMPTS))
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn create(
        &self,
        owner: Participant,
        destination: Option<Coordinate>,
        created_at: Timestamp,
    ) -> Result<RoomId, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let room_id = self.generate_unique_room_id(&rooms)?;
        let mut room = Room::new(room_id.clone(), owner.id.clone(), destination, created_at);
        room.participants.insert(owner.id.clone(), owner);
        rooms.insert(room_id.clone(), room);
        Ok(room_id)
    }

    async fn get(&self, room_id: &RoomId) -> Option<Room> {
        let rooms = self.rooms.lock().await;
        rooms.get(room_id).cloned()
    }

    async fn delete(&self, room_id: &RoomId) -> Option<Room> {
        let mut rooms = self.rooms.lock().await;
        rooms.remove(room_id)
    }

    async fn add_participant(
        &self,
        room_id: &RoomId,
        participant: Participant,
    ) -> Result<(), RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.to_string()))?;
        room.participants
            .insert(participant.id.clone(), participant);
        Ok(())
    }

    async fn remove_participant(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
    ) -> Result<(Participant, bool), RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .get_mut(room_id)
            .ok_or_else(|| RepositoryError::RoomNotFound(room_id.to_string()))?;
        let removed = room
            .participants
            .remove(participant_id)
            .ok_or_else(|| RepositoryError::ParticipantNotFound(participant_id.to_string()))?;
        Ok((removed, room.is_empty()))
    }

    async fn update_location(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
        location: Coordinate,
        updated_at: Timestamp,
    ) -> Result<(), RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let participant = find_participant_mut(&mut rooms, room_id, participant_id)?;
        participant.location = Some(location);
        participant.last_updated_at = updated_at;
        Ok(())
    }

    async fn update_route(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
        route: Route,
    ) -> Result<(), RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let participant = find_participant_mut(&mut rooms, room_id, participant_id)?;
        participant.route = Some(route);
        Ok(())
    }

    async fn list(&self) -> Vec<Room> {
        let rooms = self.rooms.lock().await;
        rooms.values().cloned().collect()
    }
}

fn find_participant_mut<'a>(
    rooms: &'a mut HashMap<RoomId, Room>,
    room_id: &RoomId,
    participant_id: &ParticipantId,
) -> Result<&'a mut Participant, RepositoryError> {
    rooms
        .get_mut(room_id)
        .ok_or_else(|| RepositoryError::RoomNotFound(room_id.to_string()))?
        .participants
        .get_mut(participant_id)
        .ok_or_else(|| RepositoryError::ParticipantNotFound(participant_id.to_string()))
}

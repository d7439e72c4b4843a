//! ID の生成
//!
//! 参加者 ID と接続 ID は UUID v4、Room ID は共有しやすい 6 桁の数字。

use rand::Rng;
use uuid::Uuid;

use super::value_object::{ConnectionId, ParticipantId, RoomId};

/// Room ID の桁数
pub const ROOM_ID_DIGITS: usize = 6;

/// Room ID の生成器
///
/// 衝突チェックは Repository 側で行う。テストでは決まった順序の ID を返す実装に差し替える。
pub trait RoomIdGenerator: Send + Sync {
    fn generate(&self) -> RoomId;
}

/// 乱数による 6 桁の Room ID 生成器
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomRoomIdGenerator;

impl RoomIdGenerator for RandomRoomIdGenerator {
    fn generate(&self) -> RoomId {
        let value: u32 = rand::thread_rng().gen_range(0..10u32.pow(ROOM_ID_DIGITS as u32));
        RoomId(format!("{:0width$}", value, width = ROOM_ID_DIGITS))
    }
}

pub struct ParticipantIdFactory;

impl ParticipantIdFactory {
    pub fn generate() -> ParticipantId {
        ParticipantId(Uuid::new_v4().to_string())
    }
}

pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    pub fn generate() -> ConnectionId {
        ConnectionId(Uuid::new_v4().to_string())
    }
}

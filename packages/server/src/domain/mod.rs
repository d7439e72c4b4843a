//! Domain layer: entities, value objects, and the interfaces the use cases depend on.

pub mod entity;
pub mod error;
pub mod factory;
pub mod pusher;
pub mod repository;
pub mod value_object;

pub use entity::{ConnectionBinding, Coordinate, Participant, Room, Route};
pub use error::{MessagePushError, RepositoryError, ValueObjectError};
pub use factory::{
    ConnectionIdFactory, ParticipantIdFactory, ROOM_ID_DIGITS, RandomRoomIdGenerator,
    RoomIdGenerator,
};
pub use pusher::{MessagePusher, PusherChannel};
pub use repository::{ConnectionRepository, RoomRepository};
pub use value_object::{ConnectionId, ParticipantId, RoomId, Timestamp};

#[cfg(test)]
pub use pusher::MockMessagePusher;

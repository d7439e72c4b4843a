//! InMemory Repository 実装

pub mod connection;
pub mod room;

pub use connection::InMemoryConnectionRepository;
pub use room::InMemoryRoomRepository;

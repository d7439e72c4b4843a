//! HTTP and WebSocket handlers.

mod http;
mod websocket;

pub use http::{debug_connections, debug_rooms, health_check, room_destination};
pub use websocket::websocket_handler;

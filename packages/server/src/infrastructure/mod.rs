//! Infrastructure layer: in-memory registries, WebSocket delivery, and DTOs.

pub mod dto;
pub mod message_pusher;
pub mod repository;

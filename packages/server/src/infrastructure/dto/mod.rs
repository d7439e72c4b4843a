//! Data Transfer Objects (DTOs).
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket message DTOs (inbound envelope and outbound events)
//! - `http`: HTTP diagnostic response DTOs
//! - `conversion`: Domain Model → DTO conversion

pub mod conversion;
pub mod http;
pub mod websocket;

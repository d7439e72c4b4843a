//! WebSocket / HTTP server implementation.

mod handler;
pub mod hub;
mod server;
mod signal;
pub mod state;

pub use server::Server;

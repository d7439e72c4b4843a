//! Convoy location sharing server.
//!
//! Participants join short-lived rooms over WebSocket and receive everyone
//! else's live location.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin convoy-server
//! cargo run --bin convoy-server -- --host 0.0.0.0 --port 3001 --broadcast-strategy indexed
//! ```

use std::sync::Arc;

use clap::Parser;
use convoy_server::{
    config::{BroadcastStrategy, ServerConfig},
    domain::RandomRoomIdGenerator,
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryConnectionRepository, InMemoryRoomRepository},
    },
    ui::Server,
};
use convoy_shared::{logger::setup_logger, time::SystemClock};

#[derive(Parser, Debug)]
#[command(name = "convoy-server")]
#[command(about = "Ephemeral location sharing rooms over WebSocket", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "CONVOY_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "CONVOY_PORT", default_value = "3001")]
    port: u16,

    /// How broadcast recipients are resolved
    #[arg(long, env = "CONVOY_BROADCAST_STRATEGY", value_enum, default_value_t = BroadcastStrategy::Scan)]
    broadcast_strategy: BroadcastStrategy,

    /// Default log level when RUST_LOG is not set
    #[arg(long, env = "CONVOY_LOG_LEVEL", default_value = "debug")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(&[env!("CARGO_PKG_NAME"), "convoy-shared"], &args.log_level);

    // Initialize dependencies in order:
    // 1. Repositories
    // 2. MessagePusher
    // 3. Server

    // 1. Create Repositories (in-memory, nothing survives a restart)
    let room_repository = Arc::new(InMemoryRoomRepository::new(Arc::new(
        RandomRoomIdGenerator,
    )));
    let connection_repository = Arc::new(InMemoryConnectionRepository::new());

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Create and run the server
    let config = ServerConfig::new(args.host, args.port, args.broadcast_strategy);
    let server = Server::new(
        config,
        room_repository,
        connection_repository,
        message_pusher,
        Arc::new(SystemClock),
    );
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

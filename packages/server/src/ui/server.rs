//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use convoy_shared::time::Clock;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    domain::{ConnectionRepository, MessagePusher, RoomRepository},
    usecase::SessionRouter,
};

use super::{
    handler::{
        debug_connections, debug_rooms, health_check, room_destination, websocket_handler,
    },
    hub::spawn_hub,
    signal::shutdown_signal,
    state::AppState,
};

/// Location-sharing server
///
/// # Example
///
/// ```ignore
/// let server = Server::new(
///     ServerConfig::default(),
///     room_repository,
///     connection_repository,
///     message_pusher,
///     Arc::new(SystemClock),
/// );
/// server.run().await?;
/// ```
pub struct Server {
    config: ServerConfig,
    /// Room Registry
    room_repository: Arc<dyn RoomRepository>,
    /// Connection Registry
    connection_repository: Arc<dyn ConnectionRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl Server {
    pub fn new(
        config: ServerConfig,
        room_repository: Arc<dyn RoomRepository>,
        connection_repository: Arc<dyn ConnectionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            room_repository,
            connection_repository,
            message_pusher,
            clock,
        }
    }

    /// Bind to the configured address and serve until Ctrl+C / SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the configured address or
    /// if there's an error during server execution.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = self.config.bind_addr();
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!(
            "Location sharing server listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!(
            "Broadcast strategy: {}",
            self.config.broadcast_strategy
        );
        let router = SessionRouter::new(
            self.room_repository.clone(),
            self.connection_repository.clone(),
            self.message_pusher,
            self.clock,
            self.config.broadcast_strategy,
        );
        let (hub, hub_task) = spawn_hub(router);

        let app_state = Arc::new(AppState {
            hub,
            room_repository: self.room_repository,
            connection_repository: self.connection_repository,
        });

        let app = Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms/{room_id}/destination", get(room_destination))
            .route("/debug/rooms", get(debug_rooms))
            .route("/debug/connections", get(debug_connections))
            .layer(TraceLayer::new_for_http())
            .with_state(app_state);

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;
        hub_task.abort();
        result
    }
}

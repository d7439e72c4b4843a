//! Server configuration

use clap::ValueEnum;

/// How broadcast recipients are resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum BroadcastStrategy {
    /// Walk every live connection and keep those bound to the room
    #[default]
    Scan,
    /// Ask the connection registry for its per-room index
    Indexed,
}

impl std::fmt::Display for BroadcastStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scan => f.write_str("scan"),
            Self::Indexed => f.write_str("indexed"),
        }
    }
}

/// Runtime settings for [`crate::ui::Server`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub broadcast_strategy: BroadcastStrategy,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16, broadcast_strategy: BroadcastStrategy) -> Self {
        Self {
            host: host.into(),
            port,
            broadcast_strategy,
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new("127.0.0.1", 3001, BroadcastStrategy::default())
    }
}

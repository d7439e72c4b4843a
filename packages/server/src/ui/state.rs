//! Shared application state.

use std::sync::Arc;

use crate::domain::{ConnectionRepository, RoomRepository};

use super::hub::HubHandle;

pub struct AppState {
    /// Session hub（全てのソケットイベントの送り先）
    pub hub: HubHandle,
    /// Room Registry（診断用の読み取り専用）
    pub room_repository: Arc<dyn RoomRepository>,
    /// Connection Registry（診断用の読み取り専用）
    pub connection_repository: Arc<dyn ConnectionRepository>,
}

//! MessagePusher trait 定義
//!
//! 接続へのメッセージ送信（通知）を抽象化します。
//! 送信はノンブロッキングなキュー投入で、失敗してもリトライしません。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError};

/// 接続ごとの送信チャンネル
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// 接続の送信チャンネルを登録
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// 接続の送信チャンネルを登録解除
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 現在開いている全ての接続 ID
    async fn connected_ids(&self) -> Vec<ConnectionId>;

    /// 特定の接続に送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// 複数の接続に送信し、実際に配送できた件数を返す
    ///
    /// 閉じた接続や見つからない接続はスキップする。
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<usize, MessagePushError>;
}

//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - WebSocket 接続ごとの `UnboundedSender` を管理
//! - 接続へのメッセージ送信（push_to, broadcast）
//!
//! ## 設計ノート
//!
//! WebSocket の受付と送信ループは UI 層（`ui/handler/websocket.rs`）が持ちます。
//! この実装は生成された `UnboundedSender` を受け取り、キューに積むだけです。
//! 送信はブロックせず、閉じた接続への送信はスキップしてリトライしません。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel};

/// WebSocket を使った MessagePusher 実装
///
/// ## 使用例
///
/// ```ignore
/// let pusher = WebSocketMessagePusher::new();
/// pusher.register_client(connection_id.clone(), tx).await;
/// pusher.push_to(&connection_id, "{\"type\":\"ERROR\",\"payload\":{}}").await?;
/// ```
#[derive(Default)]
pub struct WebSocketMessagePusher {
    /// 接続中のクライアントの WebSocket sender
    clients: Mutex<HashMap<ConnectionId, PusherChannel>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        tracing::debug!("Connection '{}' registered to MessagePusher", connection_id);
        clients.insert(connection_id, sender);
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        let mut clients = self.clients.lock().await;
        clients.remove(connection_id);
        tracing::debug!(
            "Connection '{}' unregistered from MessagePusher",
            connection_id
        );
    }

    async fn connected_ids(&self) -> Vec<ConnectionId> {
        let clients = self.clients.lock().await;
        clients
            .iter()
            .filter(|(_, sender)| !sender.is_closed())
            .map(|(id, _)| id.clone())
            .collect()
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;

        let sender = clients
            .get(connection_id)
            .ok_or_else(|| MessagePushError::ClientNotFound(connection_id.to_string()))?;
        sender
            .send(content.to_string())
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!("Pushed message to connection '{}'", connection_id);
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<usize, MessagePushError> {
        let clients = self.clients.lock().await;
        let mut delivered = 0;

        for target in targets {
            match clients.get(&target) {
                // 半開き・切断済みの接続はスキップ（リトライしない）
                Some(sender) if sender.is_closed() => {
                    tracing::debug!("Connection '{}' is closed, skipping", target);
                }
                Some(sender) => {
                    if let Err(e) = sender.send(content.to_string()) {
                        tracing::warn!("Failed to push message to connection '{}': {}", target, e);
                    } else {
                        delivered += 1;
                    }
                }
                None => {
                    tracing::warn!(
                        "Connection '{}' not found during broadcast, skipping",
                        target
                    );
                }
            }
        }

        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - push_to: 特定の接続への送信
    // - broadcast: 複数接続への送信と、閉じた接続・未登録の接続のスキップ
    // - connected_ids: 開いている接続のみが列挙されること
    // ========================================

    fn conn(value: &str) -> ConnectionId {
        ConnectionId::new(value.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_push_to_success() {
        // テスト項目: 特定の接続にメッセージを送信できる
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        pusher.register_client(conn("c1"), tx).await;

        // when (操作):
        let result = pusher.push_to(&conn("c1"), "Hello").await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(rx.recv().await, Some("Hello".to_string()));
    }

    #[tokio::test]
    async fn test_push_to_client_not_found() {
        // テスト項目: 存在しない接続への送信はエラーを返す
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();

        // when (操作):
        let result = pusher.push_to(&conn("nonexistent"), "Hello").await;

        // then (期待する結果):
        assert!(matches!(result, Err(MessagePushError::ClientNotFound(_))));
    }

    #[tokio::test]
    async fn test_broadcast_success() {
        // テスト項目: 複数の接続にメッセージをブロードキャストできる
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        pusher.register_client(conn("c1"), tx1).await;
        pusher.register_client(conn("c2"), tx2).await;

        // when (操作):
        let result = pusher
            .broadcast(vec![conn("c1"), conn("c2")], "Broadcast message")
            .await;

        // then (期待する結果):
        assert_eq!(result, Ok(2));
        assert_eq!(rx1.recv().await, Some("Broadcast message".to_string()));
        assert_eq!(rx2.recv().await, Some("Broadcast message".to_string()));
    }

    #[tokio::test]
    async fn test_broadcast_skips_closed_and_unknown_connections() {
        // テスト項目: 閉じた接続・未登録の接続はスキップされ、他の接続には届く
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx_open, mut rx_open) = mpsc::unbounded_channel();
        let (tx_closed, rx_closed) = mpsc::unbounded_channel();
        pusher.register_client(conn("open"), tx_open).await;
        pusher.register_client(conn("closed"), tx_closed).await;
        drop(rx_closed);

        // when (操作):
        let result = pusher
            .broadcast(
                vec![conn("open"), conn("closed"), conn("unknown")],
                "Broadcast message",
            )
            .await;

        // then (期待する結果): ブロードキャストは部分失敗を許容
        assert_eq!(result, Ok(1));
        assert_eq!(rx_open.recv().await, Some("Broadcast message".to_string()));
    }

    #[tokio::test]
    async fn test_connected_ids_excludes_closed_channels() {
        // テスト項目: connected_ids は開いている接続のみを返す
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx_open, _rx_open) = mpsc::unbounded_channel();
        let (tx_closed, rx_closed) = mpsc::unbounded_channel();
        pusher.register_client(conn("open"), tx_open).await;
        pusher.register_client(conn("closed"), tx_closed).await;
        drop(rx_closed);

        // when (操作):
        let ids = pusher.connected_ids().await;

        // then (期待する結果):
        assert_eq!(ids, vec![conn("open")]);
    }

    #[tokio::test]
    async fn test_unregister_client() {
        // テスト項目: 登録解除した接続には送信できない
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        pusher.register_client(conn("c1"), tx).await;

        // when (操作):
        pusher.unregister_client(&conn("c1")).await;

        // then (期待する結果):
        assert!(pusher.connected_ids().await.is_empty());
        assert!(pusher.push_to(&conn("c1"), "Hello").await.is_err());
    }
}

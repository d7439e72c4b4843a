//! UseCase: 参加者の離脱・切断・Room 終了時の後始末
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectParticipantUseCase::reconcile() メソッド
//! - 離脱（Leave）、切断（Disconnect）、終了時の掃除（Sweep）の 3 つのモード
//!
//! ### なぜこのテストが必要か
//! - 残った参加者に離脱が通知されることを保証
//! - 最後の参加者がいなくなった Room が削除されることを保証
//! - バインディングが必ず最後に削除され、幽霊参加者が残らないことを確認
//!
//! ### どのような状況を想定しているか
//! - 正常系：複数人の Room からの離脱と通知
//! - エッジケース：最後の参加者の離脱（Room 削除）
//! - エッジケース：バインドされていない接続、既に消えた Room

use std::sync::Arc;

use serde_json::{Map, json};

use crate::{
    domain::{ConnectionBinding, ConnectionId, ConnectionRepository, RoomRepository},
    infrastructure::dto::websocket::RoomEventKind,
};

use super::{PayloadShape, RoomBroadcaster};

/// 後始末のモード
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileMode {
    /// LEAVE_ROOM による通常の離脱
    Leave,
    /// ソケットが閉じた
    Disconnect,
    /// Room 終了時の掃除（通知も Room 削除もしない）
    Sweep,
}

/// 参加者切断のユースケース
pub struct DisconnectParticipantUseCase {
    /// Room Registry
    room_repository: Arc<dyn RoomRepository>,
    /// Connection Registry
    connection_repository: Arc<dyn ConnectionRepository>,
    broadcaster: Arc<RoomBroadcaster>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(
        room_repository: Arc<dyn RoomRepository>,
        connection_repository: Arc<dyn ConnectionRepository>,
        broadcaster: Arc<RoomBroadcaster>,
    ) -> Self {
        Self {
            room_repository,
            connection_repository,
            broadcaster,
        }
    }

    /// 接続のバインディングを解消する
    ///
    /// # Returns
    ///
    /// * `Some(ConnectionBinding)` - 解消したバインディング
    /// * `None` - 接続はどの Room にもバインドされていなかった
    pub async fn reconcile(
        &self,
        connection_id: &ConnectionId,
        mode: ReconcileMode,
    ) -> Option<ConnectionBinding> {
        // 1. バインディングを取得
        let Some(binding) = self.connection_repository.lookup(connection_id).await else {
            tracing::debug!("{} is not in a room, nothing to reconcile", connection_id);
            return None;
        };

        // 2. Room から参加者を削除
        match self
            .room_repository
            .remove_participant(&binding.room_id, &binding.participant_id)
            .await
        {
            Ok((participant, now_empty)) if mode != ReconcileMode::Sweep => {
                // 3. 残りの参加者に通知
                let mut extra = Map::new();
                extra.insert(
                    "leftParticipant".to_string(),
                    json!({
                        "participantId": participant.id.as_str(),
                        "name": participant.display_name,
                    }),
                );
                self.broadcaster
                    .broadcast(
                        &binding.room_id,
                        RoomEventKind::UpdatedRoom,
                        extra,
                        PayloadShape::Full,
                    )
                    .await;

                // 4. 空になった Room を削除
                if now_empty {
                    self.room_repository.delete(&binding.room_id).await;
                    tracing::info!("Room '{}' is empty and was removed", binding.room_id);
                }
            }
            Ok(_) => {}
            Err(e) => {
                tracing::debug!("Reconcile of {} skipped room cleanup: {}", connection_id, e);
            }
        }

        // 5. バインディングは最後に削除
        self.connection_repository.unbind(connection_id).await;
        tracing::info!(
            "{} left room '{}' as participant {} ({:?})",
            connection_id,
            binding.room_id,
            binding.participant_id,
            mode
        );
        Some(binding)
    }
}

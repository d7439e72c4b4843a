//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! Room Registry と Connection Registry は独立したストアとして注入され、
//! プロセス全体のシングルトンにはしません（テストごとに分離したインスタンスを作れるように）。

use async_trait::async_trait;

use super::{
    ConnectionBinding, ConnectionId, Coordinate, Participant, ParticipantId, RepositoryError,
    Room, RoomId, Route, Timestamp,
};

/// Room Registry
///
/// Room と Participant のレコードを排他的に所有する。
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// オーナーを参加者に含めた Room を作成し、ライブな Room と衝突しない ID を返す
    async fn create(
        &self,
        owner: Participant,
        destination: Option<Coordinate>,
        created_at: Timestamp,
    ) -> Result<RoomId, RepositoryError>;

    /// Room を取得（スナップショットのコピー）
    async fn get(&self, room_id: &RoomId) -> Option<Room>;

    /// Room を削除し、削除された Room を返す
    async fn delete(&self, room_id: &RoomId) -> Option<Room>;

    /// 参加者を追加
    async fn add_participant(
        &self,
        room_id: &RoomId,
        participant: Participant,
    ) -> Result<(), RepositoryError>;

    /// 参加者を削除し、削除された参加者と削除後に Room が空になったかを返す
    async fn remove_participant(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
    ) -> Result<(Participant, bool), RepositoryError>;

    /// 参加者の位置情報を更新
    async fn update_location(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
        location: Coordinate,
        updated_at: Timestamp,
    ) -> Result<(), RepositoryError>;

    /// 参加者の経路を更新（中身は検証しない）
    async fn update_route(
        &self,
        room_id: &RoomId,
        participant_id: &ParticipantId,
        route: Route,
    ) -> Result<(), RepositoryError>;

    /// 全ての Room を取得（診断用）
    async fn list(&self) -> Vec<Room>;
}

/// Connection Registry
///
/// 接続 ID から (room, participant) へのバインディングを所有する。
#[async_trait]
pub trait ConnectionRepository: Send + Sync {
    /// 接続をバインドする。既存のバインディングがあれば置き換え、それを返す
    async fn bind(
        &self,
        connection_id: ConnectionId,
        binding: ConnectionBinding,
    ) -> Option<ConnectionBinding>;

    /// バインディングを取得
    async fn lookup(&self, connection_id: &ConnectionId) -> Option<ConnectionBinding>;

    /// バインディングを削除
    async fn unbind(&self, connection_id: &ConnectionId) -> Option<ConnectionBinding>;

    /// 指定した Room にバインドされている接続の一覧
    async fn connections_in_room(&self, room_id: &RoomId) -> Vec<ConnectionId>;

    /// 全てのバインディングを取得（診断用）
    async fn list(&self) -> Vec<(ConnectionId, ConnectionBinding)>;
}

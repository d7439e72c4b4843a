//! Domain errors

use thiserror::Error;

/// Value Object の生成エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("room id must not be empty")]
    EmptyRoomId,

    #[error("participant id must not be empty")]
    EmptyParticipantId,

    #[error("connection id must not be empty")]
    EmptyConnectionId,
}

/// Repository 操作のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("room '{0}' not found")]
    RoomNotFound(String),

    #[error("participant '{0}' not found")]
    ParticipantNotFound(String),

    #[error("could not allocate a free room id after {0} attempts")]
    RoomIdExhausted(usize),
}

/// メッセージ送信のエラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("connection '{0}' not found")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),
}

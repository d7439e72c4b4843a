//! UseCase layer errors
//!
//! All of these are recoverable and are reported only to the connection that
//! caused them, as an `ERROR` message carrying [`SessionError::code`].

use thiserror::Error;

use crate::domain::RepositoryError;
use crate::infrastructure::dto::websocket::ParseError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    #[error("unknown message type '{0}'")]
    UnknownMessageType(String),

    #[error("room '{0}' not found")]
    RoomNotFound(String),

    #[error("already joined room '{0}'")]
    AlreadyJoined(String),

    #[error("only the owner can terminate room '{0}'")]
    NotOwner(String),

    #[error("participant '{0}' not found")]
    ParticipantNotFound(String),

    #[error("no free room id after {0} attempts")]
    RoomIdUnavailable(usize),
}

impl SessionError {
    /// Wire error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::MalformedMessage(_) => "MALFORMED_MESSAGE",
            Self::UnknownMessageType(_) => "UNKNOWN_TYPE",
            Self::RoomNotFound(_) => "ROOM_NOT_FOUND",
            Self::AlreadyJoined(_) => "ALREADY_JOINED",
            Self::NotOwner(_) => "NOT_OWNER",
            Self::ParticipantNotFound(_) => "PARTICIPANT_NOT_FOUND",
            Self::RoomIdUnavailable(_) => "ROOM_ID_UNAVAILABLE",
        }
    }
}

impl From<RepositoryError> for SessionError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::RoomNotFound(id) => Self::RoomNotFound(id),
            RepositoryError::ParticipantNotFound(id) => Self::ParticipantNotFound(id),
            RepositoryError::RoomIdExhausted(attempts) => Self::RoomIdUnavailable(attempts),
        }
    }
}

impl From<ParseError> for SessionError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Malformed(reason) => Self::MalformedMessage(reason),
            ParseError::UnknownType(r#type) => Self::UnknownMessageType(r#type),
        }
    }
}

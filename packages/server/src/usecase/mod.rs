//! UseCase 層
//!
//! メッセージ種別ごとに 1 つのユースケースを置き、`SessionRouter` が振り分ける。

pub mod broadcast_room;
pub mod create_room;
pub mod disconnect_participant;
pub mod error;
pub mod get_room_details;
pub mod join_room;
pub mod leave_room;
pub mod session_router;
pub mod terminate_room;
pub mod update_location;
pub mod update_route;

#[cfg(test)]
mod test_support;

pub use broadcast_room::{PayloadShape, RoomBroadcaster};
pub use create_room::CreateRoomUseCase;
pub use disconnect_participant::{DisconnectParticipantUseCase, ReconcileMode};
pub use error::SessionError;
pub use get_room_details::GetRoomDetailsUseCase;
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use session_router::SessionRouter;
pub use terminate_room::TerminateRoomUseCase;
pub use update_location::UpdateLocationUseCase;
pub use update_route::UpdateRouteUseCase;

use crate::domain::{ConnectionBinding, ParticipantId, RoomId};

/// 受信した Room ID を検証する。空文字は存在しない Room として扱う
fn parse_room_id(raw: String) -> Result<RoomId, SessionError> {
    RoomId::new(raw.clone()).map_err(|_| SessionError::RoomNotFound(raw))
}

/// 受信した Participant ID を検証する。空文字は存在しない参加者として扱う
fn parse_participant_id(raw: String) -> Result<ParticipantId, SessionError> {
    ParticipantId::new(raw.clone()).map_err(|_| SessionError::ParticipantNotFound(raw))
}

/// ペイロードの Room が接続のバインド先でなければ、存在しない Room として扱う
fn ensure_bound_room(binding: &ConnectionBinding, room_id: &RoomId) -> Result<(), SessionError> {
    if &binding.room_id != room_id {
        return Err(SessionError::RoomNotFound(room_id.to_string()));
    }
    Ok(())
}

/// ペイロードの参加者が接続自身でなければ、存在しない参加者として扱う
fn ensure_bound_participant(
    binding: &ConnectionBinding,
    participant_id: &ParticipantId,
) -> Result<(), SessionError> {
    if &binding.participant_id != participant_id {
        return Err(SessionError::ParticipantNotFound(participant_id.to_string()));
    }
    Ok(())
}

//! Conversion logic between domain entities and DTOs.

use std::collections::BTreeMap;

use convoy_shared::time::timestamp_to_rfc3339;

use crate::domain::{ConnectionBinding, Coordinate, Participant, Room};
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// DTO → Domain Entity
// ========================================

impl From<dto::CoordinateDto> for Coordinate {
    fn from(dto: dto::CoordinateDto) -> Self {
        Coordinate::new(dto.latitude, dto.longitude)
    }
}

// ========================================
// Domain Entity → DTO
// ========================================

impl From<Coordinate> for dto::CoordinateDto {
    fn from(model: Coordinate) -> Self {
        Self {
            latitude: model.latitude,
            longitude: model.longitude,
        }
    }
}

impl From<&Participant> for dto::ParticipantDto {
    fn from(model: &Participant) -> Self {
        Self {
            id: model.id.as_str().to_string(),
            name: model.display_name.clone(),
            location: model.location.map(Into::into),
            joined_at: model.joined_at.value(),
            last_updated_at: model.last_updated_at.value(),
            route: model.route.as_ref().map(|route| route.as_value().clone()),
        }
    }
}

impl From<&Room> for dto::RoomStateDto {
    fn from(model: &Room) -> Self {
        Self {
            participants: model
                .participants
                .iter()
                .map(|(id, participant)| (id.as_str().to_string(), participant.into()))
                .collect(),
            destination: model.destination.map(Into::into),
            created_at: model.created_at.value(),
            owner_id: model.owner_id.as_str().to_string(),
        }
    }
}

impl From<&Participant> for http::ParticipantDetailDto {
    fn from(model: &Participant) -> Self {
        Self {
            connection_id: model.connection_id.as_str().to_string(),
            name: model.display_name.clone(),
            location: model.location.map(Into::into),
            joined_at: timestamp_to_rfc3339(model.joined_at.value()),
            last_updated_at: timestamp_to_rfc3339(model.last_updated_at.value()),
            route: model.route.as_ref().map(|route| route.as_value().clone()),
        }
    }
}

impl From<&Room> for http::RoomDetailDto {
    fn from(model: &Room) -> Self {
        Self {
            id: model.id.as_str().to_string(),
            created_at: timestamp_to_rfc3339(model.created_at.value()),
            owner_id: model.owner_id.as_str().to_string(),
            destination: model.destination.map(Into::into),
            participants: model
                .participants
                .iter()
                .map(|(id, participant)| (id.as_str().to_string(), participant.into()))
                .collect::<BTreeMap<_, _>>(),
        }
    }
}

impl From<&ConnectionBinding> for http::ConnectionBindingDto {
    fn from(model: &ConnectionBinding) -> Self {
        Self {
            room_id: model.room_id.as_str().to_string(),
            participant_id: model.participant_id.as_str().to_string(),
        }
    }
}

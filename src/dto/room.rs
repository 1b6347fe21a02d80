//! DTO definitions used by the room REST API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::{format_system_time, validation::validate_room_name},
    state::{
        lifecycle::RoomStatus,
        room::{MAX_PLAYERS, MIN_PLAYERS, RoomSlot, Theme},
        variant::GameVariant,
    },
};

/// Payload used to open a new room. The caller becomes host and first member.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateRoomRequest {
    #[validate(custom(function = "validate_room_name"))]
    pub name: String,
    /// Defaults to 4.
    #[serde(default)]
    #[validate(range(min = MIN_PLAYERS, max = MAX_PLAYERS))]
    pub max_players: Option<u8>,
    /// Defaults to Gritty Sci-Fi.
    #[serde(default)]
    pub theme: Option<Theme>,
    /// Defaults to the configured variant.
    #[serde(default)]
    pub variant: Option<GameVariant>,
}

/// Request to change the theme of a waiting room.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateThemeRequest {
    pub theme: Theme,
}

/// Room member as exposed to clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MemberSummary {
    pub id: String,
    pub name: String,
    pub is_host: bool,
}

/// Public projection of a room.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoomSummary {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub host_id: String,
    pub members: Vec<MemberSummary>,
    pub max_players: u8,
    pub theme: Theme,
    pub variant: GameVariant,
    pub locked: bool,
    pub status: RoomStatus,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

impl From<&RoomSlot> for RoomSummary {
    fn from(slot: &RoomSlot) -> Self {
        let room = &slot.room;
        Self {
            id: room.id,
            code: room.code.clone(),
            name: room.name.clone(),
            host_id: room.host_id.clone(),
            members: room
                .members
                .iter()
                .map(|member| MemberSummary {
                    id: member.id.clone(),
                    name: member.name.clone(),
                    is_host: member.id == room.host_id,
                })
                .collect(),
            max_players: room.max_players,
            theme: room.theme,
            variant: room.variant,
            locked: room.locked,
            status: slot.status(),
            created_at: format_system_time(room.created_at),
        }
    }
}

/// Outcome of a leave request. `room` is absent when the room was torn down.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaveRoomResponse {
    pub room_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<RoomSummary>,
}

/// Generic acknowledgement.
#[derive(Debug, Serialize, ToSchema)]
pub struct ActionResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use std::time::SystemTime;

    use validator::Validate;

    use super::*;
    use crate::state::room::{Member, Room};

    #[test]
    fn create_request_rejects_out_of_range_capacity() {
        let request: CreateRoomRequest =
            serde_json::from_str(r#"{"name": "Crew", "max_players": 5}"#).unwrap();
        assert!(request.validate().is_err());

        let request: CreateRoomRequest =
            serde_json::from_str(r#"{"name": "Crew", "theme": "Weird West"}"#).unwrap();
        assert!(request.validate().is_ok());
        assert_eq!(request.theme, Some(Theme::WeirdWest));
    }

    #[test]
    fn summary_flags_the_host() {
        let slot = RoomSlot::new(Room {
            id: Uuid::new_v4(),
            code: "ABC234".into(),
            name: "Crew".into(),
            host_id: "h".into(),
            members: vec![
                Member {
                    id: "h".into(),
                    name: "Host".into(),
                },
                Member {
                    id: "g".into(),
                    name: "Guest".into(),
                },
            ],
            max_players: 4,
            theme: Theme::default(),
            variant: GameVariant::default(),
            locked: false,
            created_at: SystemTime::now(),
        });
        let summary = RoomSummary::from(&slot);
        assert_eq!(summary.status, RoomStatus::Waiting);
        let hosts: Vec<_> = summary.members.iter().map(|m| m.is_host).collect();
        assert_eq!(hosts, vec![true, false]);
    }
}

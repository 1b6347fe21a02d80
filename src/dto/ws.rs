use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::ValidationError;

use crate::dto::{
    game::GameStateResponse,
    room::RoomSummary,
    validation::{validate_player_field, validate_scribe_tag, validate_sentence},
};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
/// Messages accepted from player WebSocket clients.
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerInboundMessage {
    /// Must be the first message of a session.
    Identification {
        player_id: String,
        player_name: String,
    },
    JoinRoom {
        room_id: Uuid,
    },
    LeaveRoom {
        room_id: Uuid,
    },
    StartGame {
        room_id: Uuid,
    },
    SubmitSentence {
        room_id: Uuid,
        sentence: String,
    },
    SubmitVote {
        room_id: Uuid,
        submission_id: String,
    },
    ScribeChoice {
        room_id: Uuid,
        chosen_id: String,
        #[serde(default)]
        scribe_tag: Option<String>,
    },
}

/// Rejection of an inbound frame before it reaches the services.
#[derive(Debug, Error)]
pub enum InboundError {
    #[error("malformed message: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid message: {0}")]
    Invalid(ValidationError),
}

impl PlayerInboundMessage {
    /// Parse a text frame and apply the same shape checks as the REST DTOs.
    pub fn from_json_str(text: &str) -> Result<Self, InboundError> {
        let message: Self = serde_json::from_str(text)?;
        message.validate().map_err(InboundError::Invalid)?;
        Ok(message)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Identification {
                player_id,
                player_name,
            } => {
                validate_player_field(player_id)?;
                validate_player_field(player_name)
            }
            Self::SubmitSentence { sentence, .. } => validate_sentence(sentence),
            Self::ScribeChoice {
                scribe_tag: Some(tag),
                ..
            } => validate_scribe_tag(tag),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Frames pushed to player WebSocket clients.
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerOutboundMessage {
    /// Identification accepted.
    Identified { player_id: String },
    /// Sent to the joiner right after `join_room`.
    RoomState {
        room: RoomSummary,
        #[serde(skip_serializing_if = "Option::is_none")]
        game: Option<GameStateResponse>,
    },
    /// Room event forwarded from the room hub.
    Event {
        event: String,
        #[schema(value_type = Object)]
        data: serde_json::Value,
    },
    /// A request from this socket was rejected.
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_messages() {
        let room_id = Uuid::new_v4();
        let text = format!(
            r#"{{"type": "scribe_choice", "room_id": "{room_id}", "chosen_id": "p2"}}"#
        );
        match PlayerInboundMessage::from_json_str(&text).unwrap() {
            PlayerInboundMessage::ScribeChoice {
                room_id: parsed,
                chosen_id,
                scribe_tag,
            } => {
                assert_eq!(parsed, room_id);
                assert_eq!(chosen_id, "p2");
                assert!(scribe_tag.is_none());
            }
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn rejects_blank_identification() {
        let text = r#"{"type": "identification", "player_id": " ", "player_name": "Ann"}"#;
        assert!(matches!(
            PlayerInboundMessage::from_json_str(text),
            Err(InboundError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_unknown_type() {
        assert!(matches!(
            PlayerInboundMessage::from_json_str(r#"{"type": "shout"}"#),
            Err(InboundError::Parse(_))
        ));
    }

    #[test]
    fn error_frame_is_tagged() {
        let frame = serde_json::to_value(PlayerOutboundMessage::Error {
            message: "nope".into(),
        })
        .unwrap();
        assert_eq!(frame["type"], "error");
        assert_eq!(frame["message"], "nope");
    }
}

use indexmap::IndexMap;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dto::room::RoomSummary,
    state::{
        room::{Origin, Theme},
        round::{NarrativeEntry, RankedChoice, Submission},
        scoring::VoteCount,
        variant::{GameVariant, StoryPhase},
    },
};

#[derive(Clone, Debug)]
/// Dispatched payload carried across room hubs, SSE streams and WebSocket sessions.
pub struct ServerEvent {
    pub event: Option<String>,
    pub data: String,
}

impl ServerEvent {
    /// Convenience wrapper that serialises `payload` into the data field.
    pub fn json<E, T>(event: E, payload: &T) -> serde_json::Result<Self>
    where
        E: Into<Option<String>>,
        T: Serialize,
    {
        Ok(Self {
            event: event.into(),
            data: serde_json::to_string(payload)?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
/// Initial metadata sent to an SSE client when it connects.
pub struct Handshake {
    /// Identifier of the stream (`room:<id>`).
    pub stream: String,
    /// Human-readable message confirming the subscription.
    pub message: String,
    /// Whether the backend is running without a storage backend connection.
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// Broadcast when the backend enters or leaves degraded mode.
pub struct SystemStatus {
    pub degraded: bool,
}

#[derive(Debug, Serialize, ToSchema)]
/// A player joined the room.
pub struct PlayerJoinedEvent {
    pub player_id: String,
    pub player_name: String,
    pub room: RoomSummary,
}

#[derive(Debug, Serialize, ToSchema)]
/// A player left the room.
pub struct PlayerLeftEvent {
    pub player_id: String,
    pub player_name: String,
    pub room: RoomSummary,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
/// Room settings changed (theme, lock, host).
pub struct RoomUpdatedEvent(pub RoomSummary);

#[derive(Debug, Serialize, ToSchema)]
/// The room is gone; subscribers should disconnect.
pub struct RoomClosedEvent {
    pub room_id: Uuid,
    pub reason: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// A game started in the room.
pub struct GameStartedEvent {
    pub room_id: Uuid,
    pub round: u32,
    pub phase: StoryPhase,
    pub scribe_id: String,
    pub max_rounds: u32,
    pub theme: Theme,
    pub variant: GameVariant,
    pub origin: Origin,
    pub prompt: Option<String>,
    pub narrative: Vec<NarrativeEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
/// A contributor submitted (or replaced) a sentence.
pub struct SubmissionReceivedEvent {
    pub player_id: String,
    pub player_name: String,
    pub total_submissions: usize,
    pub required_submissions: usize,
}

#[derive(Debug, Serialize, ToSchema)]
/// Every contributor submitted; votes are open.
pub struct VotingPhaseEvent {
    pub submissions: Vec<Submission>,
}

#[derive(Debug, Serialize, ToSchema)]
/// A contributor voted (or changed their vote).
pub struct VoteReceivedEvent {
    pub voter_id: String,
    pub total_votes: usize,
    pub required_votes: usize,
}

#[derive(Debug, Serialize, ToSchema)]
/// The scribe may now pick the round's line.
pub struct ScribeChoiceEvent {
    pub scribe_id: String,
    pub submissions: Vec<Submission>,
    /// Best-voted submissions, present in voting variants.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_voted: Option<Vec<RankedChoice>>,
}

#[derive(Debug, Serialize, ToSchema)]
/// A line was appended to the story.
pub struct RoundCompleteEvent {
    pub round: u32,
    pub chosen_sentence: String,
    pub scribe_tag: Option<String>,
    pub author_id: String,
    pub author_name: String,
    pub vote_tally: Vec<VoteCount>,
    pub scores_delta: IndexMap<String, u32>,
    pub scores: IndexMap<String, u32>,
}

#[derive(Debug, Serialize, ToSchema)]
/// The next round began.
pub struct NextRoundEvent {
    pub round: u32,
    pub phase: StoryPhase,
    pub scribe_id: String,
    pub prompt: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
/// The last round was finalised.
pub struct GameCompleteEvent {
    pub room_id: Uuid,
    /// Archived story, absent when it could not be saved.
    pub story_id: Option<Uuid>,
    pub narrative: Vec<NarrativeEntry>,
    pub scores: IndexMap<String, u32>,
}

#[derive(Debug, Serialize, ToSchema)]
/// The game stopped early because too few players remain.
pub struct GameAbandonedEvent {
    pub room_id: Uuid,
    pub reason: String,
}

#[derive(Debug, Serialize, ToSchema)]
/// The current scribe left and the role moved on.
pub struct ScribeChangedEvent {
    pub round: u32,
    pub scribe_id: String,
}

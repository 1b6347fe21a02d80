//! DTO definitions for in-room game actions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::validation::{validate_scribe_tag, validate_sentence},
    state::{
        room::{ActiveGame, Origin, Theme},
        round::{NarrativeEntry, RoundSnapshot, RoundStage},
        variant::{GameVariant, StoryPhase},
    },
};

/// Sentence submitted by a contributor for the current round.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SubmitSentenceRequest {
    #[validate(custom(function = "validate_sentence"))]
    pub sentence: String,
}

/// Vote for another contributor's submission (voting variants only).
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SubmitVoteRequest {
    /// Author identity of the submission voted for.
    #[validate(length(min = 1))]
    pub submission_id: String,
}

/// Scribe's pick for the round.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ScribeChoiceRequest {
    /// Author identity of the chosen submission.
    #[validate(length(min = 1))]
    pub chosen_id: String,
    #[serde(default)]
    #[validate(custom(function = "validate_scribe_tag"))]
    pub scribe_tag: Option<String>,
}

/// Catch-up view of a room's running game.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GameStateResponse {
    pub room_id: Uuid,
    pub theme: Theme,
    pub variant: GameVariant,
    pub origin: Origin,
    /// Prompt of the current round, if one was available.
    pub prompt: Option<String>,
    #[serde(flatten)]
    pub round: RoundSnapshot,
}

impl GameStateResponse {
    /// Project an active game.
    pub fn new(room_id: Uuid, variant: GameVariant, game: &ActiveGame) -> Self {
        Self {
            room_id,
            theme: game.theme,
            variant,
            origin: game.origin.clone(),
            prompt: game.prompt.clone(),
            round: game.coordinator.public_state(),
        }
    }
}

/// Acknowledgement of a submission or vote.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProgressResponse {
    pub round: u32,
    pub stage: RoundStage,
    /// Submissions or votes collected so far.
    pub received: usize,
    /// Submissions or votes needed to move on.
    pub required: usize,
}

/// Outcome of a scribe choice.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoundResultResponse {
    pub line: NarrativeEntry,
    pub scores_delta: IndexMap<String, u32>,
    pub scores: IndexMap<String, u32>,
    pub complete: bool,
    /// Set while the game continues.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_round: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_phase: Option<StoryPhase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_scribe_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    /// Set once the finished story has been archived.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub story_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;

    #[test]
    fn blank_sentence_fails_validation() {
        let request: SubmitSentenceRequest = serde_json::from_str(r#"{"sentence": "  "}"#).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn scribe_tag_is_optional() {
        let request: ScribeChoiceRequest =
            serde_json::from_str(r#"{"chosen_id": "p2"}"#).unwrap();
        assert!(request.validate().is_ok());
        assert!(request.scribe_tag.is_none());
    }
}

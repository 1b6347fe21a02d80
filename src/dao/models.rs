use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use uuid::Uuid;

use crate::state::{room::Theme, variant::GameVariant, variant::StoryPhase};

/// Opening text stored per theme.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OriginEntity {
    /// Stable identifier.
    pub id: Uuid,
    /// Theme the origin belongs to.
    pub theme: Theme,
    /// Short title (at most 100 characters).
    pub title: String,
    /// Opening paragraph (20 to 500 characters).
    pub text: String,
    /// Creation timestamp.
    pub created_at: SystemTime,
}

/// Round prompt stored per theme and phase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptEntity {
    /// Stable identifier.
    pub id: Uuid,
    /// Theme the prompt belongs to.
    pub theme: Theme,
    /// Phase the prompt is meant for.
    pub category: StoryPhase,
    /// Prompt text (10 to 200 characters).
    pub text: String,
    /// Creation timestamp.
    pub created_at: SystemTime,
}

/// Vote count attached to a persisted story line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteCountEntity {
    /// Contributor identity.
    pub player_id: String,
    /// Votes received.
    pub votes: u32,
}

/// Finalised line of a persisted story.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoryLineEntity {
    /// Round the line was written in.
    pub round: u32,
    /// Sentence text.
    pub text: String,
    /// Optional scribe label.
    pub tag: Option<String>,
    /// Contributor identity.
    pub author_id: String,
    /// Contributor display name.
    pub author_name: String,
    /// Scribe of the round.
    pub scribe_id: String,
    /// Ranked votes of the round.
    pub votes: Vec<VoteCountEntity>,
}

/// Player who took part in a story.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoryMemberEntity {
    /// Player identity.
    pub player_id: String,
    /// Display name at completion.
    pub name: String,
    /// Final score.
    pub score: u32,
}

/// Completed story archived at the end of a game. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoryEntity {
    /// Primary key.
    pub id: Uuid,
    /// Room the story was written in.
    pub room_id: Uuid,
    /// Room display name.
    pub room_name: String,
    /// Theme of the game.
    pub theme: Theme,
    /// Rules the game ran with.
    pub variant: GameVariant,
    /// Origin title.
    pub origin_title: String,
    /// Origin paragraph.
    pub origin_text: String,
    /// Narrative lines in round order.
    pub lines: Vec<StoryLineEntity>,
    /// Roster with final scores, in join order.
    pub members: Vec<StoryMemberEntity>,
    /// Completion timestamp.
    pub completed_at: SystemTime,
}

impl StoryEntity {
    /// Whether `player_id` took part in the story.
    pub fn has_member(&self, player_id: &str) -> bool {
        self.members.iter().any(|member| member.player_id == player_id)
    }
}

//! DTO definitions for archived stories.

use indexmap::IndexMap;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    dao::models::{StoryEntity, StoryLineEntity, StoryMemberEntity},
    dto::format_system_time,
    state::{room::Theme, scoring::VoteCount, variant::GameVariant},
};

/// Line of an archived story.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StoryLine {
    pub round: u32,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub author_id: String,
    pub author_name: String,
    pub scribe_id: String,
    pub vote_tally: Vec<VoteCount>,
}

impl From<StoryLineEntity> for StoryLine {
    fn from(line: StoryLineEntity) -> Self {
        Self {
            round: line.round,
            text: line.text,
            tag: line.tag,
            author_id: line.author_id,
            author_name: line.author_name,
            scribe_id: line.scribe_id,
            vote_tally: line
                .votes
                .into_iter()
                .map(|vote| VoteCount {
                    id: vote.player_id,
                    votes: vote.votes,
                })
                .collect(),
        }
    }
}

/// Player of an archived story.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StoryMember {
    pub player_id: String,
    pub name: String,
    pub score: u32,
}

impl From<StoryMemberEntity> for StoryMember {
    fn from(member: StoryMemberEntity) -> Self {
        Self {
            player_id: member.player_id,
            name: member.name,
            score: member.score,
        }
    }
}

/// Completed story as returned by the archive.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StoryResponse {
    pub id: Uuid,
    pub room_id: Uuid,
    pub room_name: String,
    pub theme: Theme,
    pub variant: GameVariant,
    pub origin_title: String,
    pub origin_text: String,
    pub lines: Vec<StoryLine>,
    pub members: Vec<StoryMember>,
    /// Final ledger keyed by player identity, in roster order.
    pub scores: IndexMap<String, u32>,
    /// RFC 3339 completion timestamp.
    pub completed_at: String,
}

impl From<StoryEntity> for StoryResponse {
    fn from(story: StoryEntity) -> Self {
        let scores = story
            .members
            .iter()
            .map(|member| (member.player_id.clone(), member.score))
            .collect();
        Self {
            id: story.id,
            room_id: story.room_id,
            room_name: story.room_name,
            theme: story.theme,
            variant: story.variant,
            origin_title: story.origin_title,
            origin_text: story.origin_text,
            lines: story.lines.into_iter().map(Into::into).collect(),
            members: story.members.into_iter().map(Into::into).collect(),
            scores,
            completed_at: format_system_time(story.completed_at),
        }
    }
}

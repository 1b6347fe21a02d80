use mongodb::bson::{DateTime, Document, doc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    dao::models::{
        OriginEntity, PromptEntity, StoryEntity, StoryLineEntity, StoryMemberEntity,
    },
    state::{room::Theme, variant::GameVariant, variant::StoryPhase},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoStoryDocument {
    #[serde(rename = "_id")]
    id: String,
    room_id: String,
    room_name: String,
    theme: Theme,
    variant: GameVariant,
    origin_title: String,
    origin_text: String,
    lines: Vec<StoryLineEntity>,
    members: Vec<StoryMemberEntity>,
    /// Denormalised member ids backing the per-player index.
    player_ids: Vec<String>,
    completed_at: DateTime,
}

impl From<StoryEntity> for MongoStoryDocument {
    fn from(value: StoryEntity) -> Self {
        let player_ids = value
            .members
            .iter()
            .map(|member| member.player_id.clone())
            .collect();
        Self {
            id: value.id.to_string(),
            room_id: value.room_id.to_string(),
            room_name: value.room_name,
            theme: value.theme,
            variant: value.variant,
            origin_title: value.origin_title,
            origin_text: value.origin_text,
            lines: value.lines,
            members: value.members,
            player_ids,
            completed_at: DateTime::from_system_time(value.completed_at),
        }
    }
}

impl TryFrom<MongoStoryDocument> for StoryEntity {
    type Error = uuid::Error;

    fn try_from(value: MongoStoryDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&value.id)?,
            room_id: Uuid::parse_str(&value.room_id)?,
            room_name: value.room_name,
            theme: value.theme,
            variant: value.variant,
            origin_title: value.origin_title,
            origin_text: value.origin_text,
            lines: value.lines,
            members: value.members,
            completed_at: value.completed_at.to_system_time(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoOriginDocument {
    #[serde(rename = "_id")]
    id: String,
    theme: Theme,
    title: String,
    text: String,
    created_at: DateTime,
}

impl From<OriginEntity> for MongoOriginDocument {
    fn from(value: OriginEntity) -> Self {
        Self {
            id: value.id.to_string(),
            theme: value.theme,
            title: value.title,
            text: value.text,
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl TryFrom<MongoOriginDocument> for OriginEntity {
    type Error = uuid::Error;

    fn try_from(value: MongoOriginDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&value.id)?,
            theme: value.theme,
            title: value.title,
            text: value.text,
            created_at: value.created_at.to_system_time(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoPromptDocument {
    #[serde(rename = "_id")]
    id: String,
    theme: Theme,
    category: StoryPhase,
    text: String,
    created_at: DateTime,
}

impl From<PromptEntity> for MongoPromptDocument {
    fn from(value: PromptEntity) -> Self {
        Self {
            id: value.id.to_string(),
            theme: value.theme,
            category: value.category,
            text: value.text,
            created_at: DateTime::from_system_time(value.created_at),
        }
    }
}

impl TryFrom<MongoPromptDocument> for PromptEntity {
    type Error = uuid::Error;

    fn try_from(value: MongoPromptDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: Uuid::parse_str(&value.id)?,
            theme: value.theme,
            category: value.category,
            text: value.text,
            created_at: value.created_at.to_system_time(),
        })
    }
}

/// Primary-key filter; ids are stored in their hyphenated string form.
pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": id.to_string()}
}

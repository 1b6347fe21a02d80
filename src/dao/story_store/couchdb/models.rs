use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::error::CouchDaoError;
use crate::{
    dao::models::{OriginEntity, PromptEntity, StoryEntity, StoryLineEntity, StoryMemberEntity},
    state::{room::Theme, variant::GameVariant, variant::StoryPhase},
};

pub const STORY_PREFIX: &str = "story::";
pub const ORIGIN_PREFIX: &str = "origin::";
pub const PROMPT_PREFIX: &str = "prompt::";
pub const END_SUFFIX: &str = "\u{ffff}";

#[derive(Debug, Deserialize)]
pub struct AllDocsResponse {
    pub rows: Vec<AllDocsRow>,
}

#[derive(Debug, Deserialize)]
pub struct AllDocsRow {
    #[allow(dead_code)]
    pub id: String,
    #[serde(default)]
    pub doc: Option<Value>,
}

/// Minimal projection used to fetch the current revision of a document.
#[derive(Debug, Deserialize)]
pub struct RevisionOnly {
    #[serde(rename = "_rev")]
    pub rev: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchStoryDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(flatten)]
    pub story: StoryBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryBody {
    pub room_id: Uuid,
    pub room_name: String,
    pub theme: Theme,
    pub variant: GameVariant,
    pub origin_title: String,
    pub origin_text: String,
    pub lines: Vec<StoryLineEntity>,
    pub members: Vec<StoryMemberEntity>,
    pub completed_at: SystemTime,
}

impl From<(StoryEntity, Option<String>)> for CouchStoryDocument {
    fn from((story, rev): (StoryEntity, Option<String>)) -> Self {
        Self {
            id: story_doc_id(story.id),
            rev,
            story: StoryBody {
                room_id: story.room_id,
                room_name: story.room_name,
                theme: story.theme,
                variant: story.variant,
                origin_title: story.origin_title,
                origin_text: story.origin_text,
                lines: story.lines,
                members: story.members,
                completed_at: story.completed_at,
            },
        }
    }
}

impl TryFrom<CouchStoryDocument> for StoryEntity {
    type Error = CouchDaoError;

    fn try_from(doc: CouchStoryDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: extract_uuid(&doc.id)?,
            room_id: doc.story.room_id,
            room_name: doc.story.room_name,
            theme: doc.story.theme,
            variant: doc.story.variant,
            origin_title: doc.story.origin_title,
            origin_text: doc.story.origin_text,
            lines: doc.story.lines,
            members: doc.story.members,
            completed_at: doc.story.completed_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchOriginDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    pub theme: Theme,
    pub title: String,
    pub text: String,
    pub created_at: SystemTime,
}

impl From<(OriginEntity, Option<String>)> for CouchOriginDocument {
    fn from((origin, rev): (OriginEntity, Option<String>)) -> Self {
        Self {
            id: origin_doc_id(origin.theme, origin.id),
            rev,
            theme: origin.theme,
            title: origin.title,
            text: origin.text,
            created_at: origin.created_at,
        }
    }
}

impl TryFrom<CouchOriginDocument> for OriginEntity {
    type Error = CouchDaoError;

    fn try_from(doc: CouchOriginDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: extract_uuid(&doc.id)?,
            theme: doc.theme,
            title: doc.title,
            text: doc.text,
            created_at: doc.created_at,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchPromptDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    pub theme: Theme,
    pub category: StoryPhase,
    pub text: String,
    pub created_at: SystemTime,
}

impl From<(PromptEntity, Option<String>)> for CouchPromptDocument {
    fn from((prompt, rev): (PromptEntity, Option<String>)) -> Self {
        Self {
            id: prompt_doc_id(prompt.theme, prompt.category, prompt.id),
            rev,
            theme: prompt.theme,
            category: prompt.category,
            text: prompt.text,
            created_at: prompt.created_at,
        }
    }
}

impl TryFrom<CouchPromptDocument> for PromptEntity {
    type Error = CouchDaoError;

    fn try_from(doc: CouchPromptDocument) -> Result<Self, Self::Error> {
        Ok(Self {
            id: extract_uuid(&doc.id)?,
            theme: doc.theme,
            category: doc.category,
            text: doc.text,
            created_at: doc.created_at,
        })
    }
}

pub fn story_doc_id(id: Uuid) -> String {
    format!("{STORY_PREFIX}{id}")
}

/// Origins are keyed by theme so a prefix scan returns one theme only.
pub fn origin_prefix(theme: Theme) -> String {
    format!("{ORIGIN_PREFIX}{}::", theme.slug())
}

pub fn origin_doc_id(theme: Theme, id: Uuid) -> String {
    format!("{}{id}", origin_prefix(theme))
}

pub fn prompt_prefix(theme: Theme, category: StoryPhase) -> String {
    format!("{PROMPT_PREFIX}{}::{}::", theme.slug(), category.as_str())
}

pub fn prompt_doc_id(theme: Theme, category: StoryPhase, id: Uuid) -> String {
    format!("{}{id}", prompt_prefix(theme, category))
}

/// Take the UUID after the last `::` separator of a document id.
pub fn extract_uuid(doc_id: &str) -> Result<Uuid, CouchDaoError> {
    let (_, id) = doc_id
        .rsplit_once("::")
        .ok_or_else(|| CouchDaoError::InvalidDocId {
            doc_id: doc_id.to_string(),
            kind: "missing separator",
        })?;

    Uuid::parse_str(id).map_err(|_| CouchDaoError::InvalidDocId {
        doc_id: doc_id.to_string(),
        kind: "invalid UUID",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_ids_nest_under_theme_and_phase() {
        let id = Uuid::new_v4();
        let doc_id = prompt_doc_id(Theme::WeirdWest, StoryPhase::Action, id);
        assert!(doc_id.starts_with(&prompt_prefix(Theme::WeirdWest, StoryPhase::Action)));
        assert!(!doc_id.starts_with(&prompt_prefix(Theme::WeirdWest, StoryPhase::Setting)));
        assert_eq!(extract_uuid(&doc_id).unwrap(), id);
    }

    #[test]
    fn extract_uuid_rejects_malformed_ids() {
        assert!(matches!(
            extract_uuid("story-without-separator"),
            Err(CouchDaoError::InvalidDocId { kind: "missing separator", .. })
        ));
        assert!(matches!(
            extract_uuid("story::nope"),
            Err(CouchDaoError::InvalidDocId { kind: "invalid UUID", .. })
        ));
    }
}

//! DTO definitions for theme content (origins and prompts).

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::{SeedOrigin, SeedPrompt},
    dao::models::{OriginEntity, PromptEntity},
    dto::format_system_time,
    state::{room::Theme, variant::StoryPhase},
};

/// Opening text offered for a theme.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct OriginResponse {
    /// Absent for built-in entries served while storage is unreachable.
    pub id: Option<Uuid>,
    pub theme: Theme,
    pub title: String,
    pub text: String,
    pub created_at: Option<String>,
}

impl From<OriginEntity> for OriginResponse {
    fn from(origin: OriginEntity) -> Self {
        Self {
            id: Some(origin.id),
            theme: origin.theme,
            title: origin.title,
            text: origin.text,
            created_at: Some(format_system_time(origin.created_at)),
        }
    }
}

impl From<&SeedOrigin> for OriginResponse {
    fn from(origin: &SeedOrigin) -> Self {
        Self {
            id: None,
            theme: origin.theme,
            title: origin.title.clone(),
            text: origin.text.clone(),
            created_at: None,
        }
    }
}

/// Round prompt offered for a theme and phase.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PromptResponse {
    /// Absent for built-in entries served while storage is unreachable.
    pub id: Option<Uuid>,
    pub theme: Theme,
    pub category: StoryPhase,
    pub text: String,
    pub created_at: Option<String>,
}

impl From<PromptEntity> for PromptResponse {
    fn from(prompt: PromptEntity) -> Self {
        Self {
            id: Some(prompt.id),
            theme: prompt.theme,
            category: prompt.category,
            text: prompt.text,
            created_at: Some(format_system_time(prompt.created_at)),
        }
    }
}

impl From<&SeedPrompt> for PromptResponse {
    fn from(prompt: &SeedPrompt) -> Self {
        Self {
            id: None,
            theme: prompt.theme,
            category: prompt.category,
            text: prompt.text.clone(),
            created_at: None,
        }
    }
}

/// Request to add a prompt to a theme.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreatePromptRequest {
    pub category: StoryPhase,
    #[validate(length(min = 10, max = 200))]
    pub text: String,
}

/// Summary returned by a catalog seeding run.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct SeedReport {
    pub origins_added: usize,
    pub origins_skipped: usize,
    pub prompts_added: usize,
    pub prompts_skipped: usize,
}

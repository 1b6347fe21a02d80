#[cfg(feature = "couch-store")]
pub mod couchdb;
pub mod memory;
#[cfg(feature = "mongo-store")]
pub mod mongodb;

use crate::dao::models::{OriginEntity, PromptEntity, StoryEntity};
use crate::dao::storage::StorageResult;
use crate::state::{room::Theme, variant::StoryPhase};
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the persistence layer for archived stories and theme content.
pub trait StoryStore: Send + Sync {
    /// Insert a completed story.
    fn save_story(&self, story: StoryEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Fetch a story by id.
    fn find_story(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<StoryEntity>>>;
    /// Stories a player took part in, newest first.
    fn list_stories_for_player(
        &self,
        player_id: String,
    ) -> BoxFuture<'static, StorageResult<Vec<StoryEntity>>>;
    /// Delete a story, returning whether it existed.
    fn delete_story(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    /// Origins stored for a theme.
    fn list_origins(&self, theme: Theme) -> BoxFuture<'static, StorageResult<Vec<OriginEntity>>>;
    /// Prompts stored for a theme and phase.
    fn list_prompts(
        &self,
        theme: Theme,
        category: StoryPhase,
    ) -> BoxFuture<'static, StorageResult<Vec<PromptEntity>>>;
    /// Insert or replace an origin.
    fn save_origin(&self, origin: OriginEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Insert or replace a prompt.
    fn save_prompt(&self, prompt: PromptEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Cheap liveness probe.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Re-establish the underlying connection.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}

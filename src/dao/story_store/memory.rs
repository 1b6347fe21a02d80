use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use futures::future::BoxFuture;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    dao::{
        models::{OriginEntity, PromptEntity, StoryEntity},
        storage::{StorageError, StorageResult},
        story_store::StoryStore,
    },
    state::{room::Theme, variant::StoryPhase},
};

/// Process-local store used for development and tests. Contents vanish on restart.
#[derive(Clone, Default)]
pub struct MemoryStoryStore {
    inner: Arc<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    offline: AtomicBool,
    data: RwLock<MemoryData>,
}

#[derive(Default)]
struct MemoryData {
    stories: IndexMap<Uuid, StoryEntity>,
    origins: IndexMap<Uuid, OriginEntity>,
    prompts: IndexMap<Uuid, PromptEntity>,
}

impl MemoryStoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage: every call fails with [`StorageError::Offline`] until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    fn ensure_online(&self) -> StorageResult<()> {
        if self.inner.offline.load(Ordering::SeqCst) {
            return Err(StorageError::Offline);
        }
        Ok(())
    }
}

impl StoryStore for MemoryStoryStore {
    fn save_story(&self, story: StoryEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            store.inner.data.write().await.stories.insert(story.id, story);
            Ok(())
        })
    }

    fn find_story(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<StoryEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            Ok(store.inner.data.read().await.stories.get(&id).cloned())
        })
    }

    fn list_stories_for_player(
        &self,
        player_id: String,
    ) -> BoxFuture<'static, StorageResult<Vec<StoryEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            let data = store.inner.data.read().await;
            let mut stories: Vec<StoryEntity> = data
                .stories
                .values()
                .filter(|story| story.has_member(&player_id))
                .cloned()
                .collect();
            stories.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
            Ok(stories)
        })
    }

    fn delete_story(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            Ok(store
                .inner
                .data
                .write()
                .await
                .stories
                .shift_remove(&id)
                .is_some())
        })
    }

    fn list_origins(&self, theme: Theme) -> BoxFuture<'static, StorageResult<Vec<OriginEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            let data = store.inner.data.read().await;
            Ok(data
                .origins
                .values()
                .filter(|origin| origin.theme == theme)
                .cloned()
                .collect())
        })
    }

    fn list_prompts(
        &self,
        theme: Theme,
        category: StoryPhase,
    ) -> BoxFuture<'static, StorageResult<Vec<PromptEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            let data = store.inner.data.read().await;
            Ok(data
                .prompts
                .values()
                .filter(|prompt| prompt.theme == theme && prompt.category == category)
                .cloned()
                .collect())
        })
    }

    fn save_origin(&self, origin: OriginEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            store
                .inner
                .data
                .write()
                .await
                .origins
                .insert(origin.id, origin);
            Ok(())
        })
    }

    fn save_prompt(&self, prompt: PromptEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.ensure_online()?;
            store
                .inner
                .data
                .write()
                .await
                .prompts
                .insert(prompt.id, prompt);
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_online() })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ensure_online() })
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime};

    use super::*;
    use crate::{dao::models::StoryMemberEntity, state::variant::GameVariant};

    fn story(player: &str, completed_at: SystemTime) -> StoryEntity {
        StoryEntity {
            id: Uuid::new_v4(),
            room_id: Uuid::new_v4(),
            room_name: "Room".into(),
            theme: Theme::WeirdWest,
            variant: GameVariant::Classic,
            origin_title: "Dust".into(),
            origin_text: "Dust everywhere".into(),
            lines: Vec::new(),
            members: vec![StoryMemberEntity {
                player_id: player.into(),
                name: player.into(),
                score: 0,
            }],
            completed_at,
        }
    }

    #[tokio::test]
    async fn player_stories_are_newest_first() {
        let store = MemoryStoryStore::new();
        let now = SystemTime::now();
        let older = story("p1", now - Duration::from_secs(60));
        let newer = story("p1", now);
        store.save_story(older.clone()).await.unwrap();
        store.save_story(newer.clone()).await.unwrap();
        store.save_story(story("p2", now)).await.unwrap();

        let listed = store.list_stories_for_player("p1".into()).await.unwrap();
        let ids: Vec<_> = listed.iter().map(|story| story.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[tokio::test]
    async fn delete_reports_whether_story_existed() {
        let store = MemoryStoryStore::new();
        let entity = story("p1", SystemTime::now());
        store.save_story(entity.clone()).await.unwrap();
        assert!(store.delete_story(entity.id).await.unwrap());
        assert!(!store.delete_story(entity.id).await.unwrap());
        assert!(store.find_story(entity.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn prompts_filter_by_theme_and_phase() {
        let store = MemoryStoryStore::new();
        for (theme, category) in [
            (Theme::WeirdWest, StoryPhase::Setting),
            (Theme::WeirdWest, StoryPhase::Action),
            (Theme::CosmicHorror, StoryPhase::Setting),
        ] {
            store
                .save_prompt(PromptEntity {
                    id: Uuid::new_v4(),
                    theme,
                    category,
                    text: "Describe the place.".into(),
                    created_at: SystemTime::now(),
                })
                .await
                .unwrap();
        }
        let prompts = store
            .list_prompts(Theme::WeirdWest, StoryPhase::Setting)
            .await
            .unwrap();
        assert_eq!(prompts.len(), 1);
    }

    #[tokio::test]
    async fn offline_store_rejects_calls() {
        let store = MemoryStoryStore::new();
        store.set_offline(true);
        assert!(matches!(
            store.health_check().await,
            Err(StorageError::Offline)
        ));
        assert!(store.list_origins(Theme::WeirdWest).await.is_err());
        store.set_offline(false);
        assert!(store.health_check().await.is_ok());
    }
}

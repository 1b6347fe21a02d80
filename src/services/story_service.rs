use tracing::info;
use uuid::Uuid;

use crate::{dto::story::StoryResponse, error::ServiceError, state::SharedState};

/// Fetch an archived story.
pub async fn get_story(state: &SharedState, id: Uuid) -> Result<StoryResponse, ServiceError> {
    let store = state.require_store().await?;
    let Some(story) = store.find_story(id).await? else {
        return Err(ServiceError::NotFound(format!("story `{id}` not found")));
    };
    Ok(story.into())
}

/// Stories a player took part in, newest first.
pub async fn list_player_stories(
    state: &SharedState,
    player_id: &str,
) -> Result<Vec<StoryResponse>, ServiceError> {
    let store = state.require_store().await?;
    let stories = store.list_stories_for_player(player_id.to_owned()).await?;
    Ok(stories.into_iter().map(Into::into).collect())
}

/// Remove an archived story.
pub async fn delete_story(state: &SharedState, id: Uuid) -> Result<(), ServiceError> {
    let store = state.require_store().await?;
    if !store.delete_story(id).await? {
        return Err(ServiceError::NotFound(format!("story `{id}` not found")));
    }
    info!(story_id = %id, "story deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::SystemTime};

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            models::{StoryEntity, StoryMemberEntity},
            story_store::{StoryStore, memory::MemoryStoryStore},
        },
        state::{AppState, room::Theme, variant::GameVariant},
    };

    fn story(player: &str) -> StoryEntity {
        StoryEntity {
            id: Uuid::new_v4(),
            room_id: Uuid::new_v4(),
            room_name: "Crew".into(),
            theme: Theme::CyberpunkNoir,
            variant: GameVariant::Classic,
            origin_title: "The Drift".into(),
            origin_text: "Rain on chrome.".into(),
            lines: Vec::new(),
            members: vec![StoryMemberEntity {
                player_id: player.into(),
                name: player.to_uppercase(),
                score: 65,
            }],
            completed_at: SystemTime::now(),
        }
    }

    #[tokio::test]
    async fn archive_requires_storage() {
        let state = AppState::new(AppConfig::default());
        assert!(matches!(
            get_story(&state, Uuid::new_v4()).await,
            Err(ServiceError::Degraded)
        ));
    }

    #[tokio::test]
    async fn stories_can_be_listed_and_deleted() {
        let state = AppState::new(AppConfig::default());
        let store = MemoryStoryStore::new();
        state.set_story_store(Arc::new(store.clone())).await;
        let saved = story("p1");
        store.save_story(saved.clone()).await.unwrap();

        let fetched = get_story(&state, saved.id).await.unwrap();
        assert_eq!(fetched.scores.get("p1"), Some(&65));
        assert_eq!(list_player_stories(&state, "p1").await.unwrap().len(), 1);
        assert!(list_player_stories(&state, "p2").await.unwrap().is_empty());

        delete_story(&state, saved.id).await.unwrap();
        assert!(matches!(
            delete_story(&state, saved.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}

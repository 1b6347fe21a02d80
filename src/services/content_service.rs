use std::{sync::Arc, time::SystemTime};

use rand::{rng, seq::IndexedRandom};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    config::ContentCatalog,
    dao::{
        models::{OriginEntity, PromptEntity},
        storage::StorageResult,
        story_store::StoryStore,
    },
    dto::content::{CreatePromptRequest, OriginResponse, PromptResponse, SeedReport},
    error::ServiceError,
    state::{SharedState, room::Origin, room::Theme, variant::StoryPhase},
};

/// Origins for a theme: stored ones, or the seed catalog when storage is unreachable or empty.
pub async fn list_origins(state: &SharedState, theme: Theme) -> Vec<OriginResponse> {
    match stored_origins(state, theme).await {
        Some(origins) => origins.into_iter().map(Into::into).collect(),
        None => state
            .config()
            .catalog()
            .origins_for(theme)
            .into_iter()
            .map(Into::into)
            .collect(),
    }
}

/// A random origin for a theme.
pub async fn random_origin(state: &SharedState, theme: Theme) -> Result<OriginResponse, ServiceError> {
    let origins = list_origins(state, theme).await;
    origins
        .choose(&mut rng())
        .cloned()
        .ok_or_else(|| ServiceError::NotFound(format!("no story origins available for {theme}")))
}

/// Prompts for a theme and phase, with the same fallback as [`list_origins`].
pub async fn list_prompts(
    state: &SharedState,
    theme: Theme,
    category: StoryPhase,
) -> Vec<PromptResponse> {
    match stored_prompts(state, theme, category).await {
        Some(prompts) => prompts.into_iter().map(Into::into).collect(),
        None => state
            .config()
            .catalog()
            .prompts_for(theme, category)
            .into_iter()
            .map(Into::into)
            .collect(),
    }
}

/// A random prompt for a theme and phase.
pub async fn random_prompt(
    state: &SharedState,
    theme: Theme,
    category: StoryPhase,
) -> Result<PromptResponse, ServiceError> {
    let prompts = list_prompts(state, theme, category).await;
    prompts.choose(&mut rng()).cloned().ok_or_else(|| {
        ServiceError::NotFound(format!(
            "no {} prompts available for {theme}",
            category.as_str()
        ))
    })
}

/// Opening text for a new game.
pub async fn pick_origin(state: &SharedState, theme: Theme) -> Result<Origin, ServiceError> {
    let origin = random_origin(state, theme).await?;
    Ok(Origin {
        title: origin.title,
        text: origin.text,
    })
}

/// Prompt text for a round, `None` when the theme has none for that phase.
pub async fn pick_prompt(state: &SharedState, theme: Theme, category: StoryPhase) -> Option<String> {
    random_prompt(state, theme, category)
        .await
        .map(|prompt| prompt.text)
        .ok()
}

/// Store a new prompt for a theme.
pub async fn add_prompt(
    state: &SharedState,
    theme: Theme,
    request: CreatePromptRequest,
) -> Result<PromptResponse, ServiceError> {
    let store = state.require_store().await?;
    let prompt = PromptEntity {
        id: Uuid::new_v4(),
        theme,
        category: request.category,
        text: request.text.trim().to_owned(),
        created_at: SystemTime::now(),
    };
    store.save_prompt(prompt.clone()).await?;
    info!(theme = %theme, category = prompt.category.as_str(), id = %prompt.id, "prompt added");
    Ok(prompt.into())
}

/// Copy the seed catalog into the store, skipping entries that already exist.
///
/// Origins match on theme and title; prompts on theme, category and text.
pub async fn seed_catalog(
    store: Arc<dyn StoryStore>,
    catalog: &ContentCatalog,
) -> StorageResult<SeedReport> {
    let mut report = SeedReport::default();

    for theme in Theme::ALL {
        let existing = store.list_origins(theme).await?;
        for origin in catalog.origins_for(theme) {
            if existing.iter().any(|stored| stored.title == origin.title) {
                report.origins_skipped += 1;
                continue;
            }
            store
                .save_origin(OriginEntity {
                    id: Uuid::new_v4(),
                    theme,
                    title: origin.title.clone(),
                    text: origin.text.clone(),
                    created_at: SystemTime::now(),
                })
                .await?;
            report.origins_added += 1;
        }

        for category in StoryPhase::ALL {
            let existing = store.list_prompts(theme, category).await?;
            for prompt in catalog.prompts_for(theme, category) {
                if existing.iter().any(|stored| stored.text == prompt.text) {
                    report.prompts_skipped += 1;
                    continue;
                }
                store
                    .save_prompt(PromptEntity {
                        id: Uuid::new_v4(),
                        theme,
                        category,
                        text: prompt.text.clone(),
                        created_at: SystemTime::now(),
                    })
                    .await?;
                report.prompts_added += 1;
            }
        }
    }

    info!(
        origins_added = report.origins_added,
        origins_skipped = report.origins_skipped,
        prompts_added = report.prompts_added,
        prompts_skipped = report.prompts_skipped,
        "content catalog seeded"
    );
    Ok(report)
}

async fn stored_origins(state: &SharedState, theme: Theme) -> Option<Vec<OriginEntity>> {
    let store = state.require_store().await.ok()?;
    match store.list_origins(theme).await {
        Ok(origins) if !origins.is_empty() => Some(origins),
        Ok(_) => None,
        Err(err) => {
            warn!(theme = %theme, error = %err, "failed to load origins; using seed catalog");
            None
        }
    }
}

async fn stored_prompts(
    state: &SharedState,
    theme: Theme,
    category: StoryPhase,
) -> Option<Vec<PromptEntity>> {
    let store = state.require_store().await.ok()?;
    match store.list_prompts(theme, category).await {
        Ok(prompts) if !prompts.is_empty() => Some(prompts),
        Ok(_) => None,
        Err(err) => {
            warn!(
                theme = %theme,
                category = category.as_str(),
                error = %err,
                "failed to load prompts; using seed catalog"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{AppConfig, SeedOrigin, SeedPrompt},
        dao::story_store::memory::MemoryStoryStore,
        state::AppState,
    };

    fn catalog() -> ContentCatalog {
        ContentCatalog::new(
            vec![SeedOrigin {
                theme: Theme::WeirdWest,
                title: "Dust".into(),
                text: "A town that is not on any map.".into(),
            }],
            vec![SeedPrompt {
                theme: Theme::WeirdWest,
                category: StoryPhase::Setting,
                text: "Describe the saloon.".into(),
            }],
        )
    }

    #[tokio::test]
    async fn degraded_mode_serves_the_seed_catalog() {
        let state = AppState::new(AppConfig::default().with_catalog(catalog()));
        let origins = list_origins(&state, Theme::WeirdWest).await;
        assert_eq!(origins.len(), 1);
        assert!(origins[0].id.is_none());
        assert!(random_origin(&state, Theme::CosmicHorror).await.is_err());
        assert!(
            pick_prompt(&state, Theme::WeirdWest, StoryPhase::Action)
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn stored_content_wins_over_the_catalog() {
        let state = AppState::new(AppConfig::default().with_catalog(catalog()));
        let store = MemoryStoryStore::new();
        state.set_story_store(Arc::new(store.clone())).await;

        add_prompt(
            &state,
            Theme::WeirdWest,
            CreatePromptRequest {
                category: StoryPhase::Setting,
                text: "  Describe the railway station.  ".into(),
            },
        )
        .await
        .unwrap();

        let prompts = list_prompts(&state, Theme::WeirdWest, StoryPhase::Setting).await;
        assert_eq!(prompts.len(), 1);
        assert_eq!(prompts[0].text, "Describe the railway station.");
        assert!(prompts[0].id.is_some());
    }

    #[tokio::test]
    async fn seeding_twice_adds_nothing_new() {
        let store: Arc<dyn StoryStore> = Arc::new(MemoryStoryStore::new());
        let first = seed_catalog(store.clone(), &catalog()).await.unwrap();
        assert_eq!((first.origins_added, first.prompts_added), (1, 1));

        let second = seed_catalog(store.clone(), &catalog()).await.unwrap();
        assert_eq!((second.origins_added, second.prompts_added), (0, 0));
        assert_eq!((second.origins_skipped, second.prompts_skipped), (1, 1));
    }

    #[tokio::test]
    async fn adding_a_prompt_needs_storage() {
        let state = AppState::new(AppConfig::default());
        let result = add_prompt(
            &state,
            Theme::WeirdWest,
            CreatePromptRequest {
                category: StoryPhase::Action,
                text: "A train whistle at midnight.".into(),
            },
        )
        .await;
        assert!(matches!(result, Err(ServiceError::Degraded)));
    }
}

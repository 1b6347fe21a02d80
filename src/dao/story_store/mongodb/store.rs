use std::sync::Arc;

use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{Client, Collection, Database, IndexModel, bson::doc, options::IndexOptions};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{MongoOriginDocument, MongoPromptDocument, MongoStoryDocument, doc_id},
};
use crate::{
    dao::{
        models::{OriginEntity, PromptEntity, StoryEntity},
        storage::StorageResult,
        story_store::StoryStore,
    },
    state::{room::Theme, variant::StoryPhase},
};

const STORY_COLLECTION_NAME: &str = "stories";
const ORIGIN_COLLECTION_NAME: &str = "origins";
const PROMPT_COLLECTION_NAME: &str = "prompts";

/// MongoDB-backed [`StoryStore`].
#[derive(Clone)]
pub struct MongoStoryStore {
    inner: Arc<MongoInner>,
}

struct MongoInner {
    state: RwLock<MongoState>,
    config: MongoConfig,
}

struct MongoState {
    #[allow(dead_code)]
    client: Client,
    database: Database,
}

impl MongoInner {
    async fn ping(&self) -> MongoResult<()> {
        let database = {
            let guard = self.state.read().await;
            guard.database.clone()
        };

        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.config.options, &self.config.database_name).await?;
        let mut guard = self.state.write().await;
        guard.client = client;
        guard.database = database;
        Ok(())
    }
}

impl MongoStoryStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let inner = Arc::new(MongoInner {
            state: RwLock::new(MongoState { client, database }),
            config,
        });

        let store = Self { inner };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        let stories = self.stories().await;
        let story_index = IndexModel::builder()
            .keys(doc! {"player_ids": 1, "completed_at": -1})
            .options(
                IndexOptions::builder()
                    .name(Some("story_player_idx".to_owned()))
                    .build(),
            )
            .build();
        stories
            .create_index(story_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: STORY_COLLECTION_NAME,
                index: "player_ids,completed_at",
                source,
            })?;

        let origins = self.origins().await;
        let origin_index = IndexModel::builder()
            .keys(doc! {"theme": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("origin_theme_idx".to_owned()))
                    .build(),
            )
            .build();
        origins
            .create_index(origin_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: ORIGIN_COLLECTION_NAME,
                index: "theme",
                source,
            })?;

        let prompts = self.prompts().await;
        let prompt_index = IndexModel::builder()
            .keys(doc! {"theme": 1, "category": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("prompt_theme_category_idx".to_owned()))
                    .build(),
            )
            .build();
        prompts
            .create_index(prompt_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: PROMPT_COLLECTION_NAME,
                index: "theme,category",
                source,
            })?;

        Ok(())
    }

    async fn stories(&self) -> Collection<MongoStoryDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoStoryDocument>(STORY_COLLECTION_NAME)
    }

    async fn origins(&self) -> Collection<MongoOriginDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoOriginDocument>(ORIGIN_COLLECTION_NAME)
    }

    async fn prompts(&self) -> Collection<MongoPromptDocument> {
        let guard = self.inner.state.read().await;
        guard
            .database
            .collection::<MongoPromptDocument>(PROMPT_COLLECTION_NAME)
    }

    async fn save_story(&self, story: StoryEntity) -> MongoResult<()> {
        let id = story.id;
        let document: MongoStoryDocument = story.into();
        self.stories()
            .await
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveStory { id, source })?;
        Ok(())
    }

    async fn find_story(&self, id: Uuid) -> MongoResult<Option<StoryEntity>> {
        let document = self
            .stories()
            .await
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadStory { id, source })?;

        document
            .map(|doc| {
                StoryEntity::try_from(doc).map_err(|source| MongoDaoError::CorruptDocument {
                    kind: "story",
                    source,
                })
            })
            .transpose()
    }

    async fn list_stories_for_player(&self, player_id: String) -> MongoResult<Vec<StoryEntity>> {
        let documents: Vec<MongoStoryDocument> = self
            .stories()
            .await
            .find(doc! {"player_ids": &player_id})
            .sort(doc! {"completed_at": -1})
            .await
            .map_err(|source| MongoDaoError::ListStories {
                player_id: player_id.clone(),
                source,
            })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListStories {
                player_id: player_id.clone(),
                source,
            })?;

        documents
            .into_iter()
            .map(|doc| {
                StoryEntity::try_from(doc).map_err(|source| MongoDaoError::CorruptDocument {
                    kind: "story",
                    source,
                })
            })
            .collect()
    }

    async fn delete_story(&self, id: Uuid) -> MongoResult<bool> {
        let result = self
            .stories()
            .await
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::DeleteStory { id, source })?;
        Ok(result.deleted_count > 0)
    }

    async fn list_origins(&self, theme: Theme) -> MongoResult<Vec<OriginEntity>> {
        let list_error = |source| MongoDaoError::ListContent {
            kind: "origins",
            theme: theme.label().to_owned(),
            source,
        };
        let documents: Vec<MongoOriginDocument> = self
            .origins()
            .await
            .find(doc! {"theme": theme.label()})
            .await
            .map_err(list_error)?
            .try_collect()
            .await
            .map_err(list_error)?;

        documents
            .into_iter()
            .map(|doc| {
                OriginEntity::try_from(doc).map_err(|source| MongoDaoError::CorruptDocument {
                    kind: "origin",
                    source,
                })
            })
            .collect()
    }

    async fn list_prompts(
        &self,
        theme: Theme,
        category: StoryPhase,
    ) -> MongoResult<Vec<PromptEntity>> {
        let list_error = |source| MongoDaoError::ListContent {
            kind: "prompts",
            theme: theme.label().to_owned(),
            source,
        };
        let documents: Vec<MongoPromptDocument> = self
            .prompts()
            .await
            .find(doc! {"theme": theme.label(), "category": category.as_str()})
            .await
            .map_err(list_error)?
            .try_collect()
            .await
            .map_err(list_error)?;

        documents
            .into_iter()
            .map(|doc| {
                PromptEntity::try_from(doc).map_err(|source| MongoDaoError::CorruptDocument {
                    kind: "prompt",
                    source,
                })
            })
            .collect()
    }

    async fn save_origin(&self, origin: OriginEntity) -> MongoResult<()> {
        let id = origin.id;
        let document: MongoOriginDocument = origin.into();
        self.origins()
            .await
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveContent {
                kind: "origin",
                id,
                source,
            })?;
        Ok(())
    }

    async fn save_prompt(&self, prompt: PromptEntity) -> MongoResult<()> {
        let id = prompt.id;
        let document: MongoPromptDocument = prompt.into();
        self.prompts()
            .await
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveContent {
                kind: "prompt",
                id,
                source,
            })?;
        Ok(())
    }
}

impl StoryStore for MongoStoryStore {
    fn save_story(&self, story: StoryEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_story(story).await.map_err(Into::into) })
    }

    fn find_story(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<StoryEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_story(id).await.map_err(Into::into) })
    }

    fn list_stories_for_player(
        &self,
        player_id: String,
    ) -> BoxFuture<'static, StorageResult<Vec<StoryEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_stories_for_player(player_id)
                .await
                .map_err(Into::into)
        })
    }

    fn delete_story(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_story(id).await.map_err(Into::into) })
    }

    fn list_origins(&self, theme: Theme) -> BoxFuture<'static, StorageResult<Vec<OriginEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_origins(theme).await.map_err(Into::into) })
    }

    fn list_prompts(
        &self,
        theme: Theme,
        category: StoryPhase,
    ) -> BoxFuture<'static, StorageResult<Vec<PromptEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .list_prompts(theme, category)
                .await
                .map_err(Into::into)
        })
    }

    fn save_origin(&self, origin: OriginEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_origin(origin).await.map_err(Into::into) })
    }

    fn save_prompt(&self, prompt: PromptEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_prompt(prompt).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.inner.reconnect().await.map_err(Into::into) })
    }
}

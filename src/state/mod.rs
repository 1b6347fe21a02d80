pub mod hub;
pub mod lifecycle;
pub mod registry;
pub mod room;
pub mod round;
pub mod scoring;
pub mod variant;

use std::sync::Arc;

use tokio::sync::{RwLock, watch};

use crate::{
    config::AppConfig, dao::story_store::StoryStore, error::ServiceError,
    state::registry::RoomRegistry,
};

pub type SharedState = Arc<AppState>;

/// Central application state: the room registry, configuration and the storage handle.
pub struct AppState {
    story_store: RwLock<Option<Arc<dyn StoryStore>>>,
    rooms: RoomRegistry,
    config: AppConfig,
    degraded: watch::Sender<bool>,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`] so it can be cloned cheaply.
    ///
    /// The application starts in degraded mode until a storage backend is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        Arc::new(Self {
            story_store: RwLock::new(None),
            rooms: RoomRegistry::new(config.room_event_capacity()),
            config,
            degraded: degraded_tx,
        })
    }

    /// Obtain a handle to the current story store, if one is installed.
    pub async fn story_store(&self) -> Option<Arc<dyn StoryStore>> {
        let guard = self.story_store.read().await;
        guard.as_ref().cloned()
    }

    /// Install a story store implementation and leave degraded mode.
    pub async fn set_story_store(&self, store: Arc<dyn StoryStore>) {
        {
            let mut guard = self.story_store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false).await;
    }

    /// Remove the current story store and enter degraded mode.
    pub async fn clear_story_store(&self) {
        {
            let mut guard = self.story_store.write().await;
            guard.take();
        }
        self.update_degraded(true).await;
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        *self.degraded.borrow()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Update and broadcast the degraded flag when the value changes.
    pub async fn update_degraded(&self, value: bool) {
        self.degraded.send_if_modified(|current| {
            if *current == value {
                return false;
            }
            *current = value;
            true
        });
    }

    /// Store handle, or [`ServiceError::Degraded`] when none is installed or the
    /// backend is unhealthy.
    pub async fn require_store(&self) -> Result<Arc<dyn StoryStore>, ServiceError> {
        if self.is_degraded().await {
            return Err(ServiceError::Degraded);
        }
        self.story_store().await.ok_or(ServiceError::Degraded)
    }

    /// Registry of live rooms.
    pub fn rooms(&self) -> &RoomRegistry {
        &self.rooms
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::story_store::memory::MemoryStoryStore;

    #[tokio::test]
    async fn installing_a_store_leaves_degraded_mode() {
        let state = AppState::new(AppConfig::default());
        let mut watcher = state.degraded_watcher();
        assert!(state.is_degraded().await);
        assert!(state.require_store().await.is_err());

        state
            .set_story_store(Arc::new(MemoryStoryStore::new()))
            .await;
        assert!(!state.is_degraded().await);
        assert!(watcher.has_changed().unwrap());
        assert!(!*watcher.borrow_and_update());
        assert!(state.require_store().await.is_ok());

        state.clear_story_store().await;
        assert!(state.is_degraded().await);
        assert!(state.story_store().await.is_none());
    }
}

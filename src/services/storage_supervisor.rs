use std::{future::Future, sync::Arc, time::Duration};

use tokio::time::sleep;
use tracing::{info, warn};

use crate::{
    dao::{storage::StorageError, story_store::StoryStore},
    services::room_events,
    state::SharedState,
};

const INITIAL_DELAY: Duration = Duration::from_millis(1_000);
const MAX_DELAY: Duration = Duration::from_secs(10);
const HEALTH_POLL_INTERVAL: Duration = Duration::from_secs(5);
const MAX_RECONNECT_ATTEMPTS: u32 = 3;

/// Keep a story store installed in the shared state.
///
/// Connects with exponential backoff, then polls the store health. A failed
/// check enters degraded mode while the store retries its own connection; once
/// those retries run out a fresh connection is attempted.
pub async fn run<F, Fut>(state: SharedState, mut connect: F)
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = Result<Arc<dyn StoryStore>, StorageError>> + Send,
{
    let mut delay = INITIAL_DELAY;

    loop {
        let store = match connect().await {
            Ok(store) => store,
            Err(err) => {
                warn!(error = %err, retry_in_ms = delay.as_millis() as u64, "story store connection failed");
                sleep(delay).await;
                delay = next_delay(delay);
                continue;
            }
        };

        state.set_story_store(store.clone()).await;
        info!("story store connected; leaving degraded mode");
        delay = INITIAL_DELAY;

        watch_health(&state, store.as_ref()).await;
        state.clear_story_store().await;
        warn!("story store lost; reconnecting from scratch");

        sleep(delay).await;
        delay = next_delay(delay);
    }
}

/// Poll the store until it fails and cannot recover in place.
async fn watch_health(state: &SharedState, store: &dyn StoryStore) {
    loop {
        if store.health_check().await.is_ok() {
            if state.is_degraded().await {
                info!("story store healthy again; leaving degraded mode");
                state.update_degraded(false).await;
            }
            sleep(HEALTH_POLL_INTERVAL).await;
            continue;
        }

        if !reconnect_in_place(state, store).await {
            return;
        }
        state.update_degraded(false).await;
        sleep(HEALTH_POLL_INTERVAL).await;
    }
}

async fn reconnect_in_place(state: &SharedState, store: &dyn StoryStore) -> bool {
    let mut delay = INITIAL_DELAY;
    for attempt in 0..MAX_RECONNECT_ATTEMPTS {
        match store.try_reconnect().await {
            Ok(()) => {
                info!(attempt, "story store reconnected after failed health check");
                return true;
            }
            Err(err) => {
                if attempt == 0 {
                    warn!(attempt, error = %err, "story store unreachable; entering degraded mode");
                    state.update_degraded(true).await;
                } else {
                    warn!(attempt, error = %err, "story store reconnect attempt failed");
                }
                sleep(delay).await;
                delay = next_delay(delay);
            }
        }
    }
    warn!(attempts = MAX_RECONNECT_ATTEMPTS, "story store reconnect attempts exhausted");
    false
}

fn next_delay(delay: Duration) -> Duration {
    (delay * 2).min(MAX_DELAY)
}

/// Push every degraded mode change to the rooms so connected clients can warn their players.
pub async fn forward_status(state: SharedState) {
    let mut watcher = state.degraded_watcher();
    while watcher.changed().await.is_ok() {
        let degraded = *watcher.borrow_and_update();
        info!(degraded, "storage mode changed");
        room_events::broadcast_system_status(&state, degraded);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dao::story_store::memory::MemoryStoryStore,
        state::AppState,
    };

    #[tokio::test]
    async fn first_connection_leaves_degraded_mode() {
        let state = AppState::new(AppConfig::default());
        let store = MemoryStoryStore::new();
        let handle = tokio::spawn(run(state.clone(), move || {
            let store = store.clone();
            async move { Ok::<Arc<dyn StoryStore>, StorageError>(Arc::new(store)) }
        }));

        let mut watcher = state.degraded_watcher();
        tokio::time::timeout(Duration::from_secs(1), watcher.wait_for(|degraded| !degraded))
            .await
            .unwrap()
            .unwrap();
        assert!(state.require_store().await.is_ok());
        handle.abort();
    }
}

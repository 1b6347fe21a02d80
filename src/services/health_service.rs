use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Report storage health alongside room and game counts, logging connectivity issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    match state.require_store().await {
        Ok(store) => {
            if let Err(err) = store.health_check().await {
                warn!(error = %err, "storage health check failed");
            }
        }
        Err(_) => warn!("storage unavailable (degraded mode)"),
    }

    let rooms = state.rooms().len();
    let games = state.rooms().active_games().await;
    if state.is_degraded().await {
        HealthResponse::degraded(rooms, games)
    } else {
        HealthResponse::ok(rooms, games)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::story_store::memory::MemoryStoryStore,
        dto::room::CreateRoomRequest,
        services::room_service,
        state::{AppState, room::Member},
    };

    #[tokio::test]
    async fn counts_rooms_and_reports_storage_mode() {
        let state = AppState::new(AppConfig::default());
        let degraded = health_status(&state).await;
        assert_eq!(degraded.status, "degraded");
        assert_eq!(degraded.active_rooms, 0);

        state
            .set_story_store(Arc::new(MemoryStoryStore::new()))
            .await;
        room_service::create_room(
            &state,
            Member {
                id: "h".into(),
                name: "Host".into(),
            },
            CreateRoomRequest {
                name: "Crew".into(),
                max_players: None,
                theme: None,
                variant: None,
            },
        )
        .await
        .unwrap();

        let healthy = health_status(&state).await;
        assert_eq!(healthy.status, "ok");
        assert_eq!(healthy.active_rooms, 1);
        assert_eq!(healthy.active_games, 0);
    }
}

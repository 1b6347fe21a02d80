use serde::Serialize;
use utoipa::ToSchema;

/// Health response returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Health status ("ok" or "degraded").
    pub status: String,
    /// Rooms currently registered.
    pub active_rooms: usize,
    /// Rooms with a game in progress.
    pub active_games: usize,
}

impl HealthResponse {
    /// Create a health response indicating the system is operational.
    pub fn ok(active_rooms: usize, active_games: usize) -> Self {
        Self {
            status: "ok".to_string(),
            active_rooms,
            active_games,
        }
    }

    /// Create a health response indicating the system is in degraded mode.
    pub fn degraded(active_rooms: usize, active_games: usize) -> Self {
        Self {
            status: "degraded".to_string(),
            active_rooms,
            active_games,
        }
    }
}

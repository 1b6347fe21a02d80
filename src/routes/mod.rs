use axum::Router;

use crate::state::SharedState;

pub mod content;
pub mod docs;
pub mod game;
pub mod health;
pub mod identity;
pub mod rooms;
pub mod sse;
pub mod stories;
pub mod websocket;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(rooms::router())
        .merge(game::router())
        .merge(content::router())
        .merge(stories::router())
        .merge(sse::router())
        .merge(websocket::router());

    api_router.merge(docs::router()).with_state(state)
}

/// Theme content catalog with storage fallback.
pub mod content_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Submissions, votes, scribe choice and game completion.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Room event names and broadcast helpers.
pub mod room_events;
/// Room lobby management and game start.
pub mod room_service;
/// Server-Sent Events streams for rooms.
pub mod sse_service;
/// Storage connection supervision and degraded mode.
pub mod storage_supervisor;
/// Archive of completed stories.
pub mod story_service;
/// Player WebSocket sessions.
pub mod websocket_service;

use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Lorecraftr Back.
#[openapi(
    info(
        title = "Lorecraftr Back",
        description = "Rooms, turn-based story rounds and the story archive of the Lorecraftr party game."
    ),
    paths(
        crate::routes::health::healthcheck,
        crate::routes::rooms::create_room,
        crate::routes::rooms::list_available,
        crate::routes::rooms::get_room,
        crate::routes::rooms::get_room_by_code,
        crate::routes::rooms::join_room,
        crate::routes::rooms::join_room_by_code,
        crate::routes::rooms::leave_room,
        crate::routes::rooms::set_theme,
        crate::routes::rooms::toggle_lock,
        crate::routes::rooms::delete_room,
        crate::routes::rooms::start_game,
        crate::routes::game::game_state,
        crate::routes::game::submit_sentence,
        crate::routes::game::submit_vote,
        crate::routes::game::scribe_choice,
        crate::routes::content::list_origins,
        crate::routes::content::random_origin,
        crate::routes::content::list_prompts,
        crate::routes::content::random_prompt,
        crate::routes::content::add_prompt,
        crate::routes::stories::get_story,
        crate::routes::stories::list_player_stories,
        crate::routes::stories::delete_story,
        crate::routes::sse::room_stream,
        crate::routes::websocket::ws_handler,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::room::RoomSummary,
            crate::dto::room::MemberSummary,
            crate::dto::room::LeaveRoomResponse,
            crate::dto::game::GameStateResponse,
            crate::dto::game::ProgressResponse,
            crate::dto::game::RoundResultResponse,
            crate::dto::content::SeedReport,
            crate::dto::story::StoryResponse,
            crate::dto::ws::PlayerInboundMessage,
            crate::dto::ws::PlayerOutboundMessage,
            crate::dto::event::Handshake,
            crate::dto::event::SystemStatus,
            crate::dto::event::PlayerJoinedEvent,
            crate::dto::event::PlayerLeftEvent,
            crate::dto::event::RoomClosedEvent,
            crate::dto::event::GameStartedEvent,
            crate::dto::event::SubmissionReceivedEvent,
            crate::dto::event::VotingPhaseEvent,
            crate::dto::event::VoteReceivedEvent,
            crate::dto::event::ScribeChoiceEvent,
            crate::dto::event::ScribeChangedEvent,
            crate::dto::event::RoundCompleteEvent,
            crate::dto::event::NextRoundEvent,
            crate::dto::event::GameCompleteEvent,
            crate::dto::event::GameAbandonedEvent,
            crate::state::lifecycle::RoomStatus,
            crate::state::room::Theme,
            crate::state::variant::GameVariant,
            crate::state::variant::StoryPhase,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "rooms", description = "Room lobby management"),
        (name = "game", description = "Submissions, votes and the scribe's choice"),
        (name = "content", description = "Story origins and round prompts per theme"),
        (name = "stories", description = "Archive of completed stories"),
        (name = "sse", description = "Server-sent events streams"),
        (name = "players", description = "WebSocket sessions for players"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_room_and_story_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/rooms/{id}/start"));
        assert!(doc.paths.paths.contains_key("/stories/player/{player_id}"));
        assert!(doc.paths.paths.contains_key("/sse/rooms/{id}"));
    }
}

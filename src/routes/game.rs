use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::game::{
        GameStateResponse, ProgressResponse, RoundResultResponse, ScribeChoiceRequest,
        SubmitSentenceRequest, SubmitVoteRequest,
    },
    error::AppError,
    routes::identity::PlayerIdentity,
    services::game_service,
    state::SharedState,
};

/// In-room game endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/rooms/{id}/game", get(game_state))
        .route("/rooms/{id}/game/submissions", post(submit_sentence))
        .route("/rooms/{id}/game/votes", post(submit_vote))
        .route("/rooms/{id}/game/choice", post(scribe_choice))
}

/// Snapshot of the running game for late joiners and reconnects.
#[utoipa::path(
    get,
    path = "/rooms/{id}/game",
    tag = "game",
    params(("id" = String, Path, description = "Room identifier")),
    responses((status = 200, description = "Current game", body = GameStateResponse))
)]
pub async fn game_state(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<GameStateResponse>, AppError> {
    Ok(Json(game_service::snapshot(&state, id).await?))
}

/// Submit or replace the caller's sentence for this round.
#[utoipa::path(
    post,
    path = "/rooms/{id}/game/submissions",
    tag = "game",
    params(("X-Player-Id" = String, Header, description = "Caller identity"),
    ("id" = String, Path, description = "Room identifier")),
    request_body = SubmitSentenceRequest,
    responses((status = 200, description = "Submission recorded", body = ProgressResponse))
)]
pub async fn submit_sentence(
    State(state): State<SharedState>,
    player: PlayerIdentity,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<SubmitSentenceRequest>>,
) -> Result<Json<ProgressResponse>, AppError> {
    Ok(Json(
        game_service::submit_sentence(&state, id, player.id(), &payload.sentence).await?,
    ))
}

/// Vote for another player's submission (voting variants).
#[utoipa::path(
    post,
    path = "/rooms/{id}/game/votes",
    tag = "game",
    params(("X-Player-Id" = String, Header, description = "Caller identity"),
    ("id" = String, Path, description = "Room identifier")),
    request_body = SubmitVoteRequest,
    responses((status = 200, description = "Vote recorded", body = ProgressResponse))
)]
pub async fn submit_vote(
    State(state): State<SharedState>,
    player: PlayerIdentity,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<SubmitVoteRequest>>,
) -> Result<Json<ProgressResponse>, AppError> {
    Ok(Json(
        game_service::submit_vote(&state, id, player.id(), &payload.submission_id).await?,
    ))
}

/// Pick the round's line (scribe only).
#[utoipa::path(
    post,
    path = "/rooms/{id}/game/choice",
    tag = "game",
    params(("X-Player-Id" = String, Header, description = "Caller identity"),
    ("id" = String, Path, description = "Room identifier")),
    request_body = ScribeChoiceRequest,
    responses((status = 200, description = "Round finalised", body = RoundResultResponse))
)]
pub async fn scribe_choice(
    State(state): State<SharedState>,
    player: PlayerIdentity,
    Path(id): Path<Uuid>,
    Valid(Json(payload)): Valid<Json<ScribeChoiceRequest>>,
) -> Result<Json<RoundResultResponse>, AppError> {
    Ok(Json(
        game_service::scribe_choice(&state, id, player.id(), payload).await?,
    ))
}

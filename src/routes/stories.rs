use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use uuid::Uuid;

use crate::{dto::story::StoryResponse, error::AppError, services::story_service, state::SharedState};

/// Story archive endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/stories/{id}", get(get_story).delete(delete_story))
        .route("/stories/player/{player_id}", get(list_player_stories))
}

#[utoipa::path(
    get,
    path = "/stories/{id}",
    tag = "stories",
    params(("id" = String, Path, description = "Story identifier")),
    responses((status = 200, description = "Archived story", body = StoryResponse))
)]
pub async fn get_story(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StoryResponse>, AppError> {
    Ok(Json(story_service::get_story(&state, id).await?))
}

/// Stories a player took part in, newest first.
#[utoipa::path(
    get,
    path = "/stories/player/{player_id}",
    tag = "stories",
    params(("player_id" = String, Path, description = "Player identity")),
    responses((status = 200, description = "Player stories", body = [StoryResponse]))
)]
pub async fn list_player_stories(
    State(state): State<SharedState>,
    Path(player_id): Path<String>,
) -> Result<Json<Vec<StoryResponse>>, AppError> {
    Ok(Json(
        story_service::list_player_stories(&state, &player_id).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/stories/{id}",
    tag = "stories",
    params(("id" = String, Path, description = "Story identifier")),
    responses((status = 204, description = "Story deleted"))
)]
pub async fn delete_story(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    story_service::delete_story(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
};
use axum_valid::Valid;
use uuid::Uuid;

use crate::{
    dto::{
        game::GameStateResponse,
        room::{CreateRoomRequest, LeaveRoomResponse, RoomSummary, UpdateThemeRequest},
    },
    error::AppError,
    routes::identity::PlayerIdentity,
    services::room_service,
    state::SharedState,
};

/// Room lobby endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/rooms", post(create_room))
        .route("/rooms/available", get(list_available))
        .route("/rooms/code/{code}", get(get_room_by_code))
        .route("/rooms/code/{code}/join", post(join_room_by_code))
        .route("/rooms/{id}", get(get_room).delete(delete_room))
        .route("/rooms/{id}/join", post(join_room))
        .route("/rooms/{id}/leave", post(leave_room))
        .route("/rooms/{id}/theme", patch(set_theme))
        .route("/rooms/{id}/lock", patch(toggle_lock))
        .route("/rooms/{id}/start", post(start_game))
}

/// Open a room; the caller becomes its host.
#[utoipa::path(
    post,
    path = "/rooms",
    tag = "rooms",
    params(("X-Player-Id" = String, Header, description = "Caller identity"),
    ("X-Player-Name" = Option<String>, Header, description = "Caller display name")),
    request_body = CreateRoomRequest,
    responses((status = 201, description = "Room created", body = RoomSummary))
)]
pub async fn create_room(
    State(state): State<SharedState>,
    PlayerIdentity(player): PlayerIdentity,
    Valid(Json(payload)): Valid<Json<CreateRoomRequest>>,
) -> Result<(StatusCode, Json<RoomSummary>), AppError> {
    let room = room_service::create_room(&state, player, payload).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

/// Rooms open to newcomers, newest first.
#[utoipa::path(
    get,
    path = "/rooms/available",
    tag = "rooms",
    responses((status = 200, description = "Joinable rooms", body = [RoomSummary]))
)]
pub async fn list_available(State(state): State<SharedState>) -> Json<Vec<RoomSummary>> {
    Json(room_service::list_available(&state).await)
}

#[utoipa::path(
    get,
    path = "/rooms/{id}",
    tag = "rooms",
    params(("id" = String, Path, description = "Room identifier")),
    responses((status = 200, description = "Room", body = RoomSummary))
)]
pub async fn get_room(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RoomSummary>, AppError> {
    Ok(Json(room_service::get_room(&state, id).await?))
}

#[utoipa::path(
    get,
    path = "/rooms/code/{code}",
    tag = "rooms",
    params(("code" = String, Path, description = "Join code, any case")),
    responses((status = 200, description = "Room", body = RoomSummary))
)]
pub async fn get_room_by_code(
    State(state): State<SharedState>,
    Path(code): Path<String>,
) -> Result<Json<RoomSummary>, AppError> {
    Ok(Json(room_service::get_room_by_code(&state, &code).await?))
}

#[utoipa::path(
    post,
    path = "/rooms/{id}/join",
    tag = "rooms",
    params(("X-Player-Id" = String, Header, description = "Caller identity"),
    ("X-Player-Name" = Option<String>, Header, description = "Caller display name"),
    ("id" = String, Path, description = "Room identifier")),
    responses((status = 200, description = "Joined", body = RoomSummary))
)]
pub async fn join_room(
    State(state): State<SharedState>,
    PlayerIdentity(player): PlayerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<RoomSummary>, AppError> {
    Ok(Json(room_service::join_room(&state, id, player).await?))
}

#[utoipa::path(
    post,
    path = "/rooms/code/{code}/join",
    tag = "rooms",
    params(("X-Player-Id" = String, Header, description = "Caller identity"),
    ("X-Player-Name" = Option<String>, Header, description = "Caller display name"),
    ("code" = String, Path, description = "Join code, any case")),
    responses((status = 200, description = "Joined", body = RoomSummary))
)]
pub async fn join_room_by_code(
    State(state): State<SharedState>,
    PlayerIdentity(player): PlayerIdentity,
    Path(code): Path<String>,
) -> Result<Json<RoomSummary>, AppError> {
    Ok(Json(
        room_service::join_room_by_code(&state, &code, player).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/rooms/{id}/leave",
    tag = "rooms",
    params(("X-Player-Id" = String, Header, description = "Caller identity"),
    ("id" = String, Path, description = "Room identifier")),
    responses((status = 200, description = "Left the room", body = LeaveRoomResponse))
)]
pub async fn leave_room(
    State(state): State<SharedState>,
    player: PlayerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<LeaveRoomResponse>, AppError> {
    Ok(Json(
        room_service::leave_room(&state, id, player.id()).await?,
    ))
}

/// Change the theme of a waiting room (host only).
#[utoipa::path(
    patch,
    path = "/rooms/{id}/theme",
    tag = "rooms",
    params(("X-Player-Id" = String, Header, description = "Caller identity"),
    ("id" = String, Path, description = "Room identifier")),
    request_body = UpdateThemeRequest,
    responses((status = 200, description = "Theme updated", body = RoomSummary))
)]
pub async fn set_theme(
    State(state): State<SharedState>,
    player: PlayerIdentity,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateThemeRequest>,
) -> Result<Json<RoomSummary>, AppError> {
    Ok(Json(
        room_service::set_theme(&state, id, player.id(), payload.theme).await?,
    ))
}

/// Lock or unlock a room (host only).
#[utoipa::path(
    patch,
    path = "/rooms/{id}/lock",
    tag = "rooms",
    params(("X-Player-Id" = String, Header, description = "Caller identity"),
    ("id" = String, Path, description = "Room identifier")),
    responses((status = 200, description = "Lock toggled", body = RoomSummary))
)]
pub async fn toggle_lock(
    State(state): State<SharedState>,
    player: PlayerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<RoomSummary>, AppError> {
    Ok(Json(
        room_service::toggle_lock(&state, id, player.id()).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/rooms/{id}",
    tag = "rooms",
    params(("X-Player-Id" = String, Header, description = "Caller identity"),
    ("id" = String, Path, description = "Room identifier")),
    responses((status = 204, description = "Room deleted"))
)]
pub async fn delete_room(
    State(state): State<SharedState>,
    player: PlayerIdentity,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    room_service::delete_room(&state, id, player.id()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Start the game (host only, 2 to 4 players).
#[utoipa::path(
    post,
    path = "/rooms/{id}/start",
    tag = "rooms",
    params(("X-Player-Id" = String, Header, description = "Caller identity"),
    ("id" = String, Path, description = "Room identifier")),
    responses((status = 200, description = "Game started", body = GameStateResponse))
)]
pub async fn start_game(
    State(state): State<SharedState>,
    player: PlayerIdentity,
    Path(id): Path<Uuid>,
) -> Result<Json<GameStateResponse>, AppError> {
    Ok(Json(
        room_service::start_game(&state, id, player.id()).await?,
    ))
}

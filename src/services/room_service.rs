//! Room management: creation, membership, settings and game start. Every room
//! mutation happens under the room lock; events go out through the room hub
//! once the mutation is done.

use std::{sync::Arc, time::SystemTime};

use rand::{Rng, rng};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dto::{
        event::{
            GameAbandonedEvent, GameStartedEvent, PlayerJoinedEvent, PlayerLeftEvent,
            RoomClosedEvent, ScribeChangedEvent,
        },
        game::GameStateResponse,
        room::{CreateRoomRequest, LeaveRoomResponse, RoomSummary},
    },
    error::ServiceError,
    services::{content_service, game_service, room_events},
    state::{
        SharedState,
        lifecycle::{RoomEvent, RoomStatus},
        registry::RoomEntry,
        room::{
            ActiveGame, CODE_ALPHABET, CODE_LENGTH, MAX_PLAYERS, MIN_PLAYERS, Member, Room,
            RoomSlot, Theme,
        },
        round::RoundCoordinator,
        variant::StoryPhase,
    },
};

const CODE_ATTEMPTS: usize = 10;
const AVAILABLE_LIMIT: usize = 20;

/// Open a new room with the caller as host and first member.
pub async fn create_room(
    state: &SharedState,
    host: Member,
    request: CreateRoomRequest,
) -> Result<RoomSummary, ServiceError> {
    let CreateRoomRequest {
        name,
        max_players,
        theme,
        variant,
    } = request;

    let mut room = Room {
        id: Uuid::new_v4(),
        code: String::new(),
        name: name.trim().to_owned(),
        host_id: host.id.clone(),
        members: vec![host],
        max_players: max_players.unwrap_or(MAX_PLAYERS),
        theme: theme.unwrap_or_default(),
        variant: variant.unwrap_or_else(|| state.config().default_variant()),
        locked: false,
        created_at: SystemTime::now(),
    };

    for _ in 0..CODE_ATTEMPTS {
        room.code = generate_code();
        match state.rooms().insert(room) {
            Ok(entry) => {
                let slot = entry.lock().await;
                info!(
                    room_id = %entry.id(),
                    code = entry.code(),
                    host_id = %slot.room.host_id,
                    "room created"
                );
                return Ok(RoomSummary::from(&*slot));
            }
            Err(rejected) => room = rejected,
        }
    }

    warn!(attempts = CODE_ATTEMPTS, "could not allocate a unique room code");
    Err(ServiceError::InvalidState(
        "could not allocate a unique room code".into(),
    ))
}

/// Rooms a newcomer can join: waiting, unlocked, not full. Newest first.
pub async fn list_available(state: &SharedState) -> Vec<RoomSummary> {
    let mut rooms = Vec::new();
    for entry in state.rooms().entries() {
        let slot = entry.lock().await;
        if slot.status() == RoomStatus::Waiting
            && !slot.lifecycle.is_pending()
            && !slot.room.locked
            && !slot.room.is_full()
        {
            rooms.push((slot.room.created_at, RoomSummary::from(&*slot)));
        }
    }

    rooms.sort_by(|a, b| b.0.cmp(&a.0));
    rooms
        .into_iter()
        .take(AVAILABLE_LIMIT)
        .map(|(_, summary)| summary)
        .collect()
}

/// Fetch a room by id.
pub async fn get_room(state: &SharedState, room_id: Uuid) -> Result<RoomSummary, ServiceError> {
    let entry = find_entry(state, room_id)?;
    let slot = entry.lock().await;
    Ok(RoomSummary::from(&*slot))
}

/// Fetch a room by join code, ignoring case.
pub async fn get_room_by_code(state: &SharedState, code: &str) -> Result<RoomSummary, ServiceError> {
    let entry = find_entry_by_code(state, code)?;
    let slot = entry.lock().await;
    Ok(RoomSummary::from(&*slot))
}

/// Add a player to a room. Joining a room one is already in is a no-op.
pub async fn join_room(
    state: &SharedState,
    room_id: Uuid,
    player: Member,
) -> Result<RoomSummary, ServiceError> {
    let entry = find_entry(state, room_id)?;
    join_entry(&entry, player).await
}

/// Add a player to the room behind a join code.
pub async fn join_room_by_code(
    state: &SharedState,
    code: &str,
    player: Member,
) -> Result<RoomSummary, ServiceError> {
    let entry = find_entry_by_code(state, code)?;
    join_entry(&entry, player).await
}

async fn join_entry(entry: &RoomEntry, player: Member) -> Result<RoomSummary, ServiceError> {
    let mut slot = entry.lock().await;
    if slot.room.is_member(&player.id) {
        return Ok(RoomSummary::from(&*slot));
    }
    ensure_membership_open(&slot)?;
    if slot.status() != RoomStatus::Waiting {
        return Err(ServiceError::InvalidState("game already started".into()));
    }
    if slot.room.locked {
        return Err(ServiceError::InvalidState("room is locked".into()));
    }
    if slot.room.is_full() {
        return Err(ServiceError::InvalidState("room is full".into()));
    }

    let Member { id, name } = player;
    slot.room.members.push(Member {
        id: id.clone(),
        name: name.clone(),
    });
    let summary = RoomSummary::from(&*slot);
    drop(slot);

    info!(room_id = %entry.id(), player_id = %id, "player joined room");
    room_events::broadcast_player_joined(
        entry.hub(),
        PlayerJoinedEvent {
            player_id: id,
            player_name: name,
            room: summary.clone(),
        },
    );
    Ok(summary)
}

/// Remove a player from a room.
///
/// The host role moves to the first remaining member and an emptied room is
/// torn down. Leaving a running game drops the player from the round; the game
/// is abandoned once fewer than [`MIN_PLAYERS`] remain.
pub async fn leave_room(
    state: &SharedState,
    room_id: Uuid,
    player_id: &str,
) -> Result<LeaveRoomResponse, ServiceError> {
    let entry = find_entry(state, room_id)?;
    let mut slot = entry.lock().await;
    let Some(index) = slot
        .room
        .members
        .iter()
        .position(|member| member.id == player_id)
    else {
        return Err(ServiceError::NotFound(format!(
            "player `{player_id}` is not in room `{room_id}`"
        )));
    };
    ensure_membership_open(&slot)?;

    let member = slot.room.members.remove(index);
    info!(room_id = %room_id, player_id = %member.id, "player left room");

    if slot.room.members.is_empty() {
        slot.game = None;
        drop(slot);
        state.rooms().remove(room_id);
        info!(room_id = %room_id, "empty room removed");
        room_events::broadcast_room_closed(
            entry.hub(),
            RoomClosedEvent {
                room_id,
                reason: "room is empty".into(),
            },
        );
        return Ok(LeaveRoomResponse {
            room_id,
            room: None,
        });
    }

    if slot.room.host_id == member.id {
        let next_host = slot.room.members[0].id.clone();
        info!(room_id = %room_id, host_id = %next_host, "host reassigned");
        slot.room.host_id = next_host;
    }

    if slot.status() == RoomStatus::InProgress {
        drop_from_game(&entry, &mut slot, &member.id)?;
    }

    let summary = RoomSummary::from(&*slot);
    drop(slot);

    room_events::broadcast_player_left(
        entry.hub(),
        PlayerLeftEvent {
            player_id: member.id,
            player_name: member.name,
            room: summary.clone(),
        },
    );
    Ok(LeaveRoomResponse {
        room_id,
        room: Some(summary),
    })
}

fn drop_from_game(
    entry: &RoomEntry,
    slot: &mut RoomSlot,
    player_id: &str,
) -> Result<(), ServiceError> {
    let room_id = slot.room.id;
    if slot.room.members.len() < usize::from(MIN_PLAYERS) {
        slot.lifecycle.transition(RoomEvent::AbandonGame)?;
        slot.game = None;
        slot.room.locked = false;
        warn!(room_id = %room_id, "game abandoned, not enough players");
        room_events::broadcast_game_abandoned(
            entry.hub(),
            GameAbandonedEvent {
                room_id,
                reason: "not enough players".into(),
            },
        );
        return Ok(());
    }

    let Some(game) = slot.game.as_mut() else {
        return Ok(());
    };
    let stage_before = game.coordinator.stage();
    let scribe_changed = game.coordinator.remove_member(player_id)?;
    if scribe_changed {
        room_events::broadcast_scribe_changed(
            entry.hub(),
            ScribeChangedEvent {
                round: game.coordinator.round(),
                scribe_id: game.coordinator.scribe_id().to_owned(),
            },
        );
    }
    // A new scribe needs the current choice list even if the stage held.
    if scribe_changed || game.coordinator.stage() != stage_before {
        game_service::announce_stage(entry.hub(), &game.coordinator);
    }
    Ok(())
}

/// Change the theme of a waiting room. Host only.
pub async fn set_theme(
    state: &SharedState,
    room_id: Uuid,
    player_id: &str,
    theme: Theme,
) -> Result<RoomSummary, ServiceError> {
    let entry = find_entry(state, room_id)?;
    let mut slot = entry.lock().await;
    ensure_host(&slot, player_id)?;
    if slot.status() != RoomStatus::Waiting || slot.lifecycle.is_pending() {
        return Err(ServiceError::InvalidState(
            "theme can only change before the game starts".into(),
        ));
    }

    slot.room.theme = theme;
    let summary = RoomSummary::from(&*slot);
    drop(slot);

    info!(room_id = %room_id, theme = %theme, "room theme changed");
    room_events::broadcast_room_updated(entry.hub(), summary.clone());
    Ok(summary)
}

/// Flip the lock flag of a room. Host only.
pub async fn toggle_lock(
    state: &SharedState,
    room_id: Uuid,
    player_id: &str,
) -> Result<RoomSummary, ServiceError> {
    let entry = find_entry(state, room_id)?;
    let mut slot = entry.lock().await;
    ensure_host(&slot, player_id)?;

    slot.room.locked = !slot.room.locked;
    let summary = RoomSummary::from(&*slot);
    drop(slot);

    info!(room_id = %room_id, locked = summary.locked, "room lock toggled");
    room_events::broadcast_room_updated(entry.hub(), summary.clone());
    Ok(summary)
}

/// Tear a room down, dropping any running game. Host only.
pub async fn delete_room(
    state: &SharedState,
    room_id: Uuid,
    player_id: &str,
) -> Result<(), ServiceError> {
    let entry = find_entry(state, room_id)?;
    let mut slot = entry.lock().await;
    ensure_host(&slot, player_id)?;
    ensure_membership_open(&slot)?;

    slot.game = None;
    drop(slot);
    state.rooms().remove(room_id);

    info!(room_id = %room_id, "room deleted");
    room_events::broadcast_room_closed(
        entry.hub(),
        RoomClosedEvent {
            room_id,
            reason: "room deleted by host".into(),
        },
    );
    Ok(())
}

/// Start a game in a waiting room. Host only, with 2 to 4 members.
///
/// The origin and opening prompt are fetched outside the room lock; missing
/// content or a timeout leaves the room waiting.
pub async fn start_game(
    state: &SharedState,
    room_id: Uuid,
    player_id: &str,
) -> Result<GameStateResponse, ServiceError> {
    let entry = find_entry(state, room_id)?;
    let content_state = state.clone();
    let points = *state.config().scoring();

    let (response, status) = entry
        .run_transition(
            RoomEvent::StartGame,
            Some(state.config().start_timeout()),
            |slot| {
                ensure_host(slot, player_id)?;
                let count = slot.room.members.len();
                if !(usize::from(MIN_PLAYERS)..=usize::from(MAX_PLAYERS)).contains(&count) {
                    return Err(ServiceError::InvalidInput(format!(
                        "a game needs {MIN_PLAYERS} to {MAX_PLAYERS} players, room has {count}"
                    )));
                }
                Ok(slot.room.theme)
            },
            |theme| async move {
                let origin = content_service::pick_origin(&content_state, theme).await?;
                let prompt =
                    content_service::pick_prompt(&content_state, theme, StoryPhase::Setting)
                        .await
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "no SETTING prompts available for {theme}"
                            ))
                        })?;
                Ok::<_, ServiceError>((theme, origin, prompt))
            },
            |slot, (theme, origin, prompt)| {
                let coordinator = RoundCoordinator::new(
                    slot.room.member_ids(),
                    slot.room.variant.rules(),
                    points,
                )?;
                let game = ActiveGame {
                    coordinator,
                    theme,
                    origin,
                    prompt: Some(prompt),
                };
                let response = GameStateResponse::new(slot.room.id, slot.room.variant, &game);
                slot.room.locked = true;
                slot.game = Some(game);
                Ok(response)
            },
        )
        .await?;

    info!(room_id = %room_id, status = ?status, round = response.round.round, "game started");

    room_events::broadcast_game_started(
        entry.hub(),
        GameStartedEvent {
            room_id,
            round: response.round.round,
            phase: response.round.phase,
            scribe_id: response.round.scribe_id.clone(),
            max_rounds: response.round.max_rounds,
            theme: response.theme,
            variant: response.variant,
            origin: response.origin.clone(),
            prompt: response.prompt.clone(),
            narrative: Vec::new(),
        },
    );
    let summary = {
        let slot = entry.lock().await;
        RoomSummary::from(&*slot)
    };
    room_events::broadcast_room_updated(entry.hub(), summary);
    Ok(response)
}

pub(crate) fn find_entry(state: &SharedState, room_id: Uuid) -> Result<Arc<RoomEntry>, ServiceError> {
    state
        .rooms()
        .get(room_id)
        .ok_or_else(|| ServiceError::NotFound(format!("room `{room_id}` not found")))
}

fn find_entry_by_code(state: &SharedState, code: &str) -> Result<Arc<RoomEntry>, ServiceError> {
    state
        .rooms()
        .get_by_code(code)
        .ok_or_else(|| ServiceError::NotFound(format!("room with code `{code}` not found")))
}

fn ensure_host(slot: &RoomSlot, player_id: &str) -> Result<(), ServiceError> {
    if !slot.room.is_host(player_id) {
        return Err(ServiceError::Forbidden(
            "only the host can manage the room".into(),
        ));
    }
    Ok(())
}

fn ensure_membership_open(slot: &RoomSlot) -> Result<(), ServiceError> {
    if slot.lifecycle.is_pending() {
        return Err(ServiceError::InvalidState(
            "room is busy starting a game".into(),
        ));
    }
    Ok(())
}

fn generate_code() -> String {
    let mut rng = rng();
    (0..CODE_LENGTH)
        .map(|_| char::from(CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())]))
        .collect()
}

use serde::Serialize;
use tracing::warn;

use crate::{
    dto::{
        event::{
            GameAbandonedEvent, GameCompleteEvent, GameStartedEvent, NextRoundEvent,
            PlayerJoinedEvent, PlayerLeftEvent, RoomClosedEvent, RoomUpdatedEvent,
            RoundCompleteEvent, ScribeChangedEvent, ScribeChoiceEvent, ServerEvent,
            SubmissionReceivedEvent, SystemStatus, VoteReceivedEvent, VotingPhaseEvent,
        },
        room::RoomSummary,
    },
    state::{SharedState, hub::EventHub},
};

pub const EVENT_PLAYER_JOINED: &str = "player.joined";
pub const EVENT_PLAYER_LEFT: &str = "player.left";
pub const EVENT_ROOM_UPDATED: &str = "room.updated";
pub const EVENT_ROOM_CLOSED: &str = "room.closed";
pub const EVENT_GAME_STARTED: &str = "game.started";
pub const EVENT_SUBMISSION_RECEIVED: &str = "submission.received";
pub const EVENT_ROUND_VOTING: &str = "round.voting";
pub const EVENT_VOTE_RECEIVED: &str = "vote.received";
pub const EVENT_ROUND_SCRIBE_CHOICE: &str = "round.scribe_choice";
pub const EVENT_SCRIBE_CHANGED: &str = "round.scribe_changed";
pub const EVENT_ROUND_COMPLETE: &str = "round.complete";
pub const EVENT_ROUND_NEXT: &str = "round.next";
pub const EVENT_GAME_COMPLETE: &str = "game.complete";
pub const EVENT_GAME_ABANDONED: &str = "game.abandoned";
pub const EVENT_SYSTEM_STATUS: &str = "system.status";

/// Broadcast that a player joined the room.
pub fn broadcast_player_joined(hub: &EventHub, payload: PlayerJoinedEvent) {
    send_room_event(hub, EVENT_PLAYER_JOINED, &payload);
}

/// Broadcast that a player left the room.
pub fn broadcast_player_left(hub: &EventHub, payload: PlayerLeftEvent) {
    send_room_event(hub, EVENT_PLAYER_LEFT, &payload);
}

/// Broadcast the new room settings.
pub fn broadcast_room_updated(hub: &EventHub, room: RoomSummary) {
    send_room_event(hub, EVENT_ROOM_UPDATED, &RoomUpdatedEvent(room));
}

/// Broadcast that the room was torn down.
pub fn broadcast_room_closed(hub: &EventHub, payload: RoomClosedEvent) {
    send_room_event(hub, EVENT_ROOM_CLOSED, &payload);
}

/// Broadcast the opening state of a new game.
pub fn broadcast_game_started(hub: &EventHub, payload: GameStartedEvent) {
    send_room_event(hub, EVENT_GAME_STARTED, &payload);
}

/// Broadcast submission progress.
pub fn broadcast_submission_received(hub: &EventHub, payload: SubmissionReceivedEvent) {
    send_room_event(hub, EVENT_SUBMISSION_RECEIVED, &payload);
}

/// Broadcast that voting opened.
pub fn broadcast_voting_phase(hub: &EventHub, payload: VotingPhaseEvent) {
    send_room_event(hub, EVENT_ROUND_VOTING, &payload);
}

/// Broadcast vote progress.
pub fn broadcast_vote_received(hub: &EventHub, payload: VoteReceivedEvent) {
    send_room_event(hub, EVENT_VOTE_RECEIVED, &payload);
}

/// Broadcast that the scribe may choose.
pub fn broadcast_scribe_choice(hub: &EventHub, payload: ScribeChoiceEvent) {
    send_room_event(hub, EVENT_ROUND_SCRIBE_CHOICE, &payload);
}

/// Broadcast a mid-round scribe change after the scribe left.
pub fn broadcast_scribe_changed(hub: &EventHub, payload: ScribeChangedEvent) {
    send_room_event(hub, EVENT_SCRIBE_CHANGED, &payload);
}

/// Broadcast the finalised line of a round.
pub fn broadcast_round_complete(hub: &EventHub, payload: RoundCompleteEvent) {
    send_room_event(hub, EVENT_ROUND_COMPLETE, &payload);
}

/// Broadcast the start of the next round.
pub fn broadcast_next_round(hub: &EventHub, payload: NextRoundEvent) {
    send_room_event(hub, EVENT_ROUND_NEXT, &payload);
}

/// Broadcast the end of the game.
pub fn broadcast_game_complete(hub: &EventHub, payload: GameCompleteEvent) {
    send_room_event(hub, EVENT_GAME_COMPLETE, &payload);
}

/// Broadcast that the game stopped early.
pub fn broadcast_game_abandoned(hub: &EventHub, payload: GameAbandonedEvent) {
    send_room_event(hub, EVENT_GAME_ABANDONED, &payload);
}

/// Push the degraded flag to every room.
pub fn broadcast_system_status(state: &SharedState, degraded: bool) {
    let payload = SystemStatus { degraded };
    for entry in state.rooms().entries() {
        send_room_event(entry.hub(), EVENT_SYSTEM_STATUS, &payload);
    }
}

fn send_room_event(hub: &EventHub, event: &str, payload: &impl Serialize) {
    match ServerEvent::json(Some(event.to_string()), payload) {
        Ok(event) => hub.broadcast(event),
        Err(err) => warn!(event, error = %err, "failed to serialize room event payload"),
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    #[tokio::test]
    async fn events_reach_subscribers_with_their_name() {
        let hub = EventHub::new(4);
        let mut receiver = hub.subscribe();
        let room_id = Uuid::new_v4();
        broadcast_game_abandoned(
            &hub,
            GameAbandonedEvent {
                room_id,
                reason: "not enough players".into(),
            },
        );

        let event = receiver.recv().await.unwrap();
        assert_eq!(event.event.as_deref(), Some(EVENT_GAME_ABANDONED));
        let data: serde_json::Value = serde_json::from_str(&event.data).unwrap();
        assert_eq!(data["room_id"], room_id.to_string());
    }
}

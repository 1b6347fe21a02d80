use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    dto::event::{Handshake, ServerEvent},
    error::ServiceError,
    services::room_service::find_entry,
    state::SharedState,
};

const EVENT_HANDSHAKE: &str = "handshake";

/// Subscribe to a room's event hub.
///
/// The handshake is returned separately so it reaches this client only.
pub async fn subscribe_room(
    state: &SharedState,
    room_id: Uuid,
) -> Result<(broadcast::Receiver<ServerEvent>, ServerEvent), ServiceError> {
    let entry = find_entry(state, room_id)?;
    let receiver = entry.hub().subscribe();
    let handshake = ServerEvent::json(
        Some(EVENT_HANDSHAKE.to_string()),
        &Handshake {
            stream: format!("room:{room_id}"),
            message: format!("subscribed to room {}", entry.code()),
            degraded: state.is_degraded().await,
        },
    )
    .map_err(|err| ServiceError::InvalidState(format!("failed to encode handshake: {err}")))?;
    Ok((receiver, handshake))
}

/// Convert a room subscription into an SSE response, forwarding events until
/// the client disconnects or the room hub goes away.
pub fn to_sse_stream(
    room_id: Uuid,
    handshake: ServerEvent,
    mut receiver: broadcast::Receiver<ServerEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        if tx.send(Ok(to_event(handshake))).await.is_err() {
            return;
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) => {
                            if tx.send(Ok(to_event(payload))).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(skipped)) => {
                            debug!(room_id = %room_id, skipped, "room SSE stream lagged");
                            continue;
                        }
                    }
                }
            }
        }

        info!(room_id = %room_id, "room SSE stream disconnected");
    });

    Sse::new(ReceiverStream::new(rx)).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

fn to_event(payload: ServerEvent) -> Event {
    let event = Event::default().data(payload.data);
    match payload.event {
        Some(name) => event.event(name),
        None => event,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dto::room::CreateRoomRequest,
        services::room_service,
        state::{AppState, room::Member},
    };

    #[tokio::test]
    async fn handshake_names_the_room_stream() {
        let state = AppState::new(AppConfig::default());
        let room = room_service::create_room(
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

        let (_receiver, handshake) = subscribe_room(&state, room.id).await.unwrap();
        assert_eq!(handshake.event.as_deref(), Some(EVENT_HANDSHAKE));
        let data: serde_json::Value = serde_json::from_str(&handshake.data).unwrap();
        assert_eq!(data["stream"], format!("room:{}", room.id));
        assert_eq!(data["degraded"], true);

        assert!(matches!(
            subscribe_room(&state, Uuid::new_v4()).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::{
    sync::{broadcast::error::RecvError, mpsc},
    task::JoinHandle,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dto::{
        game::ScribeChoiceRequest,
        ws::{PlayerInboundMessage, PlayerOutboundMessage},
    },
    error::ServiceError,
    services::{game_service, room_service},
    state::{SharedState, room::Member},
};

const IDENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure while handling one inbound player frame.
#[derive(Debug, Error)]
enum SessionError {
    /// Writer channel closed; the session should end.
    #[error("connection closed")]
    ConnectionClosed,
    /// The action was rejected; reported back to this socket only.
    #[error("{0}")]
    Service(#[from] ServiceError),
}

/// Room the session currently forwards events from.
struct Subscription {
    room_id: Uuid,
    forwarder: JoinHandle<()>,
}

/// Per-connection state of an identified player.
struct PlayerSession {
    state: SharedState,
    player: Member,
    outbound_tx: mpsc::UnboundedSender<Message>,
    subscription: Option<Subscription>,
}

impl PlayerSession {
    async fn handle(&mut self, message: PlayerInboundMessage) -> Result<(), SessionError> {
        let player_id = self.player.id.clone();
        match message {
            PlayerInboundMessage::Identification { .. } => {
                warn!(player_id = %player_id, "ignoring duplicate identification message");
            }
            PlayerInboundMessage::JoinRoom { room_id } => {
                let room = room_service::join_room(&self.state, room_id, self.player.clone()).await?;
                self.subscribe(room_id)?;
                let game = game_service::snapshot(&self.state, room_id).await.ok();
                send_message_to_websocket(
                    &self.outbound_tx,
                    &PlayerOutboundMessage::RoomState { room, game },
                )?;
            }
            PlayerInboundMessage::LeaveRoom { room_id } => {
                room_service::leave_room(&self.state, room_id, &player_id).await?;
                if self
                    .subscription
                    .as_ref()
                    .is_some_and(|subscription| subscription.room_id == room_id)
                {
                    self.unsubscribe();
                }
            }
            PlayerInboundMessage::StartGame { room_id } => {
                room_service::start_game(&self.state, room_id, &player_id).await?;
            }
            PlayerInboundMessage::SubmitSentence { room_id, sentence } => {
                game_service::submit_sentence(&self.state, room_id, &player_id, &sentence).await?;
            }
            PlayerInboundMessage::SubmitVote {
                room_id,
                submission_id,
            } => {
                game_service::submit_vote(&self.state, room_id, &player_id, &submission_id)
                    .await?;
            }
            PlayerInboundMessage::ScribeChoice {
                room_id,
                chosen_id,
                scribe_tag,
            } => {
                game_service::scribe_choice(
                    &self.state,
                    room_id,
                    &player_id,
                    ScribeChoiceRequest {
                        chosen_id,
                        scribe_tag,
                    },
                )
                .await?;
            }
        }
        Ok(())
    }

    /// Forward a room hub onto this socket, replacing any previous subscription.
    fn subscribe(&mut self, room_id: Uuid) -> Result<(), SessionError> {
        if self
            .subscription
            .as_ref()
            .is_some_and(|subscription| subscription.room_id == room_id)
        {
            return Ok(());
        }
        self.unsubscribe();

        let entry = room_service::find_entry(&self.state, room_id)?;
        let mut receiver = entry.hub().subscribe();
        let tx = self.outbound_tx.clone();
        let player_id = self.player.id.clone();

        let forwarder = tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => {
                        let data = match serde_json::from_str(&event.data) {
                            Ok(data) => data,
                            Err(err) => {
                                warn!(error = %err, "dropping room event with invalid payload");
                                continue;
                            }
                        };
                        let frame = PlayerOutboundMessage::Event {
                            event: event.event.unwrap_or_default(),
                            data,
                        };
                        if send_message_to_websocket(&tx, &frame).is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(player_id = %player_id, skipped, "player event stream lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        self.subscription = Some(Subscription { room_id, forwarder });
        Ok(())
    }

    fn unsubscribe(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.forwarder.abort();
        }
    }
}

/// Handle the full lifecycle of a player WebSocket connection.
///
/// The first frame must identify the player. Disconnecting only drops the room
/// subscription; membership stays until the player leaves explicitly.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let initial_message = match tokio::time::timeout(IDENT_TIMEOUT, receiver.next()).await {
        Ok(Some(Ok(Message::Text(text)))) => text,
        Ok(Some(Ok(Message::Close(_)))) => {
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Ok(Some(Ok(_))) => {
            let _ = outbound_tx.send(Message::Close(None));
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Ok(Some(Err(err))) => {
            warn!(error = %err, "websocket receive error");
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Ok(None) | Err(_) => {
            warn!("websocket identification timed out");
            finalize(writer_task, outbound_tx).await;
            return;
        }
    };

    let player = match PlayerInboundMessage::from_json_str(&initial_message) {
        Ok(PlayerInboundMessage::Identification {
            player_id,
            player_name,
        }) => Member {
            id: player_id.trim().to_owned(),
            name: player_name.trim().to_owned(),
        },
        Ok(_) => {
            warn!("first message was not identification");
            let _ = outbound_tx.send(Message::Close(None));
            finalize(writer_task, outbound_tx).await;
            return;
        }
        Err(err) => {
            warn!(error = %err, "failed to parse or validate player message");
            let _ = outbound_tx.send(Message::Close(None));
            finalize(writer_task, outbound_tx).await;
            return;
        }
    };

    info!(player_id = %player.id, "player connected");
    let identified = PlayerOutboundMessage::Identified {
        player_id: player.id.clone(),
    };
    if send_message_to_websocket(&outbound_tx, &identified).is_err() {
        finalize(writer_task, outbound_tx).await;
        return;
    }

    let mut session = PlayerSession {
        state,
        player,
        outbound_tx: outbound_tx.clone(),
        subscription: None,
    };

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => {
                let inbound = match PlayerInboundMessage::from_json_str(&text) {
                    Ok(inbound) => inbound,
                    Err(err) => {
                        warn!(player_id = %session.player.id, error = %err, "rejected player message");
                        let reply = PlayerOutboundMessage::Error {
                            message: err.to_string(),
                        };
                        if send_message_to_websocket(&outbound_tx, &reply).is_err() {
                            break;
                        }
                        continue;
                    }
                };

                match session.handle(inbound).await {
                    Ok(()) => {}
                    Err(SessionError::ConnectionClosed) => {
                        info!(player_id = %session.player.id, "connection closed while replying, terminating");
                        break;
                    }
                    Err(SessionError::Service(err)) => {
                        debug!(player_id = %session.player.id, error = %err, "player action rejected");
                        let reply = PlayerOutboundMessage::Error {
                            message: err.to_string(),
                        };
                        if send_message_to_websocket(&outbound_tx, &reply).is_err() {
                            break;
                        }
                    }
                }
            }
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                info!(player_id = %session.player.id, "player closed the connection");
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) | Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(player_id = %session.player.id, error = %err, "websocket error");
                break;
            }
        }
    }

    session.unsubscribe();
    info!(player_id = %session.player.id, "player disconnected");
    drop(session);

    finalize(writer_task, outbound_tx).await;
}

/// Serialize a frame and queue it on the socket writer.
///
/// A serialization failure is logged and swallowed; a closed writer is
/// reported as [`SessionError::ConnectionClosed`].
fn send_message_to_websocket<T>(
    tx: &mpsc::UnboundedSender<Message>,
    value: &T,
) -> Result<(), SessionError>
where
    T: ?Sized + serde::Serialize + std::fmt::Debug,
{
    let payload = match serde_json::to_string(value) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(error = %err, "failed to serialize frame `{value:?}`");
            return Ok(());
        }
    };

    tx.send(Message::Text(payload.into()))
        .map_err(|_| SessionError::ConnectionClosed)
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::AppConfig,
        dto::room::CreateRoomRequest,
        state::AppState,
    };

    fn session(state: SharedState, id: &str) -> (PlayerSession, mpsc::UnboundedReceiver<Message>) {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        (
            PlayerSession {
                state,
                player: Member {
                    id: id.into(),
                    name: id.to_uppercase(),
                },
                outbound_tx,
                subscription: None,
            },
            outbound_rx,
        )
    }

    fn frame(message: Option<Message>) -> serde_json::Value {
        match message {
            Some(Message::Text(text)) => serde_json::from_str(text.as_str()).unwrap(),
            other => panic!("unexpected frame {other:?}"),
        }
    }

    #[tokio::test]
    async fn join_sends_room_state_then_forwards_events() {
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

        let (mut player, mut frames) = session(state.clone(), "p");
        player
            .handle(PlayerInboundMessage::JoinRoom { room_id: room.id })
            .await
            .unwrap();
        let room_state = frame(frames.recv().await);
        assert_eq!(room_state["type"], "room_state");
        assert_eq!(room_state["room"]["members"].as_array().unwrap().len(), 2);

        room_service::toggle_lock(&state, room.id, "h").await.unwrap();
        let event = frame(frames.recv().await);
        assert_eq!(event["type"], "event");
        assert_eq!(event["event"], "room.updated");
        assert_eq!(event["data"]["locked"], true);

        player.unsubscribe();
    }

    #[tokio::test]
    async fn rejected_actions_surface_as_service_errors() {
        let state = AppState::new(AppConfig::default());
        let (mut player, _frames) = session(state, "p");
        let result = player
            .handle(PlayerInboundMessage::StartGame {
                room_id: Uuid::new_v4(),
            })
            .await;
        assert!(matches!(
            result,
            Err(SessionError::Service(ServiceError::NotFound(_)))
        ));
    }
}

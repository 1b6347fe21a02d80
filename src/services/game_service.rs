//! In-room game flow: submissions, votes and the scribe's choice. Round state is
//! only touched under the room lock; content lookups and story archiving happen
//! after the lock is released.

use std::time::SystemTime;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dao::models::{StoryEntity, StoryLineEntity, StoryMemberEntity, VoteCountEntity},
    dto::{
        event::{
            GameCompleteEvent, NextRoundEvent, RoundCompleteEvent, ScribeChoiceEvent,
            SubmissionReceivedEvent, VoteReceivedEvent, VotingPhaseEvent,
        },
        game::{GameStateResponse, ProgressResponse, RoundResultResponse, ScribeChoiceRequest},
    },
    error::ServiceError,
    services::{content_service, room_events, room_service::find_entry},
    state::{
        SharedState,
        hub::EventHub,
        lifecycle::RoomEvent,
        room::{ActiveGame, RoomSlot},
        round::{NarrativeEntry, RoundCoordinator, RoundStage},
    },
};

/// Number of top-voted submissions offered to the scribe in voting variants.
const TOP_CHOICES: usize = 2;

/// Catch-up view of the running game.
pub async fn snapshot(state: &SharedState, room_id: Uuid) -> Result<GameStateResponse, ServiceError> {
    let entry = find_entry(state, room_id)?;
    let mut slot = entry.lock().await;
    let variant = slot.room.variant;
    let game = active_game(&mut slot)?;
    Ok(GameStateResponse::new(room_id, variant, game))
}

/// Record (or replace) a contributor's sentence for the current round.
pub async fn submit_sentence(
    state: &SharedState,
    room_id: Uuid,
    player_id: &str,
    sentence: &str,
) -> Result<ProgressResponse, ServiceError> {
    let entry = find_entry(state, room_id)?;
    let mut slot = entry.lock().await;
    let player_name = member_name(&slot, player_id)?;
    let game = active_game(&mut slot)?;
    let coordinator = &mut game.coordinator;

    coordinator.record_submission(player_id, sentence.trim(), &player_name)?;
    let received = coordinator.submissions().count();
    let required = coordinator.members().len() - 1;
    debug!(room_id = %room_id, player_id, received, required, "submission recorded");

    room_events::broadcast_submission_received(
        entry.hub(),
        SubmissionReceivedEvent {
            player_id: player_id.to_owned(),
            player_name,
            total_submissions: received,
            required_submissions: required,
        },
    );
    if coordinator.all_submitted() {
        announce_stage(entry.hub(), coordinator);
    }

    Ok(ProgressResponse {
        round: coordinator.round(),
        stage: coordinator.stage(),
        received,
        required,
    })
}

/// Record (or replace) a contributor's vote. Voting variants only.
pub async fn submit_vote(
    state: &SharedState,
    room_id: Uuid,
    voter_id: &str,
    submission_id: &str,
) -> Result<ProgressResponse, ServiceError> {
    let entry = find_entry(state, room_id)?;
    let mut slot = entry.lock().await;
    member_name(&slot, voter_id)?;
    let game = active_game(&mut slot)?;
    let coordinator = &mut game.coordinator;

    if coordinator.stage() == RoundStage::Submitting {
        return Err(ServiceError::InvalidState(
            "votes open once every sentence is in".into(),
        ));
    }
    coordinator.record_vote(voter_id, submission_id)?;
    let snapshot = coordinator.public_state();
    debug!(
        room_id = %room_id,
        voter_id,
        votes = snapshot.votes_cast,
        required = snapshot.expected,
        "vote recorded"
    );

    room_events::broadcast_vote_received(
        entry.hub(),
        VoteReceivedEvent {
            voter_id: voter_id.to_owned(),
            total_votes: snapshot.votes_cast,
            required_votes: snapshot.expected,
        },
    );
    if coordinator.all_voted() {
        announce_stage(entry.hub(), coordinator);
    }

    Ok(ProgressResponse {
        round: snapshot.round,
        stage: coordinator.stage(),
        received: snapshot.votes_cast,
        required: snapshot.expected,
    })
}

/// Finalise the round with the scribe's pick.
///
/// A finished game is archived, the room moves to completed and the
/// coordinator is dropped. Otherwise the next round gets a prompt for its phase
/// when the theme has one.
pub async fn scribe_choice(
    state: &SharedState,
    room_id: Uuid,
    player_id: &str,
    request: ScribeChoiceRequest,
) -> Result<RoundResultResponse, ServiceError> {
    let entry = find_entry(state, room_id)?;
    let mut slot = entry.lock().await;
    let game = active_game(&mut slot)?;
    let coordinator = &mut game.coordinator;

    if coordinator.scribe_id() != player_id {
        return Err(ServiceError::Forbidden(
            "only the scribe can choose the line".into(),
        ));
    }
    if coordinator.stage() != RoundStage::ScribeChoice {
        return Err(ServiceError::InvalidState(
            "the round is still collecting sentences or votes".into(),
        ));
    }

    let outcome = coordinator.finalize_round(&request.chosen_id, request.scribe_tag)?;
    let scores = coordinator.scores().clone();
    let theme = game.theme;
    info!(
        room_id = %room_id,
        round = outcome.entry.round,
        author_id = %outcome.entry.author_id,
        complete = outcome.complete,
        "round finalised"
    );

    room_events::broadcast_round_complete(
        entry.hub(),
        RoundCompleteEvent {
            round: outcome.entry.round,
            chosen_sentence: outcome.entry.text.clone(),
            scribe_tag: outcome.entry.tag.clone(),
            author_id: outcome.entry.author_id.clone(),
            author_name: outcome.entry.author_name.clone(),
            vote_tally: outcome.entry.vote_tally.clone(),
            scores_delta: outcome.scores_delta.clone(),
            scores: scores.clone(),
        },
    );

    if outcome.complete {
        let story = build_story(&slot)?;
        let narrative = game_narrative(&slot);
        slot.lifecycle.transition(RoomEvent::FinishGame)?;
        slot.game = None;
        drop(slot);

        let story_id = archive_story(state, story).await;
        room_events::broadcast_game_complete(
            entry.hub(),
            GameCompleteEvent {
                room_id,
                story_id,
                narrative,
                scores: scores.clone(),
            },
        );
        info!(room_id = %room_id, story_id = ?story_id, "game complete");

        return Ok(RoundResultResponse {
            line: outcome.entry,
            scores_delta: outcome.scores_delta,
            scores,
            complete: true,
            next_round: None,
            next_phase: None,
            next_scribe_id: None,
            prompt: None,
            story_id,
        });
    }

    game.prompt = None;
    drop(slot);

    let prompt = content_service::pick_prompt(state, theme, outcome.next_phase).await;
    if prompt.is_none() {
        debug!(room_id = %room_id, phase = outcome.next_phase.as_str(), "no prompt for next round");
    }
    {
        let mut slot = entry.lock().await;
        if let Some(game) = slot.game.as_mut() {
            if game.coordinator.round() == outcome.next_round {
                game.prompt = prompt.clone();
            }
        }
    }

    room_events::broadcast_next_round(
        entry.hub(),
        NextRoundEvent {
            round: outcome.next_round,
            phase: outcome.next_phase,
            scribe_id: outcome.next_scribe.clone(),
            prompt: prompt.clone(),
        },
    );

    Ok(RoundResultResponse {
        line: outcome.entry,
        scores_delta: outcome.scores_delta,
        scores,
        complete: false,
        next_round: Some(outcome.next_round),
        next_phase: Some(outcome.next_phase),
        next_scribe_id: Some(outcome.next_scribe),
        prompt,
        story_id: None,
    })
}

/// Broadcast the stage the round just entered: voting, or the scribe's choice.
pub(crate) fn announce_stage(hub: &EventHub, coordinator: &RoundCoordinator) {
    let submissions = coordinator.submissions().cloned().collect();
    match coordinator.stage() {
        RoundStage::Submitting => {}
        RoundStage::Voting => {
            room_events::broadcast_voting_phase(hub, VotingPhaseEvent { submissions });
        }
        RoundStage::ScribeChoice => {
            let top_voted = coordinator
                .rules()
                .voting
                .then(|| coordinator.tally_top_choices(TOP_CHOICES));
            room_events::broadcast_scribe_choice(
                hub,
                ScribeChoiceEvent {
                    scribe_id: coordinator.scribe_id().to_owned(),
                    submissions,
                    top_voted,
                },
            );
        }
    }
}

async fn archive_story(state: &SharedState, story: StoryEntity) -> Option<Uuid> {
    let store = match state.require_store().await {
        Ok(store) => store,
        Err(err) => {
            warn!(room_id = %story.room_id, error = %err, "story not archived");
            return None;
        }
    };

    let id = story.id;
    match store.save_story(story).await {
        Ok(()) => Some(id),
        Err(err) => {
            warn!(story_id = %id, error = %err, "failed to archive story");
            None
        }
    }
}

fn build_story(slot: &RoomSlot) -> Result<StoryEntity, ServiceError> {
    let game = slot
        .game
        .as_ref()
        .ok_or_else(|| ServiceError::InvalidState("no game in progress".into()))?;
    let coordinator = &game.coordinator;

    let lines = coordinator
        .narrative()
        .iter()
        .map(|entry| StoryLineEntity {
            round: entry.round,
            text: entry.text.clone(),
            tag: entry.tag.clone(),
            author_id: entry.author_id.clone(),
            author_name: entry.author_name.clone(),
            scribe_id: entry.scribe_id.clone(),
            votes: entry
                .vote_tally
                .iter()
                .map(|count| VoteCountEntity {
                    player_id: count.id.clone(),
                    votes: count.votes,
                })
                .collect(),
        })
        .collect();

    let members = coordinator
        .scores()
        .iter()
        .map(|(id, score)| StoryMemberEntity {
            player_id: id.clone(),
            name: slot.room.member_name(id).unwrap_or(id).to_owned(),
            score: *score,
        })
        .collect();

    Ok(StoryEntity {
        id: Uuid::new_v4(),
        room_id: slot.room.id,
        room_name: slot.room.name.clone(),
        theme: game.theme,
        variant: slot.room.variant,
        origin_title: game.origin.title.clone(),
        origin_text: game.origin.text.clone(),
        lines,
        members,
        completed_at: SystemTime::now(),
    })
}

fn game_narrative(slot: &RoomSlot) -> Vec<NarrativeEntry> {
    slot.game
        .as_ref()
        .map(|game| game.coordinator.narrative().to_vec())
        .unwrap_or_default()
}

fn active_game(slot: &mut RoomSlot) -> Result<&mut ActiveGame, ServiceError> {
    slot.game
        .as_mut()
        .ok_or_else(|| ServiceError::InvalidState("no game in progress".into()))
}

fn member_name(slot: &RoomSlot, player_id: &str) -> Result<String, ServiceError> {
    slot.room
        .member_name(player_id)
        .map(str::to_owned)
        .ok_or_else(|| ServiceError::Forbidden(format!("player `{player_id}` is not in this room")))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::{AppConfig, ContentCatalog, SeedOrigin, SeedPrompt},
        dao::story_store::{StoryStore, memory::MemoryStoryStore},
        dto::room::CreateRoomRequest,
        services::room_service,
        state::{
            AppState,
            lifecycle::RoomStatus,
            room::{Member, Theme},
            variant::{GameVariant, StoryPhase},
        },
    };

    fn member(id: &str) -> Member {
        Member {
            id: id.into(),
            name: id.to_uppercase(),
        }
    }

    async fn running_game(variant: GameVariant, players: &[&str]) -> (SharedState, Uuid) {
        let catalog = ContentCatalog::new(
            vec![SeedOrigin {
                theme: Theme::GrittySciFi,
                title: "Relay".into(),
                text: "The relay station went dark a week ago.".into(),
            }],
            vec![SeedPrompt {
                theme: Theme::GrittySciFi,
                category: StoryPhase::Setting,
                text: "Describe the docking bay.".into(),
            }],
        );
        let state = AppState::new(AppConfig::default().with_catalog(catalog));
        let room = room_service::create_room(
            &state,
            member(players[0]),
            CreateRoomRequest {
                name: "Crew".into(),
                max_players: None,
                theme: Some(Theme::GrittySciFi),
                variant: Some(variant),
            },
        )
        .await
        .unwrap();
        for id in &players[1..] {
            room_service::join_room(&state, room.id, member(id))
                .await
                .unwrap();
        }
        room_service::start_game(&state, room.id, players[0])
            .await
            .unwrap();
        (state, room.id)
    }

    #[tokio::test]
    async fn scribe_cannot_submit_and_strangers_are_refused() {
        let (state, room_id) = running_game(GameVariant::Classic, &["a", "b"]).await;
        let result = submit_sentence(&state, room_id, "a", "The scribe writes.").await;
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));

        let result = submit_sentence(&state, room_id, "z", "Who am I?").await;
        assert!(matches!(result, Err(ServiceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn only_the_scribe_chooses_once_sentences_are_in() {
        let (state, room_id) = running_game(GameVariant::Classic, &["a", "b", "c"]).await;
        submit_sentence(&state, room_id, "b", "Sparks fly.").await.unwrap();

        let early = scribe_choice(
            &state,
            room_id,
            "a",
            ScribeChoiceRequest {
                chosen_id: "b".into(),
                scribe_tag: None,
            },
        )
        .await;
        assert!(matches!(early, Err(ServiceError::InvalidState(_))));

        let progress = submit_sentence(&state, room_id, "c", "The hull groans.").await.unwrap();
        assert_eq!(progress.stage, RoundStage::ScribeChoice);

        let intruder = scribe_choice(
            &state,
            room_id,
            "b",
            ScribeChoiceRequest {
                chosen_id: "c".into(),
                scribe_tag: None,
            },
        )
        .await;
        assert!(matches!(intruder, Err(ServiceError::Forbidden(_))));

        let result = scribe_choice(
            &state,
            room_id,
            "a",
            ScribeChoiceRequest {
                chosen_id: "c".into(),
                scribe_tag: Some("ominous".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(result.line.text, "The hull groans.");
        assert_eq!(result.next_round, Some(2));
        assert_eq!(result.next_scribe_id.as_deref(), Some("b"));
        assert_eq!(result.scores_delta.get("c"), Some(&50));
        assert_eq!(result.scores_delta.get("a"), Some(&15));
    }

    #[tokio::test]
    async fn voting_variant_waits_for_votes() {
        let (state, room_id) = running_game(GameVariant::Saga, &["a", "b", "c"]).await;
        submit_sentence(&state, room_id, "b", "Sparks fly.").await.unwrap();
        let progress = submit_sentence(&state, room_id, "c", "The hull groans.").await.unwrap();
        assert_eq!(progress.stage, RoundStage::Voting);

        let own = submit_vote(&state, room_id, "b", "b").await;
        assert!(matches!(own, Err(ServiceError::InvalidInput(_))));

        submit_vote(&state, room_id, "b", "c").await.unwrap();
        let progress = submit_vote(&state, room_id, "c", "b").await.unwrap();
        assert_eq!(progress.stage, RoundStage::ScribeChoice);
        assert_eq!(progress.received, 2);
    }

    #[tokio::test]
    async fn completing_a_game_archives_the_story() {
        let (state, room_id) = running_game(GameVariant::Classic, &["a", "b"]).await;
        let store = MemoryStoryStore::new();
        state.set_story_store(Arc::new(store.clone())).await;

        let mut last = None;
        for round in 1..=10 {
            let scribe = if round % 2 == 1 { "a" } else { "b" };
            let writer = if scribe == "a" { "b" } else { "a" };
            submit_sentence(&state, room_id, writer, &format!("Line {round}."))
                .await
                .unwrap();
            last = Some(
                scribe_choice(
                    &state,
                    room_id,
                    scribe,
                    ScribeChoiceRequest {
                        chosen_id: writer.into(),
                        scribe_tag: None,
                    },
                )
                .await
                .unwrap(),
            );
        }

        let result = last.unwrap();
        assert!(result.complete);
        let story_id = result.story_id.unwrap();
        let story = store.find_story(story_id).await.unwrap().unwrap();
        assert_eq!(story.lines.len(), 10);
        assert!(story.has_member("a"));

        let entry = state.rooms().get(room_id).unwrap();
        let slot = entry.lock().await;
        assert!(slot.game.is_none());
        assert_eq!(slot.status(), RoomStatus::Completed);
    }

    #[tokio::test]
    async fn degraded_completion_still_finishes_the_game() {
        let (state, room_id) = running_game(GameVariant::Classic, &["a", "b"]).await;
        let mut result = None;
        for round in 1..=10 {
            let (scribe, writer) = if round % 2 == 1 { ("a", "b") } else { ("b", "a") };
            submit_sentence(&state, room_id, writer, "Onwards.").await.unwrap();
            result = Some(
                scribe_choice(
                    &state,
                    room_id,
                    scribe,
                    ScribeChoiceRequest {
                        chosen_id: writer.into(),
                        scribe_tag: None,
                    },
                )
                .await
                .unwrap(),
            );
        }
        let result = result.unwrap();
        assert!(result.complete);
        assert!(result.story_id.is_none());
        assert!(snapshot(&state, room_id).await.is_err());
    }
}

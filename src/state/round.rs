//! Per-room round coordinator: scribe rotation, submissions, votes, narrative and scores.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::state::{
    scoring::{ScoringPoints, VoteCount, calculate_scores},
    variant::{StoryPhase, VariantRules},
};

/// Rejections raised by the round coordinator. Nothing is mutated when one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoundError {
    /// The scribe tried to act as a contributor.
    #[error("the scribe cannot {0} this round")]
    RoleConflict(&'static str),
    /// A player tried to vote for their own submission.
    #[error("players cannot vote for their own submission")]
    SelfVote,
    /// The referenced submission does not exist this round.
    #[error("no submission from `{0}` this round")]
    NotFound(String),
    /// Role rotation over an empty roster.
    #[error("cannot rotate roles over an empty roster")]
    EmptyRoster,
    /// Votes were sent to a variant without a voting stage.
    #[error("this game has no voting stage")]
    VotingDisabled,
    /// The game already ran past its last round.
    #[error("the game is already complete")]
    GameOver,
}

/// One contribution for the current round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Submission {
    /// Contributor identity; also the submission id used by votes and choices.
    pub author_id: String,
    /// Contributor display name at submission time.
    pub author_name: String,
    /// Submitted sentence.
    pub text: String,
}

/// A finalised line of the story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NarrativeEntry {
    /// Chosen sentence.
    pub text: String,
    /// Optional label given by the scribe.
    pub tag: Option<String>,
    /// Contributor of the sentence.
    pub author_id: String,
    /// Contributor display name.
    pub author_name: String,
    /// Round the line was written in.
    pub round: u32,
    /// Scribe who picked the line.
    pub scribe_id: String,
    /// Votes cast during the round, ranked.
    pub vote_tally: Vec<VoteCount>,
}

/// Vote-ranked submission offered to the scribe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RankedChoice {
    /// Contributor identity.
    pub id: String,
    /// Votes received.
    pub votes: u32,
    /// Submitted sentence.
    pub text: String,
    /// Contributor display name.
    pub author_name: String,
}

/// Sub-stage of the current round, derived from collected inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RoundStage {
    /// Waiting on contributor sentences.
    Submitting,
    /// Waiting on contributor votes.
    Voting,
    /// Waiting on the scribe.
    ScribeChoice,
}

/// Result of finalising a round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundOutcome {
    /// Line appended to the narrative.
    pub entry: NarrativeEntry,
    /// Points awarded this round.
    pub scores_delta: IndexMap<String, u32>,
    /// Round number after the increment.
    pub next_round: u32,
    /// Phase of the next round.
    pub next_phase: StoryPhase,
    /// Scribe of the next round.
    pub next_scribe: String,
    /// Whether the game ran out of rounds.
    pub complete: bool,
}

/// Catch-up view of a running game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RoundSnapshot {
    /// Current round number.
    pub round: u32,
    /// Phase of the current round.
    pub phase: StoryPhase,
    /// Last playable round.
    pub max_rounds: u32,
    /// Current scribe.
    pub scribe_id: String,
    /// Sub-stage of the round.
    pub stage: RoundStage,
    /// Whether the game has a voting stage.
    pub voting: bool,
    /// Contributors expected to act this round.
    pub expected: usize,
    /// Identities that already submitted.
    pub submitted_by: Vec<String>,
    /// Submissions, revealed once every contributor submitted.
    pub submissions: Vec<Submission>,
    /// Number of votes cast.
    pub votes_cast: usize,
    /// Finalised lines so far.
    pub narrative: Vec<NarrativeEntry>,
    /// Accumulated points.
    pub scores: IndexMap<String, u32>,
}

/// Next role-holder after `current` in cyclic roster order.
///
/// When `current` is absent or no longer on the roster the first member gets the role.
pub fn rotate_role(members: &[String], current: Option<&str>) -> Result<String, RoundError> {
    if members.is_empty() {
        return Err(RoundError::EmptyRoster);
    }

    let next = current
        .and_then(|id| members.iter().position(|member| member == id))
        .map(|index| (index + 1) % members.len())
        .unwrap_or(0);

    Ok(members[next].clone())
}

/// Count votes per target and rank them by count, ties kept in first-vote order.
pub fn rank_votes<'a, I>(targets: I) -> Vec<VoteCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: IndexMap<&str, u32> = IndexMap::new();
    for target in targets {
        *counts.entry(target).or_default() += 1;
    }

    let mut ranked: Vec<VoteCount> = counts
        .into_iter()
        .map(|(id, votes)| VoteCount {
            id: id.to_string(),
            votes,
        })
        .collect();
    ranked.sort_by(|a, b| b.votes.cmp(&a.votes));
    ranked
}

/// In-memory turn structure of one room's game.
#[derive(Debug, Clone)]
pub struct RoundCoordinator {
    rules: VariantRules,
    points: ScoringPoints,
    members: Vec<String>,
    round: u32,
    scribe_id: String,
    submissions: IndexMap<String, Submission>,
    /// Voter to target, in arrival order of the surviving votes.
    votes: IndexMap<String, String>,
    narrative: Vec<NarrativeEntry>,
    scores: IndexMap<String, u32>,
}

impl RoundCoordinator {
    /// Start a game at round one with the first member as scribe.
    pub fn new(
        members: Vec<String>,
        rules: VariantRules,
        points: ScoringPoints,
    ) -> Result<Self, RoundError> {
        let scribe_id = rotate_role(&members, None)?;
        let scores = members.iter().map(|id| (id.clone(), 0)).collect();
        Ok(Self {
            rules,
            points,
            members,
            round: 1,
            scribe_id,
            submissions: IndexMap::new(),
            votes: IndexMap::new(),
            narrative: Vec::new(),
            scores,
        })
    }

    /// Map a round number onto its phase using this game's rules.
    pub fn advance_phase(&self, round: u32) -> StoryPhase {
        self.rules.advance_phase(round)
    }

    /// Current round number.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Phase of the current round.
    pub fn phase(&self) -> StoryPhase {
        self.advance_phase(self.round)
    }

    /// Current scribe.
    pub fn scribe_id(&self) -> &str {
        &self.scribe_id
    }

    /// Rules this game runs with.
    pub fn rules(&self) -> &VariantRules {
        &self.rules
    }

    /// Ordered roster.
    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Submissions of the current round in arrival order.
    pub fn submissions(&self) -> impl Iterator<Item = &Submission> {
        self.submissions.values()
    }

    /// Finalised lines.
    pub fn narrative(&self) -> &[NarrativeEntry] {
        &self.narrative
    }

    /// Accumulated points.
    pub fn scores(&self) -> &IndexMap<String, u32> {
        &self.scores
    }

    /// Store or overwrite a contributor's sentence for this round.
    pub fn record_submission(
        &mut self,
        contributor_id: &str,
        text: &str,
        display_name: &str,
    ) -> Result<(), RoundError> {
        self.ensure_running()?;
        if contributor_id == self.scribe_id {
            return Err(RoundError::RoleConflict("submit"));
        }

        let submission = Submission {
            author_id: contributor_id.to_string(),
            author_name: display_name.to_string(),
            text: text.to_string(),
        };
        self.submissions
            .insert(contributor_id.to_string(), submission);
        Ok(())
    }

    /// Store or overwrite a contributor's vote for this round.
    pub fn record_vote(&mut self, voter_id: &str, target_id: &str) -> Result<(), RoundError> {
        self.ensure_running()?;
        if !self.rules.voting {
            return Err(RoundError::VotingDisabled);
        }
        if voter_id == self.scribe_id {
            return Err(RoundError::RoleConflict("vote"));
        }
        if voter_id == target_id {
            return Err(RoundError::SelfVote);
        }
        if !self.submissions.contains_key(target_id) {
            return Err(RoundError::NotFound(target_id.to_string()));
        }

        // A changed vote counts as newly arrived for tie-breaking.
        self.votes.shift_remove(voter_id);
        self.votes
            .insert(voter_id.to_string(), target_id.to_string());
        Ok(())
    }

    /// Every non-scribe member submitted.
    pub fn all_submitted(&self) -> bool {
        self.submissions.len() == self.contributor_count()
    }

    /// Every non-scribe member voted.
    pub fn all_voted(&self) -> bool {
        self.votes.len() == self.contributor_count()
    }

    /// Sub-stage of the current round.
    pub fn stage(&self) -> RoundStage {
        if !self.all_submitted() {
            RoundStage::Submitting
        } else if self.rules.voting && !self.all_voted() {
            RoundStage::Voting
        } else {
            RoundStage::ScribeChoice
        }
    }

    /// Top `limit` vote-getters with their sentences.
    pub fn tally_top_choices(&self, limit: usize) -> Vec<RankedChoice> {
        self.tally()
            .into_iter()
            .filter_map(|count| {
                self.submissions.get(&count.id).map(|submission| RankedChoice {
                    id: count.id,
                    votes: count.votes,
                    text: submission.text.clone(),
                    author_name: submission.author_name.clone(),
                })
            })
            .take(limit)
            .collect()
    }

    /// Commit the chosen sentence, score the round and move to the next one.
    pub fn finalize_round(
        &mut self,
        chosen_id: &str,
        tag: Option<String>,
    ) -> Result<RoundOutcome, RoundError> {
        self.ensure_running()?;
        let chosen = self
            .submissions
            .get(chosen_id)
            .ok_or_else(|| RoundError::NotFound(chosen_id.to_string()))?;
        let next_scribe = rotate_role(&self.members, Some(&self.scribe_id))?;

        let tally = self.tally();
        let entry = NarrativeEntry {
            text: chosen.text.clone(),
            tag: tag.filter(|tag| !tag.trim().is_empty()),
            author_id: chosen.author_id.clone(),
            author_name: chosen.author_name.clone(),
            round: self.round,
            scribe_id: self.scribe_id.clone(),
            vote_tally: tally.clone(),
        };

        let scores_delta = calculate_scores(
            self.rules.scoring,
            &self.points,
            &tally,
            Some(chosen_id),
            &self.scribe_id,
        );
        for (id, points) in &scores_delta {
            *self.scores.entry(id.clone()).or_default() += points;
        }

        self.narrative.push(entry.clone());
        self.round += 1;
        self.submissions.clear();
        self.votes.clear();
        self.scribe_id = next_scribe;

        Ok(RoundOutcome {
            entry,
            scores_delta,
            next_round: self.round,
            next_phase: self.phase(),
            next_scribe: self.scribe_id.clone(),
            complete: self.is_complete(),
        })
    }

    /// The round number ran past the configured maximum.
    pub fn is_complete(&self) -> bool {
        self.round > self.rules.max_rounds
    }

    /// Drop a member who left mid-game along with their inputs for this round.
    ///
    /// Returns `true` when the scribe role moved as a consequence.
    pub fn remove_member(&mut self, member_id: &str) -> Result<bool, RoundError> {
        let Some(index) = self.members.iter().position(|id| id == member_id) else {
            return Ok(false);
        };

        if self.members.len() == 1 {
            return Err(RoundError::EmptyRoster);
        }

        let was_scribe = self.scribe_id == member_id;
        let successor = if was_scribe {
            Some(rotate_role(&self.members, Some(member_id))?)
        } else {
            None
        };

        self.members.remove(index);
        self.submissions.shift_remove(member_id);
        self.votes.shift_remove(member_id);
        self.votes.retain(|_, target| target.as_str() != member_id);

        if let Some(next) = successor {
            self.submissions.shift_remove(&next);
            self.votes.shift_remove(&next);
            self.votes.retain(|_, target| *target != next);
            self.scribe_id = next;
        }

        Ok(was_scribe)
    }

    /// Catch-up view for late joiners.
    pub fn public_state(&self) -> RoundSnapshot {
        let stage = self.stage();
        let submissions = if stage == RoundStage::Submitting {
            Vec::new()
        } else {
            self.submissions.values().cloned().collect()
        };

        RoundSnapshot {
            round: self.round,
            phase: self.phase(),
            max_rounds: self.rules.max_rounds,
            scribe_id: self.scribe_id.clone(),
            stage,
            voting: self.rules.voting,
            expected: self.contributor_count(),
            submitted_by: self.submissions.keys().cloned().collect(),
            submissions,
            votes_cast: self.votes.len(),
            narrative: self.narrative.clone(),
            scores: self.scores.clone(),
        }
    }

    fn tally(&self) -> Vec<VoteCount> {
        rank_votes(self.votes.values().map(String::as_str))
    }

    fn contributor_count(&self) -> usize {
        self.members.len().saturating_sub(1)
    }

    fn ensure_running(&self) -> Result<(), RoundError> {
        if self.is_complete() {
            return Err(RoundError::GameOver);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::variant::GameVariant;

    fn roster(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|id| id.to_string()).collect()
    }

    fn classic(ids: &[&str]) -> RoundCoordinator {
        RoundCoordinator::new(
            roster(ids),
            GameVariant::Classic.rules(),
            ScoringPoints::default(),
        )
        .unwrap()
    }

    fn saga(ids: &[&str]) -> RoundCoordinator {
        RoundCoordinator::new(
            roster(ids),
            GameVariant::Saga.rules(),
            ScoringPoints::default(),
        )
        .unwrap()
    }

    #[test]
    fn rotate_role_starts_with_first_member() {
        let members = roster(&["a", "b", "c"]);
        assert_eq!(rotate_role(&members, None).unwrap(), "a");
        assert_eq!(rotate_role(&members, Some("ghost")).unwrap(), "a");
    }

    #[test]
    fn rotate_role_visits_everyone_before_repeating() {
        for size in 2..=4 {
            let members: Vec<String> = (0..size).map(|i| format!("p{i}")).collect();
            let mut current = rotate_role(&members, None).unwrap();
            let mut seen = vec![current.clone()];
            for _ in 1..size {
                let next = rotate_role(&members, Some(&current)).unwrap();
                assert_ne!(next, current);
                assert!(!seen.contains(&next));
                seen.push(next.clone());
                current = next;
            }
            assert_eq!(rotate_role(&members, Some(&current)).unwrap(), members[0]);
        }
    }

    #[test]
    fn rotate_role_rejects_empty_roster() {
        assert_eq!(rotate_role(&[], None), Err(RoundError::EmptyRoster));
        assert!(matches!(
            RoundCoordinator::new(
                Vec::new(),
                GameVariant::Classic.rules(),
                ScoringPoints::default()
            ),
            Err(RoundError::EmptyRoster)
        ));
    }

    #[test]
    fn scribe_cannot_submit_or_vote() {
        let mut game = saga(&["scribe", "b", "c"]);
        let err = game.record_submission("scribe", "I write", "S").unwrap_err();
        assert_eq!(err, RoundError::RoleConflict("submit"));
        assert!(!game.all_submitted());
        assert_eq!(game.submissions().count(), 0);

        game.record_submission("b", "line b", "B").unwrap();
        let err = game.record_vote("scribe", "b").unwrap_err();
        assert_eq!(err, RoundError::RoleConflict("vote"));
        assert_eq!(game.public_state().votes_cast, 0);
    }

    #[test]
    fn self_vote_is_rejected() {
        let mut game = saga(&["scribe", "b", "c"]);
        game.record_submission("b", "line b", "B").unwrap();
        assert_eq!(game.record_vote("b", "b"), Err(RoundError::SelfVote));
    }

    #[test]
    fn vote_requires_voting_variant_and_known_target() {
        let mut game = classic(&["scribe", "b", "c"]);
        game.record_submission("b", "line b", "B").unwrap();
        assert_eq!(game.record_vote("c", "b"), Err(RoundError::VotingDisabled));

        let mut game = saga(&["scribe", "b", "c"]);
        assert_eq!(
            game.record_vote("c", "b"),
            Err(RoundError::NotFound("b".into()))
        );
    }

    #[test]
    fn overwrites_do_not_change_submission_count() {
        let mut game = classic(&["scribe", "b", "c"]);
        game.record_submission("b", "first", "B").unwrap();
        game.record_submission("b", "second", "B").unwrap();
        assert!(!game.all_submitted());
        assert_eq!(game.stage(), RoundStage::Submitting);

        game.record_submission("c", "line c", "C").unwrap();
        assert!(game.all_submitted());
        game.record_submission("c", "line c again", "C").unwrap();
        assert!(game.all_submitted());

        let texts: Vec<_> = game.submissions().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["second", "line c again"]);
        assert_eq!(game.stage(), RoundStage::ScribeChoice);
    }

    #[test]
    fn voting_stage_sits_between_submissions_and_choice() {
        let mut game = saga(&["scribe", "b", "c"]);
        game.record_submission("b", "line b", "B").unwrap();
        game.record_submission("c", "line c", "C").unwrap();
        assert_eq!(game.stage(), RoundStage::Voting);

        game.record_vote("b", "c").unwrap();
        game.record_vote("c", "b").unwrap();
        game.record_vote("c", "b").unwrap();
        assert!(game.all_voted());
        assert_eq!(game.stage(), RoundStage::ScribeChoice);
    }

    #[test]
    fn rank_votes_keeps_first_vote_order_on_ties() {
        let mut targets = vec!["b", "a", "c", "d"];
        targets.extend(std::iter::repeat_n("a", 4));
        targets.extend(std::iter::repeat_n("b", 4));
        targets.extend(std::iter::repeat_n("c", 2));

        let ranked = rank_votes(targets);
        let counts: Vec<_> = ranked.iter().map(|c| (c.id.as_str(), c.votes)).collect();
        assert_eq!(counts, vec![("b", 5), ("a", 5), ("c", 3), ("d", 1)]);
        assert_eq!(&counts[..2], &[("b", 5), ("a", 5)]);
    }

    #[test]
    fn tally_top_choices_enriches_with_text() {
        let mut game = saga(&["scribe", "b", "c", "d"]);
        game.record_submission("b", "line b", "B").unwrap();
        game.record_submission("c", "line c", "C").unwrap();
        game.record_submission("d", "line d", "D").unwrap();
        game.record_vote("b", "c").unwrap();
        game.record_vote("c", "d").unwrap();
        game.record_vote("d", "c").unwrap();

        let top = game.tally_top_choices(2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].id, "c");
        assert_eq!(top[0].votes, 2);
        assert_eq!(top[0].text, "line c");
        assert_eq!(top[1].id, "d");
        assert_eq!(top[1].author_name, "D");
    }

    #[test]
    fn changed_vote_ranks_behind_earlier_ties() {
        let mut game = saga(&["s", "a", "b", "c"]);
        game.record_submission("a", "line a", "A").unwrap();
        game.record_submission("b", "line b", "B").unwrap();
        game.record_submission("c", "line c", "C").unwrap();
        game.record_vote("a", "b").unwrap();
        game.record_vote("b", "a").unwrap();
        game.record_vote("a", "c").unwrap();

        let top: Vec<_> = game
            .tally_top_choices(2)
            .into_iter()
            .map(|choice| (choice.id, choice.votes))
            .collect();
        assert_eq!(top, vec![("a".to_string(), 1), ("c".to_string(), 1)]);
    }

    #[test]
    fn finalize_round_advances_and_clears() {
        let mut game = classic(&["scribe", "b", "c"]);
        game.record_submission("b", "line b", "B").unwrap();
        game.record_submission("c", "line c", "C").unwrap();

        let outcome = game.finalize_round("c", Some("twist".into())).unwrap();
        assert_eq!(outcome.entry.text, "line c");
        assert_eq!(outcome.entry.tag.as_deref(), Some("twist"));
        assert_eq!(outcome.next_round, 2);
        assert_eq!(outcome.next_scribe, "b");
        assert!(!outcome.complete);

        assert_eq!(game.round(), 2);
        assert_eq!(game.narrative().len(), 1);
        assert_eq!(game.submissions().count(), 0);
        assert_eq!(game.public_state().votes_cast, 0);
        assert_eq!(game.scores().get("c"), Some(&50));
        assert_eq!(game.scores().get("scribe"), Some(&15));
        assert_eq!(game.scores().get("b"), Some(&0));
    }

    #[test]
    fn finalize_round_rejects_unknown_choice_without_mutation() {
        let mut game = classic(&["scribe", "b"]);
        game.record_submission("b", "line b", "B").unwrap();
        assert_eq!(
            game.finalize_round("ghost", None),
            Err(RoundError::NotFound("ghost".into()))
        );
        assert_eq!(game.round(), 1);
        assert_eq!(game.submissions().count(), 1);
        assert!(game.narrative().is_empty());
    }

    #[test]
    fn saga_round_scores_votes_and_consistency() {
        let mut game = saga(&["scribe1", "player1", "player2"]);
        game.record_submission("player1", "one", "P1").unwrap();
        game.record_submission("player2", "two", "P2").unwrap();
        game.record_vote("player1", "player2").unwrap();
        game.record_vote("player2", "player1").unwrap();

        let outcome = game.finalize_round("player1", None).unwrap();
        assert_eq!(outcome.scores_delta.get("player1"), Some(&35));
        assert_eq!(outcome.scores_delta.get("player2"), Some(&10));
        assert_eq!(outcome.scores_delta.get("scribe1"), Some(&15));
        assert_eq!(outcome.entry.vote_tally.len(), 2);
    }

    #[test]
    fn two_player_classic_game_completes_after_ten_rounds() {
        let mut game = classic(&["a", "b"]);
        for round in 1..=10 {
            assert!(!game.is_complete());
            let contributor = if game.scribe_id() == "a" { "b" } else { "a" };
            game.record_submission(contributor, &format!("line {round}"), contributor)
                .unwrap();
            assert!(game.all_submitted());
            game.finalize_round(contributor, None).unwrap();
        }

        assert!(game.is_complete());
        assert_eq!(game.narrative().len(), 10);
        assert_eq!(
            game.record_submission("a", "late", "A"),
            Err(RoundError::GameOver)
        );
        let total: u32 = game.scores().values().sum();
        assert_eq!(total, 10 * (50 + 15));
    }

    #[test]
    fn phase_follows_round_number() {
        let mut game = classic(&["a", "b"]);
        let mut phases = vec![game.phase()];
        while !game.is_complete() {
            let contributor = if game.scribe_id() == "a" { "b" } else { "a" };
            game.record_submission(contributor, "line", contributor).unwrap();
            let outcome = game.finalize_round(contributor, None).unwrap();
            if !outcome.complete {
                phases.push(outcome.next_phase);
            }
        }
        assert_eq!(phases.len(), 10);
        assert_eq!(phases[2], StoryPhase::Setting);
        assert_eq!(phases[3], StoryPhase::Action);
        assert_eq!(phases[9], StoryPhase::Consequence);
    }

    #[test]
    fn removing_the_scribe_hands_the_role_on() {
        let mut game = saga(&["a", "b", "c"]);
        game.record_submission("b", "line b", "B").unwrap();
        game.record_submission("c", "line c", "C").unwrap();
        game.record_vote("c", "b").unwrap();

        assert!(game.remove_member("a").unwrap());
        assert_eq!(game.scribe_id(), "b");
        assert_eq!(game.members(), &["b".to_string(), "c".to_string()]);
        let remaining: Vec<_> = game.submissions().map(|s| s.author_id.as_str()).collect();
        assert_eq!(remaining, vec!["c"]);
        assert_eq!(game.public_state().votes_cast, 0);
        assert!(game.all_submitted());
    }

    #[test]
    fn public_state_hides_submissions_until_all_are_in() {
        let mut game = classic(&["a", "b", "c"]);
        game.record_submission("b", "line b", "B").unwrap();
        let snapshot = game.public_state();
        assert_eq!(snapshot.stage, RoundStage::Submitting);
        assert_eq!(snapshot.submitted_by, vec!["b".to_string()]);
        assert!(snapshot.submissions.is_empty());
        assert_eq!(snapshot.expected, 2);

        game.record_submission("c", "line c", "C").unwrap();
        let snapshot = game.public_state();
        assert_eq!(snapshot.submissions.len(), 2);
        assert_eq!(snapshot.max_rounds, 10);
    }
}

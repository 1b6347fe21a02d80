//! Points awarded when a round is finalised.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Scoring formula selected by the game variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScoringPolicy {
    /// Flat bonus for the chosen contributor plus the scribe completion bonus.
    FlatBonus,
    /// Points per vote received, a consistency bonus for the chosen contributor
    /// and the scribe completion bonus.
    VoteWeighted,
}

/// Point values used by both scoring policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringPoints {
    /// Awarded to the chosen contributor under [`ScoringPolicy::FlatBonus`].
    pub chosen_bonus: u32,
    /// Awarded per vote under [`ScoringPolicy::VoteWeighted`].
    pub vote_received: u32,
    /// Awarded to the chosen contributor under [`ScoringPolicy::VoteWeighted`].
    pub consistency_bonus: u32,
    /// Awarded to the scribe for completing the round.
    pub scribe_completion: u32,
}

impl Default for ScoringPoints {
    fn default() -> Self {
        Self {
            chosen_bonus: 50,
            vote_received: 10,
            consistency_bonus: 25,
            scribe_completion: 15,
        }
    }
}

/// Number of votes a contributor received in a round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct VoteCount {
    /// Contributor identity.
    pub id: String,
    /// Votes received.
    pub votes: u32,
}

/// Compute the points delta for one finalised round.
///
/// `tally` is ignored by [`ScoringPolicy::FlatBonus`]. The scribe bonus is
/// added on top of anything already computed for that identity.
pub fn calculate_scores(
    policy: ScoringPolicy,
    points: &ScoringPoints,
    tally: &[VoteCount],
    chosen_id: Option<&str>,
    scribe_id: &str,
) -> IndexMap<String, u32> {
    let mut scores: IndexMap<String, u32> = IndexMap::new();

    match policy {
        ScoringPolicy::FlatBonus => {
            if let Some(chosen) = chosen_id {
                scores.insert(chosen.to_string(), points.chosen_bonus);
            }
        }
        ScoringPolicy::VoteWeighted => {
            for entry in tally {
                *scores.entry(entry.id.clone()).or_default() += entry.votes * points.vote_received;
            }
            if let Some(chosen) = chosen_id {
                *scores.entry(chosen.to_string()).or_default() += points.consistency_bonus;
            }
        }
    }

    *scores.entry(scribe_id.to_string()).or_default() += points.scribe_completion;
    scores
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn as_map(scores: IndexMap<String, u32>) -> HashMap<String, u32> {
        scores.into_iter().collect()
    }

    #[test]
    fn flat_bonus_rewards_chosen_and_scribe() {
        let scores = calculate_scores(
            ScoringPolicy::FlatBonus,
            &ScoringPoints::default(),
            &[],
            Some("X"),
            "S",
        );
        let expected = HashMap::from([("X".to_string(), 50), ("S".to_string(), 15)]);
        assert_eq!(as_map(scores), expected);
    }

    #[test]
    fn flat_bonus_without_choice_only_pays_scribe() {
        let scores = calculate_scores(
            ScoringPolicy::FlatBonus,
            &ScoringPoints::default(),
            &[],
            None,
            "scribe1",
        );
        assert_eq!(as_map(scores), HashMap::from([("scribe1".to_string(), 15)]));
    }

    #[test]
    fn vote_weighted_pays_votes_consistency_and_scribe() {
        let tally = vec![
            VoteCount {
                id: "player1".into(),
                votes: 3,
            },
            VoteCount {
                id: "player2".into(),
                votes: 2,
            },
        ];
        let scores = calculate_scores(
            ScoringPolicy::VoteWeighted,
            &ScoringPoints::default(),
            &tally,
            Some("player1"),
            "scribe1",
        );
        let expected = HashMap::from([
            ("player1".to_string(), 55),
            ("player2".to_string(), 20),
            ("scribe1".to_string(), 15),
        ]);
        assert_eq!(as_map(scores), expected);
    }

    #[test]
    fn scribe_bonus_is_additive() {
        let scores = calculate_scores(
            ScoringPolicy::FlatBonus,
            &ScoringPoints::default(),
            &[],
            Some("same"),
            "same",
        );
        assert_eq!(scores.get("same"), Some(&65));
    }
}

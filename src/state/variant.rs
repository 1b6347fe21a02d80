//! Game rule sets and the round-number to story phase mapping.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::scoring::ScoringPolicy;

/// Narrative band a round belongs to. Ordered: `Setting < Action < Consequence`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoryPhase {
    /// Opening rounds establishing the world.
    Setting,
    /// Rising action.
    Action,
    /// Resolution rounds.
    Consequence,
}

impl StoryPhase {
    /// All phases in narrative order.
    pub const ALL: [StoryPhase; 3] = [
        StoryPhase::Setting,
        StoryPhase::Action,
        StoryPhase::Consequence,
    ];

    /// Stable upper-case label, also used as the prompt category in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryPhase::Setting => "SETTING",
            StoryPhase::Action => "ACTION",
            StoryPhase::Consequence => "CONSEQUENCE",
        }
    }

    /// Parse a prompt category label, accepting any casing.
    pub fn parse(value: &str) -> Option<Self> {
        StoryPhase::ALL
            .into_iter()
            .find(|phase| phase.as_str().eq_ignore_ascii_case(value.trim()))
    }
}

/// Named rule sets. `Classic` is canonical; `Saga` keeps the longer voting game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum GameVariant {
    /// Ten rounds, scribe picks directly from submissions, flat bonus scoring.
    #[default]
    Classic,
    /// Fifteen rounds with a voting stage and vote-weighted scoring.
    Saga,
}

impl GameVariant {
    /// Resolve the concrete rules for this variant.
    pub fn rules(self) -> VariantRules {
        match self {
            GameVariant::Classic => VariantRules {
                max_rounds: 10,
                setting_until: 3,
                action_until: 7,
                voting: false,
                scoring: ScoringPolicy::FlatBonus,
            },
            GameVariant::Saga => VariantRules {
                max_rounds: 15,
                setting_until: 5,
                action_until: 10,
                voting: true,
                scoring: ScoringPolicy::VoteWeighted,
            },
        }
    }
}

/// Concrete turn-structure parameters used by the round coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantRules {
    /// Last playable round; the game completes once the round number exceeds it.
    pub max_rounds: u32,
    /// Last round (inclusive) of the setting band.
    pub setting_until: u32,
    /// Last round (inclusive) of the action band.
    pub action_until: u32,
    /// Whether contributors vote before the scribe chooses.
    pub voting: bool,
    /// Scoring formula applied when a round is finalised.
    pub scoring: ScoringPolicy,
}

impl VariantRules {
    /// Map a round number onto its phase band. Total over `u32`: rounds past the
    /// last band stay in [`StoryPhase::Consequence`].
    pub fn advance_phase(&self, round: u32) -> StoryPhase {
        if round <= self.setting_until {
            StoryPhase::Setting
        } else if round <= self.action_until {
            StoryPhase::Action
        } else {
            StoryPhase::Consequence
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classic_bands_match_ten_round_layout() {
        let rules = GameVariant::Classic.rules();
        assert_eq!(rules.advance_phase(1), StoryPhase::Setting);
        assert_eq!(rules.advance_phase(3), StoryPhase::Setting);
        assert_eq!(rules.advance_phase(4), StoryPhase::Action);
        assert_eq!(rules.advance_phase(7), StoryPhase::Action);
        assert_eq!(rules.advance_phase(8), StoryPhase::Consequence);
        assert_eq!(rules.advance_phase(10), StoryPhase::Consequence);
    }

    #[test]
    fn phases_are_monotonic_and_cover_every_round() {
        for variant in [GameVariant::Classic, GameVariant::Saga] {
            let rules = variant.rules();
            let phases: Vec<_> = (1..=rules.max_rounds)
                .map(|round| rules.advance_phase(round))
                .collect();
            assert!(phases.windows(2).all(|pair| pair[0] <= pair[1]));
            for phase in StoryPhase::ALL {
                assert!(phases.contains(&phase), "{variant:?} never reaches {phase:?}");
            }
        }
    }

    #[test]
    fn saga_uses_voting_and_fifteen_rounds() {
        let rules = GameVariant::Saga.rules();
        assert!(rules.voting);
        assert_eq!(rules.max_rounds, 15);
        assert_eq!(rules.advance_phase(11), StoryPhase::Consequence);
    }

    #[test]
    fn parse_phase_labels() {
        assert_eq!(StoryPhase::parse("setting"), Some(StoryPhase::Setting));
        assert_eq!(StoryPhase::parse("CONSEQUENCE"), Some(StoryPhase::Consequence));
        assert_eq!(StoryPhase::parse("climax"), None);
    }
}

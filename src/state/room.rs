use std::{fmt, time::SystemTime};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::{
    lifecycle::{RoomLifecycle, RoomStatus},
    round::RoundCoordinator,
    variant::GameVariant,
};

/// Characters used for join codes; ambiguous glyphs (I, O, 0, 1) are left out.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
/// Length of a room join code.
pub const CODE_LENGTH: usize = 6;
/// Smallest allowed room capacity, also the minimum roster to start a game.
pub const MIN_PLAYERS: u8 = 2;
/// Largest allowed room capacity.
pub const MAX_PLAYERS: u8 = 4;

/// Story world a room plays in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
pub enum Theme {
    /// Default theme.
    #[default]
    #[serde(rename = "Gritty Sci-Fi")]
    GrittySciFi,
    /// Swords and sorcery.
    #[serde(rename = "High Fantasy")]
    HighFantasy,
    /// Frontier with the uncanny.
    #[serde(rename = "Weird West")]
    WeirdWest,
    /// Neon-lit crime.
    #[serde(rename = "Cyberpunk Noir")]
    CyberpunkNoir,
    /// Unknowable dread.
    #[serde(rename = "Cosmic Horror")]
    CosmicHorror,
}

impl Theme {
    /// Every theme, in menu order.
    pub const ALL: [Theme; 5] = [
        Theme::GrittySciFi,
        Theme::HighFantasy,
        Theme::WeirdWest,
        Theme::CyberpunkNoir,
        Theme::CosmicHorror,
    ];

    /// Display label, also the key used in storage.
    pub fn label(&self) -> &'static str {
        match self {
            Theme::GrittySciFi => "Gritty Sci-Fi",
            Theme::HighFantasy => "High Fantasy",
            Theme::WeirdWest => "Weird West",
            Theme::CyberpunkNoir => "Cyberpunk Noir",
            Theme::CosmicHorror => "Cosmic Horror",
        }
    }

    /// URL-friendly form of the label (`gritty-sci-fi`).
    pub fn slug(&self) -> String {
        self.label().to_ascii_lowercase().replace(' ', "-")
    }

    /// Accept either the label or the slug, ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Theme::ALL.into_iter().find(|theme| {
            theme.label().eq_ignore_ascii_case(value) || theme.slug().eq_ignore_ascii_case(value)
        })
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A room member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Client-asserted identity.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Lobby data of a room.
#[derive(Debug, Clone)]
pub struct Room {
    /// Primary key.
    pub id: Uuid,
    /// Six-character join code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Member allowed to configure and start the room.
    pub host_id: String,
    /// Members in join order.
    pub members: Vec<Member>,
    /// Capacity, between [`MIN_PLAYERS`] and [`MAX_PLAYERS`].
    pub max_players: u8,
    /// Selected story world.
    pub theme: Theme,
    /// Rules the game will run with.
    pub variant: GameVariant,
    /// Locked rooms reject new members.
    pub locked: bool,
    /// Creation timestamp.
    pub created_at: SystemTime,
}

impl Room {
    /// Whether `player_id` is on the roster.
    pub fn is_member(&self, player_id: &str) -> bool {
        self.members.iter().any(|member| member.id == player_id)
    }

    /// Whether `player_id` hosts the room.
    pub fn is_host(&self, player_id: &str) -> bool {
        self.host_id == player_id
    }

    /// Roster reached capacity.
    pub fn is_full(&self) -> bool {
        self.members.len() >= usize::from(self.max_players)
    }

    /// Display name of a member.
    pub fn member_name(&self, player_id: &str) -> Option<&str> {
        self.members
            .iter()
            .find(|member| member.id == player_id)
            .map(|member| member.name.as_str())
    }

    /// Member identities in join order.
    pub fn member_ids(&self) -> Vec<String> {
        self.members.iter().map(|member| member.id.clone()).collect()
    }
}

/// Opening text a game starts from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Origin {
    /// Short title.
    pub title: String,
    /// Opening paragraph.
    pub text: String,
}

/// Running game of a room.
#[derive(Debug, Clone)]
pub struct ActiveGame {
    /// Turn structure and scores.
    pub coordinator: RoundCoordinator,
    /// Theme fixed at start.
    pub theme: Theme,
    /// Opening text.
    pub origin: Origin,
    /// Prompt for the current round, if one was found.
    pub prompt: Option<String>,
}

/// Everything guarded by a room's mutex.
#[derive(Debug)]
pub struct RoomSlot {
    /// Lobby data.
    pub room: Room,
    /// Status machine.
    pub lifecycle: RoomLifecycle,
    /// Running game, present while in progress.
    pub game: Option<ActiveGame>,
}

impl RoomSlot {
    /// Wrap a fresh room in the waiting status.
    pub fn new(room: Room) -> Self {
        Self {
            room,
            lifecycle: RoomLifecycle::new(),
            game: None,
        }
    }

    /// Current lifecycle status.
    pub fn status(&self) -> RoomStatus {
        self.lifecycle.status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room(members: &[&str], max_players: u8) -> Room {
        Room {
            id: Uuid::new_v4(),
            code: "ABC234".into(),
            name: "Test".into(),
            host_id: members[0].into(),
            members: members
                .iter()
                .map(|id| Member {
                    id: id.to_string(),
                    name: id.to_uppercase(),
                })
                .collect(),
            max_players,
            theme: Theme::default(),
            variant: GameVariant::default(),
            locked: false,
            created_at: SystemTime::now(),
        }
    }

    #[test]
    fn theme_parses_labels_and_slugs() {
        assert_eq!(Theme::parse("Weird West"), Some(Theme::WeirdWest));
        assert_eq!(Theme::parse("cyberpunk-noir"), Some(Theme::CyberpunkNoir));
        assert_eq!(Theme::parse("gritty sci-fi"), Some(Theme::GrittySciFi));
        assert_eq!(Theme::parse("Space Opera"), None);
        assert_eq!(Theme::HighFantasy.slug(), "high-fantasy");
    }

    #[test]
    fn theme_serializes_as_label() {
        let json = serde_json::to_string(&Theme::CosmicHorror).unwrap();
        assert_eq!(json, "\"Cosmic Horror\"");
    }

    #[test]
    fn room_membership_helpers() {
        let room = room(&["a", "b"], 2);
        assert!(room.is_member("b"));
        assert!(room.is_host("a"));
        assert!(!room.is_host("b"));
        assert!(room.is_full());
        assert_eq!(room.member_name("b"), Some("B"));
        assert_eq!(room.member_ids(), vec!["a".to_string(), "b".to_string()]);
    }
}

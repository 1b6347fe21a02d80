//! Application-level configuration loading: game rules, scoring and the content seed catalog.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use serde_with::{DurationMilliSeconds, serde_as};
use tracing::{info, warn};

use crate::state::{
    room::Theme,
    scoring::ScoringPoints,
    variant::{GameVariant, StoryPhase},
};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "LORECRAFTR_BACK_CONFIG_PATH";
const DEFAULT_START_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_ROOM_EVENT_CAPACITY: usize = 64;

/// Origin shipped with the seed catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedOrigin {
    /// Theme the origin belongs to.
    pub theme: Theme,
    /// Short title.
    pub title: String,
    /// Opening paragraph.
    pub text: String,
}

/// Prompt shipped with the seed catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedPrompt {
    /// Theme the prompt belongs to.
    pub theme: Theme,
    /// Phase the prompt is meant for.
    pub category: StoryPhase,
    /// Prompt text.
    pub text: String,
}

/// Built-in origins and prompts used to seed storage and as a fallback when it is unreachable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentCatalog {
    #[serde(default)]
    origins: Vec<SeedOrigin>,
    #[serde(default)]
    prompts: Vec<SeedPrompt>,
}

impl ContentCatalog {
    /// Build a catalog from explicit entries.
    pub fn new(origins: Vec<SeedOrigin>, prompts: Vec<SeedPrompt>) -> Self {
        Self { origins, prompts }
    }

    /// Every seed origin.
    pub fn origins(&self) -> &[SeedOrigin] {
        &self.origins
    }

    /// Every seed prompt.
    pub fn prompts(&self) -> &[SeedPrompt] {
        &self.prompts
    }

    /// Seed origins for one theme.
    pub fn origins_for(&self, theme: Theme) -> Vec<&SeedOrigin> {
        self.origins
            .iter()
            .filter(|origin| origin.theme == theme)
            .collect()
    }

    /// Seed prompts for one theme and phase.
    pub fn prompts_for(&self, theme: Theme, category: StoryPhase) -> Vec<&SeedPrompt> {
        self.prompts
            .iter()
            .filter(|prompt| prompt.theme == theme && prompt.category == category)
            .collect()
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    default_variant: GameVariant,
    scoring: ScoringPoints,
    start_timeout: Duration,
    room_event_capacity: usize,
    catalog: ContentCatalog,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        variant = ?app_config.default_variant,
                        origins = app_config.catalog.origins.len(),
                        prompts = app_config.catalog.prompts.len(),
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Variant used when a room does not pick one.
    pub fn default_variant(&self) -> GameVariant {
        self.default_variant
    }

    /// Point values applied by the scoring policies.
    pub fn scoring(&self) -> &ScoringPoints {
        &self.scoring
    }

    /// Upper bound on the content lookup performed when a game starts.
    pub fn start_timeout(&self) -> Duration {
        self.start_timeout
    }

    /// Broadcast capacity of each room event hub.
    pub fn room_event_capacity(&self) -> usize {
        self.room_event_capacity
    }

    /// Seed content catalog.
    pub fn catalog(&self) -> &ContentCatalog {
        &self.catalog
    }

    /// Replace the seed catalog.
    pub fn with_catalog(mut self, catalog: ContentCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Override the game start timeout.
    pub fn with_start_timeout(mut self, timeout: Duration) -> Self {
        self.start_timeout = timeout;
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_variant: GameVariant::default(),
            scoring: ScoringPoints::default(),
            start_timeout: Duration::from_millis(DEFAULT_START_TIMEOUT_MS),
            room_event_capacity: DEFAULT_ROOM_EVENT_CAPACITY,
            catalog: default_catalog(),
        }
    }
}

#[serde_as]
#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    default_variant: GameVariant,
    #[serde(default)]
    scoring: Option<ScoringPoints>,
    #[serde_as(as = "Option<DurationMilliSeconds<u64>>")]
    #[serde(default)]
    start_timeout_ms: Option<Duration>,
    #[serde(default)]
    room_event_capacity: Option<usize>,
    #[serde(default)]
    content: Option<ContentCatalog>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            default_variant: value.default_variant,
            scoring: value.scoring.unwrap_or_default(),
            start_timeout: value
                .start_timeout_ms
                .unwrap_or(Duration::from_millis(DEFAULT_START_TIMEOUT_MS)),
            room_event_capacity: value
                .room_event_capacity
                .filter(|capacity| *capacity > 0)
                .unwrap_or(DEFAULT_ROOM_EVENT_CAPACITY),
            catalog: value.content.unwrap_or_else(default_catalog),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

fn origin(theme: Theme, title: &str, text: &str) -> SeedOrigin {
    SeedOrigin {
        theme,
        title: title.into(),
        text: text.into(),
    }
}

fn prompt(theme: Theme, category: StoryPhase, text: &str) -> SeedPrompt {
    SeedPrompt {
        theme,
        category,
        text: text.into(),
    }
}

/// Built-in catalog shipped with the binary: one origin and one prompt per phase for every theme.
fn default_catalog() -> ContentCatalog {
    use StoryPhase::{Action, Consequence, Setting};
    use Theme::*;

    ContentCatalog {
        origins: vec![
            origin(
                GrittySciFi,
                "The Year 3045",
                "Earth is a wasteland. Humanity clings to existence in massive orbital stations, watching their home planet die below them.",
            ),
            origin(
                HighFantasy,
                "The Citadel of K'tharr",
                "For a thousand years, the crystal towers have stood. Now, the stones whisper of change, and ancient magic stirs beneath the foundations.",
            ),
            origin(
                WeirdWest,
                "Dust Devil Territory",
                "They say the railroad won't cross these lands. Not because of the outlaws, but because of what lives in the canyons after sundown.",
            ),
            origin(
                CyberpunkNoir,
                "Neon District 7",
                "In the shadow of corporate megastructures, where the rain never stops and memories can be bought and sold, a detective hunts for truth.",
            ),
            origin(
                CosmicHorror,
                "The Lighthouse Signal",
                "The abandoned lighthouse began transmitting again. The signal isn't human, and those who hear it speak of a place beyond the stars.",
            ),
        ],
        prompts: vec![
            prompt(GrittySciFi, Setting, "Describe the air quality in this environment."),
            prompt(GrittySciFi, Action, "A system failure threatens everyone nearby."),
            prompt(GrittySciFi, Consequence, "Describe what was lost forever."),
            prompt(HighFantasy, Setting, "Describe the oldest structure in this realm."),
            prompt(HighFantasy, Action, "A prophecy begins to manifest."),
            prompt(HighFantasy, Consequence, "What balance has been upset?"),
            prompt(WeirdWest, Setting, "Describe what lurks in the desert at night."),
            prompt(WeirdWest, Action, "A stranger rides in from the wastes."),
            prompt(WeirdWest, Consequence, "What curse now afflicts the land?"),
            prompt(CyberpunkNoir, Setting, "Describe the corporate sector that dominates."),
            prompt(CyberpunkNoir, Action, "A netrunner breaches the firewall."),
            prompt(CyberpunkNoir, Consequence, "What information is erased forever?"),
            prompt(CosmicHorror, Setting, "Describe the impossible geometry of this place."),
            prompt(CosmicHorror, Action, "Reality fractures at the edges."),
            prompt(CosmicHorror, Consequence, "What truth shatters sanity?"),
        ],
    }
}

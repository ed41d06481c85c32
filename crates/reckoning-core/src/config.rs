//! Configuration loading and typed config structures for Wild Reckoning.
//!
//! The engine reads a single YAML document (`reckoning.yaml` by default).
//! Every field has a default, so an empty document is a valid config. World
//! ticker sections reuse the parameter structs of `reckoning-world`.

use std::path::{Path, PathBuf};

use reckoning_types::Sex;
use reckoning_world::{EcosystemParams, MemoryParams, NpcParams, TerritoryParams, WeatherParams};
use serde::{Deserialize, Serialize};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Session settings (seed, bundle path, turn limit, save file).
    #[serde(default)]
    pub session: SessionConfig,

    /// Event limits per turn.
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Difficulty multipliers.
    #[serde(default)]
    pub difficulty: DifficultyConfig,

    /// NPC introduction and departure.
    #[serde(default)]
    pub npc: NpcParams,

    /// Territory establishment.
    #[serde(default)]
    pub territory: TerritoryParams,

    /// Ecosystem ticker.
    #[serde(default)]
    pub ecosystem: EcosystemParams,

    /// World memory bounds and decay.
    #[serde(default)]
    pub memory: MemoryParams,

    /// Escape roll clamps.
    #[serde(default)]
    pub escape: EscapeConfig,

    /// Weather generation.
    #[serde(default)]
    pub weather: WeatherParams,

    /// Storyline starts and pacing.
    #[serde(default)]
    pub storylines: StorylineConfig,

    /// Voluntary actions.
    #[serde(default)]
    pub actions: ActionConfig,
}

impl EngineConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// Session settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Seed for the session's random stream.
    #[serde(default = "default_seed")]
    pub seed: u64,

    /// Path to the species bundle YAML.
    #[serde(default = "default_species_bundle")]
    pub species_bundle: PathBuf,

    /// Stop after this many turns.
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,

    /// Where to write the JSON save, if anywhere. The headless engine
    /// resumes from an existing save at this path.
    #[serde(default)]
    pub save_path: Option<PathBuf>,

    /// Fallback log filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Sex of the animal in a new game.
    #[serde(default = "default_sex")]
    pub sex: Sex,

    /// Backstory id for a new game.
    #[serde(default)]
    pub backstory: Option<String>,

    /// How the headless driver answers choices and escapes.
    #[serde(default)]
    pub decisions: DecisionMode,
}

/// Decision source used by the headless driver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionMode {
    /// Always the first available choice and unlocked escape.
    FirstChoice,
    /// Uniform picks from a stream seeded with the session seed.
    #[default]
    Seeded,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            species_bundle: default_species_bundle(),
            max_turns: default_max_turns(),
            save_path: None,
            log_level: default_log_level(),
            sex: default_sex(),
            backstory: None,
            decisions: DecisionMode::default(),
        }
    }
}

/// Event limits per turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Most active (choice) events per turn.
    #[serde(default = "default_max_active_events")]
    pub max_active_events: usize,

    /// Most passive events per turn.
    #[serde(default = "default_max_passive_events")]
    pub max_passive_events: usize,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            max_active_events: default_max_active_events(),
            max_passive_events: default_max_passive_events(),
        }
    }
}

/// Difficulty multipliers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyConfig {
    /// Scales every death-chance probability.
    #[serde(default = "default_factor")]
    pub death_chance_factor: f64,

    /// Scales the selection weight of predator events.
    #[serde(default = "default_factor")]
    pub predator_encounter_factor: f64,

    /// Scales passive weight gain.
    #[serde(default = "default_factor")]
    pub weight_gain_factor: f64,

    /// Scales passive weight loss.
    #[serde(default = "default_factor")]
    pub weight_loss_factor: f64,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            death_chance_factor: default_factor(),
            predator_encounter_factor: default_factor(),
            weight_gain_factor: default_factor(),
            weight_loss_factor: default_factor(),
        }
    }
}

/// Clamps for escape-modified death probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscapeConfig {
    /// Lowest death probability after an escape option.
    #[serde(default = "default_escape_min")]
    pub min_probability: f64,

    /// Highest death probability after an escape option.
    #[serde(default = "default_escape_max")]
    pub max_probability: f64,
}

impl Default for EscapeConfig {
    fn default() -> Self {
        Self {
            min_probability: default_escape_min(),
            max_probability: default_escape_max(),
        }
    }
}

/// Storyline starts and pacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorylineConfig {
    /// Whether storylines start and advance at all.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Chance per turn that a step fires between its minimum and maximum
    /// delay.
    #[serde(default = "default_advance_chance")]
    pub advance_chance: f64,
}

impl Default for StorylineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            advance_chance: default_advance_chance(),
        }
    }
}

/// Voluntary action limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionConfig {
    /// Most actions per turn. Each action may be taken once per turn.
    #[serde(default = "default_max_actions")]
    pub max_per_turn: usize,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            max_per_turn: default_max_actions(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

const fn default_seed() -> u64 {
    42
}

fn default_species_bundle() -> PathBuf {
    PathBuf::from("data/species/white-tailed-deer.yaml")
}

const fn default_max_turns() -> u32 {
    520
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_sex() -> Sex {
    Sex::Female
}

const fn default_max_active_events() -> usize {
    3
}

const fn default_max_passive_events() -> usize {
    2
}

const fn default_factor() -> f64 {
    1.0
}

const fn default_escape_min() -> f64 {
    0.01
}

const fn default_escape_max() -> f64 {
    0.95
}

const fn default_true() -> bool {
    true
}

const fn default_advance_chance() -> f64 {
    0.3
}

const fn default_max_actions() -> usize {
    1
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = EngineConfig::parse("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.selection.max_active_events, 3);
        assert_eq!(config.selection.max_passive_events, 2);
        assert_eq!(config.npc.introduction_min_turn, 6);
        assert_eq!(config.territory.establish_turn, 12);
        assert_eq!(config.memory.max_recent_events, 20);
        assert!((config.escape.max_probability - 0.95).abs() < f64::EPSILON);
        assert!(config.weather.enabled);
        assert!(config.storylines.enabled);
        assert!((config.storylines.advance_chance - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.actions.max_per_turn, 1);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let yaml = r"
session:
  seed: 7
  max_turns: 12
difficulty:
  death_chance_factor: 1.5
weather:
  enabled: false
";
        let config = EngineConfig::parse(yaml).unwrap();
        assert_eq!(config.session.seed, 7);
        assert_eq!(config.session.max_turns, 12);
        assert!(config.session.save_path.is_none());
        assert_eq!(config.session.decisions, DecisionMode::Seeded);
        assert!((config.difficulty.death_chance_factor - 1.5).abs() < f64::EPSILON);
        assert!((config.difficulty.weight_gain_factor - 1.0).abs() < f64::EPSILON);
        assert!(!config.weather.enabled);
        assert!((config.weather.persistence_chance - 0.6).abs() < f64::EPSILON);
    }

    #[test]
    fn session_choices_parse() {
        let yaml = r"
session:
  sex: male
  backstory: orphaned
  decisions: first_choice
";
        let config = EngineConfig::parse(yaml).unwrap();
        assert_eq!(config.session.sex, Sex::Male);
        assert_eq!(config.session.backstory.as_deref(), Some("orphaned"));
        assert_eq!(config.session.decisions, DecisionMode::FirstChoice);
    }

    #[test]
    fn storyline_and_action_sections_parse() {
        let yaml = r"
storylines:
  enabled: false
actions:
  max_per_turn: 2
";
        let config = EngineConfig::parse(yaml).unwrap();
        assert!(!config.storylines.enabled);
        assert!((config.storylines.advance_chance - 0.3).abs() < f64::EPSILON);
        assert_eq!(config.actions.max_per_turn, 2);
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let result = EngineConfig::parse("session: [unclosed");
        assert!(matches!(result, Err(ConfigError::Yaml { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = EngineConfig::from_file(Path::new("/nonexistent/reckoning.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}

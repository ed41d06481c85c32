//! Core turn engine for Wild Reckoning.
//!
//! This crate turns species content into play: it decides which events
//! happen each turn, applies what they do, rolls for death and escape, and
//! drives the whole cycle through a phase-checked [`GameSession`].
//!
//! # Modules
//!
//! - [`clock`] -- Weekly turns, months, seasons and years
//! - [`conditions`] -- Condition evaluator over animal and world state
//! - [`config`] -- Engine configuration loaded from YAML
//! - [`content`] -- Species bundle loading and offline validation
//! - [`death_roll`] -- Death probability, escape options and escape rolls
//! - [`decision`] -- Automated decision sources for headless play
//! - [`narrative`] -- `{{...}}` template rendering for event text
//! - [`resolver`] -- Consequence applier
//! - [`selector`] -- Event selector, cooldowns and selection bias
//! - [`session`] -- Turn orchestrator ([`GameSession`])
//! - [`snapshot`] -- JSON save and restore
//! - [`state`] -- The game-state container
//! - [`storyline`] -- Multi-turn storylines injected into the turn's events
//! - [`worker`] -- Selection request/response handoff

pub mod clock;
pub mod conditions;
pub mod config;
pub mod content;
pub mod death_roll;
pub mod decision;
pub mod narrative;
pub mod resolver;
pub mod selector;
pub mod session;
pub mod snapshot;
pub mod state;
pub mod storyline;
pub mod worker;

#[cfg(test)]
mod testing;

pub use clock::{ClockAdvance, ClockError, advance};
pub use conditions::{ConditionContext, all_hold, evaluate};
pub use config::{
    ActionConfig, ConfigError, DecisionMode, DifficultyConfig, EngineConfig, EscapeConfig,
    SelectionConfig, SessionConfig, StorylineConfig,
};
pub use content::{ContentError, ValidationIssue, ValidationReport, load_species_bundle, validate_bundle};
pub use death_roll::{EscapeError, EscapeRoll, death_probability, escape_probability};
pub use decision::{
    DecisionError, DecisionSource, FirstChoiceDecisions, SeededDecisions, play_decisions,
};
pub use resolver::Resolver;
pub use selector::{
    BehavioralBias, BiasContext, DefaultBias, EventSelector, IllustrationPicker, MemoryBias,
    PlaceholderIllustrations, PoolIllustrations, SelectionBias, tick_cooldowns,
};
pub use session::{EscapeResolution, GameSession, SessionError};
pub use snapshot::{Snapshot, SnapshotError};
pub use state::{GameState, SessionOptions, TurnPhase};
pub use storyline::tick_storylines;
pub use worker::{
    SelectionRequest, SelectionResponse, WorkerError, check_response, run_selection,
    run_selection_with,
};

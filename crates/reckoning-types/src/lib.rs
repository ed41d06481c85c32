//! Shared type definitions for the Wild Reckoning life simulation.
//!
//! This crate is the single source of truth for all data that flows between
//! the simulation crates: species content, animal and world state, world
//! memory, per-turn records and the deterministic random source. Types are
//! exported to `TypeScript` via `ts-rs` for UI clients.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for runtime entities
//! - [`enums`] -- Calendar, identity, event and world enumerations
//! - [`stats`] -- Stats, modifiers and stat effects
//! - [`content`] -- Conditions, consequences, choices and event definitions
//! - [`health`] -- Parasite and injury definitions and instances
//! - [`species`] -- Species configuration and content bundle
//! - [`animal`] -- The player's animal
//! - [`reproduction`] -- Pregnancy, offspring and spawning state
//! - [`story`] -- Storylines and voluntary actions
//! - [`world`] -- Time, weather, ecosystem, territory and NPCs
//! - [`memory`] -- World memory records
//! - [`turn`] -- Resolved events, outcomes and turn history
//! - [`rng`] -- Seeded, replayable random source

pub mod animal;
pub mod content;
pub mod enums;
pub mod health;
pub mod ids;
pub mod memory;
pub mod reproduction;
pub mod rng;
pub mod species;
pub mod stats;
pub mod story;
pub mod turn;
pub mod world;

// Re-export all public types at crate root for convenience.
pub use animal::{AnimalState, BehavioralSettings, LifetimeCounters};
pub use content::{
    Condition, Consequence, DeathChance, EscapeOption, EventChoice, GameEvent, StatFactor,
    SubEventTrigger,
};
pub use enums::{
    ChoiceStyle, Diet, EventCategory, EventType, Month, NpcType, PopulationTrend, Relationship,
    Season, Sex, WeatherType,
};
pub use health::{
    ActiveInjury, ActiveParasite, InjuryDefinition, InjurySeverityLevel, ParasiteDefinition,
    ParasiteStage, Severity,
};
pub use ids::{NpcId, OffspringId};
pub use memory::{
    EventMemoryEntry, NodeMemory, ScentKind, ScentMark, SeasonalTotals, ThreatAssessment,
    WorldMemory,
};
pub use reproduction::{Offspring, OffspringFate, Pregnancy, ReproductionState};
pub use rng::{GameRng, RngState};
pub use species::{
    AgeConfig, AgePhase, Backstory, EcosystemLink, EcosystemNarrative, IteroparousConfig,
    MigrationConfig, NpcTemplate, OffspringCountFormula, PopulationSeed, PredationVulnerability,
    MaleCompetitionConfig, ReproductionConfig, SeasonalWeight, SemelparousConfig, SpeciesBundle,
    SpeciesConfig, StartingWeight, ThresholdDirection, WeightConfig,
};
pub use stats::{STAT_MAX, STAT_MIN, StatBlock, StatEffect, StatId, StatModifier, StatValue};
pub use story::{
    ActionOutcome, ActiveStoryline, StorylineDefinition, StorylineStep, VoluntaryAction,
};
pub use turn::{
    DeathRollOutcome, EscapeOptionView, EventOutcome, PendingDeathRoll, ResolvedEvent,
    ResolvedSubEvent, TurnEventSummary, TurnRecord, TurnResult,
};
pub use world::{
    EcosystemState, Npc, PopulationLevel, TerritoryState, TimeState, WeatherState,
};

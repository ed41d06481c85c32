//! Animal state logic for Wild Reckoning.
//!
//! This crate holds everything that operates on a single animal without
//! touching the wider world: stat modifiers, weight and age, parasites and
//! injuries, reproduction, and the end-of-turn death checks. It sits between
//! `reckoning-types` (the data) and `reckoning-core` (the turn loop).
//!
//! # Modules
//!
//! - [`create`] -- Starting animal from a species bundle and backstory
//! - [`death`] -- Terminal death conditions ([`DeathCause`]) and [`kill`]
//! - [`error`] -- Error types for animal operations ([`AnimalError`])
//! - [`health`] -- Parasite progression, injury healing and worsening
//! - [`reproduction`] -- Pregnancy, siring, spawning and offspring survival
//! - [`stats`] -- Stat modifier bookkeeping
//! - [`vitals`] -- Per-turn weight, age, age phases and migration

pub mod create;
pub mod death;
pub mod error;
pub mod health;
pub mod reproduction;
pub mod stats;
pub mod vitals;

#[cfg(test)]
mod testing;

pub use create::create_animal;
pub use death::{DeathCause, check_terminal_death, kill, old_age_chance};
pub use error::AnimalError;
pub use health::{add_injury, add_parasite, critical_parasites, remove_parasite, tick_health};
pub use reproduction::{
    SpawnOutcome, challenge_win_probability, initial_state, offspring_count, sire_offspring, spawn, start_pregnancy,
    tick_reproduction,
};
pub use stats::{apply_stat_effect, remove_modifiers_by_source, set_source_modifiers, tick_modifiers};
pub use vitals::{VitalsContext, VitalsTickResult, apply_vitals_tick, modify_weight};

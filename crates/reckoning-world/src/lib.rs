//! World-side systems for Wild Reckoning.
//!
//! Everything that surrounds the animal rather than belonging to it. Each
//! ticker runs once per turn against state owned by the session and draws
//! randomness only from the shared [`GameRng`](reckoning_types::GameRng).
//!
//! # Modules
//!
//! - [`ecosystem`] -- Predator/prey population levels and ambient narratives
//! - [`error`] -- Error types for world operations ([`WorldError`])
//! - [`memory`] -- World memory tracker: recent events, danger, threats, seasonal totals
//! - [`npc`] -- Introduction, encounters and departure of recurring NPCs
//! - [`territory`] -- Home range establishment, marking, intruders, quality
//! - [`weather`] -- Season-weighted weather and its effects

pub mod ecosystem;
pub mod error;
pub mod memory;
pub mod npc;
pub mod territory;
pub mod weather;

#[cfg(test)]
mod testing;

pub use ecosystem::{EcosystemParams, initial_ecosystem, modify_population, population_level, tick_ecosystem};
pub use error::WorldError;
pub use memory::{MemoryParams, tick_memory};
pub use npc::{NpcParams, has_npc, introduce_npc, mark_seen, tick_npcs};
pub use territory::{TERRITORY_MARKED_FLAG, TerritoryParams, modify_territory, tick_territory, weight_modifier};
pub use weather::{WeatherEffects, WeatherParams, category_multiplier, next_weather, weather_effects};

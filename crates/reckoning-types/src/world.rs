//! World-side state: calendar, weather, ecosystem, territory and NPCs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{Month, NpcType, PopulationTrend, Relationship, Season, WeatherType};
use crate::ids::NpcId;

/// Position in the calendar. One turn is one week; four weeks make a month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TimeState {
    /// Turn number; 0 before the first turn is played.
    pub turn: u32,
    /// Week within the month, 1..=4.
    pub week: u8,
    /// Current month.
    pub month: Month,
    /// Year of the animal's life, starting at 1.
    pub year: u32,
    /// Season derived from `month`.
    pub season: Season,
}

impl TimeState {
    /// Calendar positioned before the first turn, starting at `month`.
    pub const fn starting(month: Month) -> Self {
        Self {
            turn: 0,
            week: 1,
            month,
            year: 1,
            season: month.season(),
        }
    }
}

/// Weather for the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WeatherState {
    /// Kind of weather.
    pub weather_type: WeatherType,
    /// Strength in `[0, 1]`.
    pub intensity: f64,
    /// Consecutive turns this weather has lasted.
    pub turns_active: u32,
}

/// A tracked population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PopulationLevel {
    /// Population name.
    pub name: String,
    /// Deviation from baseline in `[-2, 2]`, rounded to 0.1.
    pub level: f64,
    /// Direction of the last change.
    pub trend: PopulationTrend,
}

/// All tracked populations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EcosystemState {
    /// Populations keyed by name.
    pub populations: BTreeMap<String, PopulationLevel>,
    /// Turn of the last ecosystem narrative.
    pub last_narrative_turn: u32,
}

/// The animal's home range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TerritoryState {
    /// Whether a territory is held.
    pub established: bool,
    /// Relative size, 0..=100.
    pub size: f64,
    /// Foraging quality, 0..=100.
    pub quality: f64,
    /// Whether another animal is contesting it.
    pub contested: bool,
    /// Turns since the territory was last marked.
    pub marked_turns: u32,
    /// Whether an intruder is present.
    pub intruder_present: bool,
}

impl Default for TerritoryState {
    fn default() -> Self {
        Self {
            established: false,
            size: 0.0,
            quality: 50.0,
            contested: false,
            marked_turns: 0,
            intruder_present: false,
        }
    }
}

/// A named non-player character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Npc {
    /// Identifier.
    pub id: NpcId,
    /// Name from the species template.
    pub name: String,
    /// Role.
    pub npc_type: NpcType,
    /// Species label.
    pub species_label: String,
    /// Disposition.
    pub relationship: Relationship,
    /// Whether the NPC is still around.
    pub alive: bool,
    /// Turn the NPC appeared.
    pub introduced_turn: u32,
    /// Turn the NPC last featured in an event.
    pub last_seen_turn: u32,
}

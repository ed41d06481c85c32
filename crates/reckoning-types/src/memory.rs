//! World memory: what the animal has learned about its surroundings.
//!
//! Only the world memory tracker in `reckoning-world` writes these
//! structures, once per turn.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{EventCategory, Season};

/// One remembered event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventMemoryEntry {
    /// Turn the event happened.
    pub turn: u32,
    /// Event definition id.
    pub event_id: String,
    /// Event category.
    pub category: EventCategory,
    /// Choice made, if any.
    pub choice_id: Option<String>,
    /// Whether the outcome was harmful.
    pub harmful: bool,
    /// For predator or danger events, whether the animal got away.
    pub escaped: Option<bool>,
    /// Location the event happened at.
    pub location: String,
    /// Event tags.
    pub tags: Vec<String>,
}

/// Kind of scent left at a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ScentKind {
    /// Territorial marking.
    Territory,
    /// Alarm scent after an escape.
    Alarm,
    /// Left by a kill or attack.
    PredatorKill,
}

/// A scent mark at a location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ScentMark {
    /// Who left it.
    pub source: String,
    /// Turn it was left.
    pub turn: u32,
    /// What kind of scent.
    pub kind: ScentKind,
}

/// Aggregates for one location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NodeMemory {
    /// Harmful predator events experienced here.
    pub kill_count: u32,
    /// Turn of the most recent one.
    pub last_kill_turn: u32,
    /// Scent marks that have not faded.
    pub scent_marks: Vec<ScentMark>,
    /// Depletion from repeated foraging.
    pub foraging_pressure: f64,
    /// Learned danger, 0..=100.
    pub perceived_danger: f64,
    /// Turns spent here.
    pub turns_occupied: u32,
}

/// What the animal knows about one source of danger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ThreatAssessment {
    /// Source name, e.g. `"Gray Wolf"`.
    pub source: String,
    /// Encounters in the recent window.
    pub recent_encounters: u32,
    /// Turn of the last encounter.
    pub last_encounter_turn: u32,
    /// Running mean severity, 0..=100.
    pub average_severity: f64,
}

/// Per-season aggregates, reset when the season changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SeasonalTotals {
    /// Season these totals belong to.
    pub season: Season,
    /// Foraging events.
    pub foraging_events: u32,
    /// Foraging events without harm.
    pub foraging_successes: u32,
    /// Predator or danger events.
    pub predator_encounters: u32,
    /// Predator or danger events escaped.
    pub predator_escapes: u32,
    /// Harmful events.
    pub harm_events: u32,
    /// Weight gained through event consequences.
    pub calories_gained: f64,
    /// Weight lost through event consequences.
    pub calories_lost: f64,
    /// Locations visited.
    pub locations_visited: BTreeSet<String>,
}

impl SeasonalTotals {
    /// Empty totals for `season`.
    pub const fn new(season: Season) -> Self {
        Self {
            season,
            foraging_events: 0,
            foraging_successes: 0,
            predator_encounters: 0,
            predator_escapes: 0,
            harm_events: 0,
            calories_gained: 0.0,
            calories_lost: 0.0,
            locations_visited: BTreeSet::new(),
        }
    }
}

/// Accumulating, decaying record of the animal's experience.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldMemory {
    /// Most recent first, bounded.
    pub recent_events: Vec<EventMemoryEntry>,
    /// Per-location aggregates.
    pub nodes: BTreeMap<String, NodeMemory>,
    /// Threats keyed by source name.
    pub threats: BTreeMap<String, ThreatAssessment>,
    /// Current season's totals.
    pub seasonal: SeasonalTotals,
}

impl WorldMemory {
    /// Fresh memory for a game starting in `season`.
    pub const fn new(season: Season) -> Self {
        Self {
            recent_events: Vec::new(),
            nodes: BTreeMap::new(),
            threats: BTreeMap::new(),
            seasonal: SeasonalTotals::new(season),
        }
    }

    /// Learned danger at `location` (zero if never visited).
    pub fn perceived_danger(&self, location: &str) -> f64 {
        self.nodes.get(location).map_or(0.0, |n| n.perceived_danger)
    }
}

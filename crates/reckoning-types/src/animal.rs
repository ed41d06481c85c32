//! The player's animal.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Sex;
use crate::health::{ActiveInjury, ActiveParasite};
use crate::stats::StatBlock;

/// Event-driven tallies kept over the animal's life.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LifetimeCounters {
    /// Lethal rolls survived.
    pub predators_evaded: u32,
    /// Injuries received.
    pub injuries_sustained: u32,
    /// Parasites contracted.
    pub parasites_contracted: u32,
    /// Offspring born or sired.
    pub offspring_born: u32,
}

/// Complete state of the player's animal.
///
/// Once `alive` is `false` the state is frozen; only `cause_of_death` is
/// written, at the moment of death.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AnimalState {
    /// Species id.
    pub species_id: String,
    /// Sex.
    pub sex: Sex,
    /// Age in months.
    pub age_months: u32,
    /// Body weight.
    pub weight: f64,
    /// Stats and their modifiers.
    pub stats: StatBlock,
    /// Active parasites; never two with the same definition id.
    pub parasites: Vec<ActiveParasite>,
    /// Active injuries.
    pub injuries: Vec<ActiveInjury>,
    /// Narrative and state markers.
    pub flags: BTreeSet<String>,
    /// Current region id.
    pub region: String,
    /// Whether the animal is alive.
    pub alive: bool,
    /// Why the animal died.
    pub cause_of_death: Option<String>,
    /// Lifetime tallies.
    pub counters: LifetimeCounters,
    /// Chosen backstory.
    pub backstory_id: Option<String>,
}

impl AnimalState {
    /// Whether the animal carries `flag`.
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    /// Whether the animal carries the parasite `id`.
    pub fn has_parasite(&self, id: &str) -> bool {
        self.parasites.iter().any(|p| p.definition_id == id)
    }
}

const fn default_setting() -> u8 {
    3
}

/// Player-tuned behavioural tendencies, each on a 1..=5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BehavioralSettings {
    /// Time spent feeding.
    #[serde(default = "default_setting")]
    pub foraging: u8,
    /// Wariness of danger.
    #[serde(default = "default_setting")]
    pub caution: u8,
    /// Tendency to seek company.
    #[serde(default = "default_setting")]
    pub sociability: u8,
    /// Drive to breed.
    #[serde(default = "default_setting")]
    pub mating: u8,
    /// Tendency to roam.
    #[serde(default = "default_setting")]
    pub exploration: u8,
    /// Willingness to fight.
    #[serde(default = "default_setting")]
    pub belligerence: u8,
}

impl Default for BehavioralSettings {
    fn default() -> Self {
        Self {
            foraging: 3,
            caution: 3,
            sociability: 3,
            mating: 3,
            exploration: 3,
            belligerence: 3,
        }
    }
}

impl BehavioralSettings {
    /// Copy with every setting clamped to 1..=5.
    pub fn clamped(self) -> Self {
        Self {
            foraging: self.foraging.clamp(1, 5),
            caution: self.caution.clamp(1, 5),
            sociability: self.sociability.clamp(1, 5),
            mating: self.mating.clamp(1, 5),
            exploration: self.exploration.clamp(1, 5),
            belligerence: self.belligerence.clamp(1, 5),
        }
    }
}

//! Reproduction progress, discriminated by reproductive strategy.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::Sex;
use crate::ids::OffspringId;

/// What became of one offspring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "status", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum OffspringFate {
    /// Still depends on the parent.
    Dependent,
    /// Living on its own.
    Independent,
    /// Reached maturity; counts towards fitness.
    Matured,
    /// Died before maturing.
    Dead {
        /// Cause of death.
        cause: String,
    },
}

/// One offspring of an iteroparous parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Offspring {
    /// Identifier.
    pub id: OffspringId,
    /// Sex.
    pub sex: Sex,
    /// Turn of birth.
    pub born_turn: u32,
    /// Age in turns.
    pub age_turns: u32,
    /// Current fate.
    pub fate: OffspringFate,
    /// Sired by the animal rather than borne; sired young get no parental care.
    pub sired: bool,
    /// Parent's WIS at birth; improves survival odds.
    pub parent_wis: f64,
}

impl Offspring {
    /// Whether the offspring is still alive.
    pub const fn is_alive(&self) -> bool {
        !matches!(self.fate, OffspringFate::Dead { .. })
    }
}

/// An ongoing pregnancy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Pregnancy {
    /// Turn of conception.
    pub conceived_turn: u32,
    /// Turns until birth.
    pub turns_remaining: u32,
    /// Litter size.
    pub offspring_count: u32,
}

/// Reproduction state of the animal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ReproductionState {
    /// Repeated breeding.
    Iteroparous {
        /// Current pregnancy, if any.
        pregnancy: Option<Pregnancy>,
        /// All offspring ever born or sired.
        offspring: Vec<Offspring>,
        /// Whether the animal already mated this season.
        mated_this_season: bool,
        /// Offspring that reached maturity.
        total_fitness: u32,
    },
    /// One-shot spawning.
    Semelparous {
        /// Whether spawning happened.
        spawned: bool,
        /// Eggs laid.
        egg_count: u32,
        /// Expected surviving young.
        estimated_survivors: u32,
        /// Equals `estimated_survivors` once spawned.
        total_fitness: u32,
    },
}

impl ReproductionState {
    /// Empty iteroparous state.
    pub const fn iteroparous() -> Self {
        Self::Iteroparous {
            pregnancy: None,
            offspring: Vec::new(),
            mated_this_season: false,
            total_fitness: 0,
        }
    }

    /// Empty semelparous state.
    pub const fn semelparous() -> Self {
        Self::Semelparous {
            spawned: false,
            egg_count: 0,
            estimated_survivors: 0,
            total_fitness: 0,
        }
    }

    /// Reproductive success so far.
    pub const fn total_fitness(&self) -> u32 {
        match self {
            Self::Iteroparous { total_fitness, .. } | Self::Semelparous { total_fitness, .. } => {
                *total_fitness
            }
        }
    }
}

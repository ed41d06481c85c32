//! Parasite and injury definitions, and their active instances on an animal.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::stats::StatEffect;

/// Severity grade shared by parasite stages and injury levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Severity {
    /// Barely noticeable.
    Minor,
    /// Clearly impairing.
    Moderate,
    /// Seriously impairing.
    Severe,
    /// Life threatening.
    Critical,
}

impl Severity {
    /// Lower-case display name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Minor => "minor",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
            Self::Critical => "critical",
        }
    }
}

// ---------------------------------------------------------------------------
// Parasites
// ---------------------------------------------------------------------------

const fn default_stage_turns() -> u32 {
    4
}

/// One stage of a parasite infection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ParasiteStage {
    /// Severity grade of this stage.
    pub severity: Severity,
    /// Description shown in health panels.
    #[serde(default)]
    pub description: String,
    /// Stat modifiers while at this stage; durations are ignored.
    #[serde(default)]
    pub stat_effects: Vec<StatEffect>,
    /// Minimum turns at this stage before progression or remission is rolled.
    #[serde(default = "default_stage_turns")]
    pub min_turns: u32,
    /// Per-turn chance of advancing to the next stage.
    #[serde(default)]
    pub progression_chance: f64,
    /// Per-turn chance of improving to the previous stage.
    #[serde(default)]
    pub remission_chance: f64,
}

/// Immutable description of a parasite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ParasiteDefinition {
    /// Unique id within the bundle.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Ordered infection stages; the last stage is critical.
    pub stages: Vec<ParasiteStage>,
}

impl ParasiteDefinition {
    /// Index of the final (critical) stage, if any stages exist.
    pub fn last_stage(&self) -> Option<u32> {
        self.stages
            .len()
            .checked_sub(1)
            .and_then(|i| u32::try_from(i).ok())
    }

    /// Stage at `index`.
    pub fn stage(&self, index: u32) -> Option<&ParasiteStage> {
        usize::try_from(index).ok().and_then(|i| self.stages.get(i))
    }
}

/// A parasite currently carried by the animal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActiveParasite {
    /// Parasite definition id.
    pub definition_id: String,
    /// Index into the definition's stages.
    pub stage: u32,
    /// Turns spent at the current stage.
    pub turns_in_stage: u32,
    /// Turn the infection began.
    pub acquired_turn: u32,
}

// ---------------------------------------------------------------------------
// Injuries
// ---------------------------------------------------------------------------

const fn default_healing_time() -> u32 {
    8
}

/// One severity level of an injury.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct InjurySeverityLevel {
    /// Severity grade.
    pub severity: Severity,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Stat modifiers while the injury is active; durations are ignored.
    #[serde(default)]
    pub stat_effects: Vec<StatEffect>,
    /// Turns to heal at this level.
    #[serde(default = "default_healing_time")]
    pub base_healing_time: u32,
    /// Per-turn chance of worsening while not resting.
    #[serde(default)]
    pub worsening_chance: f64,
}

/// Immutable description of an injury type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct InjuryDefinition {
    /// Unique id within the bundle.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Candidate body parts, drawn from when a consequence names none.
    #[serde(default)]
    pub body_parts: Vec<String>,
    /// Severity levels in increasing order.
    pub severity_levels: Vec<InjurySeverityLevel>,
}

impl InjuryDefinition {
    /// Severity level at `index`.
    pub fn level(&self, index: u32) -> Option<&InjurySeverityLevel> {
        usize::try_from(index)
            .ok()
            .and_then(|i| self.severity_levels.get(i))
    }
}

/// An injury currently carried by the animal.
///
/// The same definition may be present several times, even on the same body
/// part; each instance heals independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActiveInjury {
    /// Injury definition id.
    pub definition_id: String,
    /// Affected body part.
    pub body_part: String,
    /// Index into the definition's severity levels.
    pub severity: u32,
    /// Turns until healed.
    pub turns_remaining: u32,
    /// Whether the animal is resting the injury (heals twice as fast).
    pub resting: bool,
    /// Turn the injury happened.
    pub acquired_turn: u32,
    /// Key of the stat modifiers this instance applied.
    pub modifier_key: String,
}

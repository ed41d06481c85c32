//! Animal stats and the modifiers layered on top of them.
//!
//! Each [`StatId`] has a base value plus a stack of [`StatModifier`]s. The
//! effective value (base plus every modifier) is always clamped to
//! [`STAT_MIN`]..=[`STAT_MAX`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Lowest possible effective stat value.
pub const STAT_MIN: f64 = 0.0;

/// Highest possible effective stat value.
pub const STAT_MAX: f64 = 100.0;

/// The nine tracked stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export, export_to = "bindings/")]
pub enum StatId {
    /// Immunity: resistance to parasites and disease.
    Imm,
    /// Climate stress: exposure to heat and cold.
    Cli,
    /// Homeostasis: physiological balance.
    Hom,
    /// Trauma: accumulated fear and pain.
    Tra,
    /// Adversity: how hard life currently is.
    Adv,
    /// Novelty: exposure to unfamiliar situations.
    Nov,
    /// Wisdom: learned survival skill.
    Wis,
    /// Health: overall condition; zero is fatal.
    Hea,
    /// Strength: physical power.
    Str,
}

impl StatId {
    /// Every stat in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Imm,
        Self::Cli,
        Self::Hom,
        Self::Tra,
        Self::Adv,
        Self::Nov,
        Self::Wis,
        Self::Hea,
        Self::Str,
    ];
}

/// A single adjustment stacked onto a stat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StatModifier {
    /// Unique key, used to replace or remove this modifier.
    pub id: String,
    /// What produced the modifier (event id, parasite id, age phase...).
    pub source: String,
    /// Signed amount added to the base value.
    pub amount: f64,
    /// Turns left before the modifier expires; `None` is permanent.
    pub turns_remaining: Option<u32>,
}

/// Base value plus modifiers for one stat.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StatValue {
    /// Unmodified value.
    pub base: f64,
    /// Active modifiers.
    pub modifiers: Vec<StatModifier>,
}

impl StatValue {
    /// Create a stat with no modifiers.
    pub const fn new(base: f64) -> Self {
        Self {
            base,
            modifiers: Vec::new(),
        }
    }

    /// Base plus all modifiers, clamped to the valid range.
    pub fn effective(&self) -> f64 {
        let total = self.base + self.modifiers.iter().map(|m| m.amount).sum::<f64>();
        if total.is_nan() {
            return STAT_MIN;
        }
        total.clamp(STAT_MIN, STAT_MAX)
    }
}

/// All stats of an animal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StatBlock {
    /// Per-stat values.
    pub values: BTreeMap<StatId, StatValue>,
}

impl StatBlock {
    /// Build a block from base values; stats missing from `base` start at 50.
    pub fn from_base(base: &BTreeMap<StatId, f64>) -> Self {
        let values = StatId::ALL
            .iter()
            .map(|id| (*id, StatValue::new(base.get(id).copied().unwrap_or(50.0))))
            .collect();
        Self { values }
    }

    /// Effective value of `stat` (zero if the stat is absent).
    pub fn effective(&self, stat: StatId) -> f64 {
        self.values.get(&stat).map_or(STAT_MIN, StatValue::effective)
    }

    /// Effective values of every stat, for before/after diffing.
    pub fn effective_all(&self) -> BTreeMap<StatId, f64> {
        StatId::ALL
            .iter()
            .map(|id| (*id, self.effective(*id)))
            .collect()
    }

    /// Mutable access to a stat, creating it at zero if missing.
    pub fn entry(&mut self, stat: StatId) -> &mut StatValue {
        self.values.entry(stat).or_default()
    }
}

/// A stat change declared by content (event, choice, sub-event, escape cost).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StatEffect {
    /// Stat to change.
    pub stat: StatId,
    /// Signed change.
    pub amount: f64,
    /// Turns the change lasts; absent or zero means permanent.
    #[serde(default)]
    pub duration: Option<u32>,
    /// Short display label such as `"-TRA"`.
    #[serde(default)]
    pub label: String,
}

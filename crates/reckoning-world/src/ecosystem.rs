//! Predator/prey population dynamics.
//!
//! Levels run from -2 (collapsed) to +2 (booming) in steps of 0.1. Each turn
//! linked predators follow their prey, every population may regress one step
//! toward the mean, and occasionally a narrative line describes the state of
//! the land.

use std::collections::BTreeMap;

use reckoning_types::{
    EcosystemState, GameRng, PopulationLevel, PopulationTrend, SpeciesConfig, ThresholdDirection,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::WorldError;

/// Lowest population level.
pub const LEVEL_MIN: f64 = -2.0;

/// Highest population level.
pub const LEVEL_MAX: f64 = 2.0;

/// Size of one regression step.
const REGRESSION_STEP: f64 = 0.1;

/// Tunables for the ecosystem ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EcosystemParams {
    /// Minimum turns between narrative lines.
    #[serde(default = "default_narrative_interval")]
    pub narrative_interval: u32,

    /// Chance of a narrative line once the interval has passed.
    #[serde(default = "default_narrative_chance")]
    pub narrative_chance: f64,

    /// Per-population chance of regressing one step toward zero.
    #[serde(default = "default_regression_chance")]
    pub regression_chance: f64,
}

impl Default for EcosystemParams {
    fn default() -> Self {
        Self {
            narrative_interval: default_narrative_interval(),
            narrative_chance: default_narrative_chance(),
            regression_chance: default_regression_chance(),
        }
    }
}

const fn default_narrative_interval() -> u32 {
    5
}

const fn default_narrative_chance() -> f64 {
    0.4
}

const fn default_regression_chance() -> f64 {
    0.15
}

fn round_level(level: f64) -> f64 {
    ((level * 10.0).round() / 10.0).clamp(LEVEL_MIN, LEVEL_MAX)
}

fn trend_between(before: f64, after: f64) -> PopulationTrend {
    if after > before {
        PopulationTrend::Growing
    } else if after < before {
        PopulationTrend::Declining
    } else {
        PopulationTrend::Stable
    }
}

fn set_level(pop: &mut PopulationLevel, level: f64) {
    let level = round_level(level);
    pop.trend = trend_between(pop.level, level);
    pop.level = level;
}

/// Seed the tracked populations from the species config.
pub fn initial_ecosystem(config: &SpeciesConfig) -> EcosystemState {
    let populations: BTreeMap<String, PopulationLevel> = config
        .populations
        .iter()
        .map(|seed| {
            (
                seed.name.clone(),
                PopulationLevel {
                    name: seed.name.clone(),
                    level: round_level(seed.initial_level),
                    trend: PopulationTrend::Stable,
                },
            )
        })
        .collect();
    EcosystemState {
        populations,
        last_narrative_turn: 0,
    }
}

/// Shift a population by `amount`. Returns the new level.
///
/// # Errors
///
/// Returns [`WorldError::UnknownPopulation`] when `name` is not tracked.
pub fn modify_population(state: &mut EcosystemState, name: &str, amount: f64) -> Result<f64, WorldError> {
    let pop = state
        .populations
        .get_mut(name)
        .ok_or_else(|| WorldError::UnknownPopulation {
            name: name.to_owned(),
        })?;
    set_level(pop, pop.level + amount);
    debug!(population = name, level = pop.level, "Population modified");
    Ok(pop.level)
}

/// Advance populations by one turn. Returns narrative lines.
pub fn tick_ecosystem(
    state: &mut EcosystemState,
    config: &SpeciesConfig,
    region: &str,
    turn: u32,
    params: &EcosystemParams,
    rng: &mut GameRng,
) -> Vec<String> {
    // Predators follow their prey.
    for link in &config.ecosystem_links {
        if !link.region_ids.is_empty() && !link.region_ids.iter().any(|r| r == region) {
            continue;
        }
        let Some(prey) = state.populations.get(&link.prey).map(|p| p.level) else {
            continue;
        };
        let Some(predator) = state.populations.get_mut(&link.predator) else {
            continue;
        };
        if prey <= -1.0 {
            let target = (predator.level - link.strength * 0.3).max(LEVEL_MIN);
            set_level(predator, target);
        } else if prey >= 1.0 {
            let target = (predator.level + link.strength * 0.2).min(LEVEL_MAX);
            set_level(predator, target);
        }
    }

    // Regression toward the mean.
    for pop in state.populations.values_mut() {
        let regress = rng.chance(params.regression_chance);
        if regress && pop.level.abs() > f64::EPSILON {
            let step = if pop.level > 0.0 {
                -REGRESSION_STEP
            } else {
                REGRESSION_STEP
            };
            set_level(pop, pop.level + step);
        }
    }

    let mut narratives = Vec::new();
    if turn.saturating_sub(state.last_narrative_turn) < params.narrative_interval {
        return narratives;
    }
    let candidates: Vec<&str> = config
        .ecosystem_narratives
        .iter()
        .filter(|n| {
            state.populations.get(&n.species_name).is_some_and(|p| match n.direction {
                ThresholdDirection::Below => p.level <= n.threshold,
                ThresholdDirection::Above => p.level >= n.threshold,
            })
        })
        .map(|n| n.narrative_text.as_str())
        .collect();
    if candidates.is_empty() || !rng.chance(params.narrative_chance) {
        return narratives;
    }
    if let Some(text) = rng.pick(&candidates) {
        narratives.push((*text).to_owned());
        state.last_narrative_turn = turn;
    }
    narratives
}

/// Current level of a population, if tracked.
pub fn population_level(state: &EcosystemState, name: &str) -> Option<f64> {
    state.populations.get(name).map(|p| p.level)
}

//! Parasites and injuries: acquisition, progression and healing.
//!
//! Each parasite contributes the stat modifiers of its current stage under
//! the source `parasite:<id>`; each injury instance contributes the modifiers
//! of its severity level under its own `modifier_key`.

use reckoning_types::{ActiveInjury, ActiveParasite, AnimalState, GameRng, SpeciesBundle};
use tracing::debug;

use crate::error::AnimalError;
use crate::stats::{remove_modifiers_by_source, set_source_modifiers};

/// Healing time used when an injury definition has no matching level.
pub const DEFAULT_HEALING_TIME: u32 = 8;

/// Turns added to an injury that worsens.
pub const WORSENING_EXTRA_TURNS: u32 = 4;

/// Body part recorded when neither the consequence nor the definition names one.
pub const UNSPECIFIED_BODY_PART: &str = "unspecified";

/// Modifier source key for a parasite.
pub fn parasite_source(parasite_id: &str) -> String {
    format!("parasite:{parasite_id}")
}

/// Infect the animal with a parasite.
///
/// Returns `Ok(false)` without touching state when the animal already
/// carries the parasite. The start stage is clamped to the last stage.
pub fn add_parasite(
    animal: &mut AnimalState,
    bundle: &SpeciesBundle,
    parasite_id: &str,
    start_stage: Option<u32>,
    turn: u32,
) -> Result<bool, AnimalError> {
    if !animal.alive {
        return Err(AnimalError::Dead);
    }
    let def = bundle
        .parasite(parasite_id)
        .ok_or_else(|| AnimalError::UnknownParasite {
            parasite_id: parasite_id.to_owned(),
        })?;
    let last = def.last_stage().ok_or_else(|| AnimalError::EmptyParasite {
        parasite_id: parasite_id.to_owned(),
    })?;
    if animal.has_parasite(parasite_id) {
        return Ok(false);
    }

    let stage = start_stage.unwrap_or(0).min(last);
    if let Some(stage_def) = def.stage(stage) {
        set_source_modifiers(
            &mut animal.stats,
            &parasite_source(parasite_id),
            &stage_def.stat_effects,
        );
    }
    animal.parasites.push(ActiveParasite {
        definition_id: parasite_id.to_owned(),
        stage,
        turns_in_stage: 0,
        acquired_turn: turn,
    });
    animal.counters.parasites_contracted = animal.counters.parasites_contracted.saturating_add(1);
    debug!(parasite_id, stage, "Parasite acquired");
    Ok(true)
}

/// Clear a parasite and its modifiers. Returns whether one was carried.
pub fn remove_parasite(animal: &mut AnimalState, parasite_id: &str) -> bool {
    if !animal.alive || !animal.has_parasite(parasite_id) {
        return false;
    }
    animal.parasites.retain(|p| p.definition_id != parasite_id);
    remove_modifiers_by_source(&mut animal.stats, &parasite_source(parasite_id));
    true
}

/// Inflict an injury and return its display name.
///
/// Body part precedence: the explicit `body_part`, then a random pick from
/// the definition's candidates, then [`UNSPECIFIED_BODY_PART`]. Duplicate
/// `(definition, body part)` pairs are allowed and heal independently.
pub fn add_injury(
    animal: &mut AnimalState,
    bundle: &SpeciesBundle,
    injury_id: &str,
    severity: Option<u32>,
    body_part: Option<&str>,
    turn: u32,
    rng: &mut GameRng,
) -> Result<String, AnimalError> {
    if !animal.alive {
        return Err(AnimalError::Dead);
    }
    let def = bundle
        .injury(injury_id)
        .ok_or_else(|| AnimalError::UnknownInjury {
            injury_id: injury_id.to_owned(),
        })?;

    let max_level = u32::try_from(def.severity_levels.len().saturating_sub(1)).unwrap_or(0);
    let severity = severity.unwrap_or(0).min(max_level);
    let part = match body_part {
        Some(part) => part.to_owned(),
        None => rng
            .pick(&def.body_parts)
            .cloned()
            .unwrap_or_else(|| UNSPECIFIED_BODY_PART.to_owned()),
    };

    let level = def.level(severity);
    let turns_remaining = level.map_or(DEFAULT_HEALING_TIME, |l| l.base_healing_time);
    let modifier_key = format!(
        "injury:{injury_id}:{turn}:{}",
        animal.counters.injuries_sustained
    );
    if let Some(level) = level {
        set_source_modifiers(&mut animal.stats, &modifier_key, &level.stat_effects);
    }

    animal.injuries.push(ActiveInjury {
        definition_id: injury_id.to_owned(),
        body_part: part.clone(),
        severity,
        turns_remaining,
        resting: false,
        acquired_turn: turn,
        modifier_key,
    });
    animal.counters.injuries_sustained = animal.counters.injuries_sustained.saturating_add(1);
    debug!(injury_id, body_part = %part, severity, "Injury sustained");
    Ok(format!("{} ({part})", def.name))
}

/// Advance parasites and injuries by one turn.
///
/// Parasites past their stage's minimum duration roll progression first,
/// then remission. Injuries heal one turn (two when resting); an injury not
/// being rested may worsen. Returns player-facing narratives.
pub fn tick_health(animal: &mut AnimalState, bundle: &SpeciesBundle, rng: &mut GameRng) -> Vec<String> {
    let mut narratives = Vec::new();
    if !animal.alive {
        return narratives;
    }

    let parasites = std::mem::take(&mut animal.parasites);
    for mut parasite in parasites {
        let Some(def) = bundle.parasite(&parasite.definition_id) else {
            animal.parasites.push(parasite);
            continue;
        };
        let Some(stage) = def.stage(parasite.stage) else {
            animal.parasites.push(parasite);
            continue;
        };

        parasite.turns_in_stage = parasite.turns_in_stage.saturating_add(1);
        let last = def.last_stage().unwrap_or(0);
        if parasite.turns_in_stage >= stage.min_turns {
            if rng.chance(stage.progression_chance) && parasite.stage < last {
                parasite.stage = parasite.stage.saturating_add(1);
                parasite.turns_in_stage = 0;
                if let Some(next) = def.stage(parasite.stage) {
                    narratives.push(format!(
                        "Your {} infection has worsened to {}.",
                        def.name,
                        next.severity.as_str()
                    ));
                }
            } else if rng.chance(stage.remission_chance) && parasite.stage > 0 {
                parasite.stage = parasite.stage.saturating_sub(1);
                parasite.turns_in_stage = 0;
                if let Some(prev) = def.stage(parasite.stage) {
                    narratives.push(format!(
                        "Your {} infection has improved to {}.",
                        def.name,
                        prev.severity.as_str()
                    ));
                }
            }
        }

        if let Some(current) = def.stage(parasite.stage) {
            set_source_modifiers(
                &mut animal.stats,
                &parasite_source(&parasite.definition_id),
                &current.stat_effects,
            );
        }
        animal.parasites.push(parasite);
    }

    let injuries = std::mem::take(&mut animal.injuries);
    for mut injury in injuries {
        let healing = if injury.resting { 2 } else { 1 };
        injury.turns_remaining = injury.turns_remaining.saturating_sub(healing);
        if injury.turns_remaining == 0 {
            remove_modifiers_by_source(&mut animal.stats, &injury.modifier_key);
            narratives.push(format!("Your {} has healed.", injury.body_part));
            continue;
        }

        let def = bundle.injury(&injury.definition_id);
        let worsening = def
            .and_then(|d| d.level(injury.severity))
            .map_or(0.0, |l| l.worsening_chance);
        if !injury.resting && rng.chance(worsening) {
            let max_level = def.map_or(0, |d| {
                u32::try_from(d.severity_levels.len().saturating_sub(1)).unwrap_or(0)
            });
            injury.severity = injury.severity.saturating_add(1).min(max_level);
            injury.turns_remaining = injury.turns_remaining.saturating_add(WORSENING_EXTRA_TURNS);
            if let Some(level) = def.and_then(|d| d.level(injury.severity)) {
                set_source_modifiers(&mut animal.stats, &injury.modifier_key, &level.stat_effects);
            }
            narratives.push(format!(
                "Your {} injury has worsened from lack of rest.",
                injury.body_part
            ));
        }
        animal.injuries.push(injury);
    }

    narratives
}

/// Whether any carried parasite has reached its final stage.
pub fn critical_parasites<'a>(animal: &'a AnimalState, bundle: &'a SpeciesBundle) -> Vec<&'a str> {
    animal
        .parasites
        .iter()
        .filter(|p| {
            bundle
                .parasite(&p.definition_id)
                .and_then(reckoning_types::ParasiteDefinition::last_stage)
                .is_some_and(|last| p.stage == last)
        })
        .map(|p| p.definition_id.as_str())
        .collect()
}

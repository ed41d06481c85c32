//! Reproduction: pregnancy, siring, spawning and offspring survival.
//!
//! Iteroparous parents breed repeatedly and raise dependent young, each of
//! which rolls for survival every turn until it matures. Semelparous parents
//! spawn once; the end-of-turn death check then ends the game.

use reckoning_types::{
    AnimalState, GameRng, IteroparousConfig, MaleCompetitionConfig, Offspring, OffspringCountFormula,
    OffspringFate, OffspringId, Pregnancy, ReproductionConfig, ReproductionState, Season,
    SemelparousConfig, Sex, StatId, TimeState,
};
use tracing::debug;

use crate::error::AnimalError;

/// Fallback causes for offspring deaths when the species lists none.
const DEFAULT_DEATH_CAUSES: [&str; 4] = [
    "Killed by predators",
    "Died of exposure",
    "Succumbed to disease",
    "Lost to starvation",
];

/// Parent flag that slightly raises offspring survival.
pub const NEST_PRIME_FLAG: &str = "nest-quality-prime";

/// Parent flag that slightly lowers offspring survival.
pub const NEST_POOR_FLAG: &str = "nest-quality-poor";

/// Survival multiplier for eggs laid at a prime nest site.
pub const PRIME_NEST_MULTIPLIER: f64 = 1.5;

/// Survival multiplier for eggs laid at a poor nest site.
pub const POOR_NEST_MULTIPLIER: f64 = 0.5;

/// Empty reproduction state for a strategy.
pub const fn initial_state(config: &ReproductionConfig) -> ReproductionState {
    match config {
        ReproductionConfig::Iteroparous(_) => ReproductionState::iteroparous(),
        ReproductionConfig::Semelparous(_) => ReproductionState::semelparous(),
    }
}

/// Litter size scaled by the parent's condition.
///
/// A heavier, healthier parent shifts both thresholds down, making larger
/// litters likelier. Always at least one, never above `max_offspring`.
#[allow(clippy::suboptimal_flops)]
pub fn offspring_count(formula: &OffspringCountFormula, weight: f64, hea: f64, rng: &mut GameRng) -> u32 {
    let weight_term = if formula.weight_divisor.abs() > f64::EPSILON {
        (weight - formula.weight_reference) / formula.weight_divisor * 0.15
    } else {
        0.0
    };
    let hea_term = if formula.hea_divisor.abs() > f64::EPSILON {
        (hea - formula.hea_reference) / formula.hea_divisor * 0.15
    } else {
        0.0
    };
    let bonus = (weight_term + hea_term).clamp(-0.2, 0.3);

    let roll = rng.next_f64();
    let count = if roll < formula.single_threshold - bonus {
        1
    } else if roll < formula.triplet_threshold - bonus {
        2
    } else {
        3
    };
    count.min(formula.max_offspring.max(1))
}

fn iteroparous_config(config: &ReproductionConfig) -> Result<&IteroparousConfig, AnimalError> {
    match config {
        ReproductionConfig::Iteroparous(c) => Ok(c),
        ReproductionConfig::Semelparous(_) => Err(AnimalError::ReproductionUnavailable {
            reason: "species is semelparous".to_owned(),
        }),
    }
}

fn semelparous_config(config: &ReproductionConfig) -> Result<&SemelparousConfig, AnimalError> {
    match config {
        ReproductionConfig::Semelparous(c) => Ok(c),
        ReproductionConfig::Iteroparous(_) => Err(AnimalError::ReproductionUnavailable {
            reason: "species is iteroparous".to_owned(),
        }),
    }
}

/// Begin a pregnancy. Returns the litter size.
pub fn start_pregnancy(
    state: &mut ReproductionState,
    animal: &mut AnimalState,
    config: &ReproductionConfig,
    fixed_count: Option<u32>,
    turn: u32,
    rng: &mut GameRng,
) -> Result<u32, AnimalError> {
    if !animal.alive {
        return Err(AnimalError::Dead);
    }
    let cfg = iteroparous_config(config)?;
    if animal.sex != Sex::Female {
        return Err(AnimalError::ReproductionUnavailable {
            reason: "only females can become pregnant".to_owned(),
        });
    }
    let ReproductionState::Iteroparous {
        pregnancy,
        mated_this_season,
        ..
    } = state
    else {
        return Err(AnimalError::ReproductionUnavailable {
            reason: "reproduction state does not match strategy".to_owned(),
        });
    };
    if pregnancy.is_some() {
        return Err(AnimalError::ReproductionUnavailable {
            reason: "already pregnant".to_owned(),
        });
    }

    let count = match fixed_count {
        Some(n) => n.max(1),
        None => offspring_count(
            &cfg.offspring_count,
            animal.weight,
            animal.stats.effective(StatId::Hea),
            rng,
        ),
    };
    *pregnancy = Some(Pregnancy {
        conceived_turn: turn,
        turns_remaining: cfg.gestation_turns.max(1),
        offspring_count: count,
    });
    *mated_this_season = true;
    animal.flags.insert(cfg.pregnant_flag.clone());
    animal.flags.insert(cfg.mated_flag.clone());
    debug!(count, gestation = cfg.gestation_turns, "Pregnancy started");
    Ok(count)
}

fn new_offspring(count: u32, turn: u32, parent_wis: f64, sired: bool, rng: &mut GameRng) -> Vec<Offspring> {
    (0..count)
        .map(|_| {
            let id = OffspringId::generate(rng);
            let sex = if rng.chance(0.5) { Sex::Male } else { Sex::Female };
            Offspring {
                id,
                sex,
                born_turn: turn,
                age_turns: 0,
                fate: if sired {
                    OffspringFate::Independent
                } else {
                    OffspringFate::Dependent
                },
                sired,
                parent_wis,
            }
        })
        .collect()
}

/// Father offspring. They receive no parental care and start independent.
pub fn sire_offspring(
    state: &mut ReproductionState,
    animal: &mut AnimalState,
    config: &ReproductionConfig,
    fixed_count: Option<u32>,
    turn: u32,
    rng: &mut GameRng,
) -> Result<u32, AnimalError> {
    if !animal.alive {
        return Err(AnimalError::Dead);
    }
    let cfg = iteroparous_config(config)?;
    if animal.sex != Sex::Male {
        return Err(AnimalError::ReproductionUnavailable {
            reason: "only males can sire offspring".to_owned(),
        });
    }
    let ReproductionState::Iteroparous {
        offspring,
        mated_this_season,
        ..
    } = state
    else {
        return Err(AnimalError::ReproductionUnavailable {
            reason: "reproduction state does not match strategy".to_owned(),
        });
    };

    let count = match fixed_count {
        Some(n) => n.max(1),
        None => offspring_count(
            &cfg.offspring_count,
            animal.weight,
            animal.stats.effective(StatId::Hea),
            rng,
        ),
    };
    let wis = animal.stats.effective(StatId::Wis);
    offspring.extend(new_offspring(count, turn, wis, true, rng));
    *mated_this_season = true;
    animal.flags.insert(cfg.mated_flag.clone());
    animal.counters.offspring_born = animal.counters.offspring_born.saturating_add(count);
    Ok(count)
}

/// Result of a spawning consequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnOutcome {
    /// Eggs laid.
    pub egg_count: u32,
    /// Young expected to survive.
    pub estimated_survivors: u32,
}

/// Spawn once. Egg count scales with HEA and weight; survival with WIS and
/// nest quality.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::suboptimal_flops
)]
pub fn spawn(
    state: &mut ReproductionState,
    animal: &mut AnimalState,
    config: &ReproductionConfig,
) -> Result<SpawnOutcome, AnimalError> {
    if !animal.alive {
        return Err(AnimalError::Dead);
    }
    let cfg = semelparous_config(config)?;
    let ReproductionState::Semelparous {
        spawned,
        egg_count,
        estimated_survivors,
        total_fitness,
    } = state
    else {
        return Err(AnimalError::ReproductionUnavailable {
            reason: "reproduction state does not match strategy".to_owned(),
        });
    };
    if *spawned {
        return Err(AnimalError::ReproductionUnavailable {
            reason: "already spawned".to_owned(),
        });
    }

    let hea = animal.stats.effective(StatId::Hea);
    let wis = animal.stats.effective(StatId::Wis);
    let eggs = (cfg.base_egg_count + hea * cfg.egg_count_hea_factor + animal.weight * cfg.egg_count_weight_factor)
        .round()
        .max(0.0);

    let mut survival = cfg.egg_survival_base + wis * cfg.egg_survival_wis_factor;
    if cfg
        .nest_quality_prime_flag
        .as_deref()
        .is_some_and(|f| animal.has_flag(f))
    {
        survival *= PRIME_NEST_MULTIPLIER;
    }
    if cfg
        .nest_quality_poor_flag
        .as_deref()
        .is_some_and(|f| animal.has_flag(f))
    {
        survival *= POOR_NEST_MULTIPLIER;
    }
    let survival = survival.clamp(0.0, 1.0);
    let survivors = (eggs * survival).round();

    let outcome = SpawnOutcome {
        egg_count: eggs.min(f64::from(u32::MAX)) as u32,
        estimated_survivors: survivors.min(f64::from(u32::MAX)) as u32,
    };
    *spawned = true;
    *egg_count = outcome.egg_count;
    *estimated_survivors = outcome.estimated_survivors;
    *total_fitness = outcome.estimated_survivors;
    animal.flags.insert(cfg.spawning_complete_flag.clone());
    animal.counters.offspring_born = animal.counters.offspring_born.saturating_add(outcome.egg_count);
    debug!(eggs = outcome.egg_count, survivors = outcome.estimated_survivors, "Spawned");
    Ok(outcome)
}

/// Chance a male wins a rutting contest in his current condition.
#[allow(clippy::suboptimal_flops)]
pub fn challenge_win_probability(cfg: &MaleCompetitionConfig, animal: &AnimalState) -> f64 {
    let hea = animal.stats.effective(StatId::Hea);
    let stress = animal.stats.effective(StatId::Str);
    #[allow(clippy::cast_precision_loss)]
    let (injuries, parasites) = (animal.injuries.len() as f64, animal.parasites.len() as f64);

    let p = cfg.base_win_prob
        + (hea - 50.0) * cfg.hea_factor
        + ((animal.weight - cfg.weight_reference) * cfg.weight_factor).max(0.0)
        + ((cfg.low_stress_threshold - stress) * cfg.low_stress_factor).max(0.0)
        - injuries * cfg.injury_penalty
        - parasites * cfg.parasite_penalty;
    p.clamp(cfg.min_win_prob, cfg.max_win_prob.max(cfg.min_win_prob))
}

/// Per-turn survival probability of an independent young animal.
pub fn offspring_survival_chance(
    offspring: &Offspring,
    cfg: &IteroparousConfig,
    season: Season,
    parent: &AnimalState,
) -> f64 {
    let mut p = cfg.offspring_base_survival + (offspring.parent_wis - 50.0) / 5000.0;
    match season {
        Season::Winter => p -= cfg.winter_penalty,
        Season::Summer => p += cfg.summer_bonus,
        Season::Spring | Season::Autumn => {}
    }
    if offspring.age_turns < cfg.young_threshold {
        p -= cfg.young_penalty;
    }
    if parent.has_flag(NEST_PRIME_FLAG) {
        p += 0.006;
    }
    if parent.has_flag(NEST_POOR_FLAG) {
        p -= 0.008;
    }
    p.clamp(cfg.survival_min, cfg.survival_max)
}

/// Advance pregnancy and offspring by one turn. Returns narratives.
pub fn tick_reproduction(
    state: &mut ReproductionState,
    animal: &mut AnimalState,
    config: &ReproductionConfig,
    time: &TimeState,
    rng: &mut GameRng,
) -> Vec<String> {
    let mut narratives = Vec::new();
    if !animal.alive {
        return narratives;
    }
    let (
        ReproductionConfig::Iteroparous(cfg),
        ReproductionState::Iteroparous {
            pregnancy,
            offspring,
            mated_this_season,
            total_fitness,
        },
    ) = (config, state)
    else {
        return narratives;
    };

    // 1. Pregnancy
    if let Some(p) = pregnancy.as_mut() {
        p.turns_remaining = p.turns_remaining.saturating_sub(1);
        if p.turns_remaining == 0 {
            let count = p.offspring_count;
            let wis = animal.stats.effective(StatId::Wis);
            offspring.extend(new_offspring(count, time.turn, wis, false, rng));
            *pregnancy = None;
            animal.flags.remove(&cfg.pregnant_flag);
            animal.flags.insert(cfg.dependent_flag.clone());
            animal.counters.offspring_born = animal.counters.offspring_born.saturating_add(count);
            let litter = match count {
                1 => "a single offspring".to_owned(),
                2 => "twins".to_owned(),
                3 => "triplets".to_owned(),
                n => format!("{n} offspring"),
            };
            narratives.push(format!(
                "You have given birth to {litter}. They are small and impossibly fragile."
            ));
        }
    }

    // 2. Offspring
    let causes: Vec<&str> = if cfg.offspring_death_causes.is_empty() {
        DEFAULT_DEATH_CAUSES.to_vec()
    } else {
        cfg.offspring_death_causes.iter().map(String::as_str).collect()
    };
    let mut any_dependent = false;
    let mut became_independent = false;
    for child in offspring.iter_mut().filter(|o| o.is_alive()) {
        child.age_turns = child.age_turns.saturating_add(1);

        if child.fate == OffspringFate::Dependent && child.age_turns >= cfg.dependence_turns {
            child.fate = OffspringFate::Independent;
            became_independent = true;
        }

        if child.fate == OffspringFate::Independent {
            let p = offspring_survival_chance(child, cfg, time.season, animal);
            if !rng.chance(p) {
                let cause = rng.pick(&causes).copied().unwrap_or("Lost");
                narratives.push(format!(
                    "You sense, in the way that animals do, that one of your offspring has not survived. {cause}."
                ));
                child.fate = OffspringFate::Dead {
                    cause: cause.to_owned(),
                };
                continue;
            }
            if child.age_turns >= cfg.maturation_turns {
                child.fate = OffspringFate::Matured;
                narratives.push(
                    "One of your offspring has reached reproductive age. They will carry your bloodline forward."
                        .to_owned(),
                );
            }
        }

        if child.fate == OffspringFate::Dependent {
            any_dependent = true;
        }
    }

    if !any_dependent {
        animal.flags.remove(&cfg.dependent_flag);
    }
    if became_independent {
        animal.flags.insert(cfg.independence_flag.clone());
    } else {
        animal.flags.remove(&cfg.independence_flag);
    }

    // 3. Mating season reset
    if cfg.mating_season_reset_month == Some(time.month) && time.week == 1 {
        *mated_this_season = false;
        animal.flags.remove(&cfg.mated_flag);
    }

    *total_fitness = u32::try_from(
        offspring
            .iter()
            .filter(|o| o.fate == OffspringFate::Matured)
            .count(),
    )
    .unwrap_or(u32::MAX);

    narratives
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use reckoning_types::Month;

    use crate::testing::{male_competition, sample_animal, sample_bundle, semelparous_config};

    fn time(turn: u32) -> TimeState {
        TimeState {
            turn,
            week: 2,
            month: Month::June,
            year: 1,
            season: Season::Summer,
        }
    }

    #[test]
    fn pregnancy_leads_to_birth_after_gestation() {
        let bundle = sample_bundle();
        let mut animal = sample_animal();
        let mut state = initial_state(&bundle.config.reproduction);
        let mut rng = GameRng::new(3);
        let count =
            start_pregnancy(&mut state, &mut animal, &bundle.config.reproduction, Some(2), 1, &mut rng)
                .unwrap();
        assert_eq!(count, 2);
        assert!(animal.has_flag("pregnant"));

        let mut born = false;
        for turn in 2..10 {
            let lines = tick_reproduction(
                &mut state,
                &mut animal,
                &bundle.config.reproduction,
                &time(turn),
                &mut rng,
            );
            if lines.iter().any(|l| l.contains("twins")) {
                born = true;
                break;
            }
        }
        assert!(born);
        assert!(!animal.has_flag("pregnant"));
        assert!(animal.has_flag("young-dependent"));
        assert_eq!(animal.counters.offspring_born, 2);
    }

    #[test]
    fn second_pregnancy_rejected() {
        let bundle = sample_bundle();
        let mut animal = sample_animal();
        let mut state = initial_state(&bundle.config.reproduction);
        let mut rng = GameRng::new(3);
        start_pregnancy(&mut state, &mut animal, &bundle.config.reproduction, None, 1, &mut rng).unwrap();
        assert!(
            start_pregnancy(&mut state, &mut animal, &bundle.config.reproduction, None, 2, &mut rng)
                .is_err()
        );
    }

    #[test]
    fn males_cannot_become_pregnant_but_can_sire() {
        let bundle = sample_bundle();
        let mut animal = sample_animal();
        animal.sex = Sex::Male;
        let mut state = initial_state(&bundle.config.reproduction);
        let mut rng = GameRng::new(3);
        assert!(
            start_pregnancy(&mut state, &mut animal, &bundle.config.reproduction, None, 1, &mut rng)
                .is_err()
        );
        let sired =
            sire_offspring(&mut state, &mut animal, &bundle.config.reproduction, Some(1), 1, &mut rng)
                .unwrap();
        assert_eq!(sired, 1);
        let ReproductionState::Iteroparous { offspring, .. } = &state else {
            unreachable!()
        };
        assert_eq!(offspring.first().map(|o| o.fate.clone()), Some(OffspringFate::Independent));
    }

    #[test]
    fn litter_size_within_bounds() {
        let bundle = sample_bundle();
        let ReproductionConfig::Iteroparous(cfg) = &bundle.config.reproduction else {
            unreachable!()
        };
        let mut rng = GameRng::new(77);
        for _ in 0..200 {
            let n = offspring_count(&cfg.offspring_count, 140.0, 90.0, &mut rng);
            assert!((1..=cfg.offspring_count.max_offspring).contains(&n));
        }
    }

    #[test]
    fn spawning_is_one_shot() {
        let config = semelparous_config();
        let mut animal = sample_animal();
        let mut state = initial_state(&config);
        let outcome = spawn(&mut state, &mut animal, &config).unwrap();
        // 100 + 70 * 10 + 110 * 2 = 1020 eggs; survival 0.01 + 50 * 0.0001 = 0.015
        assert_eq!(outcome.egg_count, 1020);
        assert_eq!(outcome.estimated_survivors, 15);
        assert!(animal.has_flag("spawning-complete"));
        assert!(spawn(&mut state, &mut animal, &config).is_err());
        assert_eq!(state.total_fitness(), 15);
    }

    #[test]
    fn prime_nest_improves_survivors() {
        let config = semelparous_config();
        let mut animal = sample_animal();
        animal.flags.insert("nest-quality-prime".to_owned());
        let mut state = initial_state(&config);
        let outcome = spawn(&mut state, &mut animal, &config).unwrap();
        assert_eq!(outcome.estimated_survivors, 23);
    }

    #[test]
    fn contest_odds_follow_condition() {
        let cfg = male_competition();
        let mut buck = sample_animal();
        buck.sex = Sex::Male;
        buck.weight = 150.0;
        let fit = challenge_win_probability(&cfg, &buck);

        buck.weight = 100.0;
        let light = challenge_win_probability(&cfg, &buck);
        assert!(light < fit);
        assert!(light >= cfg.min_win_prob);

        buck.injuries.push(reckoning_types::ActiveInjury {
            definition_id: "leg-wound".to_owned(),
            body_part: "left flank".to_owned(),
            severity: 0,
            turns_remaining: 3,
            resting: false,
            acquired_turn: 1,
            modifier_key: "injury:leg-wound:1:0".to_owned(),
        });
        let hurt = challenge_win_probability(&cfg, &buck);
        assert!(hurt < light || (hurt - cfg.min_win_prob).abs() < f64::EPSILON);
    }

    #[test]
    fn contest_odds_are_clamped() {
        let cfg = male_competition();
        let mut buck = sample_animal();
        buck.weight = 10_000.0;
        assert!((challenge_win_probability(&cfg, &buck) - cfg.max_win_prob).abs() < f64::EPSILON);
        buck.weight = 40.0;
        for _ in 0..20 {
            buck.injuries.push(reckoning_types::ActiveInjury {
                definition_id: "leg-wound".to_owned(),
                body_part: "left flank".to_owned(),
                severity: 0,
                turns_remaining: 3,
                resting: false,
                acquired_turn: 1,
                modifier_key: "injury:leg-wound:1:0".to_owned(),
            });
        }
        assert!((challenge_win_probability(&cfg, &buck) - cfg.min_win_prob).abs() < f64::EPSILON);
    }
}

//! Condition evaluator.
//!
//! Every [`Condition`] variant is defined for every context: references to
//! things that do not exist (an untracked population, an absent NPC) make
//! the condition fail rather than erroring. A list of conditions holds when
//! all of them hold; the empty list always holds.

use reckoning_types::{
    AnimalState, Condition, EcosystemState, Npc, SpeciesConfig, TimeState, WeatherState,
};
use reckoning_world::ecosystem::population_level;
use reckoning_world::npc::has_npc;

/// Read-only view of the state conditions are tested against.
#[derive(Debug, Clone, Copy)]
pub struct ConditionContext<'a> {
    /// The player's animal.
    pub animal: &'a AnimalState,
    /// Species parameters.
    pub species: &'a SpeciesConfig,
    /// Calendar.
    pub time: &'a TimeState,
    /// Known NPCs.
    pub npcs: &'a [Npc],
    /// Population levels.
    pub ecosystem: &'a EcosystemState,
    /// Current weather, if simulated.
    pub weather: Option<&'a WeatherState>,
}

/// Evaluate a single condition.
pub fn evaluate(condition: &Condition, ctx: &ConditionContext<'_>) -> bool {
    let animal = ctx.animal;
    match condition {
        Condition::HasFlag { flag } => animal.has_flag(flag),
        Condition::NoFlag { flag } => !animal.has_flag(flag),
        Condition::Season { seasons } => seasons.contains(&ctx.time.season),
        Condition::AgeRange { min, max } => {
            min.is_none_or(|m| animal.age_months >= m) && max.is_none_or(|m| animal.age_months <= m)
        }
        Condition::Sex { sex } => animal.sex == *sex,
        Condition::Species { species_ids } => species_ids.iter().any(|s| *s == animal.species_id),
        Condition::Region { region_ids } => region_ids.iter().any(|r| *r == animal.region),
        Condition::Diet { diets } => diets.contains(&ctx.species.diet),
        Condition::HasNpc { npc_type } => has_npc(ctx.npcs, *npc_type),
        Condition::NoNpc { npc_type } => !has_npc(ctx.npcs, *npc_type),
        Condition::PopulationAbove {
            species_name,
            threshold,
        } => population_level(ctx.ecosystem, species_name).is_some_and(|l| l > *threshold),
        Condition::PopulationBelow {
            species_name,
            threshold,
        } => population_level(ctx.ecosystem, species_name).is_some_and(|l| l < *threshold),
        Condition::StatAbove { stat, threshold } => animal.stats.effective(*stat) > *threshold,
        Condition::StatBelow { stat, threshold } => animal.stats.effective(*stat) < *threshold,
        Condition::HasParasite { parasite_id } => animal.has_parasite(parasite_id),
        Condition::NoParasite { parasite_id } => !animal.has_parasite(parasite_id),
        Condition::HasInjury { injury_id } => match injury_id {
            Some(id) => animal.injuries.iter().any(|i| i.definition_id == *id),
            None => !animal.injuries.is_empty(),
        },
        Condition::NoInjury { injury_id } => match injury_id {
            Some(id) => !animal.injuries.iter().any(|i| i.definition_id == *id),
            None => animal.injuries.is_empty(),
        },
        Condition::WeightAbove { threshold } => animal.weight > *threshold,
        Condition::WeightBelow { threshold } => animal.weight < *threshold,
        Condition::TurnAbove { turn } => ctx.time.turn > *turn,
        Condition::Weather { weather_types } => {
            ctx.weather.is_some_and(|w| weather_types.contains(&w.weather_type))
        }
    }
}

/// Whether every condition holds.
pub fn all_hold(conditions: &[Condition], ctx: &ConditionContext<'_>) -> bool {
    conditions.iter().all(|c| evaluate(c, ctx))
}

#[cfg(test)]
mod tests {
    use reckoning_types::{
        ActiveInjury, EcosystemState, Month, NpcType, PopulationLevel, PopulationTrend, Season, Sex,
        StatId, WeatherType,
    };

    use super::*;
    use crate::testing::{sample_animal, sample_bundle};

    fn check(condition: &Condition, animal: &AnimalState) -> bool {
        let bundle = sample_bundle();
        let time = TimeState::starting(Month::May);
        let mut ecosystem = EcosystemState::default();
        ecosystem.populations.insert(
            "Gray Wolf".to_owned(),
            PopulationLevel {
                name: "Gray Wolf".to_owned(),
                level: 1.0,
                trend: PopulationTrend::Stable,
            },
        );
        let weather = WeatherState {
            weather_type: WeatherType::Rain,
            intensity: 0.3,
            turns_active: 1,
        };
        let ctx = ConditionContext {
            animal,
            species: &bundle.config,
            time: &time,
            npcs: &[],
            ecosystem: &ecosystem,
            weather: Some(&weather),
        };
        evaluate(condition, &ctx)
    }

    #[test]
    fn flags_and_sex() {
        let mut animal = sample_animal();
        animal.flags.insert("scarred".to_owned());
        assert!(check(&Condition::HasFlag { flag: "scarred".to_owned() }, &animal));
        assert!(!check(&Condition::NoFlag { flag: "scarred".to_owned() }, &animal));
        assert!(check(&Condition::Sex { sex: Sex::Female }, &animal));
    }

    #[test]
    fn season_and_age_range() {
        let animal = sample_animal();
        assert!(check(&Condition::Season { seasons: vec![Season::Spring] }, &animal));
        assert!(check(&Condition::AgeRange { min: Some(12), max: None }, &animal));
        assert!(!check(&Condition::AgeRange { min: None, max: Some(12) }, &animal));
        assert!(check(&Condition::AgeRange { min: Some(24), max: Some(24) }, &animal));
    }

    #[test]
    fn missing_entities_fail_the_condition() {
        let animal = sample_animal();
        assert!(!check(&Condition::HasNpc { npc_type: NpcType::Rival }, &animal));
        assert!(check(&Condition::NoNpc { npc_type: NpcType::Rival }, &animal));
        assert!(!check(
            &Condition::PopulationAbove {
                species_name: "Moose".to_owned(),
                threshold: -5.0
            },
            &animal
        ));
        assert!(!check(
            &Condition::PopulationBelow {
                species_name: "Moose".to_owned(),
                threshold: 5.0
            },
            &animal
        ));
    }

    #[test]
    fn population_thresholds() {
        let animal = sample_animal();
        let above = Condition::PopulationAbove {
            species_name: "Gray Wolf".to_owned(),
            threshold: 0.5,
        };
        assert!(check(&above, &animal));
    }

    #[test]
    fn stats_weight_and_injuries() {
        let mut animal = sample_animal();
        assert!(check(&Condition::StatAbove { stat: StatId::Hea, threshold: 60.0 }, &animal));
        assert!(check(&Condition::WeightBelow { threshold: 111.0 }, &animal));
        assert!(check(&Condition::NoInjury { injury_id: None }, &animal));
        animal.injuries.push(ActiveInjury {
            definition_id: "leg-wound".to_owned(),
            body_part: "foreleg".to_owned(),
            severity: 0,
            turns_remaining: 3,
            resting: false,
            acquired_turn: 1,
            modifier_key: "injury:leg-wound:1:0".to_owned(),
        });
        assert!(check(&Condition::HasInjury { injury_id: None }, &animal));
        assert!(check(&Condition::HasInjury { injury_id: Some("leg-wound".to_owned()) }, &animal));
        assert!(!check(&Condition::HasInjury { injury_id: Some("bruise".to_owned()) }, &animal));
        assert!(!check(&Condition::NoInjury { injury_id: None }, &animal));
        assert!(!check(&Condition::NoInjury { injury_id: Some("leg-wound".to_owned()) }, &animal));
    }

    #[test]
    fn no_injury_of_one_kind_ignores_other_injuries() {
        let mut animal = sample_animal();
        animal.injuries.push(ActiveInjury {
            definition_id: "leg-wound".to_owned(),
            body_part: "hind leg".to_owned(),
            severity: 0,
            turns_remaining: 3,
            resting: false,
            acquired_turn: 1,
            modifier_key: "injury:leg-wound:1:0".to_owned(),
        });
        let no_antler = Condition::NoInjury {
            injury_id: Some("antler-break".to_owned()),
        };
        assert!(check(&no_antler, &animal));
    }

    #[test]
    fn weather_and_turn() {
        let animal = sample_animal();
        assert!(check(&Condition::Weather { weather_types: vec![WeatherType::Rain] }, &animal));
        assert!(!check(&Condition::Weather { weather_types: vec![WeatherType::Snow] }, &animal));
        assert!(!check(&Condition::TurnAbove { turn: 0 }, &animal));
    }

    #[test]
    fn empty_list_holds() {
        let animal = sample_animal();
        let bundle = sample_bundle();
        let time = TimeState::starting(Month::May);
        let ecosystem = EcosystemState::default();
        let ctx = ConditionContext {
            animal: &animal,
            species: &bundle.config,
            time: &time,
            npcs: &[],
            ecosystem: &ecosystem,
            weather: None,
        };
        assert!(all_hold(&[], &ctx));
    }
}

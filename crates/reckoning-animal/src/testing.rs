//! Shared fixtures for unit tests.

use std::collections::{BTreeMap, BTreeSet};

use reckoning_types::{
    AgeConfig, AnimalState, Diet, InjuryDefinition, InjurySeverityLevel, IteroparousConfig,
    LifetimeCounters, MaleCompetitionConfig, OffspringCountFormula, ParasiteDefinition, ParasiteStage,
    PredationVulnerability, ReproductionConfig, SeasonalWeight, SemelparousConfig, Severity, Sex,
    SpeciesBundle, SpeciesConfig, StartingWeight, StatBlock, StatEffect, StatId, WeightConfig,
};

fn effect(stat: StatId, amount: f64) -> StatEffect {
    StatEffect {
        stat,
        amount,
        duration: None,
        label: String::new(),
    }
}

/// An iteroparous breeding setup with short timings.
pub fn iteroparous_config() -> ReproductionConfig {
    ReproductionConfig::Iteroparous(IteroparousConfig {
        mating_min_age: 12,
        gestation_turns: 3,
        offspring_count: OffspringCountFormula {
            weight_reference: 100.0,
            weight_divisor: 20.0,
            hea_reference: 60.0,
            hea_divisor: 20.0,
            single_threshold: 0.4,
            triplet_threshold: 0.9,
            max_offspring: 3,
        },
        dependence_turns: 4,
        maturation_turns: 8,
        offspring_base_survival: 0.95,
        winter_penalty: 0.05,
        summer_bonus: 0.02,
        young_penalty: 0.03,
        young_threshold: 6,
        survival_min: 0.5,
        survival_max: 0.99,
        offspring_death_causes: vec!["Taken by a coyote".to_owned()],
        pregnant_flag: "pregnant".to_owned(),
        dependent_flag: "young-dependent".to_owned(),
        independence_flag: "young-independent".to_owned(),
        mated_flag: "mated-this-season".to_owned(),
        mating_season_reset_month: None,
        male_competition: Some(male_competition()),
    })
}

/// Rutting contests tuned like a whitetail buck's.
pub fn male_competition() -> MaleCompetitionConfig {
    MaleCompetitionConfig {
        base_win_prob: 0.15,
        min_win_prob: 0.02,
        max_win_prob: 0.45,
        hea_factor: 0.003,
        weight_reference: 130.0,
        weight_factor: 0.001,
        low_stress_threshold: 30.0,
        low_stress_factor: 0.002,
        injury_penalty: 0.05,
        parasite_penalty: 0.03,
        loss_injury_chance: 0.4,
        loss_injury_id: "leg-wound".to_owned(),
        loss_injury_body_parts: vec!["left flank".to_owned(), "right flank".to_owned()],
        challenge_flag: "attempted-buck-challenge".to_owned(),
    }
}

/// A one-shot spawning setup.
pub fn semelparous_config() -> ReproductionConfig {
    ReproductionConfig::Semelparous(SemelparousConfig {
        base_egg_count: 100.0,
        egg_count_hea_factor: 10.0,
        egg_count_weight_factor: 2.0,
        egg_survival_base: 0.01,
        egg_survival_wis_factor: 0.0001,
        spawning_complete_flag: "spawning-complete".to_owned(),
        nest_quality_prime_flag: Some("nest-quality-prime".to_owned()),
        nest_quality_poor_flag: Some("nest-quality-poor".to_owned()),
    })
}

/// A small deer-like species with one parasite and two injuries.
pub fn sample_bundle() -> SpeciesBundle {
    let mut base_stats = BTreeMap::new();
    base_stats.insert(StatId::Hea, 70.0);

    let config = SpeciesConfig {
        id: "test-deer".to_owned(),
        name: "Test Deer".to_owned(),
        scientific_name: String::new(),
        diet: Diet::Herbivore,
        default_region: "forest".to_owned(),
        starting_weight: StartingWeight {
            male: 150.0,
            female: 110.0,
        },
        base_stats,
        weight: WeightConfig {
            min_floor: 40.0,
            max_weight: None,
            starvation_death: 60.0,
            starvation_debuff: 80.0,
            debuff_max_penalty: 20.0,
        },
        age: AgeConfig {
            starting_age_months: 24,
            old_age_onset_months: 120,
            old_age_base_chance: 0.05,
            old_age_escalation: 1.5,
            max_old_age_chance: 0.5,
        },
        disease_death_chance_at_critical: 0.0,
        predation: PredationVulnerability {
            injury_prob_increase: 0.05,
            parasite_prob_increase: 0.03,
            underweight_factor: 0.01,
            underweight_threshold: 80.0,
            death_chance_min: 0.01,
            death_chance_max: 0.9,
        },
        seasonal_weight: SeasonalWeight::default(),
        age_phases: Vec::new(),
        migration: None,
        reproduction: iteroparous_config(),
        populations: Vec::new(),
        ecosystem_links: Vec::new(),
        ecosystem_narratives: Vec::new(),
        npc_templates: Vec::new(),
        territorial: false,
        template_vars: BTreeMap::new(),
    };

    let mut parasites = BTreeMap::new();
    parasites.insert(
        "deer-tick".to_owned(),
        ParasiteDefinition {
            id: "deer-tick".to_owned(),
            name: "Deer Tick".to_owned(),
            description: String::new(),
            stages: vec![
                ParasiteStage {
                    severity: Severity::Minor,
                    description: "A few ticks.".to_owned(),
                    stat_effects: vec![effect(StatId::Hea, -5.0)],
                    min_turns: 1,
                    progression_chance: 1.0,
                    remission_chance: 0.0,
                },
                ParasiteStage {
                    severity: Severity::Critical,
                    description: "Heavy infestation.".to_owned(),
                    stat_effects: vec![effect(StatId::Hea, -15.0)],
                    min_turns: 1,
                    progression_chance: 0.0,
                    remission_chance: 0.0,
                },
            ],
        },
    );

    let mut injuries = BTreeMap::new();
    injuries.insert(
        "leg-wound".to_owned(),
        InjuryDefinition {
            id: "leg-wound".to_owned(),
            name: "Leg Wound".to_owned(),
            body_parts: vec!["foreleg".to_owned(), "hind leg".to_owned()],
            severity_levels: vec![InjurySeverityLevel {
                severity: Severity::Moderate,
                description: "A deep cut.".to_owned(),
                stat_effects: vec![effect(StatId::Str, -5.0)],
                base_healing_time: 4,
                worsening_chance: 0.0,
            }],
        },
    );
    injuries.insert(
        "bruise".to_owned(),
        InjuryDefinition {
            id: "bruise".to_owned(),
            name: "Bruise".to_owned(),
            body_parts: Vec::new(),
            severity_levels: Vec::new(),
        },
    );

    SpeciesBundle {
        config,
        events: Vec::new(),
        parasites,
        injuries,
        backstories: Vec::new(),
        storylines: Vec::new(),
        actions: Vec::new(),
    }
}

/// A healthy two-year-old female at 110 weight.
pub fn sample_animal() -> AnimalState {
    let bundle = sample_bundle();
    AnimalState {
        species_id: bundle.config.id.clone(),
        sex: Sex::Female,
        age_months: 24,
        weight: 110.0,
        stats: StatBlock::from_base(&bundle.config.base_stats),
        parasites: Vec::new(),
        injuries: Vec::new(),
        flags: BTreeSet::new(),
        region: bundle.config.default_region,
        alive: true,
        cause_of_death: None,
        counters: LifetimeCounters::default(),
        backstory_id: None,
    }
}

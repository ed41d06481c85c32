//! Shared fixtures for unit tests.

use std::collections::BTreeMap;

use reckoning_types::{
    AgeConfig, Diet, EventCategory, EventType, GameEvent, IteroparousConfig, OffspringCountFormula,
    PredationVulnerability, ReproductionConfig, SeasonalWeight, SpeciesConfig, StartingWeight,
    WeightConfig,
};

/// A bare event with no conditions or consequences.
pub fn event(id: &str, event_type: EventType, category: EventCategory) -> GameEvent {
    GameEvent {
        id: id.to_owned(),
        event_type,
        category,
        narrative_text: format!("{id} happens."),
        image: None,
        conditions: Vec::new(),
        weight: 1.0,
        cooldown: None,
        tags: Vec::new(),
        guaranteed: false,
        stat_effects: Vec::new(),
        consequences: Vec::new(),
        choices: Vec::new(),
        sub_events: Vec::new(),
        footnote: None,
    }
}

/// A minimal species config with no populations, links or templates.
pub fn sample_config() -> SpeciesConfig {
    SpeciesConfig {
        id: "test-deer".to_owned(),
        name: "Test Deer".to_owned(),
        scientific_name: String::new(),
        diet: Diet::Herbivore,
        default_region: "forest".to_owned(),
        starting_weight: StartingWeight {
            male: 150.0,
            female: 110.0,
        },
        base_stats: BTreeMap::new(),
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
        reproduction: ReproductionConfig::Iteroparous(IteroparousConfig {
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
            offspring_death_causes: Vec::new(),
            pregnant_flag: "pregnant".to_owned(),
            dependent_flag: "young-dependent".to_owned(),
            independence_flag: "young-independent".to_owned(),
            mated_flag: "mated-this-season".to_owned(),
            mating_season_reset_month: None,
            male_competition: None,
        }),
        populations: Vec::new(),
        ecosystem_links: Vec::new(),
        ecosystem_narratives: Vec::new(),
        npc_templates: Vec::new(),
        territorial: false,
        template_vars: BTreeMap::new(),
    }
}

//! Species configuration and the immutable content bundle.
//!
//! A [`SpeciesBundle`] is everything the engine needs to simulate one
//! species: numeric parameters, the event catalogue, parasite and injury
//! definitions, and backstory options. The engine only ever reads it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::content::GameEvent;
use crate::enums::{Diet, Month, NpcType, Season};
use crate::health::{InjuryDefinition, ParasiteDefinition};
use crate::stats::{StatEffect, StatId};
use crate::story::{StorylineDefinition, VoluntaryAction};

// ---------------------------------------------------------------------------
// Body and survival parameters
// ---------------------------------------------------------------------------

/// Starting weight by sex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StartingWeight {
    /// Male starting weight.
    pub male: f64,
    /// Female starting weight.
    pub female: f64,
}

/// Weight thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WeightConfig {
    /// Weight can never drop below this.
    pub min_floor: f64,
    /// Optional biological ceiling.
    pub max_weight: Option<f64>,
    /// Below this weight the animal starves to death.
    pub starvation_death: f64,
    /// Below this weight a starvation debuff applies to HEA.
    pub starvation_debuff: f64,
    /// Largest HEA penalty from the starvation debuff.
    pub debuff_max_penalty: f64,
}

/// Old-age hazard parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgeConfig {
    /// Age in months at the start of a game.
    pub starting_age_months: u32,
    /// Age in months after which the old-age roll begins.
    pub old_age_onset_months: u32,
    /// Chance of death in the first year past onset.
    pub old_age_base_chance: f64,
    /// Multiplier per year past onset.
    pub old_age_escalation: f64,
    /// Cap on the per-turn old-age chance.
    pub max_old_age_chance: f64,
}

/// How vulnerable the animal is when a choice carries a death chance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PredationVulnerability {
    /// Added per active injury.
    pub injury_prob_increase: f64,
    /// Added per active parasite.
    pub parasite_prob_increase: f64,
    /// Added per unit of weight under `underweight_threshold`.
    pub underweight_factor: f64,
    /// Weight below which the underweight term applies.
    pub underweight_threshold: f64,
    /// Lower clamp for adjusted probabilities.
    pub death_chance_min: f64,
    /// Upper clamp for adjusted probabilities.
    pub death_chance_max: f64,
}

/// Passive per-turn weight change by season.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SeasonalWeight {
    /// Spring change.
    pub spring: f64,
    /// Summer change.
    pub summer: f64,
    /// Autumn change.
    pub autumn: f64,
    /// Winter change.
    pub winter: f64,
    /// Multiplied by the foraging behavioural setting and added.
    #[serde(default)]
    pub foraging_bonus: f64,
}

impl SeasonalWeight {
    /// Base change for `season`.
    pub const fn for_season(&self, season: Season) -> f64 {
        match season {
            Season::Spring => self.spring,
            Season::Summer => self.summer,
            Season::Autumn => self.autumn,
            Season::Winter => self.winter,
        }
    }
}

/// A stage of life with its own stat modifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgePhase {
    /// Phase id; also set as a flag while active.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Inclusive lower bound in months.
    pub min_age: u32,
    /// Exclusive upper bound in months.
    pub max_age: Option<u32>,
    /// Stat modifiers while in the phase; durations are ignored.
    #[serde(default)]
    pub stat_modifiers: Vec<StatEffect>,
}

/// Seasonal migration between ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MigrationConfig {
    /// Region used while migrated.
    pub winter_region_id: String,
    /// Flag signalling the animal intends to migrate.
    pub migration_flag: String,
    /// Flag set while migrated.
    pub migrated_flag: String,
    /// Flag set after returning.
    pub return_flag: String,
    /// Season the move happens.
    pub migration_season: Season,
    /// Season the return happens.
    pub return_season: Season,
}

// ---------------------------------------------------------------------------
// Reproduction
// ---------------------------------------------------------------------------

/// Condition-scaled litter size parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct OffspringCountFormula {
    /// Weight at which the weight term is neutral.
    pub weight_reference: f64,
    /// Divisor of the weight term.
    pub weight_divisor: f64,
    /// HEA at which the health term is neutral.
    pub hea_reference: f64,
    /// Divisor of the health term.
    pub hea_divisor: f64,
    /// Rolls below this (minus the condition bonus) give a single offspring.
    pub single_threshold: f64,
    /// Rolls at or above this (minus the condition bonus) give triplets.
    pub triplet_threshold: f64,
    /// Hard cap on litter size.
    pub max_offspring: u32,
}

/// Rutting contests a male enters by raising `challenge_flag`.
///
/// The win chance starts at `base_win_prob`, rises with HEA above 50,
/// weight above `weight_reference` and stress below `low_stress_threshold`,
/// falls with every injury and parasite, and is clamped to
/// `[min_win_prob, max_win_prob]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MaleCompetitionConfig {
    /// Win chance of an average contender.
    pub base_win_prob: f64,
    /// Lower clamp.
    pub min_win_prob: f64,
    /// Upper clamp.
    pub max_win_prob: f64,
    /// Added per point of HEA above 50.
    pub hea_factor: f64,
    /// Weight above which size starts to count.
    pub weight_reference: f64,
    /// Added per unit of weight above the reference.
    pub weight_factor: f64,
    /// STR below which calm starts to count.
    pub low_stress_threshold: f64,
    /// Added per point of STR below the threshold.
    pub low_stress_factor: f64,
    /// Subtracted per active injury.
    pub injury_penalty: f64,
    /// Subtracted per carried parasite.
    pub parasite_penalty: f64,
    /// Chance a lost contest leaves an injury.
    pub loss_injury_chance: f64,
    /// Injury definition a lost contest inflicts.
    pub loss_injury_id: String,
    /// Body parts the loss injury can land on.
    #[serde(default)]
    pub loss_injury_body_parts: Vec<String>,
    /// Flag an event sets to enter a contest this turn.
    pub challenge_flag: String,
}

/// Repeated breeding with dependent young.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct IteroparousConfig {
    /// Minimum age in months to breed.
    pub mating_min_age: u32,
    /// Turns from conception to birth.
    pub gestation_turns: u32,
    /// Litter size formula.
    pub offspring_count: OffspringCountFormula,
    /// Turns the young depend on the parent.
    pub dependence_turns: u32,
    /// Turns until the young count as matured.
    pub maturation_turns: u32,
    /// Per-turn survival chance of a young animal.
    pub offspring_base_survival: f64,
    /// Subtracted in winter.
    pub winter_penalty: f64,
    /// Added in summer.
    pub summer_bonus: f64,
    /// Subtracted while younger than `young_threshold` turns.
    pub young_penalty: f64,
    /// Age in turns below which the young penalty applies.
    pub young_threshold: u32,
    /// Lower survival clamp.
    pub survival_min: f64,
    /// Upper survival clamp.
    pub survival_max: f64,
    /// Possible causes of offspring death.
    #[serde(default)]
    pub offspring_death_causes: Vec<String>,
    /// Flag while pregnant.
    pub pregnant_flag: String,
    /// Flag while young depend on the parent.
    pub dependent_flag: String,
    /// Flag set when the young become independent.
    pub independence_flag: String,
    /// Flag set after mating this season.
    pub mated_flag: String,
    /// Month whose first week clears the mated state.
    pub mating_season_reset_month: Option<Month>,
    /// Male contests for mating rights; absent for species without them.
    #[serde(default)]
    pub male_competition: Option<MaleCompetitionConfig>,
}

/// One-shot fatal spawning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SemelparousConfig {
    /// Eggs before condition adjustments.
    pub base_egg_count: f64,
    /// Eggs added per point of HEA.
    pub egg_count_hea_factor: f64,
    /// Eggs added per unit of weight.
    pub egg_count_weight_factor: f64,
    /// Base fraction of eggs expected to survive.
    pub egg_survival_base: f64,
    /// Survival fraction added per point of WIS.
    pub egg_survival_wis_factor: f64,
    /// Flag set once spawning is done.
    pub spawning_complete_flag: String,
    /// Flag marking a prime nest site (survival x1.5).
    pub nest_quality_prime_flag: Option<String>,
    /// Flag marking a poor nest site (survival x0.5).
    pub nest_quality_poor_flag: Option<String>,
}

/// Reproductive strategy of a species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ReproductionConfig {
    /// Repeated breeding.
    Iteroparous(IteroparousConfig),
    /// One-shot spawning.
    Semelparous(SemelparousConfig),
}

// ---------------------------------------------------------------------------
// World seeds
// ---------------------------------------------------------------------------

/// A population tracked by the ecosystem ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PopulationSeed {
    /// Population name, e.g. `"Gray Wolf"`.
    pub name: String,
    /// Starting level in `[-2, 2]`.
    #[serde(default)]
    pub initial_level: f64,
}

/// Predator/prey coupling between two tracked populations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EcosystemLink {
    /// Predator population name.
    pub predator: String,
    /// Prey population name.
    pub prey: String,
    /// Coupling strength.
    pub strength: f64,
    /// Regions where the link applies; empty applies everywhere.
    #[serde(default)]
    pub region_ids: Vec<String>,
}

/// Which side of a threshold triggers an ecosystem narrative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ThresholdDirection {
    /// Level at or below the threshold.
    Below,
    /// Level at or above the threshold.
    Above,
}

/// A line of ambient narrative triggered by a population level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EcosystemNarrative {
    /// Population name.
    pub species_name: String,
    /// Level threshold.
    pub threshold: f64,
    /// Side of the threshold that triggers.
    pub direction: ThresholdDirection,
    /// Text emitted.
    pub narrative_text: String,
}

/// Name pool for introducing NPCs of one type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct NpcTemplate {
    /// Role of NPCs made from this template.
    pub npc_type: NpcType,
    /// Species label, e.g. `"whitetail buck"`.
    pub species_label: String,
    /// Candidate names.
    pub names: Vec<String>,
}

/// A starting history that shapes the initial animal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Backstory {
    /// Unique id.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Flags set at the start of the game.
    #[serde(default)]
    pub flags: Vec<String>,
    /// Permanent stat adjustments.
    #[serde(default)]
    pub stat_adjustments: Vec<StatEffect>,
}

// ---------------------------------------------------------------------------
// Species config and bundle
// ---------------------------------------------------------------------------

/// Numeric and behavioural parameters of a species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SpeciesConfig {
    /// Species id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Latin name.
    #[serde(default)]
    pub scientific_name: String,
    /// Dietary class.
    pub diet: Diet,
    /// Region the animal starts in.
    pub default_region: String,
    /// Starting weight by sex.
    pub starting_weight: StartingWeight,
    /// Base stat values; missing stats start at 50.
    #[serde(default)]
    pub base_stats: BTreeMap<StatId, f64>,
    /// Weight thresholds.
    pub weight: WeightConfig,
    /// Age hazard parameters.
    pub age: AgeConfig,
    /// Chance of dying each turn while a parasite is at its final stage.
    #[serde(default)]
    pub disease_death_chance_at_critical: f64,
    /// Death-chance adjustments.
    pub predation: PredationVulnerability,
    /// Passive weight change per season.
    #[serde(default)]
    pub seasonal_weight: SeasonalWeight,
    /// Life stages.
    #[serde(default)]
    pub age_phases: Vec<AgePhase>,
    /// Seasonal migration, if the species migrates.
    pub migration: Option<MigrationConfig>,
    /// Reproductive strategy.
    pub reproduction: ReproductionConfig,
    /// Tracked populations.
    #[serde(default)]
    pub populations: Vec<PopulationSeed>,
    /// Predator/prey couplings.
    #[serde(default)]
    pub ecosystem_links: Vec<EcosystemLink>,
    /// Narrative lines triggered by population levels.
    #[serde(default)]
    pub ecosystem_narratives: Vec<EcosystemNarrative>,
    /// NPC name pools.
    #[serde(default)]
    pub npc_templates: Vec<NpcTemplate>,
    /// Whether the species holds territory.
    #[serde(default)]
    pub territorial: bool,
    /// Values for `{{species.*}}` narrative variables.
    #[serde(default)]
    pub template_vars: BTreeMap<String, String>,
}

/// Everything needed to simulate one species. Read-only at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SpeciesBundle {
    /// Numeric parameters.
    pub config: SpeciesConfig,
    /// Event catalogue.
    #[serde(default)]
    pub events: Vec<GameEvent>,
    /// Parasite definitions keyed by id.
    #[serde(default)]
    pub parasites: BTreeMap<String, ParasiteDefinition>,
    /// Injury definitions keyed by id.
    #[serde(default)]
    pub injuries: BTreeMap<String, InjuryDefinition>,
    /// Starting histories.
    #[serde(default)]
    pub backstories: Vec<Backstory>,
    /// Multi-turn story arcs.
    #[serde(default)]
    pub storylines: Vec<StorylineDefinition>,
    /// Actions the player may take on their own initiative.
    #[serde(default)]
    pub actions: Vec<VoluntaryAction>,
}

impl SpeciesBundle {
    /// Event definition by id.
    pub fn event(&self, id: &str) -> Option<&GameEvent> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Parasite definition by id.
    pub fn parasite(&self, id: &str) -> Option<&ParasiteDefinition> {
        self.parasites.get(id)
    }

    /// Injury definition by id.
    pub fn injury(&self, id: &str) -> Option<&InjuryDefinition> {
        self.injuries.get(id)
    }

    /// Storyline definition by id.
    pub fn storyline(&self, id: &str) -> Option<&StorylineDefinition> {
        self.storylines.iter().find(|s| s.id == id)
    }

    /// Voluntary action by id.
    pub fn action(&self, id: &str) -> Option<&VoluntaryAction> {
        self.actions.iter().find(|a| a.id == id)
    }

    /// NPC template for `npc_type`.
    pub fn npc_template(&self, npc_type: NpcType) -> Option<&NpcTemplate> {
        self.config
            .npc_templates
            .iter()
            .find(|t| t.npc_type == npc_type)
    }
}

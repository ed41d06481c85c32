//! Declarative event content: conditions, consequences, choices and events.
//!
//! Species catalogues are plain data. Nothing here executes; the condition
//! evaluator and consequence applier in `reckoning-core` interpret these
//! closed vocabularies.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{ChoiceStyle, Diet, EventCategory, EventType, NpcType, Season, Sex, WeatherType};
use crate::stats::{StatEffect, StatId};

// ---------------------------------------------------------------------------
// Conditions
// ---------------------------------------------------------------------------

/// A predicate over the current game state. Lists of conditions are ANDed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Condition {
    /// The animal carries `flag`.
    HasFlag {
        /// Flag name.
        flag: String,
    },
    /// The animal does not carry `flag`.
    NoFlag {
        /// Flag name.
        flag: String,
    },
    /// The current season is one of `seasons`.
    Season {
        /// Allowed seasons.
        seasons: Vec<Season>,
    },
    /// Age in months within the inclusive bounds.
    AgeRange {
        /// Minimum age in months.
        min: Option<u32>,
        /// Maximum age in months.
        max: Option<u32>,
    },
    /// The animal has this sex.
    Sex {
        /// Required sex.
        sex: Sex,
    },
    /// The animal's species is one of `species_ids`.
    Species {
        /// Allowed species ids.
        species_ids: Vec<String>,
    },
    /// The animal is in one of `region_ids`.
    Region {
        /// Allowed region ids.
        region_ids: Vec<String>,
    },
    /// The species' diet is one of `diets`.
    Diet {
        /// Allowed diets.
        diets: Vec<Diet>,
    },
    /// A living NPC of this type is present.
    HasNpc {
        /// Required NPC type.
        npc_type: NpcType,
    },
    /// No living NPC of this type is present.
    NoNpc {
        /// Excluded NPC type.
        npc_type: NpcType,
    },
    /// The named population's level is strictly above `threshold`.
    PopulationAbove {
        /// Population name as tracked by the ecosystem.
        species_name: String,
        /// Exclusive lower bound.
        threshold: f64,
    },
    /// The named population's level is strictly below `threshold`.
    PopulationBelow {
        /// Population name as tracked by the ecosystem.
        species_name: String,
        /// Exclusive upper bound.
        threshold: f64,
    },
    /// Effective stat value strictly above `threshold`.
    StatAbove {
        /// Stat to test.
        stat: StatId,
        /// Exclusive lower bound.
        threshold: f64,
    },
    /// Effective stat value strictly below `threshold`.
    StatBelow {
        /// Stat to test.
        stat: StatId,
        /// Exclusive upper bound.
        threshold: f64,
    },
    /// The animal carries this parasite.
    HasParasite {
        /// Parasite definition id.
        parasite_id: String,
    },
    /// The animal does not carry this parasite.
    NoParasite {
        /// Parasite definition id.
        parasite_id: String,
    },
    /// The animal has an injury (of `injury_id`, or of any kind when absent).
    HasInjury {
        /// Injury definition id to match, if specific.
        injury_id: Option<String>,
    },
    /// The animal has no injury of `injury_id`, or none at all when absent.
    NoInjury {
        /// Injury definition id to exclude, if specific.
        injury_id: Option<String>,
    },
    /// Weight strictly above `threshold`.
    WeightAbove {
        /// Exclusive lower bound.
        threshold: f64,
    },
    /// Weight strictly below `threshold`.
    WeightBelow {
        /// Exclusive upper bound.
        threshold: f64,
    },
    /// Current turn strictly above `turn`.
    TurnAbove {
        /// Exclusive lower bound.
        turn: u32,
    },
    /// Current weather is one of `weather_types`. Fails when no weather is set.
    Weather {
        /// Allowed weather kinds.
        weather_types: Vec<WeatherType>,
    },
}

// ---------------------------------------------------------------------------
// Consequences
// ---------------------------------------------------------------------------

/// A typed state mutation produced by resolving an event, choice or sub-event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Consequence {
    /// Change body weight, respecting the species floor and ceiling.
    ModifyWeight {
        /// Signed change.
        amount: f64,
    },
    /// Apply a stat effect.
    ModifyStat {
        /// Stat to change.
        stat: StatId,
        /// Signed change.
        amount: f64,
        /// Turns the change lasts; absent or zero is permanent.
        duration: Option<u32>,
    },
    /// Add a flag.
    SetFlag {
        /// Flag name.
        flag: String,
    },
    /// Remove a flag.
    RemoveFlag {
        /// Flag name.
        flag: String,
    },
    /// Infect with a parasite, unless already carried.
    AddParasite {
        /// Parasite definition id.
        parasite_id: String,
        /// Starting stage index (default 0).
        start_stage: Option<u32>,
    },
    /// Clear a parasite and its stat modifiers.
    RemoveParasite {
        /// Parasite definition id.
        parasite_id: String,
    },
    /// Inflict an injury.
    AddInjury {
        /// Injury definition id.
        injury_id: String,
        /// Severity level index (default 0).
        severity: Option<u32>,
        /// Body part; drawn from the definition when absent.
        body_part: Option<String>,
    },
    /// Move to another region.
    ChangeRegion {
        /// Destination region id.
        region_id: String,
    },
    /// Shift the animal's age.
    ModifyAge {
        /// Signed change in months.
        amount: i32,
    },
    /// Begin a pregnancy (iteroparous females).
    StartPregnancy {
        /// Fixed litter size; computed from condition when absent.
        offspring_count: Option<u32>,
    },
    /// Spawn (semelparous species); fatal to the parent at the end of the turn.
    Spawn,
    /// Father offspring (iteroparous males).
    SireOffspring {
        /// Fixed offspring count; computed from condition when absent.
        offspring_count: Option<u32>,
    },
    /// Shift a tracked population level.
    ModifyPopulation {
        /// Population name.
        species_name: String,
        /// Signed change.
        amount: f64,
    },
    /// Change the size or quality of the held territory.
    ModifyTerritory {
        /// Signed size change.
        size_change: Option<f64>,
        /// Signed quality change.
        quality_change: Option<f64>,
    },
    /// Bring a new NPC into the animal's life.
    IntroduceNpc {
        /// Role of the new NPC.
        npc_type: NpcType,
    },
    /// Kill the animal.
    Death {
        /// Cause of death shown to the player.
        cause: String,
    },
}

// ---------------------------------------------------------------------------
// Choices and death rolls
// ---------------------------------------------------------------------------

/// Linear stat adjustment of a death probability (`prob += stat * factor`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StatFactor {
    /// Stat whose effective value is read.
    pub stat: StatId,
    /// Multiplier applied to the stat value.
    pub factor: f64,
}

/// A defensive maneuver offered when a lethal roll is pending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EscapeOption {
    /// Unique id within the death chance.
    pub id: String,
    /// Short label.
    pub label: String,
    /// Longer description.
    #[serde(default)]
    pub description: String,
    /// Amount subtracted from the base death probability.
    pub survival_modifier: f64,
    /// Stat effects paid when the animal survives using this option.
    #[serde(default)]
    pub stat_cost: Vec<StatEffect>,
    /// Flag the animal must carry to use this option.
    pub required_flag: Option<String>,
}

/// Probabilistic lethal outcome attached to a choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DeathChance {
    /// Base probability of death.
    pub probability: f64,
    /// Cause recorded if the roll is fatal.
    pub cause: String,
    /// Stat-driven adjustments.
    #[serde(default)]
    pub stat_modifiers: Vec<StatFactor>,
    /// Options offered to the player before the roll; empty rolls immediately.
    #[serde(default)]
    pub escape_options: Vec<EscapeOption>,
}

/// One option of an active event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventChoice {
    /// Unique id within the event.
    pub id: String,
    /// Button label.
    pub label: String,
    /// Tooltip text.
    #[serde(default)]
    pub description: String,
    /// Text shown after choosing.
    pub narrative_result: Option<String>,
    /// Conditions under which the choice is offered.
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Stat effects of the choice.
    #[serde(default)]
    pub stat_effects: Vec<StatEffect>,
    /// Consequences of the choice.
    #[serde(default)]
    pub consequences: Vec<Consequence>,
    /// Whether a confirmed choice may be changed before the turn resolves.
    #[serde(default)]
    pub revocable: bool,
    /// Display style.
    #[serde(default)]
    pub style: ChoiceStyle,
    /// Optional lethal risk.
    pub death_chance: Option<DeathChance>,
}

/// A probabilistic nested occurrence attached to an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SubEventTrigger {
    /// Sub-event id.
    pub event_id: String,
    /// Probability of firing, 0..=1.
    pub chance: f64,
    /// Extra conditions that must hold.
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Narrative shown when it fires.
    pub narrative_text: String,
    /// Optional footnote.
    pub footnote: Option<String>,
    /// Stat effects when fired.
    #[serde(default)]
    pub stat_effects: Vec<StatEffect>,
    /// Consequences when fired.
    #[serde(default)]
    pub consequences: Vec<Consequence>,
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

const fn default_event_weight() -> f64 {
    1.0
}

/// Immutable definition of a possible occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GameEvent {
    /// Unique id within the species catalogue.
    pub id: String,
    /// Active (choice) or passive (automatic).
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Classification.
    pub category: EventCategory,
    /// Narrative text; supports `{{...}}` template variables.
    pub narrative_text: String,
    /// Illustration placeholder resolved by the illustration picker.
    pub image: Option<String>,
    /// Eligibility conditions.
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Base selection weight.
    #[serde(default = "default_event_weight")]
    pub weight: f64,
    /// Turns before the event may fire again.
    pub cooldown: Option<u32>,
    /// Behavioural and memory tags such as `"foraging"` or `"predator"`.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Milestone events fire once, as soon as they become eligible.
    #[serde(default)]
    pub guaranteed: bool,
    /// Event-level stat effects.
    #[serde(default)]
    pub stat_effects: Vec<StatEffect>,
    /// Event-level consequences.
    #[serde(default)]
    pub consequences: Vec<Consequence>,
    /// Choices for active events.
    #[serde(default)]
    pub choices: Vec<EventChoice>,
    /// Nested probabilistic occurrences.
    #[serde(default)]
    pub sub_events: Vec<SubEventTrigger>,
    /// Optional footnote.
    pub footnote: Option<String>,
}

impl GameEvent {
    /// Whether the event carries `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Whether the event waits for a player decision.
    pub fn needs_choice(&self) -> bool {
        self.event_type == EventType::Active && !self.choices.is_empty()
    }

    /// Look up a choice by id.
    pub fn choice(&self, choice_id: &str) -> Option<&EventChoice> {
        self.choices.iter().find(|c| c.id == choice_id)
    }
}

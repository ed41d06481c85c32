//! Per-turn runtime records: resolved events, outcomes and history.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::content::{Consequence, EscapeOption, GameEvent};
use crate::enums::{Month, Season};
use crate::stats::{StatEffect, StatId};

/// A sub-event that fired this occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResolvedSubEvent {
    /// Sub-event id.
    pub event_id: String,
    /// Templated narrative.
    pub narrative_text: String,
    /// Optional footnote.
    pub footnote: Option<String>,
    /// Stat effects to apply.
    pub stat_effects: Vec<StatEffect>,
    /// Consequences to apply.
    pub consequences: Vec<Consequence>,
}

/// An event realised for the current turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResolvedEvent {
    /// The definition this occurrence came from.
    pub definition: GameEvent,
    /// Narrative with template variables filled in.
    pub narrative: String,
    /// Concrete illustration, if the event had a placeholder.
    pub image: Option<String>,
    /// Confirmed choice, if any.
    pub choice_id: Option<String>,
    /// Sub-events that fired, in catalogue order.
    pub sub_events: Vec<ResolvedSubEvent>,
    /// Set when resolving this event killed the animal.
    pub lethal_outcome: bool,
}

impl ResolvedEvent {
    /// Definition id.
    pub fn id(&self) -> &str {
        &self.definition.id
    }

    /// Every consequence this occurrence carries: event level, the chosen
    /// choice, then fired sub-events.
    pub fn all_consequences(&self) -> Vec<&Consequence> {
        let choice = self
            .choice_id
            .as_deref()
            .and_then(|id| self.definition.choice(id));
        self.definition
            .consequences
            .iter()
            .chain(choice.into_iter().flat_map(|c| c.consequences.iter()))
            .chain(self.sub_events.iter().flat_map(|s| s.consequences.iter()))
            .collect()
    }
}

/// Result of a death roll attached to a choice.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DeathRollOutcome {
    /// Adjusted probability of death.
    pub probability: f64,
    /// `None` while the roll waits on an escape decision.
    pub survived: Option<bool>,
}

/// What happened for one event this turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventOutcome {
    /// Event id.
    pub event_id: String,
    /// Templated event narrative.
    pub narrative: String,
    /// Choice id, if any.
    pub choice_id: Option<String>,
    /// Choice label, if any.
    pub choice_label: Option<String>,
    /// Text shown after choosing.
    pub narrative_result: Option<String>,
    /// Stat effects applied for this event.
    pub stat_effects: Vec<StatEffect>,
    /// Consequences applied for this event.
    pub consequences: Vec<Consequence>,
    /// Death roll, if the choice carried one.
    pub death_roll: Option<DeathRollOutcome>,
}

/// A lethal roll waiting for the player to pick an escape option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PendingDeathRoll {
    /// Event that produced the roll.
    pub event_id: String,
    /// Choice that produced the roll.
    pub choice_id: String,
    /// Adjusted death probability before the escape option.
    pub base_probability: f64,
    /// Cause recorded if fatal.
    pub cause: String,
    /// Options to choose from.
    pub escape_options: Vec<EscapeOption>,
}

/// An escape option as presented to the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EscapeOptionView {
    /// The option.
    pub option: EscapeOption,
    /// Whether it is unavailable.
    pub locked: bool,
    /// Why it is unavailable.
    pub locked_reason: Option<String>,
    /// Death probability if chosen.
    pub death_probability: f64,
}

/// End-of-turn summary for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TurnResult {
    /// Turn number.
    pub turn: u32,
    /// Outcomes in event order.
    pub event_outcomes: Vec<EventOutcome>,
    /// Parasite, injury and reproduction narratives.
    pub health_narratives: Vec<String>,
    /// Ecosystem, territory and NPC narratives.
    pub world_narratives: Vec<String>,
    /// Net weight change during resolution.
    pub weight_change: f64,
    /// Parasites contracted this turn (display names).
    pub new_parasites: Vec<String>,
    /// Injuries received this turn (display names).
    pub new_injuries: Vec<String>,
    /// Effective stat change during resolution (non-zero entries only).
    pub stat_delta: BTreeMap<StatId, f64>,
    /// Lethal rolls still waiting on the player.
    pub pending_death_rolls: Vec<PendingDeathRoll>,
    /// Cause of death, if the animal died this turn.
    pub death_cause: Option<String>,
}

/// One event in the turn history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TurnEventSummary {
    /// Event id.
    pub event_id: String,
    /// Choice id.
    pub choice_id: Option<String>,
    /// Fired sub-event ids.
    pub sub_event_ids: Vec<String>,
}

/// Summarised projection of a finished turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TurnRecord {
    /// Turn number.
    pub turn: u32,
    /// Month.
    pub month: Month,
    /// Year.
    pub year: u32,
    /// Season.
    pub season: Season,
    /// Events of the turn.
    pub events: Vec<TurnEventSummary>,
    /// Weight at the end of the turn.
    pub weight: f64,
    /// Whether the animal survived the turn.
    pub alive: bool,
}

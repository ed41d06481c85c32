//! Multi-turn storylines and player-initiated actions.
//!
//! A storyline is a chain of passive steps injected into the turn's events,
//! each waiting a few turns after the previous one. A voluntary action is
//! something the player does on their own initiative, at most once per turn.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::content::{Condition, Consequence};
use crate::stats::StatEffect;

// ---------------------------------------------------------------------------
// Storylines
// ---------------------------------------------------------------------------

/// One beat of a storyline, presented as a passive event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StorylineStep {
    /// Unique within the storyline.
    pub id: String,
    /// Fewest turns after the previous step before this one may fire.
    #[serde(default)]
    pub delay_min: u32,
    /// Turns after which the step fires without a roll.
    #[serde(default)]
    pub delay_max: u32,
    /// Extra conditions; the step waits while they fail.
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Narrative text; supports `{{...}}` template variables.
    pub narrative_text: String,
    /// Footnote shown with the step. Defaults to naming the storyline.
    pub footnote: Option<String>,
    /// Stat effects applied when the step resolves.
    #[serde(default)]
    pub stat_effects: Vec<StatEffect>,
    /// Consequences applied when the step resolves.
    #[serde(default)]
    pub consequences: Vec<Consequence>,
    /// Flag marking the step as reached. The last step's flag marks the
    /// storyline as finished for good.
    pub completion_flag: String,
}

/// A storyline definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StorylineDefinition {
    /// Unique id within the species bundle.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Conditions under which the storyline may start.
    #[serde(default)]
    pub start_conditions: Vec<Condition>,
    /// Chance per eligible turn of starting.
    pub start_chance: f64,
    /// Tags carried by every injected step.
    #[serde(default)]
    pub tags: Vec<String>,
    /// The beats, in order. The first fires on the turn the storyline starts.
    pub steps: Vec<StorylineStep>,
}

impl StorylineDefinition {
    /// Completion flag of the final step.
    pub fn final_flag(&self) -> Option<&str> {
        self.steps.last().map(|s| s.completion_flag.as_str())
    }

    /// Event id under which `step` is injected.
    pub fn event_id(&self, step: &StorylineStep) -> String {
        format!("storyline-{}-{}", self.id, step.id)
    }
}

/// Progress through a running storyline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActiveStoryline {
    /// Definition id.
    pub storyline_id: String,
    /// Index of the last step that fired.
    pub step_index: usize,
    /// Turns since that step fired.
    pub turns_at_step: u32,
    /// Turn the storyline started.
    pub started_turn: u32,
}

// ---------------------------------------------------------------------------
// Voluntary actions
// ---------------------------------------------------------------------------

/// Extra effects an action earns when its roll succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ActionOutcome {
    /// Chance of success.
    pub chance: f64,
    /// Narrative that replaces the action's own on success.
    pub narrative_text: String,
    /// Stat effects added on success.
    #[serde(default)]
    pub stat_effects: Vec<StatEffect>,
    /// Consequences added on success.
    #[serde(default)]
    pub consequences: Vec<Consequence>,
}

/// Something the player may choose to do during a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct VoluntaryAction {
    /// Unique id within the species bundle.
    pub id: String,
    /// Button label.
    pub label: String,
    /// One-line description.
    #[serde(default)]
    pub description: String,
    /// Availability conditions.
    #[serde(default)]
    pub conditions: Vec<Condition>,
    /// Only offered to territorial species holding a territory.
    #[serde(default)]
    pub requires_territory: bool,
    /// Narrative when the action is taken (or its roll fails).
    pub narrative_text: String,
    /// Stat effects always applied.
    #[serde(default)]
    pub stat_effects: Vec<StatEffect>,
    /// Consequences always applied.
    #[serde(default)]
    pub consequences: Vec<Consequence>,
    /// Optional success roll.
    pub outcome: Option<ActionOutcome>,
}

impl VoluntaryAction {
    /// Event id under which a taken action is reported.
    pub fn event_id(&self) -> String {
        format!("action-{}", self.id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn storyline_parses_with_defaults() {
        let yaml = r"
id: the-flood
name: The Flood
start_chance: 0.07
steps:
  - id: rising
    narrative_text: Rain falls without ceasing.
    completion_flag: flood-rising
  - id: receding
    delay_min: 2
    delay_max: 4
    narrative_text: The water drops back.
    consequences:
      - type: modify_weight
        amount: -2
    completion_flag: flood-over
";
        let story: StorylineDefinition = serde_yml::from_str(yaml).unwrap();
        assert!(story.start_conditions.is_empty());
        assert_eq!(story.final_flag(), Some("flood-over"));
        let first = story.steps.first().unwrap();
        assert_eq!((first.delay_min, first.delay_max), (0, 0));
        assert_eq!(story.event_id(first), "storyline-the-flood-rising");
    }

    #[test]
    fn action_parses_with_optional_roll() {
        let yaml = r"
id: explore
label: Explore
narrative_text: You wander but find nothing of note.
stat_effects:
  - stat: NOV
    amount: 5
    duration: 2
outcome:
  chance: 0.4
  narrative_text: You find a rich patch of forage.
  consequences:
    - type: modify_weight
      amount: 2
";
        let action: VoluntaryAction = serde_yml::from_str(yaml).unwrap();
        assert!(!action.requires_territory);
        assert_eq!(action.event_id(), "action-explore");
        let outcome = action.outcome.unwrap();
        assert!((outcome.chance - 0.4).abs() < f64::EPSILON);
        assert_eq!(outcome.consequences.len(), 1);
    }
}

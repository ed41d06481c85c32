//! Decision sources: who picks choices, actions and escape options.
//!
//! A [`DecisionSource`] stands in for the player. The headless engine and
//! the scenario tests use one to drive a [`GameSession`] through whole
//! turns with [`play_decisions`]; an interactive front end calls the
//! session directly instead.

use reckoning_types::{
    EscapeOptionView, GameRng, PendingDeathRoll, ResolvedEvent, TurnResult, VoluntaryAction,
};
use tracing::debug;

use crate::conditions::{ConditionContext, all_hold};
use crate::session::{GameSession, SessionError};
use crate::state::TurnPhase;

/// Errors that can occur while deciding for the player.
#[derive(Debug, thiserror::Error)]
pub enum DecisionError {
    /// Every choice of an active event is unavailable.
    #[error("no available choice for event {event_id}")]
    NoAvailableChoice {
        /// The event without an available choice.
        event_id: String,
    },

    /// Every escape option of a pending roll is locked.
    #[error("no unlocked escape option for event {event_id}")]
    NoUnlockedOption {
        /// The event whose roll is pending.
        event_id: String,
    },

    /// The session refused a decision.
    #[error("session error: {source}")]
    Session {
        /// The underlying session error.
        #[from]
        source: SessionError,
    },
}

/// A source of player decisions.
pub trait DecisionSource {
    /// Pick a choice id for an active event, or `None` if no choice is
    /// available. Only choices whose conditions hold may be returned.
    fn choose(&mut self, event: &ResolvedEvent, ctx: &ConditionContext<'_>) -> Option<String>;

    /// Pick an escape option id for a pending roll, or `None` if every
    /// option is locked.
    fn choose_escape(&mut self, roll: &PendingDeathRoll, options: &[EscapeOptionView]) -> Option<String>;

    /// Pick a voluntary action to take before the turn resolves, or `None`
    /// to take none. Only ids from `actions` may be returned.
    fn choose_action(&mut self, _actions: &[&VoluntaryAction]) -> Option<String> {
        None
    }
}

/// Always takes the first available choice and the first unlocked option.
/// Never takes an action.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstChoiceDecisions;

impl DecisionSource for FirstChoiceDecisions {
    fn choose(&mut self, event: &ResolvedEvent, ctx: &ConditionContext<'_>) -> Option<String> {
        event
            .definition
            .choices
            .iter()
            .find(|c| all_hold(&c.conditions, ctx))
            .map(|c| c.id.clone())
    }

    fn choose_escape(&mut self, _roll: &PendingDeathRoll, options: &[EscapeOptionView]) -> Option<String> {
        options.iter().find(|o| !o.locked).map(|o| o.option.id.clone())
    }
}

/// Picks uniformly among what is available, from its own random stream.
/// Taking no action counts as one more option when actions are offered.
///
/// The stream is separate from the session's, so swapping decision
/// sources never shifts the world's rolls.
#[derive(Debug, Clone)]
pub struct SeededDecisions {
    rng: GameRng,
}

impl SeededDecisions {
    /// Create a source seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: GameRng::new(seed),
        }
    }
}

impl DecisionSource for SeededDecisions {
    fn choose(&mut self, event: &ResolvedEvent, ctx: &ConditionContext<'_>) -> Option<String> {
        let available: Vec<&str> = event
            .definition
            .choices
            .iter()
            .filter(|c| all_hold(&c.conditions, ctx))
            .map(|c| c.id.as_str())
            .collect();
        self.rng.pick(&available).map(|id| (*id).to_owned())
    }

    fn choose_escape(&mut self, _roll: &PendingDeathRoll, options: &[EscapeOptionView]) -> Option<String> {
        let unlocked: Vec<&str> = options
            .iter()
            .filter(|o| !o.locked)
            .map(|o| o.option.id.as_str())
            .collect();
        self.rng.pick(&unlocked).map(|id| (*id).to_owned())
    }

    fn choose_action(&mut self, actions: &[&VoluntaryAction]) -> Option<String> {
        if actions.is_empty() {
            return None;
        }
        let index = self.rng.index(actions.len().saturating_add(1))?;
        actions.get(index).map(|a| a.id.clone())
    }
}

/// Confirm every active event, take the source's action if any, then
/// resolve the turn and every escape roll.
///
/// Call once the session is awaiting choices, or awaiting an escape after a
/// restore. Returns the finished turn.
///
/// # Errors
///
/// Returns [`DecisionError::NoAvailableChoice`] or
/// [`DecisionError::NoUnlockedOption`] when `source` has nothing to pick,
/// and [`DecisionError::Session`] if the session refuses a decision.
pub fn play_decisions(
    session: &mut GameSession,
    source: &mut dyn DecisionSource,
) -> Result<TurnResult, DecisionError> {
    let mut result = if session.phase() == TurnPhase::AwaitingEscape {
        TurnResult::default()
    } else {
        confirm_choices(session, source)?;
        take_action(session, source)?;
        if session.phase() == TurnPhase::Dead {
            return Ok(session.turn_result().cloned().unwrap_or_default());
        }
        session.resolve_turn()?
    };

    while session.phase() == TurnPhase::AwaitingEscape {
        let Some(roll) = session.pending_escape().cloned() else {
            break;
        };
        let option = source
            .choose_escape(&roll, &session.escape_options_view())
            .ok_or_else(|| DecisionError::NoUnlockedOption {
                event_id: roll.event_id.clone(),
            })?;
        debug!(event_id = %roll.event_id, option_id = %option, "Escape chosen");
        if session.resolve_escape_roll(&roll.event_id, &option)?.turn_finished {
            result = session.turn_result().cloned().unwrap_or_default();
        }
    }
    Ok(result)
}

fn take_action(session: &mut GameSession, source: &mut dyn DecisionSource) -> Result<(), DecisionError> {
    let Some(action_id) = source.choose_action(&session.available_actions()) else {
        return Ok(());
    };
    debug!(action_id = %action_id, "Action chosen");
    session.perform_action(&action_id)?;
    Ok(())
}

fn confirm_choices(session: &mut GameSession, source: &mut dyn DecisionSource) -> Result<(), DecisionError> {
    let picks = {
        let ctx = session.state().condition_context(&session.bundle().config);
        session
            .current_events()
            .iter()
            .filter(|e| e.definition.needs_choice())
            .map(|e| {
                source
                    .choose(e, &ctx)
                    .map(|choice| (e.id().to_owned(), choice))
                    .ok_or_else(|| DecisionError::NoAvailableChoice {
                        event_id: e.id().to_owned(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?
    };
    for (event_id, choice_id) in &picks {
        debug!(event_id, choice_id, "Decision made");
        session.confirm_choice(event_id, choice_id)?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use reckoning_types::{Condition, EscapeOption, EventCategory, EventChoice, EventType};

    use super::*;
    use crate::config::EngineConfig;
    use crate::state::{GameState, SessionOptions};
    use crate::testing::{event, sample_bundle};

    fn resolved(definition: reckoning_types::GameEvent) -> ResolvedEvent {
        ResolvedEvent {
            narrative: String::new(),
            definition,
            image: None,
            choice_id: None,
            sub_events: Vec::new(),
            lethal_outcome: false,
        }
    }

    fn view(id: &str, locked: bool) -> EscapeOptionView {
        EscapeOptionView {
            option: EscapeOption {
                id: id.to_owned(),
                label: id.to_owned(),
                description: String::new(),
                survival_modifier: 0.1,
                stat_cost: Vec::new(),
                required_flag: None,
            },
            locked,
            locked_reason: None,
            death_probability: 0.3,
        }
    }

    fn roll() -> PendingDeathRoll {
        PendingDeathRoll {
            event_id: "wolf-pack".to_owned(),
            choice_id: "flee".to_owned(),
            base_probability: 0.4,
            cause: "Caught".to_owned(),
            escape_options: Vec::new(),
        }
    }

    #[test]
    fn first_choice_skips_unavailable_choices() {
        let bundle = sample_bundle();
        let state = GameState::new(&bundle, &EngineConfig::default(), &SessionOptions::default()).unwrap();
        let mut e = event("river", EventType::Active, EventCategory::Environmental);
        e.choices = vec![
            EventChoice {
                id: "swim".to_owned(),
                conditions: vec![Condition::HasFlag {
                    flag: "strong-swimmer".to_owned(),
                }],
                ..EventChoice::default()
            },
            EventChoice {
                id: "wade".to_owned(),
                ..EventChoice::default()
            },
        ];
        let ctx = state.condition_context(&bundle.config);
        assert_eq!(FirstChoiceDecisions.choose(&resolved(e), &ctx).as_deref(), Some("wade"));
    }

    #[test]
    fn locked_options_are_never_picked() {
        let options = [view("thicket", true), view("sprint", false)];
        assert_eq!(
            FirstChoiceDecisions.choose_escape(&roll(), &options).as_deref(),
            Some("sprint")
        );
        let mut seeded = SeededDecisions::new(9);
        for _ in 0..20 {
            assert_eq!(seeded.choose_escape(&roll(), &options).as_deref(), Some("sprint"));
        }
        assert_eq!(FirstChoiceDecisions.choose_escape(&roll(), &[view("thicket", true)]), None);
    }

    fn rest() -> VoluntaryAction {
        VoluntaryAction {
            id: "rest".to_owned(),
            label: "Rest".to_owned(),
            description: String::new(),
            conditions: Vec::new(),
            requires_territory: false,
            narrative_text: "You bed down.".to_owned(),
            stat_effects: Vec::new(),
            consequences: Vec::new(),
            outcome: None,
        }
    }

    #[test]
    fn actions_are_optional() {
        let rest = rest();
        assert_eq!(FirstChoiceDecisions.choose_action(&[&rest]), None);

        let mut seeded = SeededDecisions::new(5);
        let before = seeded.rng.state();
        assert_eq!(seeded.choose_action(&[]), None);
        assert_eq!(seeded.rng.state(), before);

        let picks: Vec<Option<String>> = (0..40).map(|_| seeded.choose_action(&[&rest])).collect();
        assert!(picks.iter().any(Option::is_none));
        assert!(picks.iter().any(|p| p.as_deref() == Some("rest")));
    }

    #[test]
    fn seeded_decisions_repeat_for_a_seed() {
        let bundle = sample_bundle();
        let state = GameState::new(&bundle, &EngineConfig::default(), &SessionOptions::default()).unwrap();
        let ctx = state.condition_context(&bundle.config);
        let wolves = resolved(bundle.event("wolf-pack").cloned().unwrap());
        let picks = |seed| {
            let mut source = SeededDecisions::new(seed);
            (0..10).map(|_| source.choose(&wolves, &ctx).unwrap()).collect::<Vec<_>>()
        };
        assert_eq!(picks(3), picks(3));
    }
}

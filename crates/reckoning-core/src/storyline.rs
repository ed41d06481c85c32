//! Storyline ticker.
//!
//! Runs once per turn, right after selection is merged. Storylines that are
//! not running and not yet finished may start (their first step fires at
//! once); running storylines count the turns since their last step and fire
//! the next one between its minimum and maximum delay. Each fired step is
//! appended to the turn's events as a passive event that also sets the
//! step's completion flag.

use reckoning_types::{
    ActiveStoryline, Consequence, EventCategory, EventType, GameEvent, ResolvedEvent,
    SpeciesBundle, StorylineDefinition, StorylineStep,
};
use tracing::{debug, info};

use crate::conditions::{ConditionContext, all_hold};
use crate::config::StorylineConfig;
use crate::narrative::render;
use crate::state::GameState;

/// Start and advance storylines. Returns the step events to inject.
pub fn tick_storylines(
    state: &mut GameState,
    bundle: &SpeciesBundle,
    config: &StorylineConfig,
) -> Vec<ResolvedEvent> {
    let mut injected = Vec::new();
    if !config.enabled || bundle.storylines.is_empty() {
        return injected;
    }

    let turn = state.time.turn;
    let ctx = ConditionContext {
        animal: &state.animal,
        species: &bundle.config,
        time: &state.time,
        npcs: &state.npcs,
        ecosystem: &state.ecosystem,
        weather: state.weather.as_ref(),
    };
    let rng = &mut state.rng;
    let running = std::mem::take(&mut state.active_storylines);
    let mut next = Vec::with_capacity(running.len());

    // Starts
    for def in &bundle.storylines {
        if running.iter().any(|a| a.storyline_id == def.id) {
            continue;
        }
        let Some(first) = def.steps.first() else {
            continue;
        };
        if def.final_flag().is_some_and(|flag| ctx.animal.has_flag(flag)) {
            continue;
        }
        if !all_hold(&def.start_conditions, &ctx) || !all_hold(&first.conditions, &ctx) {
            continue;
        }
        if !rng.chance(def.start_chance) {
            continue;
        }
        info!(turn, storyline = %def.id, "Storyline started");
        injected.push(step_event(def, first, &ctx));
        if def.steps.len() > 1 {
            next.push(ActiveStoryline {
                storyline_id: def.id.clone(),
                step_index: 0,
                turns_at_step: 0,
                started_turn: turn,
            });
        }
    }

    // Advances
    for mut active in running {
        let Some(def) = bundle.storyline(&active.storyline_id) else {
            debug!(storyline = %active.storyline_id, "Dropping storyline missing from the bundle");
            continue;
        };
        let index = active.step_index.saturating_add(1);
        let Some(step) = def.steps.get(index) else {
            continue;
        };
        let waited = active.turns_at_step.saturating_add(1);
        let due = waited >= step.delay_min
            && all_hold(&step.conditions, &ctx)
            && (waited >= step.delay_max || rng.chance(config.advance_chance));
        if !due {
            active.turns_at_step = waited;
            next.push(active);
            continue;
        }

        debug!(turn, storyline = %def.id, step = %step.id, waited, "Storyline advanced");
        injected.push(step_event(def, step, &ctx));
        if index.saturating_add(1) < def.steps.len() {
            active.step_index = index;
            active.turns_at_step = 0;
            next.push(active);
        } else {
            info!(turn, storyline = %def.id, "Storyline finished");
        }
    }

    state.active_storylines = next;
    injected
}

fn step_event(def: &StorylineDefinition, step: &StorylineStep, ctx: &ConditionContext<'_>) -> ResolvedEvent {
    let mut consequences = step.consequences.clone();
    consequences.push(Consequence::SetFlag {
        flag: step.completion_flag.clone(),
    });
    let footnote = step
        .footnote
        .clone()
        .unwrap_or_else(|| format!("Part of \"{}\"", def.name));
    ResolvedEvent {
        narrative: render(&step.narrative_text, ctx.animal, ctx.species),
        definition: GameEvent {
            id: def.event_id(step),
            event_type: EventType::Passive,
            category: EventCategory::Environmental,
            narrative_text: step.narrative_text.clone(),
            image: None,
            conditions: Vec::new(),
            weight: 0.0,
            cooldown: None,
            tags: def.tags.clone(),
            guaranteed: false,
            stat_effects: step.stat_effects.clone(),
            consequences,
            choices: Vec::new(),
            sub_events: Vec::new(),
            footnote: Some(footnote),
        },
        image: None,
        choice_id: None,
        sub_events: Vec::new(),
        lethal_outcome: false,
    }
}

//! Selection handoff between a session and a worker thread.
//!
//! The selection step is the only part of a turn that may run off the
//! session's thread. The session packs a [`SelectionRequest`] (a snapshot
//! of everything selection reads, including the random stream position),
//! the worker runs [`run_selection`], and the [`SelectionResponse`] carries
//! the events plus the advanced stream back to be merged in one step. Both
//! messages are plain serde data, so the worker may equally be another
//! process.

use std::collections::{BTreeMap, BTreeSet};

use reckoning_types::{
    AnimalState, BehavioralSettings, EcosystemState, GameRng, Npc, ResolvedEvent, RngState,
    SpeciesBundle, TimeState, WeatherState, WorldMemory,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::conditions::ConditionContext;
use crate::config::EngineConfig;
use crate::selector::{
    BiasContext, DefaultBias, EventSelector, IllustrationPicker, PlaceholderIllustrations,
    SelectionBias,
};

/// Errors raised when merging a selection response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkerError {
    /// The response answers a different turn's request.
    #[error("stale selection response: expected turn {expected}, got turn {received}")]
    StaleResponse {
        /// Turn the session is waiting on.
        expected: u32,
        /// Turn the response was computed for.
        received: u32,
    },

    /// The response names an event the species does not define.
    #[error("selection response names unknown event {event_id}")]
    UnknownEvent {
        /// The unrecognised id.
        event_id: String,
    },
}

/// Snapshot of the state event selection reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionRequest {
    /// Turn being selected for.
    pub turn: u32,
    /// Stream position to draw from.
    pub rng: RngState,
    /// Calendar.
    pub time: TimeState,
    /// The animal.
    pub animal: AnimalState,
    /// Known NPCs.
    pub npcs: Vec<Npc>,
    /// Population levels.
    pub ecosystem: EcosystemState,
    /// Current weather.
    pub weather: Option<WeatherState>,
    /// World memory.
    pub memory: WorldMemory,
    /// Behavioural settings.
    pub behavior: BehavioralSettings,
    /// Cooldowns after this turn's tick.
    pub cooldowns: BTreeMap<String, u32>,
    /// Milestones already fired.
    pub fired_milestones: BTreeSet<String>,
}

/// Result of a selection run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionResponse {
    /// Turn the request was for.
    pub turn: u32,
    /// Selected events.
    pub events: Vec<ResolvedEvent>,
    /// Cooldowns including the newly selected events.
    pub cooldowns: BTreeMap<String, u32>,
    /// Milestones including any that fired this turn.
    pub fired_milestones: BTreeSet<String>,
    /// Stream position after selection.
    pub rng: RngState,
}

/// Run selection with the default bias and placeholder illustrations.
pub fn run_selection(
    request: &SelectionRequest,
    bundle: &SpeciesBundle,
    config: &EngineConfig,
) -> SelectionResponse {
    run_selection_with(
        request,
        bundle,
        config,
        &DefaultBias::default(),
        &PlaceholderIllustrations,
    )
}

/// Run selection with an explicit bias and illustration picker.
pub fn run_selection_with(
    request: &SelectionRequest,
    bundle: &SpeciesBundle,
    config: &EngineConfig,
    bias: &dyn SelectionBias,
    illustrations: &dyn IllustrationPicker,
) -> SelectionResponse {
    let mut rng = GameRng::from_state(request.rng);
    let mut cooldowns = request.cooldowns.clone();
    let mut fired_milestones = request.fired_milestones.clone();

    let ctx = BiasContext {
        conditions: ConditionContext {
            animal: &request.animal,
            species: &bundle.config,
            time: &request.time,
            npcs: &request.npcs,
            ecosystem: &request.ecosystem,
            weather: request.weather.as_ref(),
        },
        behavior: &request.behavior,
        memory: &request.memory,
        difficulty: &config.difficulty,
    };
    let selector = EventSelector {
        catalogue: &bundle.events,
        limits: &config.selection,
        bias,
        illustrations,
    };
    let events = selector.select(&ctx, &mut cooldowns, &mut fired_milestones, &mut rng);

    debug!(turn = request.turn, events = events.len(), "Selection run");
    SelectionResponse {
        turn: request.turn,
        events,
        cooldowns,
        fired_milestones,
        rng: rng.state(),
    }
}

/// Check a response against the turn it should answer.
///
/// # Errors
///
/// Returns [`WorkerError::StaleResponse`] for a response computed for
/// another turn and [`WorkerError::UnknownEvent`] if it names an event
/// missing from `bundle`.
pub fn check_response(
    response: &SelectionResponse,
    expected_turn: u32,
    bundle: &SpeciesBundle,
) -> Result<(), WorkerError> {
    if response.turn != expected_turn {
        return Err(WorkerError::StaleResponse {
            expected: expected_turn,
            received: response.turn,
        });
    }
    if let Some(unknown) = response.events.iter().find(|e| bundle.event(e.id()).is_none()) {
        return Err(WorkerError::UnknownEvent {
            event_id: unknown.id().to_owned(),
        });
    }
    Ok(())
}

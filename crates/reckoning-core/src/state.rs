//! The game-state container threaded through a session.
//!
//! [`GameState`] is the single owner of everything that changes during
//! play. It is plain data: the session mutates it, the UI reads it, and a
//! save file is its JSON form.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use reckoning_animal::{AnimalError, create_animal, initial_state};
use reckoning_types::{
    ActiveStoryline, AnimalState, BehavioralSettings, EcosystemState, GameRng, Month, Npc,
    PendingDeathRoll, ReproductionState, ResolvedEvent, Sex, SpeciesBundle, SpeciesConfig, StatId,
    TerritoryState, TimeState, TurnRecord, TurnResult, WeatherState, WorldMemory,
};
use reckoning_world::initial_ecosystem;
use serde::{Deserialize, Serialize};

use crate::conditions::ConditionContext;
use crate::config::EngineConfig;

/// Player choices made when a session starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Sex of the animal.
    pub sex: Sex,
    /// Backstory id, if any.
    pub backstory_id: Option<String>,
    /// Behavioural settings; clamped to 1..=5.
    pub behavior: BehavioralSettings,
    /// Overrides the configured seed.
    pub seed: Option<u64>,
    /// Calendar month of the first turn.
    pub start_month: Month,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            sex: Sex::Female,
            backstory_id: None,
            behavior: BehavioralSettings::default(),
            seed: None,
            start_month: Month::May,
        }
    }
}

/// Where a session is in its turn cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    /// Between turns; the next turn may begin.
    Ready,
    /// The world has ticked and event selection is out on a worker.
    Selecting,
    /// Events are presented; active events wait for a confirmed choice.
    AwaitingChoices,
    /// A lethal roll waits on an escape option.
    AwaitingEscape,
    /// The animal is dead. Terminal.
    Dead,
}

/// Values captured once the turn-start ticks are done, for the end-of-turn
/// diff.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolutionBaseline {
    /// Effective stat values.
    pub stats: BTreeMap<StatId, f64>,
    /// Body weight.
    pub weight: f64,
}

/// Complete mutable state of one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Turn-cycle phase.
    pub phase: TurnPhase,
    /// The single random stream.
    pub rng: GameRng,
    /// Calendar.
    pub time: TimeState,
    /// The player's animal.
    pub animal: AnimalState,
    /// Reproduction progress.
    pub reproduction: ReproductionState,
    /// Behavioural settings chosen by the player.
    pub behavior: BehavioralSettings,
    /// NPCs met so far, alive or not.
    pub npcs: Vec<Npc>,
    /// Tracked populations.
    pub ecosystem: EcosystemState,
    /// Held territory.
    pub territory: TerritoryState,
    /// Current weather, when simulated.
    pub weather: Option<WeatherState>,
    /// What the animal has learned.
    pub memory: WorldMemory,
    /// Remaining cooldown turns by event id.
    pub cooldowns: BTreeMap<String, u32>,
    /// Guaranteed events that have already fired.
    pub fired_milestones: BTreeSet<String>,
    /// Events of the turn in progress (or of the last turn, once resolved).
    pub current_events: Vec<ResolvedEvent>,
    /// Lethal rolls waiting on escape options, oldest first.
    pub pending_rolls: VecDeque<PendingDeathRoll>,
    /// Result being assembled for the turn in progress.
    pub draft: TurnResult,
    /// Values captured after the turn-start ticks.
    pub baseline: ResolutionBaseline,
    /// Result of the last finished turn.
    pub turn_result: Option<TurnResult>,
    /// One record per finished turn.
    pub history: Vec<TurnRecord>,
    /// Counter that keeps stat modifier ids unique.
    pub modifier_serial: u64,
    /// Storylines in progress.
    #[serde(default)]
    pub active_storylines: Vec<ActiveStoryline>,
    /// Voluntary actions taken this turn, in order.
    #[serde(default)]
    pub actions_taken: Vec<String>,
}

impl GameState {
    /// Pre-game state (turn 0) for a new animal.
    ///
    /// # Errors
    ///
    /// Returns [`AnimalError::UnknownBackstory`] if the backstory is not in
    /// the bundle.
    pub fn new(
        bundle: &SpeciesBundle,
        config: &EngineConfig,
        options: &SessionOptions,
    ) -> Result<Self, AnimalError> {
        let animal = create_animal(bundle, options.sex, options.backstory_id.as_deref())?;
        let time = TimeState::starting(options.start_month);
        Ok(Self {
            phase: TurnPhase::Ready,
            rng: GameRng::new(options.seed.unwrap_or(config.session.seed)),
            time,
            animal,
            reproduction: initial_state(&bundle.config.reproduction),
            behavior: options.behavior.clamped(),
            npcs: Vec::new(),
            ecosystem: initial_ecosystem(&bundle.config),
            territory: TerritoryState::default(),
            weather: None,
            memory: WorldMemory::new(time.season),
            cooldowns: BTreeMap::new(),
            fired_milestones: BTreeSet::new(),
            current_events: Vec::new(),
            pending_rolls: VecDeque::new(),
            draft: TurnResult::default(),
            baseline: ResolutionBaseline::default(),
            turn_result: None,
            history: Vec::new(),
            modifier_serial: 0,
            active_storylines: Vec::new(),
            actions_taken: Vec::new(),
        })
    }

    /// View for evaluating conditions against this state.
    pub fn condition_context<'a>(&'a self, species: &'a SpeciesConfig) -> ConditionContext<'a> {
        ConditionContext {
            animal: &self.animal,
            species,
            time: &self.time,
            npcs: &self.npcs,
            ecosystem: &self.ecosystem,
            weather: self.weather.as_ref(),
        }
    }

    /// Index of a current event by definition id.
    pub fn event_index(&self, event_id: &str) -> Option<usize> {
        self.current_events.iter().position(|e| e.id() == event_id)
    }
}

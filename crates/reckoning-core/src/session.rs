//! Turn orchestrator: the state machine a player drives.
//!
//! ```text
//! Ready --begin_turn--> AwaitingChoices --resolve_turn--> Ready | Dead
//!   |                         ^                 |
//!   +--begin_turn_offloaded-->+ Selecting       +--> AwaitingEscape --resolve_escape_roll--> Ready | Dead
//!                   (apply_selection)
//! ```
//!
//! # Turn order
//!
//! 1. **World** -- advance the clock, count cooldowns down, roll weather,
//!    tick NPCs, the ecosystem and the territory.
//! 2. **Vitals** -- ageing, modifier decay, seasonal weight, weather
//!    penalties, then the health and reproduction ticks.
//! 3. **Selection** -- run here by [`GameSession::begin_turn`], or on a
//!    worker via [`GameSession::begin_turn_offloaded`] and
//!    [`GameSession::apply_selection`].
//!    Storylines then start or advance and inject their steps.
//! 4. **Choices** -- [`GameSession::confirm_choice`] for every active event,
//!    and optionally one [`GameSession::perform_action`].
//! 5. **Resolution** -- [`GameSession::resolve_turn`] applies consequences
//!    and queues escapable death rolls.
//! 6. **Escapes** -- [`GameSession::resolve_escape_roll`] for each queued
//!    roll, head first.
//! 7. **Finalise** -- world memory, terminal death checks, turn summary and
//!    history.
//!
//! Every input that does not fit the current phase is rejected with a
//! [`SessionError`] and a warning; state is left untouched.

use std::sync::Arc;

use reckoning_animal::{
    AnimalError, VitalsContext, apply_stat_effect, apply_vitals_tick, check_terminal_death, kill,
    tick_health, tick_reproduction,
};
use reckoning_types::{
    AnimalState, Condition, Consequence, DeathRollOutcome, EscapeOptionView, EventOutcome,
    PendingDeathRoll, ResolvedEvent, SpeciesBundle, TurnEventSummary, TurnRecord, TurnResult,
    VoluntaryAction, WorldMemory,
};
use reckoning_world::{
    TERRITORY_MARKED_FLAG, mark_seen, next_weather, tick_ecosystem, tick_memory, tick_npcs,
    tick_territory, weather_effects, weight_modifier,
};
use tracing::{debug, info, warn};

use crate::clock::{ClockError, advance};
use crate::conditions::all_hold;
use crate::config::EngineConfig;
use crate::death_roll::{EscapeError, escape_options_view, resolve_escape};
use crate::resolver::Resolver;
use crate::selector::tick_cooldowns;
use crate::snapshot::{self, SnapshotError};
use crate::storyline::tick_storylines;
use crate::state::{GameState, ResolutionBaseline, SessionOptions, TurnPhase};
use crate::worker::{SelectionRequest, SelectionResponse, WorkerError, check_response, run_selection};

/// Modifier source of this turn's weather penalties.
const WEATHER_SOURCE: &str = "weather";

/// Inputs the session refused.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The call does not belong in the current phase.
    #[error("expected phase {expected:?}, session is in {actual:?}")]
    WrongPhase {
        /// Phase the call needs.
        expected: TurnPhase,
        /// Phase the session is in.
        actual: TurnPhase,
    },

    /// The animal is dead; the session is over.
    #[error("the animal is dead")]
    AnimalDead,

    /// No event with this id is part of the current turn.
    #[error("event {event_id} is not part of this turn")]
    UnknownEvent {
        /// The requested event.
        event_id: String,
    },

    /// The event takes no choice.
    #[error("event {event_id} has no choices")]
    NoChoices {
        /// The requested event.
        event_id: String,
    },

    /// The event offers no choice with this id.
    #[error("event {event_id} has no choice {choice_id}")]
    UnknownChoice {
        /// The requested event.
        event_id: String,
        /// The requested choice.
        choice_id: String,
    },

    /// The choice's conditions do not hold.
    #[error("choice {choice_id} of event {event_id} is not available")]
    ChoiceUnavailable {
        /// The requested event.
        event_id: String,
        /// The requested choice.
        choice_id: String,
    },

    /// A non-revocable choice was already confirmed.
    #[error("choice for event {event_id} is already confirmed as {confirmed}")]
    ChoiceLocked {
        /// The requested event.
        event_id: String,
        /// The choice already confirmed.
        confirmed: String,
    },

    /// An active event still waits for a choice.
    #[error("event {event_id} needs a choice before the turn can resolve")]
    MissingChoice {
        /// The event without a choice.
        event_id: String,
    },

    /// The species offers no action with this id.
    #[error("no action {action_id}")]
    UnknownAction {
        /// The requested action.
        action_id: String,
    },

    /// The action's requirements do not hold, or it was already taken this
    /// turn.
    #[error("action {action_id} is not available")]
    ActionUnavailable {
        /// The requested action.
        action_id: String,
    },

    /// This turn's actions are used up.
    #[error("only {limit} action(s) per turn")]
    ActionLimit {
        /// Actions allowed per turn.
        limit: usize,
    },

    /// No death roll is waiting.
    #[error("no death roll is pending")]
    NoPendingRoll,

    /// Rolls resolve oldest first.
    #[error("death roll for {event_id} is not next; resolve {expected} first")]
    NotHeadOfQueue {
        /// The requested event.
        event_id: String,
        /// The event whose roll is next.
        expected: String,
    },

    /// Creating the animal failed.
    #[error("animal error: {source}")]
    Animal {
        /// The underlying animal error.
        #[from]
        source: AnimalError,
    },

    /// A selection response could not be merged.
    #[error("worker error: {source}")]
    Worker {
        /// The underlying handoff error.
        #[from]
        source: WorkerError,
    },

    /// An escape option was refused.
    #[error("escape error: {source}")]
    Escape {
        /// The underlying escape error.
        #[from]
        source: EscapeError,
    },

    /// The clock could not advance.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },
}

/// What happened on an escape roll.
#[derive(Debug, Clone, PartialEq)]
pub struct EscapeResolution {
    /// Event the roll belonged to.
    pub event_id: String,
    /// Option used.
    pub option_id: String,
    /// Probability of death rolled against.
    pub probability: f64,
    /// Whether the animal survived.
    pub survived: bool,
    /// Whether this roll finished the turn.
    pub turn_finished: bool,
}

/// One player's game: species content, settings and the evolving state.
#[derive(Debug, Clone)]
pub struct GameSession {
    bundle: Arc<SpeciesBundle>,
    config: EngineConfig,
    state: GameState,
}

impl GameSession {
    /// Start a session at turn 0.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Animal`] if the backstory is unknown.
    pub fn new(
        bundle: Arc<SpeciesBundle>,
        config: EngineConfig,
        options: &SessionOptions,
    ) -> Result<Self, SessionError> {
        let state = GameState::new(&bundle, &config, options)?;
        info!(
            species = %bundle.config.id,
            sex = ?options.sex,
            seed = state.rng.state().seed,
            "Session created"
        );
        Ok(Self {
            bundle,
            config,
            state,
        })
    }

    /// Resume a session from a save written by [`snapshot`](Self::snapshot).
    ///
    /// # Errors
    ///
    /// Returns a [`SnapshotError`] if the save is malformed or was written
    /// for another species.
    pub fn restore(
        json: &str,
        bundle: Arc<SpeciesBundle>,
        config: EngineConfig,
    ) -> Result<Self, SnapshotError> {
        let state = snapshot::from_json(json, &bundle.config.id)?;
        Ok(Self {
            bundle,
            config,
            state,
        })
    }

    /// Serialise the session, mid-turn state included.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::Json`] if serialisation fails.
    pub fn snapshot(&self) -> Result<String, SnapshotError> {
        snapshot::to_json(&self.bundle.config.id, &self.state)
    }

    // -----------------------------------------------------------------------
    // Read access
    // -----------------------------------------------------------------------

    /// Full state.
    pub const fn state(&self) -> &GameState {
        &self.state
    }

    /// The player's animal.
    pub const fn animal(&self) -> &AnimalState {
        &self.state.animal
    }

    /// What the animal has learned.
    pub const fn memory(&self) -> &WorldMemory {
        &self.state.memory
    }

    /// Summary of the last finished turn.
    pub const fn turn_result(&self) -> Option<&TurnResult> {
        self.state.turn_result.as_ref()
    }

    /// One record per finished turn.
    pub fn history(&self) -> &[TurnRecord] {
        &self.state.history
    }

    /// Current phase.
    pub const fn phase(&self) -> TurnPhase {
        self.state.phase
    }

    /// Events of the turn in progress.
    pub fn current_events(&self) -> &[ResolvedEvent] {
        &self.state.current_events
    }

    /// Species content the session plays.
    pub fn bundle(&self) -> &Arc<SpeciesBundle> {
        &self.bundle
    }

    /// Engine settings.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Turn start
    // -----------------------------------------------------------------------

    /// Start a turn and select its events on this thread.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::WrongPhase`] unless the session is `Ready`,
    /// or [`SessionError::AnimalDead`] once the game is over.
    pub fn begin_turn(&mut self) -> Result<&[ResolvedEvent], SessionError> {
        let request = self.begin_turn_offloaded()?;
        let response = run_selection(&request, &self.bundle, &self.config);
        self.apply_selection(response)
    }

    /// Start a turn, leaving selection to a worker.
    ///
    /// Runs the world and vitals ticks, then returns the snapshot the
    /// worker selects from. Feed the worker's answer to
    /// [`apply_selection`](Self::apply_selection).
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::WrongPhase`] unless the session is `Ready`,
    /// [`SessionError::AnimalDead`] once the game is over, or
    /// [`SessionError::Clock`] if the turn counter is exhausted.
    pub fn begin_turn_offloaded(&mut self) -> Result<SelectionRequest, SessionError> {
        self.expect_phase(TurnPhase::Ready).inspect_err(rejected)?;
        self.prepare_turn().inspect_err(rejected)?;
        Ok(self.build_request())
    }

    /// The selection request of the turn in progress, again.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::WrongPhase`] unless selection is outstanding.
    pub fn selection_request(&self) -> Result<SelectionRequest, SessionError> {
        self.expect_phase(TurnPhase::Selecting).inspect_err(rejected)?;
        Ok(self.build_request())
    }

    /// Merge a worker's selection back into the session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::WrongPhase`] unless selection is outstanding
    /// and [`SessionError::Worker`] for a stale or foreign response. A
    /// rejected response leaves the session waiting for a valid one.
    pub fn apply_selection(&mut self, response: SelectionResponse) -> Result<&[ResolvedEvent], SessionError> {
        self.expect_phase(TurnPhase::Selecting).inspect_err(rejected)?;
        check_response(&response, self.state.time.turn, &self.bundle)
            .map_err(SessionError::from)
            .inspect_err(rejected)?;

        let turn = response.turn;
        let s = &mut self.state;
        s.rng.set_state(response.rng);
        s.cooldowns = response.cooldowns;
        s.fired_milestones = response.fired_milestones;
        s.current_events = response.events;
        let storylines = tick_storylines(s, &self.bundle, &self.config.storylines);
        s.current_events.extend(storylines);

        for event in &s.current_events {
            for condition in &event.definition.conditions {
                if let Condition::HasNpc { npc_type } = condition {
                    mark_seen(&mut s.npcs, *npc_type, turn);
                }
            }
            if event.definition.guaranteed {
                info!(turn, event_id = %event.id(), "Milestone reached");
            }
        }

        s.phase = TurnPhase::AwaitingChoices;
        info!(
            turn,
            events = s.current_events.len(),
            awaiting_choice = s.current_events.iter().filter(|e| e.definition.needs_choice()).count(),
            "Events selected"
        );
        Ok(&self.state.current_events)
    }

    fn prepare_turn(&mut self) -> Result<(), SessionError> {
        let s = &mut self.state;
        let species = &self.bundle.config;

        let clock = advance(&mut s.time)?;
        let turn = clock.turn;
        s.draft = TurnResult {
            turn,
            ..TurnResult::default()
        };
        s.current_events.clear();
        s.pending_rolls.clear();
        s.actions_taken.clear();
        tick_cooldowns(&mut s.cooldowns);
        if clock.season_changed {
            debug!(turn, season = ?s.time.season, "Season changed");
        }

        // World
        s.weather = if self.config.weather.enabled {
            Some(next_weather(s.weather.as_ref(), s.time.season, &self.config.weather, &mut s.rng))
        } else {
            None
        };
        let mut world = tick_npcs(&mut s.npcs, species, turn, &self.config.npc, &mut s.rng);
        world.extend(tick_ecosystem(
            &mut s.ecosystem,
            species,
            &s.animal.region,
            turn,
            &self.config.ecosystem,
            &mut s.rng,
        ));
        let marked = s.animal.flags.remove(TERRITORY_MARKED_FLAG);
        world.extend(tick_territory(
            &mut s.territory,
            species.territorial,
            marked,
            turn,
            &self.config.territory,
            &mut s.rng,
        ));
        let weather = s.weather.as_ref().map(weather_effects).unwrap_or_default();
        world.extend(weather.narrative.clone());
        s.draft.world_narratives = world;

        // Vitals
        let difficulty = &self.config.difficulty;
        let vitals = apply_vitals_tick(
            &mut s.animal,
            species,
            &VitalsContext {
                season: s.time.season,
                months_elapsed: clock.months_elapsed,
                foraging_setting: s.behavior.foraging,
                weight_gain_factor: difficulty.weight_gain_factor,
                weight_loss_factor: difficulty.weight_loss_factor,
                territory_modifier: weight_modifier(&s.territory),
                weather_weight_change: weather.weight_change,
            },
        );
        if s.animal.alive {
            for effect in &weather.stat_effects {
                apply_stat_effect(&mut s.animal.stats, effect, WEATHER_SOURCE, &mut s.modifier_serial);
            }
        }
        let health = &mut s.draft.health_narratives;
        health.extend(vitals.narratives);
        health.extend(tick_health(&mut s.animal, &self.bundle, &mut s.rng));
        health.extend(tick_reproduction(
            &mut s.reproduction,
            &mut s.animal,
            &species.reproduction,
            &s.time,
            &mut s.rng,
        ));

        // The summary's deltas cover what the player's turn did, not these ticks.
        s.baseline = ResolutionBaseline {
            stats: s.animal.stats.effective_all(),
            weight: s.animal.weight,
        };

        s.phase = TurnPhase::Selecting;
        info!(
            turn,
            month = ?s.time.month,
            year = s.time.year,
            season = ?s.time.season,
            weight = s.animal.weight,
            weather = ?s.weather.map(|w| w.weather_type),
            "Turn started"
        );
        Ok(())
    }

    fn build_request(&self) -> SelectionRequest {
        let s = &self.state;
        SelectionRequest {
            turn: s.time.turn,
            rng: s.rng.state(),
            time: s.time,
            animal: s.animal.clone(),
            npcs: s.npcs.clone(),
            ecosystem: s.ecosystem.clone(),
            weather: s.weather,
            memory: s.memory.clone(),
            behavior: s.behavior,
            cooldowns: s.cooldowns.clone(),
            fired_milestones: s.fired_milestones.clone(),
        }
    }

    // -----------------------------------------------------------------------
    // Choices and resolution
    // -----------------------------------------------------------------------

    /// Confirm `choice_id` for the active event `event_id`.
    ///
    /// Confirming the same choice twice is harmless. A different choice
    /// replaces the first only if the first is revocable.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the session is not awaiting choices,
    /// the event or choice is unknown, the event is passive, the choice's
    /// conditions do not hold, or a non-revocable choice is already set.
    pub fn confirm_choice(&mut self, event_id: &str, choice_id: &str) -> Result<(), SessionError> {
        self.check_choice(event_id, choice_id).inspect_err(rejected)?;
        if let Some(event) = self.state.current_events.iter_mut().find(|e| e.id() == event_id) {
            event.choice_id = Some(choice_id.to_owned());
        }
        debug!(turn = self.state.time.turn, event_id, choice_id, "Choice confirmed");
        Ok(())
    }

    fn check_choice(&self, event_id: &str, choice_id: &str) -> Result<(), SessionError> {
        self.expect_phase(TurnPhase::AwaitingChoices)?;
        let event = self
            .state
            .current_events
            .iter()
            .find(|e| e.id() == event_id)
            .ok_or_else(|| SessionError::UnknownEvent {
                event_id: event_id.to_owned(),
            })?;
        let def = &event.definition;
        if !def.needs_choice() {
            return Err(SessionError::NoChoices {
                event_id: event_id.to_owned(),
            });
        }
        let choice = def.choice(choice_id).ok_or_else(|| SessionError::UnknownChoice {
            event_id: event_id.to_owned(),
            choice_id: choice_id.to_owned(),
        })?;
        if let Some(confirmed) = event.choice_id.as_deref()
            && confirmed != choice_id
            && !def.choice(confirmed).is_some_and(|c| c.revocable)
        {
            return Err(SessionError::ChoiceLocked {
                event_id: event_id.to_owned(),
                confirmed: confirmed.to_owned(),
            });
        }
        if !all_hold(&choice.conditions, &self.state.condition_context(&self.bundle.config)) {
            return Err(SessionError::ChoiceUnavailable {
                event_id: event_id.to_owned(),
                choice_id: choice_id.to_owned(),
            });
        }
        Ok(())
    }

    /// Resolve the turn's events.
    ///
    /// Returns the turn summary. If escapable death rolls were queued the
    /// session moves to `AwaitingEscape` and the summary lists them under
    /// `pending_death_rolls`; otherwise the turn is finished.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::WrongPhase`] unless choices are awaited and
    /// [`SessionError::MissingChoice`] while an active event has no choice.
    pub fn resolve_turn(&mut self) -> Result<TurnResult, SessionError> {
        self.expect_phase(TurnPhase::AwaitingChoices).inspect_err(rejected)?;
        if let Some(event) = self
            .state
            .current_events
            .iter()
            .find(|e| e.definition.needs_choice() && e.choice_id.is_none())
        {
            let err = SessionError::MissingChoice {
                event_id: event.id().to_owned(),
            };
            rejected(&err);
            return Err(err);
        }

        Resolver {
            bundle: &self.bundle,
            config: &self.config,
        }
        .resolve_events(&mut self.state);

        let s = &mut self.state;
        if !s.animal.alive {
            s.pending_rolls.clear();
        }
        if s.pending_rolls.is_empty() {
            self.finalize_turn();
            return Ok(self.state.turn_result.clone().unwrap_or_default());
        }

        s.draft.pending_death_rolls = s.pending_rolls.iter().cloned().collect();
        s.phase = TurnPhase::AwaitingEscape;
        info!(turn = s.time.turn, pending = s.pending_rolls.len(), "Awaiting escape");
        Ok(s.draft.clone())
    }

    // -----------------------------------------------------------------------
    // Voluntary actions
    // -----------------------------------------------------------------------

    /// Actions the player could take right now.
    pub fn available_actions(&self) -> Vec<&VoluntaryAction> {
        if self.state.phase != TurnPhase::AwaitingChoices
            || self.state.actions_taken.len() >= self.config.actions.max_per_turn
        {
            return Vec::new();
        }
        self.bundle
            .actions
            .iter()
            .filter(|a| self.action_open(a))
            .collect()
    }

    /// Take the action `action_id` now.
    ///
    /// Its effects apply at once, before the turn's events resolve, and its
    /// outcome heads the turn summary. An action that kills the animal ends
    /// the turn.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if the session is not awaiting choices,
    /// the action is unknown, its requirements fail, it was already taken
    /// this turn, or the turn's actions are used up.
    pub fn perform_action(&mut self, action_id: &str) -> Result<EventOutcome, SessionError> {
        self.check_action(action_id).inspect_err(rejected)?;
        let Some(action) = self.bundle.action(action_id) else {
            return Err(SessionError::UnknownAction {
                action_id: action_id.to_owned(),
            });
        };
        let outcome = Resolver {
            bundle: &self.bundle,
            config: &self.config,
        }
        .resolve_action(&mut self.state, action);
        self.state.actions_taken.push(action_id.to_owned());
        info!(turn = self.state.time.turn, action_id, "Action taken");

        if !self.state.animal.alive {
            self.finalize_turn();
        }
        Ok(outcome)
    }

    fn check_action(&self, action_id: &str) -> Result<(), SessionError> {
        self.expect_phase(TurnPhase::AwaitingChoices)?;
        let action = self
            .bundle
            .action(action_id)
            .ok_or_else(|| SessionError::UnknownAction {
                action_id: action_id.to_owned(),
            })?;
        let limit = self.config.actions.max_per_turn;
        if self.state.actions_taken.len() >= limit {
            return Err(SessionError::ActionLimit { limit });
        }
        if !self.action_open(action) {
            return Err(SessionError::ActionUnavailable {
                action_id: action_id.to_owned(),
            });
        }
        Ok(())
    }

    fn action_open(&self, action: &VoluntaryAction) -> bool {
        let s = &self.state;
        !s.actions_taken.contains(&action.id)
            && (!action.requires_territory
                || (self.bundle.config.territorial && s.territory.established))
            && all_hold(&action.conditions, &s.condition_context(&self.bundle.config))
    }

    // -----------------------------------------------------------------------
    // Escapes
    // -----------------------------------------------------------------------

    /// The roll to resolve next, if any.
    pub fn pending_escape(&self) -> Option<&PendingDeathRoll> {
        self.state.pending_rolls.front()
    }

    /// Options of the next roll as the player sees them.
    pub fn escape_options_view(&self) -> Vec<EscapeOptionView> {
        self.pending_escape()
            .map(|roll| escape_options_view(roll, &self.state.animal, &self.config.escape))
            .unwrap_or_default()
    }

    /// Roll the head of the queue using `option_id`.
    ///
    /// Survival pays the option's stat cost. Death ends the session and
    /// drops any other queued roll. The turn is finalised after the last
    /// roll.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] if no roll is pending, `event_id` is not
    /// the head of the queue, or the option is unknown or locked. Refused
    /// inputs draw nothing from the random stream.
    pub fn resolve_escape_roll(&mut self, event_id: &str, option_id: &str) -> Result<EscapeResolution, SessionError> {
        self.expect_phase(TurnPhase::AwaitingEscape).inspect_err(rejected)?;
        let s = &mut self.state;
        let head = s.pending_rolls.front().ok_or(SessionError::NoPendingRoll).inspect_err(rejected)?;
        if head.event_id != event_id {
            let err = SessionError::NotHeadOfQueue {
                event_id: event_id.to_owned(),
                expected: head.event_id.clone(),
            };
            rejected(&err);
            return Err(err);
        }
        let roll = resolve_escape(head, option_id, &s.animal, &self.config.escape, &mut s.rng)
            .map_err(SessionError::from)
            .inspect_err(rejected)?;
        let Some(pending) = s.pending_rolls.pop_front() else {
            return Err(SessionError::NoPendingRoll);
        };

        if let Some(outcome) = s.draft.event_outcomes.iter_mut().find(|o| {
            o.event_id == pending.event_id
                && o.choice_id.as_deref() == Some(pending.choice_id.as_str())
                && o.death_roll.is_some_and(|r| r.survived.is_none())
        }) {
            outcome.death_roll = Some(DeathRollOutcome {
                probability: roll.probability,
                survived: Some(!roll.died),
            });
            if roll.died {
                outcome.consequences.push(Consequence::Death {
                    cause: pending.cause.clone(),
                });
            }
        }

        if roll.died {
            kill(&mut s.animal, &pending.cause);
            if let Some(event) = s.current_events.iter_mut().find(|e| e.id() == pending.event_id) {
                event.lethal_outcome = true;
            }
            s.pending_rolls.clear();
        } else {
            let source = format!("escape:{option_id}");
            for cost in &roll.stat_cost {
                apply_stat_effect(&mut s.animal.stats, cost, &source, &mut s.modifier_serial);
            }
            let counters = &mut s.animal.counters;
            counters.predators_evaded = counters.predators_evaded.saturating_add(1);
        }

        let turn_finished = s.pending_rolls.is_empty();
        if turn_finished {
            self.finalize_turn();
        } else {
            s.draft.pending_death_rolls = s.pending_rolls.iter().cloned().collect();
        }
        Ok(EscapeResolution {
            event_id: pending.event_id,
            option_id: option_id.to_owned(),
            probability: roll.probability,
            survived: !roll.died,
            turn_finished,
        })
    }

    // -----------------------------------------------------------------------
    // Finalise
    // -----------------------------------------------------------------------

    fn finalize_turn(&mut self) {
        let s = &mut self.state;
        let turn = s.time.turn;
        s.draft.pending_death_rolls.clear();

        tick_memory(
            &mut s.memory,
            &s.current_events,
            turn,
            &s.animal.region,
            s.time.season,
            &self.config.memory,
        );

        if let Some(cause) = check_terminal_death(&s.animal, &self.bundle, &s.reproduction, &mut s.rng) {
            kill(&mut s.animal, &cause.to_string());
        }

        s.draft.stat_delta = s
            .animal
            .stats
            .effective_all()
            .into_iter()
            .filter_map(|(stat, value)| {
                let before = s.baseline.stats.get(&stat).copied().unwrap_or(value);
                let delta = value - before;
                (delta.abs() > f64::EPSILON).then_some((stat, delta))
            })
            .collect();
        s.draft.weight_change = s.animal.weight - s.baseline.weight;
        s.draft.death_cause = if s.animal.alive {
            None
        } else {
            s.animal.cause_of_death.clone()
        };

        s.history.push(TurnRecord {
            turn,
            month: s.time.month,
            year: s.time.year,
            season: s.time.season,
            events: s
                .current_events
                .iter()
                .map(|e| TurnEventSummary {
                    event_id: e.id().to_owned(),
                    choice_id: e.choice_id.clone(),
                    sub_event_ids: e.sub_events.iter().map(|sub| sub.event_id.clone()).collect(),
                })
                .collect(),
            weight: s.animal.weight,
            alive: s.animal.alive,
        });
        s.turn_result = Some(std::mem::take(&mut s.draft));

        if s.animal.alive {
            s.phase = TurnPhase::Ready;
            info!(turn, weight = s.animal.weight, "Turn resolved");
        } else {
            s.phase = TurnPhase::Dead;
            info!(
                turn,
                age_months = s.animal.age_months,
                cause = s.animal.cause_of_death.as_deref().unwrap_or_default(),
                "Animal died"
            );
        }
    }

    fn expect_phase(&self, expected: TurnPhase) -> Result<(), SessionError> {
        match self.state.phase {
            actual if actual == expected => Ok(()),
            TurnPhase::Dead => Err(SessionError::AnimalDead),
            actual => Err(SessionError::WrongPhase { expected, actual }),
        }
    }
}

fn rejected(err: &SessionError) {
    warn!(error = %err, "Session input rejected");
}

//! Consequence applier.
//!
//! Resolves the turn's events against [`GameState`] in a fixed order, per
//! event in selection order:
//!
//! 1. Event stat effects, then event consequences
//! 2. The chosen choice's stat effects, then its consequences
//! 3. The choice's death chance (rolled now, or queued for an escape)
//! 4. Each fired sub-event, in catalogue order: stat effects, consequences
//!
//! A voluntary action resolves on its own, when taken, through
//! [`Resolver::resolve_action`].
//!
//! After the last event a male who raised the species' challenge flag
//! fights for mating rights (see [`Resolver::resolve_male_competition`]).
//!
//! Once the animal is dead every later effect is a no-op. A consequence
//! naming content the bundle lacks is logged and skipped.

use reckoning_animal::{
    add_injury, add_parasite, apply_stat_effect, challenge_win_probability, kill, modify_weight,
    remove_parasite, sire_offspring, spawn, start_pregnancy,
};
use reckoning_types::{
    Consequence, DeathChance, DeathRollOutcome, EventOutcome, GameEvent, PendingDeathRoll,
    ReproductionConfig, SpeciesBundle, StatEffect, VoluntaryAction,
};
use reckoning_world::{introduce_npc, modify_population, modify_territory};
use tracing::{debug, info, warn};

use crate::config::EngineConfig;
use crate::death_roll::death_probability;
use crate::narrative::render;
use crate::state::GameState;

/// Modifier and log source of rutting contest consequences.
const COMPETITION_SOURCE: &str = "male-competition";

/// Applies resolved events to the game state.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    /// Species content.
    pub bundle: &'a SpeciesBundle,
    /// Engine settings.
    pub config: &'a EngineConfig,
}

impl Resolver<'_> {
    /// Resolve every current event, appending outcomes to the turn draft.
    ///
    /// Death chances with escape options are queued on
    /// `state.pending_rolls` rather than rolled.
    pub fn resolve_events(&self, state: &mut GameState) {
        let mut events = std::mem::take(&mut state.current_events);

        for event in &mut events {
            let def = &event.definition;
            let alive_before = state.animal.alive;
            let mut outcome = EventOutcome {
                event_id: def.id.clone(),
                narrative: event.narrative.clone(),
                choice_id: None,
                choice_label: None,
                narrative_result: None,
                stat_effects: Vec::new(),
                consequences: Vec::new(),
                death_roll: None,
            };

            let source = format!("event:{}", def.id);
            self.apply_block(state, &def.stat_effects, &def.consequences, &source, &mut outcome);

            if let Some(choice) = event.choice_id.as_deref().and_then(|id| def.choice(id)) {
                outcome.choice_id = Some(choice.id.clone());
                outcome.choice_label = Some(choice.label.clone());
                outcome.narrative_result = choice.narrative_result.clone();
                let source = format!("choice:{}:{}", def.id, choice.id);
                self.apply_block(state, &choice.stat_effects, &choice.consequences, &source, &mut outcome);
                if let Some(death) = &choice.death_chance {
                    let roll = self.death_roll(state, def, &choice.id, death, &mut outcome);
                    outcome.death_roll = roll;
                }
            }

            for sub in &event.sub_events {
                let source = format!("sub-event:{}", sub.event_id);
                self.apply_block(state, &sub.stat_effects, &sub.consequences, &source, &mut outcome);
            }

            if alive_before && !state.animal.alive {
                event.lethal_outcome = true;
            }
            state.draft.event_outcomes.push(outcome);
        }

        state.current_events = events;
        self.resolve_male_competition(state);
    }

    /// Apply a voluntary action and record its outcome in the turn draft.
    ///
    /// The action's own effects always apply. When it carries a success
    /// roll and the roll succeeds, the success narrative replaces the
    /// action's and its effects follow.
    pub fn resolve_action(&self, state: &mut GameState, action: &VoluntaryAction) -> EventOutcome {
        let success = action.outcome.as_ref().filter(|o| state.rng.chance(o.chance));
        let text = success.map_or(&action.narrative_text, |o| &o.narrative_text);
        let mut outcome = EventOutcome {
            event_id: action.event_id(),
            narrative: render(text, &state.animal, &self.bundle.config),
            choice_id: None,
            choice_label: Some(action.label.clone()),
            narrative_result: None,
            stat_effects: Vec::new(),
            consequences: Vec::new(),
            death_roll: None,
        };

        let source = format!("action:{}", action.id);
        self.apply_block(state, &action.stat_effects, &action.consequences, &source, &mut outcome);
        if let Some(extra) = success {
            self.apply_block(state, &extra.stat_effects, &extra.consequences, &source, &mut outcome);
        }
        debug!(turn = state.time.turn, action_id = %action.id, succeeded = success.is_some(), "Action resolved");
        state.draft.event_outcomes.push(outcome.clone());
        outcome
    }

    /// Settle a rutting contest if this turn's events entered one.
    ///
    /// A win sires offspring and marks the season as mated. A loss may
    /// leave the configured injury. The challenge flag is cleared either
    /// way.
    pub fn resolve_male_competition(&self, state: &mut GameState) {
        let ReproductionConfig::Iteroparous(repro) = &self.bundle.config.reproduction else {
            return;
        };
        let Some(contest) = &repro.male_competition else {
            return;
        };
        if !state.animal.alive || !state.animal.has_flag(&contest.challenge_flag) {
            return;
        }

        let probability = challenge_win_probability(contest, &state.animal);
        let won = state.rng.chance(probability);
        info!(turn = state.time.turn, probability, won, "Rutting contest");
        let mut consequences = Vec::new();
        if won {
            state
                .draft
                .health_narratives
                .push("Your rival breaks off and crashes away. The doe is yours.".to_owned());
            consequences.push(Consequence::SireOffspring {
                offspring_count: None,
            });
            consequences.push(Consequence::SetFlag {
                flag: repro.mated_flag.clone(),
            });
        } else {
            state
                .draft
                .health_narratives
                .push("Your rival drives you off with a twist of his antlers.".to_owned());
            if state.rng.chance(contest.loss_injury_chance) {
                let body_part = state.rng.pick(&contest.loss_injury_body_parts).cloned();
                let severity = u32::try_from(state.rng.int(0, 1)).ok();
                consequences.push(Consequence::AddInjury {
                    injury_id: contest.loss_injury_id.clone(),
                    severity,
                    body_part,
                });
            }
        }
        consequences.push(Consequence::RemoveFlag {
            flag: contest.challenge_flag.clone(),
        });
        for consequence in &consequences {
            self.apply_consequence(state, consequence, COMPETITION_SOURCE);
        }
    }

    fn apply_block(
        &self,
        state: &mut GameState,
        effects: &[StatEffect],
        consequences: &[Consequence],
        source: &str,
        outcome: &mut EventOutcome,
    ) {
        for effect in effects {
            if self.apply_stat_effect(state, effect, source) {
                outcome.stat_effects.push(effect.clone());
            }
        }
        for consequence in consequences {
            if self.apply_consequence(state, consequence, source) {
                outcome.consequences.push(consequence.clone());
            }
        }
    }

    fn death_roll(
        &self,
        state: &mut GameState,
        event: &GameEvent,
        choice_id: &str,
        death: &DeathChance,
        outcome: &mut EventOutcome,
    ) -> Option<DeathRollOutcome> {
        if !state.animal.alive {
            return None;
        }
        let probability =
            death_probability(death, &state.animal, &self.bundle.config, &self.config.difficulty);

        if !death.escape_options.is_empty() {
            debug!(event_id = %event.id, probability, "Death roll queued");
            state.pending_rolls.push_back(PendingDeathRoll {
                event_id: event.id.clone(),
                choice_id: choice_id.to_owned(),
                base_probability: probability,
                cause: death.cause.clone(),
                escape_options: death.escape_options.clone(),
            });
            return Some(DeathRollOutcome {
                probability,
                survived: None,
            });
        }

        let died = state.rng.chance(probability);
        debug!(event_id = %event.id, probability, died, "Death rolled");
        if died {
            kill(&mut state.animal, &death.cause);
            outcome.consequences.push(Consequence::Death {
                cause: death.cause.clone(),
            });
        } else {
            let counters = &mut state.animal.counters;
            counters.predators_evaded = counters.predators_evaded.saturating_add(1);
        }
        Some(DeathRollOutcome {
            probability,
            survived: Some(!died),
        })
    }

    /// Apply one stat effect. Returns whether it took effect.
    pub fn apply_stat_effect(&self, state: &mut GameState, effect: &StatEffect, source: &str) -> bool {
        if !state.animal.alive {
            return false;
        }
        apply_stat_effect(
            &mut state.animal.stats,
            effect,
            source,
            &mut state.modifier_serial,
        );
        true
    }

    /// Apply one consequence. Returns whether it took effect.
    pub fn apply_consequence(&self, state: &mut GameState, consequence: &Consequence, source: &str) -> bool {
        if !state.animal.alive {
            return false;
        }
        let bundle = self.bundle;
        let config = &bundle.config;
        let turn = state.time.turn;

        match consequence {
            Consequence::ModifyWeight { amount } => {
                let applied = modify_weight(&mut state.animal, *amount, &config.weight);
                debug!(source, amount, applied, "Weight modified");
            }
            Consequence::ModifyStat {
                stat,
                amount,
                duration,
            } => {
                let effect = StatEffect {
                    stat: *stat,
                    amount: *amount,
                    duration: *duration,
                    label: String::new(),
                };
                return self.apply_stat_effect(state, &effect, source);
            }
            Consequence::SetFlag { flag } => {
                state.animal.flags.insert(flag.clone());
            }
            Consequence::RemoveFlag { flag } => {
                state.animal.flags.remove(flag);
            }
            Consequence::AddParasite {
                parasite_id,
                start_stage,
            } => match add_parasite(&mut state.animal, bundle, parasite_id, *start_stage, turn) {
                Ok(true) => {
                    let name = bundle
                        .parasite(parasite_id)
                        .map_or_else(|| parasite_id.clone(), |d| d.name.clone());
                    state.draft.new_parasites.push(name);
                }
                Ok(false) => {
                    debug!(source, parasite_id, "Parasite already carried");
                    return false;
                }
                Err(e) => return skipped(source, &e),
            },
            Consequence::RemoveParasite { parasite_id } => {
                return remove_parasite(&mut state.animal, parasite_id);
            }
            Consequence::AddInjury {
                injury_id,
                severity,
                body_part,
            } => match add_injury(
                &mut state.animal,
                bundle,
                injury_id,
                *severity,
                body_part.as_deref(),
                turn,
                &mut state.rng,
            ) {
                Ok(name) => state.draft.new_injuries.push(name),
                Err(e) => return skipped(source, &e),
            },
            Consequence::ChangeRegion { region_id } => {
                state.animal.region.clone_from(region_id);
            }
            Consequence::ModifyAge { amount } => {
                state.animal.age_months = state.animal.age_months.saturating_add_signed(*amount);
            }
            Consequence::StartPregnancy { offspring_count } => {
                match start_pregnancy(
                    &mut state.reproduction,
                    &mut state.animal,
                    &config.reproduction,
                    *offspring_count,
                    turn,
                    &mut state.rng,
                ) {
                    Ok(count) => debug!(source, count, "Pregnancy started"),
                    Err(e) => return skipped(source, &e),
                }
            }
            Consequence::SireOffspring { offspring_count } => {
                match sire_offspring(
                    &mut state.reproduction,
                    &mut state.animal,
                    &config.reproduction,
                    *offspring_count,
                    turn,
                    &mut state.rng,
                ) {
                    Ok(count) => state
                        .draft
                        .health_narratives
                        .push(format!("You have sired {count} offspring.")),
                    Err(e) => return skipped(source, &e),
                }
            }
            Consequence::Spawn => {
                match spawn(&mut state.reproduction, &mut state.animal, &config.reproduction) {
                    Ok(out) => state.draft.health_narratives.push(format!(
                        "You release {} eggs. Perhaps {} will survive to return one day.",
                        out.egg_count, out.estimated_survivors
                    )),
                    Err(e) => return skipped(source, &e),
                }
            }
            Consequence::ModifyPopulation {
                species_name,
                amount,
            } => {
                if let Err(e) = modify_population(&mut state.ecosystem, species_name, *amount) {
                    return skipped(source, &e);
                }
            }
            Consequence::ModifyTerritory {
                size_change,
                quality_change,
            } => {
                if let Err(e) = modify_territory(
                    &mut state.territory,
                    size_change.unwrap_or(0.0),
                    quality_change.unwrap_or(0.0),
                ) {
                    return skipped(source, &e);
                }
            }
            Consequence::IntroduceNpc { npc_type } => {
                match introduce_npc(
                    &mut state.npcs,
                    config,
                    *npc_type,
                    turn,
                    &self.config.npc,
                    &mut state.rng,
                ) {
                    Ok(id) => {
                        if let Some(npc) = state.npcs.iter().find(|n| n.id == id) {
                            state.draft.world_narratives.push(format!(
                                "A {} you will come to know as {} enters your life.",
                                npc.species_label, npc.name
                            ));
                        }
                    }
                    Err(e) => return skipped(source, &e),
                }
            }
            Consequence::Death { cause } => {
                kill(&mut state.animal, cause);
            }
        }
        true
    }
}

fn skipped(source: &str, error: &dyn std::error::Error) -> bool {
    warn!(source, error = %error, "Consequence skipped");
    false
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use reckoning_types::{
        ActionOutcome, EventCategory, EventChoice, EventType, ResolvedEvent, Sex, StatId,
    };

    use super::*;
    use crate::state::SessionOptions;
    use crate::testing::{event, sample_bundle};

    fn resolved(definition: GameEvent, choice_id: Option<&str>) -> ResolvedEvent {
        ResolvedEvent {
            narrative: definition.narrative_text.clone(),
            definition,
            image: None,
            choice_id: choice_id.map(str::to_owned),
            sub_events: Vec::new(),
            lethal_outcome: false,
        }
    }

    fn run(bundle: &SpeciesBundle, events: Vec<ResolvedEvent>) -> GameState {
        let config = EngineConfig::default();
        let mut state = GameState::new(bundle, &config, &SessionOptions::default()).unwrap();
        state.current_events = events;
        Resolver {
            bundle,
            config: &config,
        }
        .resolve_events(&mut state);
        state
    }

    fn passive(consequences: Vec<Consequence>) -> GameEvent {
        let mut e = event("e", EventType::Passive, EventCategory::Foraging);
        e.consequences = consequences;
        e
    }

    fn lethal_choice(probability: f64) -> GameEvent {
        let mut e = event("ambush", EventType::Active, EventCategory::Predator);
        e.choices = vec![EventChoice {
            id: "run".to_owned(),
            label: "Run".to_owned(),
            death_chance: Some(DeathChance {
                probability,
                cause: "Ambushed".to_owned(),
                stat_modifiers: Vec::new(),
                escape_options: Vec::new(),
            }),
            ..EventChoice::default()
        }];
        e
    }

    #[test]
    fn weight_never_drops_below_floor() {
        let bundle = sample_bundle();
        let state = run(
            &bundle,
            vec![resolved(passive(vec![Consequence::ModifyWeight { amount: -1000.0 }]), None)],
        );
        assert!((state.animal.weight - bundle.config.weight.min_floor).abs() < f64::EPSILON);
    }

    #[test]
    fn repeat_parasite_is_a_no_op() {
        let bundle = sample_bundle();
        let add = Consequence::AddParasite {
            parasite_id: "deer-tick".to_owned(),
            start_stage: None,
        };
        let state = run(&bundle, vec![resolved(passive(vec![add.clone(), add]), None)]);
        assert_eq!(state.animal.parasites.len(), 1);
        assert_eq!(state.draft.new_parasites, vec!["Deer Tick".to_owned()]);
        let outcome = state.draft.event_outcomes.first().unwrap();
        assert_eq!(outcome.consequences.len(), 1);
    }

    #[test]
    fn unknown_content_is_skipped() {
        let bundle = sample_bundle();
        let state = run(
            &bundle,
            vec![resolved(
                passive(vec![
                    Consequence::AddInjury {
                        injury_id: "antler-break".to_owned(),
                        severity: None,
                        body_part: None,
                    },
                    Consequence::SetFlag {
                        flag: "after".to_owned(),
                    },
                ]),
                None,
            )],
        );
        assert!(state.animal.injuries.is_empty());
        assert!(state.animal.has_flag("after"));
    }

    #[test]
    fn nothing_applies_after_death() {
        let bundle = sample_bundle();
        let mut e = passive(vec![
            Consequence::Death {
                cause: "Struck by lightning".to_owned(),
            },
            Consequence::ModifyWeight { amount: 10.0 },
            Consequence::SetFlag {
                flag: "ghost".to_owned(),
            },
        ]);
        e.stat_effects = vec![StatEffect {
            stat: StatId::Wis,
            amount: 5.0,
            duration: None,
            label: String::new(),
        }];
        let state = run(&bundle, vec![resolved(e.clone(), None), resolved(e, None)]);
        assert!(!state.animal.alive);
        assert_eq!(state.animal.cause_of_death.as_deref(), Some("Struck by lightning"));
        assert!((state.animal.weight - 110.0).abs() < f64::EPSILON);
        assert!(!state.animal.has_flag("ghost"));
        // The first event's WIS effect landed before the death; the second's did not.
        assert!((state.animal.stats.effective(StatId::Wis) - 55.0).abs() < f64::EPSILON);
        assert!(state.current_events.first().unwrap().lethal_outcome);
        assert!(!state.current_events.get(1).unwrap().lethal_outcome);
    }

    #[test]
    fn certain_death_choice_kills_for_any_seed() {
        let bundle = sample_bundle();
        for seed in 0..50 {
            let config = EngineConfig::default();
            let options = SessionOptions {
                seed: Some(seed),
                ..SessionOptions::default()
            };
            let mut state = GameState::new(&bundle, &config, &options).unwrap();
            state.current_events = vec![resolved(lethal_choice(1.0), Some("run"))];
            Resolver {
                bundle: &bundle,
                config: &config,
            }
            .resolve_events(&mut state);
            assert!(!state.animal.alive);
            let roll = state.draft.event_outcomes.first().unwrap().death_roll.unwrap();
            assert_eq!(roll.survived, Some(false));
        }
    }

    #[test]
    fn impossible_death_is_survived_and_counted() {
        let mut bundle = sample_bundle();
        bundle.config.predation.death_chance_min = 0.0;
        bundle.config.predation.death_chance_max = 0.0;
        let state = run(&bundle, vec![resolved(lethal_choice(0.5), Some("run"))]);
        assert!(state.animal.alive);
        assert_eq!(state.animal.counters.predators_evaded, 1);
    }

    fn challenger(bundle: &SpeciesBundle, seed: u64) -> GameState {
        let options = SessionOptions {
            sex: Sex::Male,
            seed: Some(seed),
            ..SessionOptions::default()
        };
        let mut state = GameState::new(bundle, &EngineConfig::default(), &options).unwrap();
        state.animal.flags.insert("attempted-buck-challenge".to_owned());
        state
    }

    fn contest_odds(bundle: &mut SpeciesBundle, win: f64, injury: f64) {
        if let ReproductionConfig::Iteroparous(repro) = &mut bundle.config.reproduction {
            let contest = repro.male_competition.as_mut().unwrap();
            contest.min_win_prob = win;
            contest.max_win_prob = win;
            contest.loss_injury_chance = injury;
        }
    }

    #[test]
    fn won_contest_sires_offspring() {
        let mut bundle = sample_bundle();
        contest_odds(&mut bundle, 1.0, 1.0);
        let config = EngineConfig::default();
        let mut state = challenger(&bundle, 8);
        Resolver {
            bundle: &bundle,
            config: &config,
        }
        .resolve_events(&mut state);

        assert!(state.animal.has_flag("mated-this-season"));
        assert!(!state.animal.has_flag("attempted-buck-challenge"));
        assert!(state.animal.counters.offspring_born >= 1);
        assert!(state.animal.injuries.is_empty());
        assert!(state.draft.health_narratives.iter().any(|n| n.starts_with("You have sired")));
    }

    #[test]
    fn lost_contest_can_injure() {
        let mut bundle = sample_bundle();
        contest_odds(&mut bundle, 0.0, 1.0);
        let config = EngineConfig::default();
        let mut state = challenger(&bundle, 9);
        Resolver {
            bundle: &bundle,
            config: &config,
        }
        .resolve_events(&mut state);

        assert!(!state.animal.has_flag("mated-this-season"));
        assert!(!state.animal.has_flag("attempted-buck-challenge"));
        assert_eq!(state.animal.counters.offspring_born, 0);
        let wound = state.animal.injuries.first().unwrap();
        assert_eq!(wound.definition_id, "leg-wound");
        assert!(["left flank", "right flank"].contains(&wound.body_part.as_str()));
        assert_eq!(state.draft.new_injuries.len(), 1);
    }

    #[test]
    fn no_challenge_no_contest() {
        let mut bundle = sample_bundle();
        contest_odds(&mut bundle, 1.0, 1.0);
        let config = EngineConfig::default();
        let mut state = challenger(&bundle, 10);
        state.animal.flags.remove("attempted-buck-challenge");
        let rng_before = state.rng.state();
        Resolver {
            bundle: &bundle,
            config: &config,
        }
        .resolve_events(&mut state);

        assert_eq!(state.rng.state(), rng_before);
        assert!(!state.animal.has_flag("mated-this-season"));
    }

    fn explore(chance: f64) -> VoluntaryAction {
        VoluntaryAction {
            id: "explore".to_owned(),
            label: "Explore".to_owned(),
            description: String::new(),
            conditions: Vec::new(),
            requires_territory: false,
            narrative_text: "You wander the {{animal.region}} and find nothing.".to_owned(),
            stat_effects: vec![StatEffect {
                stat: StatId::Nov,
                amount: 5.0,
                duration: Some(2),
                label: String::new(),
            }],
            consequences: Vec::new(),
            outcome: Some(ActionOutcome {
                chance,
                narrative_text: "You find a patch of acorns.".to_owned(),
                stat_effects: Vec::new(),
                consequences: vec![Consequence::ModifyWeight { amount: 2.0 }],
            }),
        }
    }

    #[test]
    fn failed_action_applies_only_its_own_effects() {
        let bundle = sample_bundle();
        let config = EngineConfig::default();
        let mut state = GameState::new(&bundle, &config, &SessionOptions::default()).unwrap();
        let weight = state.animal.weight;
        let outcome = Resolver {
            bundle: &bundle,
            config: &config,
        }
        .resolve_action(&mut state, &explore(0.0));

        assert_eq!(outcome.event_id, "action-explore");
        assert_eq!(outcome.narrative, "You wander the forest and find nothing.");
        assert_eq!(outcome.stat_effects.len(), 1);
        assert!(outcome.consequences.is_empty());
        assert!((state.animal.weight - weight).abs() < f64::EPSILON);
        assert_eq!(state.draft.event_outcomes, vec![outcome]);
    }

    #[test]
    fn successful_action_adds_its_reward() {
        let bundle = sample_bundle();
        let config = EngineConfig::default();
        let mut state = GameState::new(&bundle, &config, &SessionOptions::default()).unwrap();
        let weight = state.animal.weight;
        let outcome = Resolver {
            bundle: &bundle,
            config: &config,
        }
        .resolve_action(&mut state, &explore(1.0));

        assert_eq!(outcome.narrative, "You find a patch of acorns.");
        assert_eq!(outcome.choice_label.as_deref(), Some("Explore"));
        assert_eq!(outcome.consequences, vec![Consequence::ModifyWeight { amount: 2.0 }]);
        assert!((state.animal.weight - weight - 2.0).abs() < 1e-9);
    }

    #[test]
    fn escapable_roll_is_queued() {
        let bundle = sample_bundle();
        let wolves = bundle.event("wolf-pack").cloned().unwrap();
        let state = run(&bundle, vec![resolved(wolves, Some("flee"))]);
        assert!(state.animal.alive);
        assert_eq!(state.pending_rolls.len(), 1);
        let pending = state.pending_rolls.front().unwrap();
        assert_eq!(pending.cause, "Pulled down by wolves");
        let roll = state.draft.event_outcomes.first().unwrap().death_roll.unwrap();
        assert_eq!(roll.survived, None);
    }
}

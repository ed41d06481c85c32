//! Helpers shared by the scenario tests.

#![allow(dead_code, clippy::unwrap_used)]

use std::path::Path;
use std::sync::Arc;

use reckoning_core::{
    DecisionSource, EngineConfig, GameSession, SessionOptions, TurnPhase, load_species_bundle,
    play_decisions,
};
use reckoning_types::{
    Consequence, EventCategory, EventType, GameEvent, SpeciesBundle, TurnResult,
};

/// The test-deer bundle from `tests/fixtures`.
pub fn bundle() -> SpeciesBundle {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/test-deer.yaml");
    load_species_bundle(&path).unwrap()
}

/// The test-deer bundle with its catalogue cut down to `ids`.
pub fn bundle_with(ids: &[&str]) -> SpeciesBundle {
    let mut bundle = bundle();
    bundle.events.retain(|e| ids.contains(&e.id.as_str()));
    bundle
}

/// The test-deer bundle with `events` as its whole catalogue.
pub fn bundle_of(events: Vec<GameEvent>) -> SpeciesBundle {
    let mut bundle = bundle();
    bundle.events = events;
    bundle
}

/// Defaults with weather switched off, so only events move the animal.
pub fn quiet_config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.weather.enabled = false;
    config
}

/// A female session on `bundle` with `seed`.
pub fn new_session(bundle: SpeciesBundle, config: EngineConfig, seed: u64) -> GameSession {
    let options = SessionOptions {
        seed: Some(seed),
        ..SessionOptions::default()
    };
    GameSession::new(Arc::new(bundle), config, &options).unwrap()
}

/// A passive event with the given consequences and no conditions.
pub fn passive(id: &str, consequences: Vec<Consequence>) -> GameEvent {
    GameEvent {
        id: id.to_owned(),
        event_type: EventType::Passive,
        category: EventCategory::Environmental,
        narrative_text: format!("{id} happens."),
        image: None,
        conditions: Vec::new(),
        weight: 1.0,
        cooldown: None,
        tags: Vec::new(),
        guaranteed: false,
        stat_effects: Vec::new(),
        consequences,
        choices: Vec::new(),
        sub_events: Vec::new(),
        footnote: None,
    }
}

/// Play up to `turns` whole turns, stopping early on death.
pub fn play(session: &mut GameSession, source: &mut dyn DecisionSource, turns: u32) -> Vec<TurnResult> {
    let mut results = Vec::new();
    for _ in 0..turns {
        if session.phase() == TurnPhase::Dead {
            break;
        }
        session.begin_turn().unwrap();
        results.push(play_decisions(session, source).unwrap());
    }
    results
}

//! Shared fixtures for unit tests.

#![allow(clippy::unwrap_used)]

use reckoning_types::{AnimalState, EventCategory, EventType, GameEvent, Sex, SpeciesBundle};

const FIXTURE: &str = include_str!("../tests/fixtures/test-deer.yaml");

/// The test-deer bundle: HEA 70, female start weight 110, region `forest`.
pub fn sample_bundle() -> SpeciesBundle {
    serde_yml::from_str(FIXTURE).unwrap()
}

/// A fresh female from the test-deer bundle.
pub fn sample_animal() -> AnimalState {
    reckoning_animal::create_animal(&sample_bundle(), Sex::Female, None).unwrap()
}

/// A bare event with no conditions or consequences.
pub fn event(id: &str, event_type: EventType, category: EventCategory) -> GameEvent {
    GameEvent {
        id: id.to_owned(),
        event_type,
        category,
        narrative_text: format!("{id} happens."),
        image: None,
        conditions: Vec::new(),
        weight: 1.0,
        cooldown: None,
        tags: Vec::new(),
        guaranteed: false,
        stat_effects: Vec::new(),
        consequences: Vec::new(),
        choices: Vec::new(),
        sub_events: Vec::new(),
        footnote: None,
    }
}

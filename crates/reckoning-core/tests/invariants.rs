//! Properties that must hold for every run: cooldowns, the weight floor,
//! parasite uniqueness, death finality and escape gating.

#![allow(clippy::unwrap_used)]

mod common;

use std::sync::Arc;

use reckoning_core::{
    EscapeError, FirstChoiceDecisions, GameSession, SeededDecisions, SessionError, SessionOptions,
    TurnPhase,
};
use reckoning_types::{Consequence, StatId};

use common::{bundle, bundle_of, bundle_with, new_session, passive, play, quiet_config};

#[test]
fn cooldown_blocks_until_turn_plus_n() {
    let mut session = new_session(bundle_with(&["wolf-pack", "forage-browse"]), quiet_config(), 8);
    let mut fired = Vec::new();
    for _ in 0..10 {
        session.begin_turn().unwrap();
        let wolves = session.current_events().iter().any(|e| e.id() == "wolf-pack");
        if wolves {
            session.confirm_choice("wolf-pack", "freeze").unwrap();
        }
        session.resolve_turn().unwrap();
        fired.push(wolves);
    }
    // Cooldown 3 and the only active event: fires on turns 1, 4, 7 and 10.
    assert_eq!(
        fired,
        vec![true, false, false, true, false, false, true, false, false, true]
    );
}

#[test]
fn weight_never_drops_below_the_floor() {
    let events = vec![
        passive("famine", vec![Consequence::ModifyWeight { amount: -45.0 }]),
        passive("glut", vec![Consequence::ModifyWeight { amount: 20.0 }]),
        passive("lean", vec![Consequence::ModifyWeight { amount: -15.0 }]),
    ];
    let floor = bundle().config.weight.min_floor;
    for seed in 0..20 {
        let mut session = new_session(bundle_of(events.clone()), quiet_config(), seed);
        play(&mut session, &mut FirstChoiceDecisions, 15);
        assert!(session.animal().weight >= floor);
        for record in session.history() {
            assert!(record.weight >= floor, "seed {seed} turn {}", record.turn);
        }
    }

    let crash = passive("crash", vec![Consequence::ModifyWeight { amount: -1000.0 }]);
    let mut session = new_session(bundle_of(vec![crash]), quiet_config(), 1);
    play(&mut session, &mut FirstChoiceDecisions, 1);
    assert!((session.animal().weight - floor).abs() < f64::EPSILON);
    // Below the starvation line, so the turn ends in death.
    assert_eq!(session.animal().cause_of_death.as_deref(), Some("Starved to death."));
}

#[test]
fn a_parasite_is_never_carried_twice() {
    let add = Consequence::AddParasite {
        parasite_id: "deer-tick".to_owned(),
        start_stage: None,
    };
    let swarm = passive("tick-swarm", vec![add.clone(), add]);
    let mut session = new_session(bundle_of(vec![swarm]), quiet_config(), 3);
    let results = play(&mut session, &mut FirstChoiceDecisions, 8);

    assert_eq!(session.animal().parasites.len(), 1);
    assert_eq!(session.animal().counters.parasites_contracted, 1);
    let reported: usize = results.iter().map(|r| r.new_parasites.len()).sum();
    assert_eq!(reported, 1);
}

#[test]
fn nothing_changes_after_death() {
    let doom = passive(
        "rockfall",
        vec![
            Consequence::Death {
                cause: "Crushed by rockfall".to_owned(),
            },
            Consequence::ModifyWeight { amount: 25.0 },
            Consequence::SetFlag {
                flag: "survivor".to_owned(),
            },
            Consequence::AddParasite {
                parasite_id: "deer-tick".to_owned(),
                start_stage: None,
            },
            Consequence::AddInjury {
                injury_id: "leg-wound".to_owned(),
                severity: None,
                body_part: None,
            },
            Consequence::ModifyStat {
                stat: StatId::Str,
                amount: -20.0,
                duration: None,
            },
        ],
    );
    let mut session = new_session(bundle_of(vec![doom]), quiet_config(), 5);
    let before = session.animal().clone();

    session.begin_turn().unwrap();
    let result = session.resolve_turn().unwrap();
    let after = session.animal().clone();

    assert!(!after.alive);
    assert_eq!(after.cause_of_death.as_deref(), Some("Crushed by rockfall"));
    assert_eq!(result.death_cause.as_deref(), Some("Crushed by rockfall"));
    assert!((after.weight - before.weight).abs() < f64::EPSILON);
    assert_eq!(after.flags, before.flags);
    assert!(after.parasites.is_empty());
    assert!(after.injuries.is_empty());
    assert_eq!(after.stats.effective_all(), before.stats.effective_all());
    assert!(result.stat_delta.is_empty());

    assert!(matches!(session.begin_turn(), Err(SessionError::AnimalDead)));
    assert_eq!(session.phase(), TurnPhase::Dead);
    assert_eq!(session.animal(), &after);
}

#[test]
fn locked_escape_options_are_never_taken() {
    let mut session = new_session(bundle_with(&["wolf-pack"]), quiet_config(), 12);
    session.begin_turn().unwrap();
    session.confirm_choice("wolf-pack", "flee").unwrap();
    session.resolve_turn().unwrap();
    assert_eq!(session.phase(), TurnPhase::AwaitingEscape);

    let rng_before = session.state().rng.state();
    let err = session.resolve_escape_roll("wolf-pack", "thicket").unwrap_err();
    assert!(matches!(
        err,
        SessionError::Escape {
            source: EscapeError::Locked { .. }
        }
    ));
    assert_eq!(session.state().rng.state(), rng_before);
    assert_eq!(session.phase(), TurnPhase::AwaitingEscape);
    assert_eq!(session.state().pending_rolls.len(), 1);

    let view = session.escape_options_view();
    let thicket = view.iter().find(|v| v.option.id == "thicket").unwrap();
    assert!(thicket.locked);
    assert_eq!(thicket.locked_reason.as_deref(), Some("Requires: knows-thicket"));

    // Automated play only ever offers unlocked options to the session.
    for seed in 0..10 {
        let mut session = new_session(bundle_with(&["wolf-pack"]), quiet_config(), seed);
        let results = play(&mut session, &mut SeededDecisions::new(seed), 6);
        assert!(!results.is_empty());
    }
}

#[test]
fn the_right_flag_unlocks_an_escape() {
    let mut bundle = bundle_with(&["wolf-pack"]);
    let orphaned = bundle.backstories.first_mut().unwrap();
    orphaned.flags.push("knows-thicket".to_owned());
    let options = SessionOptions {
        backstory_id: Some("orphaned".to_owned()),
        seed: Some(12),
        ..SessionOptions::default()
    };
    let mut session = GameSession::new(Arc::new(bundle), quiet_config(), &options).unwrap();

    session.begin_turn().unwrap();
    session.confirm_choice("wolf-pack", "flee").unwrap();
    session.resolve_turn().unwrap();
    let view = session.escape_options_view();
    let thicket = view.iter().find(|v| v.option.id == "thicket").unwrap();
    assert!(!thicket.locked);

    let outcome = session.resolve_escape_roll("wolf-pack", "thicket").unwrap();
    assert!(outcome.turn_finished);
    if outcome.survived {
        // Thicket has no stat cost.
        let result = session.turn_result().unwrap();
        assert!(!result.stat_delta.contains_key(&StatId::Hom));
    }
}

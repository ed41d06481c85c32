//! Headless turn loop.
//!
//! Each turn the session prepares a selection request, the selection runs
//! on tokio's blocking pool, and the response is merged back before the
//! decision source answers every choice and escape. A session restored
//! mid-turn picks up at whichever phase it was saved in.

use std::path::Path;
use std::sync::Arc;

use reckoning_core::{
    DecisionSource, GameSession, SelectionRequest, TurnPhase, play_decisions, run_selection,
};
use reckoning_types::TurnResult;
use tracing::{debug, info, warn};

use crate::error::EngineError;

/// Play until the animal dies or the clock reaches `max_turns`.
///
/// Returns the number of turns finished by this call.
pub async fn run<D: DecisionSource>(
    session: &mut GameSession,
    decisions: &mut D,
    max_turns: u32,
) -> Result<u32, EngineError> {
    let mut played: u32 = 0;
    while session.phase() != TurnPhase::Dead && session.state().time.turn < max_turns {
        let result = play_turn(session, decisions).await?;
        log_turn(&result);
        played = played.saturating_add(1);
    }
    Ok(played)
}

/// Finish one turn from whatever phase the session is in.
pub async fn play_turn<D: DecisionSource>(
    session: &mut GameSession,
    decisions: &mut D,
) -> Result<TurnResult, EngineError> {
    match session.phase() {
        TurnPhase::Ready => {
            let request = session.begin_turn_offloaded()?;
            select_offloaded(session, request).await?;
        }
        TurnPhase::Selecting => {
            let request = session.selection_request()?;
            select_offloaded(session, request).await?;
        }
        TurnPhase::AwaitingChoices | TurnPhase::AwaitingEscape | TurnPhase::Dead => {}
    }
    Ok(play_decisions(session, decisions)?)
}

async fn select_offloaded(session: &mut GameSession, request: SelectionRequest) -> Result<(), EngineError> {
    let bundle = Arc::clone(session.bundle());
    let config = session.config().clone();
    let response = tokio::task::spawn_blocking(move || run_selection(&request, &bundle, &config)).await?;
    let events = session.apply_selection(response)?;
    debug!(count = events.len(), "Selection merged");
    Ok(())
}

fn log_turn(result: &TurnResult) {
    let events: Vec<&str> = result
        .event_outcomes
        .iter()
        .map(|o| o.event_id.as_str())
        .collect();
    info!(
        turn = result.turn,
        events = ?events,
        weight_change = result.weight_change,
        new_parasites = ?result.new_parasites,
        new_injuries = ?result.new_injuries,
        death = result.death_cause.as_deref().unwrap_or("-"),
        "Turn resolved"
    );
    for line in result.health_narratives.iter().chain(&result.world_narratives) {
        debug!(narrative = %line, "Narrative");
    }
    match serde_json::to_string(result) {
        Ok(json) => debug!(result = %json, "Turn result"),
        Err(e) => warn!(error = %e, "Turn result not serialisable"),
    }
}

/// Resume from `path` when a save exists there.
pub async fn load_save(path: &Path) -> Result<Option<String>, EngineError> {
    match tokio::fs::read_to_string(path).await {
        Ok(json) => Ok(Some(json)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(EngineError::SaveFile {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Write the session's JSON save to `path`.
pub async fn write_save(session: &GameSession, path: &Path) -> Result<(), EngineError> {
    let json = session.snapshot()?;
    tokio::fs::write(path, json)
        .await
        .map_err(|source| EngineError::SaveFile {
            path: path.to_path_buf(),
            source,
        })?;
    info!(path = %path.display(), turn = session.state().time.turn, "Save written");
    Ok(())
}

/// Log how the life went.
pub fn log_summary(session: &GameSession) {
    let animal = session.animal();
    let counters = &animal.counters;
    info!(
        turns = session.history().len(),
        alive = animal.alive,
        cause = animal.cause_of_death.as_deref().unwrap_or("-"),
        age_months = animal.age_months,
        weight = animal.weight,
        predators_evaded = counters.predators_evaded,
        parasites_contracted = counters.parasites_contracted,
        "Session ended"
    );
}

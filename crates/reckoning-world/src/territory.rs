//! Home range for territorial species.
//!
//! A territory degrades unless the animal marks it; unmarked ground invites
//! intruders, and contested ground loses quality every turn. Quality feeds
//! back into seasonal weight gain through [`weight_modifier`].

use reckoning_types::{GameRng, TerritoryState};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::WorldError;

/// Animal flag consumed by the ticker to reset the marking clock.
pub const TERRITORY_MARKED_FLAG: &str = "territory-marked";

/// Turns a territory stays fresh after marking.
const MARKING_FRESH_TURNS: u32 = 4;

/// Tunables for territory establishment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerritoryParams {
    /// Turn at which a territorial species claims its range.
    #[serde(default = "default_establish_turn")]
    pub establish_turn: u32,

    /// Size of a freshly claimed territory.
    #[serde(default = "default_initial_size")]
    pub initial_size: f64,

    /// Quality of a freshly claimed territory.
    #[serde(default = "default_initial_quality")]
    pub initial_quality: f64,
}

impl Default for TerritoryParams {
    fn default() -> Self {
        Self {
            establish_turn: default_establish_turn(),
            initial_size: default_initial_size(),
            initial_quality: default_initial_quality(),
        }
    }
}

const fn default_establish_turn() -> u32 {
    12
}

const fn default_initial_size() -> f64 {
    30.0
}

const fn default_initial_quality() -> f64 {
    60.0
}

/// Claim a territory. Returns `false` if one is already held.
pub fn establish(state: &mut TerritoryState, params: &TerritoryParams) -> bool {
    if state.established {
        return false;
    }
    *state = TerritoryState {
        established: true,
        size: params.initial_size.clamp(0.0, 100.0),
        quality: params.initial_quality.clamp(0.0, 100.0),
        contested: false,
        marked_turns: 0,
        intruder_present: false,
    };
    true
}

/// Advance the territory by one turn. Returns narrative lines.
///
/// `marked` resets the marking clock before decay is assessed.
pub fn tick_territory(
    state: &mut TerritoryState,
    territorial: bool,
    marked: bool,
    turn: u32,
    params: &TerritoryParams,
    rng: &mut GameRng,
) -> Vec<String> {
    let mut narratives = Vec::new();
    if !territorial {
        return narratives;
    }
    if !state.established {
        if turn >= params.establish_turn && establish(state, params) {
            debug!(turn, "Territory established");
            narratives.push(
                "You have settled into a home range. The trails and bedding sites here are yours now."
                    .to_owned(),
            );
        }
        return narratives;
    }

    if marked {
        state.marked_turns = 0;
    }
    state.marked_turns = state.marked_turns.saturating_add(1);
    if state.marked_turns > MARKING_FRESH_TURNS {
        state.quality = (state.quality - 3.0).max(0.0);
        if rng.chance(0.15) {
            if !state.intruder_present {
                narratives.push(
                    "A stranger's scent lingers along your boundaries. Someone is testing your claim."
                        .to_owned(),
                );
            }
            state.intruder_present = true;
            state.contested = true;
        }
    }

    if rng.chance(0.1) {
        let drift = f64::from(i32::try_from(rng.int(-2, 2)).unwrap_or(0));
        state.quality = (state.quality + drift).clamp(0.0, 100.0);
    }

    if state.contested {
        state.quality = (state.quality - 2.0).max(0.0);
    }

    if state.intruder_present && rng.chance(0.2) {
        state.intruder_present = false;
        state.contested = false;
        narratives.push("The intruder has moved on. Your range is quiet again.".to_owned());
    }

    narratives
}

/// Multiplier on seasonal weight gain: 0.7 for worthless ground up to 1.3.
pub fn weight_modifier(state: &TerritoryState) -> f64 {
    if !state.established {
        return 1.0;
    }
    0.7 + state.quality / 100.0 * 0.6
}

/// Apply a territory consequence. Size and quality stay within 0..=100.
///
/// # Errors
///
/// Returns [`WorldError::TerritoryNotEstablished`] when no territory is held.
pub fn modify_territory(
    state: &mut TerritoryState,
    size_change: f64,
    quality_change: f64,
) -> Result<(), WorldError> {
    if !state.established {
        return Err(WorldError::TerritoryNotEstablished);
    }
    state.size = (state.size + size_change).clamp(0.0, 100.0);
    state.quality = (state.quality + quality_change).clamp(0.0, 100.0);
    Ok(())
}

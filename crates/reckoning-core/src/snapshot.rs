//! JSON save and restore.
//!
//! A save is the whole [`GameState`] tagged with the species it was played
//! with. Sets serialise as arrays and the random stream as its seed and
//! word position, so a restored session continues the exact stream,
//! including mid-turn choices and queued death rolls.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::state::GameState;

/// Save format version written by this build.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Errors that can occur when saving or restoring a session.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// The save is not valid JSON for this format.
    #[error("failed to (de)serialise snapshot: {source}")]
    Json {
        /// The underlying serde error.
        #[from]
        source: serde_json::Error,
    },

    /// The save was written for another species.
    #[error("snapshot is for species {found}, expected {expected}")]
    SpeciesMismatch {
        /// Species of the loaded bundle.
        expected: String,
        /// Species recorded in the save.
        found: String,
    },

    /// The save was written by an incompatible build.
    #[error("unsupported snapshot version {version}")]
    UnsupportedVersion {
        /// Version recorded in the save.
        version: u32,
    },
}

/// On-disk save document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// Format version.
    pub version: u32,
    /// Species the session was played with.
    pub species_id: String,
    /// Full session state.
    pub state: GameState,
}

/// Serialise `state` as a save for `species_id`.
///
/// # Errors
///
/// Returns [`SnapshotError::Json`] if serialisation fails.
pub fn to_json(species_id: &str, state: &GameState) -> Result<String, SnapshotError> {
    #[derive(Serialize)]
    struct SnapshotRef<'a> {
        version: u32,
        species_id: &'a str,
        state: &'a GameState,
    }

    let json = serde_json::to_string(&SnapshotRef {
        version: SNAPSHOT_VERSION,
        species_id,
        state,
    })?;
    debug!(species_id, turn = state.time.turn, bytes = json.len(), "Snapshot written");
    Ok(json)
}

/// Parse a save and check it belongs to `expected_species`.
///
/// # Errors
///
/// Returns [`SnapshotError::Json`] for malformed input,
/// [`SnapshotError::UnsupportedVersion`] for saves from another format and
/// [`SnapshotError::SpeciesMismatch`] for saves of another species.
pub fn from_json(json: &str, expected_species: &str) -> Result<GameState, SnapshotError> {
    let snapshot: Snapshot = serde_json::from_str(json)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(SnapshotError::UnsupportedVersion {
            version: snapshot.version,
        });
    }
    if snapshot.species_id != expected_species {
        return Err(SnapshotError::SpeciesMismatch {
            expected: expected_species.to_owned(),
            found: snapshot.species_id,
        });
    }
    debug!(
        species_id = expected_species,
        turn = snapshot.state.time.turn,
        "Snapshot restored"
    );
    Ok(snapshot.state)
}

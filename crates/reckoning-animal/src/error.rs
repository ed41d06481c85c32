//! Error types for the reckoning-animal crate.
//!
//! Content lookups that fail (a consequence naming a parasite or injury the
//! bundle does not define) are reported as errors here. The consequence
//! applier downgrades them to logged no-ops so a bad bundle never stops a
//! turn.

/// Errors that can occur during animal state operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnimalError {
    /// The bundle has no parasite with this id.
    #[error("unknown parasite: {parasite_id}")]
    UnknownParasite {
        /// The id that was looked up.
        parasite_id: String,
    },

    /// The bundle has no injury with this id.
    #[error("unknown injury: {injury_id}")]
    UnknownInjury {
        /// The id that was looked up.
        injury_id: String,
    },

    /// The bundle has no backstory with this id.
    #[error("unknown backstory: {backstory_id}")]
    UnknownBackstory {
        /// The id that was looked up.
        backstory_id: String,
    },

    /// The parasite definition has no stages.
    #[error("parasite {parasite_id} defines no stages")]
    EmptyParasite {
        /// The offending definition.
        parasite_id: String,
    },

    /// A reproduction consequence does not apply to this animal.
    #[error("reproduction not possible: {reason}")]
    ReproductionUnavailable {
        /// Why the consequence was rejected.
        reason: String,
    },

    /// The animal is dead; no further mutation is allowed.
    #[error("animal is dead")]
    Dead,
}

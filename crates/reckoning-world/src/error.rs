//! Error types for the `reckoning-world` crate.
//!
//! World consequences that cannot apply (an untracked population, a missing
//! NPC template) surface as [`WorldError`]; the consequence applier logs and
//! skips them.

use reckoning_types::NpcType;

/// Errors that can occur during world-state operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    /// The ecosystem does not track this population.
    #[error("population not tracked: {name}")]
    UnknownPopulation {
        /// The population name that was looked up.
        name: String,
    },

    /// The species defines no NPC template for this type.
    #[error("no npc template for {npc_type:?}")]
    NoNpcTemplate {
        /// The requested NPC type.
        npc_type: NpcType,
    },

    /// Every name in the template is already in use.
    #[error("npc names exhausted for {npc_type:?}")]
    NpcNamesExhausted {
        /// The requested NPC type.
        npc_type: NpcType,
    },

    /// Too many NPCs are alive already.
    #[error("npc limit reached ({max})")]
    NpcLimitReached {
        /// Configured maximum.
        max: usize,
    },

    /// The animal holds no territory.
    #[error("territory not established")]
    TerritoryNotEstablished,
}

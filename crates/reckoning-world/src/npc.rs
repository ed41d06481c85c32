//! Recurring non-player animals: rivals, allies, mates and stalking predators.

use reckoning_types::{GameRng, Npc, NpcId, NpcType, Relationship, SpeciesConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::WorldError;

/// Tunables for NPC introduction and departure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcParams {
    /// Earliest turn an NPC can appear.
    #[serde(default = "default_introduction_min_turn")]
    pub introduction_min_turn: u32,

    /// Per-turn chance of introducing an NPC when none is around.
    #[serde(default = "default_introduction_chance")]
    pub introduction_chance: f64,

    /// Most NPCs alive at once.
    #[serde(default = "default_max_npcs")]
    pub max_npcs: usize,

    /// Turns without an encounter after which an NPC moves on.
    #[serde(default = "default_departure_turns")]
    pub departure_turns: u32,
}

impl Default for NpcParams {
    fn default() -> Self {
        Self {
            introduction_min_turn: default_introduction_min_turn(),
            introduction_chance: default_introduction_chance(),
            max_npcs: default_max_npcs(),
            departure_turns: default_departure_turns(),
        }
    }
}

const fn default_introduction_min_turn() -> u32 {
    6
}

const fn default_introduction_chance() -> f64 {
    0.3
}

const fn default_max_npcs() -> usize {
    4
}

const fn default_departure_turns() -> u32 {
    20
}

/// Starting relationship for an NPC type.
pub const fn initial_relationship(npc_type: NpcType) -> Relationship {
    match npc_type {
        NpcType::Rival | NpcType::Predator => Relationship::Hostile,
        NpcType::Ally | NpcType::Mate | NpcType::Offspring => Relationship::Neutral,
    }
}

/// Introduce an NPC of `npc_type` from the species' templates.
///
/// Names already given to any NPC, living or gone, are skipped.
pub fn introduce_npc(
    npcs: &mut Vec<Npc>,
    config: &SpeciesConfig,
    npc_type: NpcType,
    turn: u32,
    params: &NpcParams,
    rng: &mut GameRng,
) -> Result<NpcId, WorldError> {
    if npcs.iter().filter(|n| n.alive).count() >= params.max_npcs {
        return Err(WorldError::NpcLimitReached {
            max: params.max_npcs,
        });
    }
    let template = config
        .npc_templates
        .iter()
        .find(|t| t.npc_type == npc_type)
        .ok_or(WorldError::NoNpcTemplate { npc_type })?;
    let free: Vec<&String> = template
        .names
        .iter()
        .filter(|name| !npcs.iter().any(|n| &n.name == *name))
        .collect();
    let name = rng
        .pick(&free)
        .map(|n| (*n).clone())
        .ok_or(WorldError::NpcNamesExhausted { npc_type })?;

    let id = NpcId::generate(rng);
    debug!(%id, name = %name, ?npc_type, turn, "NPC introduced");
    npcs.push(Npc {
        id,
        name,
        npc_type,
        species_label: template.species_label.clone(),
        relationship: initial_relationship(npc_type),
        alive: true,
        introduced_turn: turn,
        last_seen_turn: turn,
    });
    Ok(id)
}

/// Record an encounter with living NPCs of `npc_type`.
pub fn mark_seen(npcs: &mut [Npc], npc_type: NpcType, turn: u32) {
    for npc in npcs.iter_mut().filter(|n| n.alive && n.npc_type == npc_type) {
        npc.last_seen_turn = turn;
    }
}

/// Whether a living NPC of `npc_type` is around.
pub fn has_npc(npcs: &[Npc], npc_type: NpcType) -> bool {
    npcs.iter().any(|n| n.alive && n.npc_type == npc_type)
}

/// Per-turn NPC upkeep: departures, then a possible introduction.
pub fn tick_npcs(
    npcs: &mut Vec<Npc>,
    config: &SpeciesConfig,
    turn: u32,
    params: &NpcParams,
    rng: &mut GameRng,
) -> Vec<String> {
    let mut narratives = Vec::new();

    for npc in npcs.iter_mut().filter(|n| n.alive) {
        if turn.saturating_sub(npc.last_seen_turn) >= params.departure_turns {
            npc.alive = false;
            narratives.push(format!(
                "You have not crossed paths with {} in a long time. They have moved on.",
                npc.name
            ));
        }
    }

    let any_alive = npcs.iter().any(|n| n.alive);
    if turn < params.introduction_min_turn || any_alive || config.npc_templates.is_empty() {
        return narratives;
    }
    if !rng.chance(params.introduction_chance) {
        return narratives;
    }
    let Some(npc_type) = rng.pick(&config.npc_templates).map(|t| t.npc_type) else {
        return narratives;
    };
    match introduce_npc(npcs, config, npc_type, turn, params, rng) {
        Ok(id) => {
            if let Some(npc) = npcs.iter().find(|n| n.id == id) {
                narratives.push(introduction_line(npc));
            }
        }
        Err(e) => debug!(error = %e, "No NPC introduced"),
    }
    narratives
}

fn introduction_line(npc: &Npc) -> String {
    match npc.npc_type {
        NpcType::Rival => format!("A {} you will come to know as {} has begun challenging you.", npc.species_label, npc.name),
        NpcType::Ally => format!("A {} named {} has started keeping company with you.", npc.species_label, npc.name),
        NpcType::Mate => format!("You keep crossing paths with {}, a {}.", npc.name, npc.species_label),
        NpcType::Predator => format!("A {} you think of as {} has started hunting your range.", npc.species_label, npc.name),
        NpcType::Offspring => format!("{} the {} lingers nearby.", npc.name, npc.species_label),
    }
}

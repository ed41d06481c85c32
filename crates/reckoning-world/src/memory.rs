//! World memory tracker.
//!
//! Once per turn, after consequences are applied, the turn's resolved events
//! are folded into [`WorldMemory`]: a bounded log of recent events, per
//! location danger and foraging pressure, a threat map keyed by source, and
//! seasonal totals. The update is deterministic and consumes no randomness.

use reckoning_types::{
    Consequence, EventCategory, EventMemoryEntry, ResolvedEvent, ScentKind, ScentMark,
    Season, SeasonalTotals, ThreatAssessment, WorldMemory,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Tags marking an event as a predator or danger encounter.
pub const PREDATOR_TAGS: [&str; 3] = ["predator", "danger", "human"];

/// Tags marking an event as foraging.
pub const FORAGING_TAGS: [&str; 2] = ["foraging", "food"];

/// Ceiling for perceived danger at a location.
const DANGER_MAX: f64 = 100.0;

/// Tunables for memory decay and bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryParams {
    /// Entries kept in the recent-events log.
    #[serde(default = "default_max_recent_events")]
    pub max_recent_events: usize,

    /// Turns after which a threat counts as stale.
    #[serde(default = "default_threat_window_turns")]
    pub threat_window_turns: u32,

    /// Turns a scent mark lasts.
    #[serde(default = "default_scent_fade_turns")]
    pub scent_fade_turns: u32,

    /// Danger added by a harmful predator event.
    #[serde(default = "default_danger_spike")]
    pub danger_spike: f64,

    /// Danger removed per turn.
    #[serde(default = "default_danger_decay")]
    pub danger_decay: f64,

    /// Pressure added by a foraging event.
    #[serde(default = "default_forage_pressure_step")]
    pub forage_pressure_step: f64,

    /// Pressure removed per turn.
    #[serde(default = "default_forage_pressure_decay")]
    pub forage_pressure_decay: f64,
}

impl Default for MemoryParams {
    fn default() -> Self {
        Self {
            max_recent_events: default_max_recent_events(),
            threat_window_turns: default_threat_window_turns(),
            scent_fade_turns: default_scent_fade_turns(),
            danger_spike: default_danger_spike(),
            danger_decay: default_danger_decay(),
            forage_pressure_step: default_forage_pressure_step(),
            forage_pressure_decay: default_forage_pressure_decay(),
        }
    }
}

const fn default_max_recent_events() -> usize {
    20
}

const fn default_threat_window_turns() -> u32 {
    10
}

const fn default_scent_fade_turns() -> u32 {
    8
}

const fn default_danger_spike() -> f64 {
    20.0
}

const fn default_danger_decay() -> f64 {
    2.0
}

const fn default_forage_pressure_step() -> f64 {
    5.0
}

const fn default_forage_pressure_decay() -> f64 {
    1.0
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

fn tagged_any(event: &ResolvedEvent, tags: &[&str]) -> bool {
    tags.iter().any(|t| event.definition.has_tag(t))
}

/// Whether an event is a predator or danger encounter.
pub fn is_predator_event(event: &ResolvedEvent) -> bool {
    tagged_any(event, &PREDATOR_TAGS)
}

/// Whether an event is a foraging event.
pub fn is_foraging_event(event: &ResolvedEvent) -> bool {
    tagged_any(event, &FORAGING_TAGS)
}

/// Whether the occurrence hurt the animal: a death or injury consequence
/// anywhere, or a chosen choice carrying a death chance.
pub fn is_harmful(event: &ResolvedEvent) -> bool {
    let chose_risk = event
        .choice_id
        .as_deref()
        .and_then(|id| event.definition.choice(id))
        .is_some_and(|c| c.death_chance.is_some());
    chose_risk
        || event
            .all_consequences()
            .iter()
            .any(|c| matches!(c, Consequence::Death { .. } | Consequence::AddInjury { .. }))
}

/// For predator events, whether the animal got away.
pub fn escape_outcome(event: &ResolvedEvent) -> Option<bool> {
    if !is_predator_event(event) {
        return None;
    }
    let died = event.lethal_outcome
        || event
            .all_consequences()
            .iter()
            .any(|c| matches!(c, Consequence::Death { .. }));
    Some(!died)
}

/// Threat source name derived from the event id, falling back to category.
pub fn threat_source(event: &ResolvedEvent) -> Option<&'static str> {
    const PATTERNS: [(&str, &str); 9] = [
        ("wolf", "Gray Wolf"),
        ("coyote", "Coyote"),
        ("cougar", "Cougar"),
        ("hunting", "Human Hunter"),
        ("hunter", "Human Hunter"),
        ("vehicle", "Vehicle"),
        ("fire", "Wildfire"),
        ("flood", "Flooding"),
        ("blizzard", "Blizzard"),
    ];
    let id = event.id();
    if let Some((_, source)) = PATTERNS.iter().find(|(pattern, _)| id.contains(pattern)) {
        return Some(*source);
    }
    match event.definition.category {
        EventCategory::Predator => Some("Unknown Predator"),
        EventCategory::Environmental => Some("Environmental Hazard"),
        _ => None,
    }
}

/// Severity score in 0..=100 for an occurrence.
pub fn severity(event: &ResolvedEvent) -> f64 {
    let mut score: f64 = 0.0;
    for c in event.all_consequences() {
        match c {
            Consequence::Death { .. } => score = 100.0,
            Consequence::AddInjury { severity, .. } => {
                score = score.max(30.0 + f64::from(severity.unwrap_or(0)) * 15.0);
            }
            Consequence::AddParasite { .. } => score = score.max(20.0),
            _ => {}
        }
    }
    let chosen = event
        .choice_id
        .as_deref()
        .and_then(|id| event.definition.choice(id));
    if let Some(dc) = chosen.and_then(|c| c.death_chance.as_ref()) {
        score = score.max(dc.probability * 100.0);
    }
    score.min(100.0)
}

fn weight_deltas(event: &ResolvedEvent) -> (f64, f64) {
    event
        .all_consequences()
        .iter()
        .fold((0.0, 0.0), |(gained, lost), c| match c {
            Consequence::ModifyWeight { amount } if *amount > 0.0 => (gained + amount, lost),
            Consequence::ModifyWeight { amount } => (gained, lost + amount.abs()),
            _ => (gained, lost),
        })
}

// ---------------------------------------------------------------------------
// Tick
// ---------------------------------------------------------------------------

/// Fold this turn's resolved events into memory.
pub fn tick_memory(
    memory: &mut WorldMemory,
    events: &[ResolvedEvent],
    turn: u32,
    location: &str,
    season: Season,
    params: &MemoryParams,
) {
    if memory.seasonal.season != season {
        memory.seasonal = SeasonalTotals::new(season);
    }

    for event in events {
        let harmful = is_harmful(event);
        let escaped = escape_outcome(event);
        let predator = is_predator_event(event);
        let foraging = is_foraging_event(event);
        let source = threat_source(event);

        memory.recent_events.insert(
            0,
            EventMemoryEntry {
                turn,
                event_id: event.id().to_owned(),
                category: event.definition.category,
                choice_id: event.choice_id.clone(),
                harmful,
                escaped,
                location: location.to_owned(),
                tags: event.definition.tags.clone(),
            },
        );

        let node = memory.nodes.entry(location.to_owned()).or_default();
        let mark_source = source.map_or_else(|| event.id().to_owned(), str::to_owned);
        if harmful && predator {
            node.kill_count = node.kill_count.saturating_add(1);
            node.last_kill_turn = turn;
            node.perceived_danger = (node.perceived_danger + params.danger_spike).min(DANGER_MAX);
            node.scent_marks.push(ScentMark {
                source: mark_source.clone(),
                turn,
                kind: ScentKind::PredatorKill,
            });
        }
        if escaped == Some(true) {
            node.scent_marks.push(ScentMark {
                source: mark_source,
                turn,
                kind: ScentKind::Alarm,
            });
        }
        if foraging {
            node.foraging_pressure += params.forage_pressure_step;
        }

        if let Some(source) = source {
            let score = severity(event);
            let threat = memory
                .threats
                .entry(source.to_owned())
                .or_insert_with(|| ThreatAssessment {
                    source: source.to_owned(),
                    recent_encounters: 0,
                    last_encounter_turn: turn,
                    average_severity: 0.0,
                });
            let previous = f64::from(threat.recent_encounters);
            threat.recent_encounters = threat.recent_encounters.saturating_add(1);
            threat.last_encounter_turn = turn;
            threat.average_severity = (threat.average_severity * previous + score)
                / f64::from(threat.recent_encounters);
        }

        let totals = &mut memory.seasonal;
        if foraging {
            totals.foraging_events = totals.foraging_events.saturating_add(1);
            if !harmful {
                totals.foraging_successes = totals.foraging_successes.saturating_add(1);
            }
        }
        if predator {
            totals.predator_encounters = totals.predator_encounters.saturating_add(1);
            if escaped == Some(true) {
                totals.predator_escapes = totals.predator_escapes.saturating_add(1);
            }
        }
        if harmful {
            totals.harm_events = totals.harm_events.saturating_add(1);
        }
        let (gained, lost) = weight_deltas(event);
        totals.calories_gained += gained;
        totals.calories_lost += lost;
    }

    memory.recent_events.truncate(params.max_recent_events);

    let here = memory.nodes.entry(location.to_owned()).or_default();
    here.turns_occupied = here.turns_occupied.saturating_add(1);
    memory.seasonal.locations_visited.insert(location.to_owned());

    for node in memory.nodes.values_mut() {
        node.foraging_pressure = (node.foraging_pressure - params.forage_pressure_decay).max(0.0);
        node.perceived_danger = (node.perceived_danger - params.danger_decay).max(0.0);
        node.scent_marks
            .retain(|m| turn.saturating_sub(m.turn) < params.scent_fade_turns);
    }

    memory.threats.retain(|_, threat| {
        if turn.saturating_sub(threat.last_encounter_turn) > params.threat_window_turns {
            threat.recent_encounters = threat.recent_encounters.saturating_sub(1);
        }
        threat.recent_encounters > 0
    });

    debug!(turn, events = events.len(), location, "World memory updated");
}

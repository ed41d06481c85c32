//! Event selector.
//!
//! Each turn the selector filters the species catalogue down to the
//! eligible events, fires any eligible milestone, then draws the turn's
//! active and passive events by weighted sampling without replacement.
//!
//! # Eligibility
//!
//! An event is eligible when it is not on cooldown, every one of its
//! conditions holds, and (for guaranteed events) it has not fired before.
//!
//! # Weighting
//!
//! The draw weight of an event is its base weight times the multiplier of
//! the session's [`SelectionBias`]. [`BehavioralBias`] follows the player's
//! behavioural settings and the animal's condition; [`MemoryBias`] steers
//! away from predator events where the animal has learned to expect them.
//! Biases compose as tuples.

use std::collections::{BTreeMap, BTreeSet};

use reckoning_types::{
    BehavioralSettings, EventCategory, EventType, GameEvent, GameRng, ResolvedEvent,
    ResolvedSubEvent, StatId, WorldMemory,
};
use reckoning_world::memory::{FORAGING_TAGS, PREDATOR_TAGS};
use reckoning_world::weather::category_multiplier;
use tracing::debug;

use crate::conditions::{ConditionContext, all_hold};
use crate::config::{DifficultyConfig, SelectionConfig};
use crate::narrative::render;

// ---------------------------------------------------------------------------
// Cooldowns
// ---------------------------------------------------------------------------

/// Count every cooldown down by one turn, dropping the ones that expire.
///
/// Run once at the start of each turn, before selection. An event put on a
/// cooldown of `n` at turn `t` becomes eligible again at turn `t + n`.
pub fn tick_cooldowns(cooldowns: &mut BTreeMap<String, u32>) {
    cooldowns.retain(|_, turns| {
        if *turns > 1 {
            *turns = turns.saturating_sub(1);
            true
        } else {
            false
        }
    });
}

// ---------------------------------------------------------------------------
// Bias
// ---------------------------------------------------------------------------

/// Everything a bias may look at.
#[derive(Debug, Clone, Copy)]
pub struct BiasContext<'a> {
    /// Animal, calendar, NPCs, ecosystem and weather.
    pub conditions: ConditionContext<'a>,
    /// The player's behavioural settings.
    pub behavior: &'a BehavioralSettings,
    /// The animal's world memory.
    pub memory: &'a WorldMemory,
    /// Difficulty multipliers.
    pub difficulty: &'a DifficultyConfig,
}

/// Pluggable scoring hook for event selection.
pub trait SelectionBias {
    /// Multiplier applied to `event`'s base weight. Values below zero are
    /// treated as zero.
    fn multiplier(&self, event: &GameEvent, ctx: &BiasContext<'_>) -> f64;
}

impl<A: SelectionBias, B: SelectionBias> SelectionBias for (A, B) {
    fn multiplier(&self, event: &GameEvent, ctx: &BiasContext<'_>) -> f64 {
        self.0.multiplier(event, ctx) * self.1.multiplier(event, ctx)
    }
}

/// Bias from behavioural settings, stats, weather and difficulty.
///
/// | Tags | Multiplier (setting `s` in 1..=5) |
/// |------|-----------------------------------|
/// | foraging, food | `0.5 + s * 0.3` |
/// | predator, danger | `1.5 - caution * 0.2`, times the predator factor |
/// | social, herd | `0.5 + s * 0.3` |
/// | mating, reproductive | `0.3 + s * 0.3` |
/// | exploration, travel | `0.5 + s * 0.3` |
/// | confrontation, territorial | `0.3 + belligerence * 0.3` |
///
/// Tag multipliers and the predator factor only apply to active events;
/// the stat and weather context applies to every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct BehavioralBias;

impl BehavioralBias {
    fn tag_multiplier(event: &GameEvent, behavior: &BehavioralSettings) -> f64 {
        let b = behavior.clamped();
        let tagged = |tags: &[&str]| tags.iter().any(|t| event.has_tag(t));
        let mut mult = 1.0;
        if tagged(&FORAGING_TAGS) {
            mult *= 0.5 + f64::from(b.foraging) * 0.3;
        }
        if tagged(&["predator", "danger"]) {
            mult *= 1.5 - f64::from(b.caution) * 0.2;
        }
        if tagged(&["social", "herd"]) {
            mult *= 0.5 + f64::from(b.sociability) * 0.3;
        }
        if tagged(&["mating", "reproductive"]) {
            mult *= 0.3 + f64::from(b.mating) * 0.3;
        }
        if tagged(&["exploration", "travel"]) {
            mult *= 0.5 + f64::from(b.exploration) * 0.3;
        }
        if tagged(&["confrontation", "territorial"]) {
            mult *= 0.3 + f64::from(b.belligerence) * 0.3;
        }
        mult
    }

    #[allow(clippy::suboptimal_flops)]
    fn context_multiplier(event: &GameEvent, ctx: &ConditionContext<'_>) -> f64 {
        let stat = |id: StatId| ctx.animal.stats.effective(id) / 100.0;
        let mut mult = match event.category {
            EventCategory::Psychological => 0.5 + stat(StatId::Tra) * 1.5,
            EventCategory::Health => {
                (1.5 - stat(StatId::Hea)) * (0.8 + stat(StatId::Imm) * 0.8)
            }
            EventCategory::Environmental | EventCategory::Seasonal => {
                0.7 + stat(StatId::Cli)
            }
            EventCategory::Migration => 0.6 + stat(StatId::Nov),
            EventCategory::Predator => 0.7 + stat(StatId::Adv) * 0.8,
            EventCategory::Foraging | EventCategory::Social | EventCategory::Reproduction => 1.0,
        };
        if let Some(weather) = ctx.weather {
            mult *= category_multiplier(event.category, weather);
        }
        mult
    }
}

impl SelectionBias for BehavioralBias {
    fn multiplier(&self, event: &GameEvent, ctx: &BiasContext<'_>) -> f64 {
        let mut mult = Self::context_multiplier(event, &ctx.conditions);
        if event.event_type == EventType::Active {
            mult *= Self::tag_multiplier(event, ctx.behavior);
            if event.tags.iter().any(|t| t == "predator" || t == "danger") {
                mult *= ctx.difficulty.predator_encounter_factor;
            }
        }
        mult
    }
}

/// Bias from world memory: predator events become rarer where the animal
/// has learned to expect danger, down to `1 - max_reduction` at a
/// perceived danger of 100.
#[derive(Debug, Clone, Copy)]
pub struct MemoryBias {
    /// Largest fractional reduction.
    pub max_reduction: f64,
}

impl Default for MemoryBias {
    fn default() -> Self {
        Self { max_reduction: 0.5 }
    }
}

impl SelectionBias for MemoryBias {
    fn multiplier(&self, event: &GameEvent, ctx: &BiasContext<'_>) -> f64 {
        if !PREDATOR_TAGS.iter().any(|t| event.has_tag(t)) {
            return 1.0;
        }
        let danger = ctx.memory.perceived_danger(&ctx.conditions.animal.region);
        1.0 - (danger / 100.0).clamp(0.0, 1.0) * self.max_reduction.clamp(0.0, 1.0)
    }
}

/// The bias a session uses unless told otherwise.
pub type DefaultBias = (BehavioralBias, MemoryBias);

// ---------------------------------------------------------------------------
// Illustrations
// ---------------------------------------------------------------------------

/// Resolves an event's illustration to a concrete asset reference.
pub trait IllustrationPicker {
    /// Asset for `event`, if any.
    fn pick(&self, event: &GameEvent, rng: &mut GameRng) -> Option<String>;
}

/// Uses the event's own `image` as-is. Never draws from the stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderIllustrations;

impl IllustrationPicker for PlaceholderIllustrations {
    fn pick(&self, event: &GameEvent, _rng: &mut GameRng) -> Option<String> {
        event.image.clone()
    }
}

/// Picks from asset pools: the event's own image first, then the pool of
/// its first tag that has one, then its category pool.
#[derive(Debug, Clone, Default)]
pub struct PoolIllustrations {
    /// Assets by event tag.
    pub by_tag: BTreeMap<String, Vec<String>>,
    /// Assets by event category.
    pub by_category: BTreeMap<EventCategory, Vec<String>>,
}

impl IllustrationPicker for PoolIllustrations {
    fn pick(&self, event: &GameEvent, rng: &mut GameRng) -> Option<String> {
        if let Some(image) = &event.image {
            return Some(image.clone());
        }
        let pool = event
            .tags
            .iter()
            .filter_map(|t| self.by_tag.get(t))
            .find(|p| !p.is_empty())
            .or_else(|| self.by_category.get(&event.category))?;
        rng.pick(pool).cloned()
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Draws a turn's events from a species catalogue.
pub struct EventSelector<'a> {
    /// The species' event catalogue.
    pub catalogue: &'a [GameEvent],
    /// Per-turn event limits.
    pub limits: &'a SelectionConfig,
    /// Weight multiplier.
    pub bias: &'a dyn SelectionBias,
    /// Illustration resolution.
    pub illustrations: &'a dyn IllustrationPicker,
}

impl EventSelector<'_> {
    /// Whether `event` may be selected right now.
    pub fn is_eligible(
        event: &GameEvent,
        ctx: &ConditionContext<'_>,
        cooldowns: &BTreeMap<String, u32>,
        fired_milestones: &BTreeSet<String>,
    ) -> bool {
        !cooldowns.contains_key(&event.id)
            && !(event.guaranteed && fired_milestones.contains(&event.id))
            && all_hold(&event.conditions, ctx)
    }

    /// Select this turn's events.
    ///
    /// Selected events are put on cooldown and fired milestones recorded.
    /// Output order: milestones in catalogue order, then active events,
    /// then passive events, each in draw order.
    pub fn select(
        &self,
        ctx: &BiasContext<'_>,
        cooldowns: &mut BTreeMap<String, u32>,
        fired_milestones: &mut BTreeSet<String>,
        rng: &mut GameRng,
    ) -> Vec<ResolvedEvent> {
        let eligible: Vec<&GameEvent> = self
            .catalogue
            .iter()
            .filter(|e| Self::is_eligible(e, &ctx.conditions, cooldowns, fired_milestones))
            .collect();

        let mut picked: Vec<&GameEvent> = eligible.iter().copied().filter(|e| e.guaranteed).collect();
        for milestone in &picked {
            fired_milestones.insert(milestone.id.clone());
        }

        let (active_pool, passive_pool): (Vec<&GameEvent>, Vec<&GameEvent>) = eligible
            .iter()
            .copied()
            .filter(|e| !e.guaranteed)
            .partition(|e| e.event_type == EventType::Active);

        if !active_pool.is_empty() {
            let count = draw_count(1, self.limits.max_active_events, active_pool.len(), rng);
            picked.extend(self.sample(&active_pool, count, ctx, rng));
        }
        if !passive_pool.is_empty() {
            let min = usize::from(active_pool.is_empty());
            let count = draw_count(min, self.limits.max_passive_events, passive_pool.len(), rng);
            picked.extend(self.sample(&passive_pool, count, ctx, rng));
        }

        debug!(
            eligible = eligible.len(),
            selected = picked.len(),
            "Events drawn"
        );

        picked
            .into_iter()
            .map(|event| {
                if let Some(turns) = event.cooldown.filter(|t| *t > 0) {
                    cooldowns.insert(event.id.clone(), turns);
                }
                self.realise(event, &ctx.conditions, rng)
            })
            .collect()
    }

    fn sample<'e>(
        &self,
        pool: &[&'e GameEvent],
        count: usize,
        ctx: &BiasContext<'_>,
        rng: &mut GameRng,
    ) -> Vec<&'e GameEvent> {
        let mut weights: Vec<f64> = pool
            .iter()
            .map(|e| e.weight.max(0.0) * self.bias.multiplier(e, ctx).max(0.0))
            .collect();
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            let Some(idx) = rng.weighted_index(&weights) else {
                break;
            };
            if let (Some(event), Some(w)) = (pool.get(idx), weights.get_mut(idx)) {
                out.push(*event);
                *w = 0.0;
            }
        }
        out
    }

    fn realise(&self, event: &GameEvent, ctx: &ConditionContext<'_>, rng: &mut GameRng) -> ResolvedEvent {
        let narrative = render(&event.narrative_text, ctx.animal, ctx.species);

        let mut sub_events = Vec::new();
        for sub in &event.sub_events {
            if all_hold(&sub.conditions, ctx) && rng.chance(sub.chance) {
                sub_events.push(ResolvedSubEvent {
                    event_id: sub.event_id.clone(),
                    narrative_text: render(&sub.narrative_text, ctx.animal, ctx.species),
                    footnote: sub.footnote.clone(),
                    stat_effects: sub.stat_effects.clone(),
                    consequences: sub.consequences.clone(),
                });
            }
        }

        let image = self.illustrations.pick(event, rng);
        ResolvedEvent {
            definition: event.clone(),
            narrative,
            image,
            choice_id: None,
            sub_events,
            lethal_outcome: false,
        }
    }
}

/// Slot count in `min..=min(max, available)`.
fn draw_count(min: usize, max: usize, available: usize, rng: &mut GameRng) -> usize {
    let hi = max.min(available);
    let lo = min.min(hi);
    let (Ok(lo64), Ok(hi64)) = (i64::try_from(lo), i64::try_from(hi)) else {
        return lo;
    };
    usize::try_from(rng.int(lo64, hi64)).unwrap_or(lo)
}

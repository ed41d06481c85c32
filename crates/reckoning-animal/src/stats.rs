//! Stat modifier bookkeeping.
//!
//! Modifiers are keyed two ways: by `id` (unique per application) and by
//! `source` (shared by everything one parasite, injury or age phase adds).
//! Source-keyed helpers let a system replace its whole contribution at once.

use reckoning_types::{StatBlock, StatEffect, StatModifier};

/// Add a content stat effect as a modifier.
///
/// Durations of `None` or zero are permanent. `serial` makes the modifier id
/// unique and is advanced by one.
pub fn apply_stat_effect(stats: &mut StatBlock, effect: &StatEffect, source: &str, serial: &mut u64) {
    let id = format!("{source}#{serial}");
    *serial = serial.saturating_add(1);
    stats.entry(effect.stat).modifiers.push(StatModifier {
        id,
        source: source.to_owned(),
        amount: effect.amount,
        turns_remaining: effect.duration.filter(|d| *d > 0),
    });
}

/// Remove every modifier contributed by `source`. Returns how many went.
pub fn remove_modifiers_by_source(stats: &mut StatBlock, source: &str) -> usize {
    let mut removed = 0usize;
    for value in stats.values.values_mut() {
        let before = value.modifiers.len();
        value.modifiers.retain(|m| m.source != source);
        removed = removed.saturating_add(before.saturating_sub(value.modifiers.len()));
    }
    removed
}

/// Replace the permanent modifiers contributed by `source` with `effects`.
///
/// Effect durations are ignored: source-keyed modifiers live until the
/// source removes them.
pub fn set_source_modifiers(stats: &mut StatBlock, source: &str, effects: &[StatEffect]) {
    remove_modifiers_by_source(stats, source);
    for (i, effect) in effects.iter().enumerate() {
        stats.entry(effect.stat).modifiers.push(StatModifier {
            id: format!("{source}:{i}"),
            source: source.to_owned(),
            amount: effect.amount,
            turns_remaining: None,
        });
    }
}

/// Count down timed modifiers and drop the expired ones.
///
/// Returns the number of modifiers that expired this tick.
pub fn tick_modifiers(stats: &mut StatBlock) -> usize {
    let mut expired = 0usize;
    for value in stats.values.values_mut() {
        for m in &mut value.modifiers {
            if let Some(turns) = m.turns_remaining.as_mut() {
                *turns = turns.saturating_sub(1);
            }
        }
        let before = value.modifiers.len();
        value.modifiers.retain(|m| m.turns_remaining != Some(0));
        expired = expired.saturating_add(before.saturating_sub(value.modifiers.len()));
    }
    expired
}

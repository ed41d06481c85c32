//! Per-turn vital mechanics applied before events are selected.
//!
//! # Order of operations
//!
//! 1. Age the animal by the months that elapsed
//! 2. Count down timed stat modifiers
//! 3. Refresh the starvation debuff on HEA
//! 4. Apply passive seasonal weight change
//! 5. Sync age-phase flags and modifiers
//! 6. Move between seasonal ranges (migratory species)

use reckoning_types::{AnimalState, Season, SpeciesConfig, StatEffect, StatId, WeightConfig};
use tracing::debug;

use crate::stats::{remove_modifiers_by_source, set_source_modifiers, tick_modifiers};

/// Modifier source of the starvation debuff.
pub const STARVATION_SOURCE: &str = "starvation-debuff";

/// Inputs to a vitals tick that come from outside the animal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VitalsContext {
    /// Season of the turn being played.
    pub season: Season,
    /// Months that elapsed since the previous turn.
    pub months_elapsed: u32,
    /// The foraging behavioural setting (1..=5).
    pub foraging_setting: u8,
    /// Multiplier on passive weight gain.
    pub weight_gain_factor: f64,
    /// Multiplier on passive weight loss.
    pub weight_loss_factor: f64,
    /// Territory quality multiplier on passive gain (1.0 without territory).
    pub territory_modifier: f64,
    /// Extra passive weight change from weather.
    pub weather_weight_change: f64,
}

/// What a vitals tick changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VitalsTickResult {
    /// Net weight change applied.
    pub weight_change: f64,
    /// Timed modifiers that expired.
    pub expired_modifiers: usize,
    /// Player-facing narratives.
    pub narratives: Vec<String>,
}

/// Change weight, clamped to the species floor and optional ceiling.
///
/// Returns the change actually applied. Dead animals are not touched.
pub fn modify_weight(animal: &mut AnimalState, amount: f64, limits: &WeightConfig) -> f64 {
    if !animal.alive || amount.is_nan() {
        return 0.0;
    }
    let mut next = (animal.weight + amount).max(limits.min_floor);
    if let Some(max) = limits.max_weight {
        next = next.min(max.max(limits.min_floor));
    }
    let applied = next - animal.weight;
    animal.weight = next;
    applied
}

/// Apply one turn of vitals to a living animal.
pub fn apply_vitals_tick(
    animal: &mut AnimalState,
    config: &SpeciesConfig,
    ctx: &VitalsContext,
) -> VitalsTickResult {
    let mut result = VitalsTickResult::default();
    if !animal.alive {
        return result;
    }

    // 1. Age
    animal.age_months = animal.age_months.saturating_add(ctx.months_elapsed);

    // 2. Timed modifiers
    result.expired_modifiers = tick_modifiers(&mut animal.stats);

    // 3. Starvation debuff
    refresh_starvation_debuff(animal, &config.weight);

    // 4. Seasonal weight
    let foraging = f64::from(ctx.foraging_setting.clamp(1, 5));
    let mut change = config.seasonal_weight.for_season(ctx.season)
        + config.seasonal_weight.foraging_bonus * foraging
        + ctx.weather_weight_change;
    if change > 0.0 {
        change *= ctx.weight_gain_factor * ctx.territory_modifier;
    } else {
        change *= ctx.weight_loss_factor;
    }
    if change.abs() > f64::EPSILON {
        result.weight_change = modify_weight(animal, change, &config.weight);
    }

    // 5. Age phases
    if let Some(label) = sync_age_phases(animal, config) {
        result.narratives.push(format!("You have entered a new stage of life: {label}."));
    }

    // 6. Migration
    if let Some(line) = apply_migration(animal, config, ctx.season) {
        result.narratives.push(line);
    }

    debug!(
        weight = animal.weight,
        weight_change = result.weight_change,
        age_months = animal.age_months,
        "Vitals applied"
    );
    result
}

#[allow(clippy::suboptimal_flops)]
fn refresh_starvation_debuff(animal: &mut AnimalState, weight: &WeightConfig) {
    remove_modifiers_by_source(&mut animal.stats, STARVATION_SOURCE);
    let span = weight.starvation_debuff - weight.starvation_death;
    if animal.weight < weight.starvation_debuff && animal.weight >= weight.starvation_death && span > 0.0 {
        let severity = (weight.starvation_debuff - animal.weight) / span;
        let penalty = (severity * weight.debuff_max_penalty).round();
        set_source_modifiers(
            &mut animal.stats,
            STARVATION_SOURCE,
            &[StatEffect {
                stat: StatId::Hea,
                amount: -penalty,
                duration: None,
                label: "Near-starvation".to_owned(),
            }],
        );
    }
}

/// Put the animal in the age phase matching its age.
///
/// Each phase's id doubles as a flag while active. Returns the label of a
/// phase entered this call.
fn sync_age_phases(animal: &mut AnimalState, config: &SpeciesConfig) -> Option<String> {
    let mut entered = None;
    for phase in &config.age_phases {
        let active = animal.age_months >= phase.min_age
            && phase.max_age.is_none_or(|max| animal.age_months < max);
        let source = format!("age-phase:{}", phase.id);
        if active {
            if animal.flags.insert(phase.id.clone()) {
                set_source_modifiers(&mut animal.stats, &source, &phase.stat_modifiers);
                entered = Some(phase.label.clone());
            }
        } else if animal.flags.remove(&phase.id) {
            remove_modifiers_by_source(&mut animal.stats, &source);
        }
    }
    entered
}

fn apply_migration(animal: &mut AnimalState, config: &SpeciesConfig, season: Season) -> Option<String> {
    let migration = config.migration.as_ref()?;
    if season == migration.migration_season
        && animal.has_flag(&migration.migration_flag)
        && !animal.has_flag(&migration.migrated_flag)
    {
        animal.flags.insert(migration.migrated_flag.clone());
        animal.flags.remove(&migration.return_flag);
        animal.region.clone_from(&migration.winter_region_id);
        return Some("You follow the old trails to your seasonal range.".to_owned());
    }
    if season == migration.return_season && animal.has_flag(&migration.migrated_flag) {
        animal.flags.remove(&migration.migrated_flag);
        animal.flags.remove(&migration.migration_flag);
        animal.flags.insert(migration.return_flag.clone());
        animal.region.clone_from(&config.default_region);
        return Some("You return to your home range.".to_owned());
    }
    None
}

#[cfg(test)]
mod tests {
    use reckoning_types::{AgePhase, MigrationConfig};

    use super::*;
    use crate::testing::{sample_animal, sample_bundle};

    fn ctx(season: Season) -> VitalsContext {
        VitalsContext {
            season,
            months_elapsed: 0,
            foraging_setting: 3,
            weight_gain_factor: 1.0,
            weight_loss_factor: 1.0,
            territory_modifier: 1.0,
            weather_weight_change: 0.0,
        }
    }

    #[test]
    fn weight_never_below_floor() {
        let bundle = sample_bundle();
        let mut animal = sample_animal();
        let applied = modify_weight(&mut animal, -10_000.0, &bundle.config.weight);
        assert!((animal.weight - bundle.config.weight.min_floor).abs() < f64::EPSILON);
        assert!(applied < 0.0);
    }

    #[test]
    fn weight_capped_at_maximum() {
        let mut bundle = sample_bundle();
        bundle.config.weight.max_weight = Some(120.0);
        let mut animal = sample_animal();
        modify_weight(&mut animal, 50.0, &bundle.config.weight);
        assert!((animal.weight - 120.0).abs() < f64::EPSILON);
    }

    #[test]
    fn dead_animals_do_not_change_weight() {
        let bundle = sample_bundle();
        let mut animal = sample_animal();
        animal.alive = false;
        assert!(modify_weight(&mut animal, 5.0, &bundle.config.weight).abs() < f64::EPSILON);
        assert!((animal.weight - 110.0).abs() < f64::EPSILON);
    }

    #[test]
    fn seasonal_gain_scaled_by_territory() {
        let mut bundle = sample_bundle();
        bundle.config.seasonal_weight.summer = 1.0;
        bundle.config.seasonal_weight.foraging_bonus = 0.5;
        let mut animal = sample_animal();
        let mut c = ctx(Season::Summer);
        c.territory_modifier = 1.3;
        let result = apply_vitals_tick(&mut animal, &bundle.config, &c);
        // (1.0 + 0.5 * 3) * 1.3
        assert!((result.weight_change - 3.25).abs() < 1e-9);
    }

    #[test]
    fn starvation_debuff_scales_with_deficit() {
        let bundle = sample_bundle();
        let mut animal = sample_animal();
        // debuff at 80, death at 60, max penalty 20: weight 70 gives -10 HEA
        animal.weight = 70.0;
        let hea = animal.stats.effective(StatId::Hea);
        apply_vitals_tick(&mut animal, &bundle.config, &ctx(Season::Spring));
        assert!((animal.stats.effective(StatId::Hea) - (hea - 10.0)).abs() < f64::EPSILON);

        animal.weight = 100.0;
        apply_vitals_tick(&mut animal, &bundle.config, &ctx(Season::Spring));
        assert!((animal.stats.effective(StatId::Hea) - hea).abs() < f64::EPSILON);
    }

    #[test]
    fn age_phase_flag_follows_age() {
        let mut bundle = sample_bundle();
        bundle.config.age_phases = vec![AgePhase {
            id: "prime".to_owned(),
            label: "Prime".to_owned(),
            min_age: 24,
            max_age: Some(96),
            stat_modifiers: Vec::new(),
        }];
        let mut animal = sample_animal();
        animal.age_months = 23;
        let mut c = ctx(Season::Spring);
        c.months_elapsed = 1;
        let result = apply_vitals_tick(&mut animal, &bundle.config, &c);
        assert!(animal.has_flag("prime"));
        assert_eq!(result.narratives.len(), 1);
    }

    #[test]
    fn migration_moves_and_returns() {
        let mut bundle = sample_bundle();
        bundle.config.migration = Some(MigrationConfig {
            winter_region_id: "yard".to_owned(),
            migration_flag: "will-migrate".to_owned(),
            migrated_flag: "has-migrated".to_owned(),
            return_flag: "returned".to_owned(),
            migration_season: Season::Winter,
            return_season: Season::Spring,
        });
        let mut animal = sample_animal();
        animal.flags.insert("will-migrate".to_owned());
        apply_vitals_tick(&mut animal, &bundle.config, &ctx(Season::Winter));
        assert_eq!(animal.region, "yard");
        apply_vitals_tick(&mut animal, &bundle.config, &ctx(Season::Spring));
        assert_eq!(animal.region, bundle.config.default_region);
        assert!(animal.has_flag("returned"));
    }
}

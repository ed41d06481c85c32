//! Death rolls and escape options.
//!
//! A choice carrying a [`DeathChance`] either rolls immediately or, when it
//! defines escape options, queues a [`PendingDeathRoll`] for the player.
//! Each queued roll moves `pending -> survived | fatal` once an unlocked
//! option is chosen.

use reckoning_types::{
    AnimalState, DeathChance, EscapeOption, EscapeOptionView, GameRng, PendingDeathRoll,
    SpeciesConfig, StatEffect, StatId,
};
use tracing::debug;

use crate::config::{DifficultyConfig, EscapeConfig};

/// Adversity adds up to this much to every death probability.
pub const ADVERSITY_DANGER: f64 = 0.03;

/// Why an escape option was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EscapeError {
    /// The pending roll offers no option with this id.
    #[error("unknown escape option: {option_id}")]
    UnknownOption {
        /// The requested option.
        option_id: String,
    },

    /// The option needs a flag the animal does not carry.
    #[error("escape option {option_id} requires flag {required_flag}")]
    Locked {
        /// The requested option.
        option_id: String,
        /// The missing flag.
        required_flag: String,
    },
}

/// Outcome of an escape roll.
#[derive(Debug, Clone, PartialEq)]
pub struct EscapeRoll {
    /// Probability of death that was rolled against.
    pub probability: f64,
    /// Whether the animal died.
    pub died: bool,
    /// Stat cost to pay on survival.
    pub stat_cost: Vec<StatEffect>,
}

/// Adjusted probability of death for `chance`.
///
/// A declared probability of 1 or more is certain death and skips every
/// adjustment. Otherwise stat modifiers, injuries, parasites, low weight and
/// adversity add to the base, the difficulty factor scales the sum, and the
/// result is clamped to the species bounds.
#[allow(clippy::suboptimal_flops)]
pub fn death_probability(
    chance: &DeathChance,
    animal: &AnimalState,
    species: &SpeciesConfig,
    difficulty: &DifficultyConfig,
) -> f64 {
    if chance.probability >= 1.0 {
        return 1.0;
    }
    let vuln = &species.predation;
    let count = |n: usize| f64::from(u32::try_from(n).unwrap_or(u32::MAX));

    let mut p = chance.probability;
    for modifier in &chance.stat_modifiers {
        p += animal.stats.effective(modifier.stat) * modifier.factor;
    }
    p += count(animal.injuries.len()) * vuln.injury_prob_increase;
    p += count(animal.parasites.len()) * vuln.parasite_prob_increase;
    if animal.weight < vuln.underweight_threshold {
        p += (vuln.underweight_threshold - animal.weight) * vuln.underweight_factor;
    }
    p += animal.stats.effective(StatId::Adv) / 100.0 * ADVERSITY_DANGER;
    p *= difficulty.death_chance_factor;

    if p.is_nan() {
        return vuln.death_chance_min;
    }
    p.clamp(vuln.death_chance_min, vuln.death_chance_max.max(vuln.death_chance_min))
}

/// Death probability if `option` is chosen against `base`.
pub fn escape_probability(base: f64, option: &EscapeOption, escape: &EscapeConfig) -> f64 {
    let p = base - option.survival_modifier;
    if p.is_nan() {
        return escape.max_probability;
    }
    p.clamp(escape.min_probability, escape.max_probability.max(escape.min_probability))
}

/// Every option of `roll` as the player sees it, locked ones included.
pub fn escape_options_view(
    roll: &PendingDeathRoll,
    animal: &AnimalState,
    escape: &EscapeConfig,
) -> Vec<EscapeOptionView> {
    roll.escape_options
        .iter()
        .map(|option| {
            let missing = option
                .required_flag
                .as_ref()
                .filter(|flag| !animal.has_flag(flag));
            EscapeOptionView {
                option: option.clone(),
                locked: missing.is_some(),
                locked_reason: missing.map(|flag| format!("Requires: {flag}")),
                death_probability: escape_probability(roll.base_probability, option, escape),
            }
        })
        .collect()
}

/// Roll `roll` using the option `option_id`.
///
/// # Errors
///
/// Returns [`EscapeError::UnknownOption`] if the roll has no such option and
/// [`EscapeError::Locked`] if the option needs a flag the animal lacks. No
/// random draw is made in either case.
pub fn resolve_escape(
    roll: &PendingDeathRoll,
    option_id: &str,
    animal: &AnimalState,
    escape: &EscapeConfig,
    rng: &mut GameRng,
) -> Result<EscapeRoll, EscapeError> {
    let option = roll
        .escape_options
        .iter()
        .find(|o| o.id == option_id)
        .ok_or_else(|| EscapeError::UnknownOption {
            option_id: option_id.to_owned(),
        })?;
    if let Some(flag) = option.required_flag.as_ref().filter(|f| !animal.has_flag(f)) {
        return Err(EscapeError::Locked {
            option_id: option_id.to_owned(),
            required_flag: flag.clone(),
        });
    }

    let probability = escape_probability(roll.base_probability, option, escape);
    let died = rng.chance(probability);
    debug!(
        event_id = %roll.event_id,
        option_id,
        probability,
        died,
        "Escape rolled"
    );
    Ok(EscapeRoll {
        probability,
        died,
        stat_cost: option.stat_cost.clone(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use reckoning_types::StatFactor;

    use super::*;
    use crate::testing::{sample_animal, sample_bundle};

    fn chance(probability: f64) -> DeathChance {
        DeathChance {
            probability,
            cause: "Caught".to_owned(),
            stat_modifiers: Vec::new(),
            escape_options: Vec::new(),
        }
    }

    fn option(id: &str, modifier: f64, flag: Option<&str>) -> EscapeOption {
        EscapeOption {
            id: id.to_owned(),
            label: id.to_owned(),
            description: String::new(),
            survival_modifier: modifier,
            stat_cost: Vec::new(),
            required_flag: flag.map(str::to_owned),
        }
    }

    fn pending() -> PendingDeathRoll {
        PendingDeathRoll {
            event_id: "wolf-pack".to_owned(),
            choice_id: "flee".to_owned(),
            base_probability: 0.5,
            cause: "Caught".to_owned(),
            escape_options: vec![option("sprint", 0.2, None), option("thicket", 0.4, Some("knows-thicket"))],
        }
    }

    #[test]
    fn adjustments_add_up() {
        let bundle = sample_bundle();
        let mut animal = sample_animal();
        let mut dc = chance(0.2);
        dc.stat_modifiers = vec![StatFactor {
            stat: StatId::Hea,
            factor: -0.001,
        }];
        // 0.2 - 0.07 + ADV 50 -> 0.015
        let p = death_probability(&dc, &animal, &bundle.config, &DifficultyConfig::default());
        assert!((p - 0.145).abs() < 1e-9);

        // 10 under the underweight threshold at 0.01 each.
        animal.weight = 70.0;
        let p = death_probability(&dc, &animal, &bundle.config, &DifficultyConfig::default());
        assert!((p - 0.245).abs() < 1e-9);
    }

    #[test]
    fn clamped_to_species_bounds() {
        let bundle = sample_bundle();
        let animal = sample_animal();
        let hard = DifficultyConfig {
            death_chance_factor: 10.0,
            ..DifficultyConfig::default()
        };
        let p = death_probability(&chance(0.5), &animal, &bundle.config, &hard);
        assert!((p - 0.9).abs() < 1e-9);
        let p = death_probability(&chance(0.0), &animal, &bundle.config, &DifficultyConfig::default());
        assert!((p - 0.015).abs() < 1e-9);
    }

    #[test]
    fn certain_death_skips_adjustments() {
        let bundle = sample_bundle();
        let animal = sample_animal();
        let p = death_probability(&chance(1.0), &animal, &bundle.config, &DifficultyConfig::default());
        assert!((p - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn locked_options_are_shown_with_a_reason() {
        let animal = sample_animal();
        let views = escape_options_view(&pending(), &animal, &EscapeConfig::default());
        assert_eq!(views.len(), 2);
        let sprint = views.first().unwrap();
        assert!(!sprint.locked);
        assert!((sprint.death_probability - 0.3).abs() < 1e-9);
        let thicket = views.get(1).unwrap();
        assert!(thicket.locked);
        assert_eq!(thicket.locked_reason.as_deref(), Some("Requires: knows-thicket"));
    }

    #[test]
    fn locked_option_is_rejected_without_drawing() {
        let animal = sample_animal();
        let mut rng = GameRng::new(4);
        let before = rng.state();
        let err = resolve_escape(&pending(), "thicket", &animal, &EscapeConfig::default(), &mut rng);
        assert_eq!(
            err,
            Err(EscapeError::Locked {
                option_id: "thicket".to_owned(),
                required_flag: "knows-thicket".to_owned(),
            })
        );
        assert_eq!(rng.state(), before);

        let err = resolve_escape(&pending(), "fly", &animal, &EscapeConfig::default(), &mut rng);
        assert!(matches!(err, Err(EscapeError::UnknownOption { .. })));
    }

    #[test]
    fn unlocked_option_rolls_clamped_probability() {
        let mut animal = sample_animal();
        animal.flags.insert("knows-thicket".to_owned());
        let mut roll = pending();
        roll.base_probability = 0.2;
        let mut rng = GameRng::new(4);
        let outcome = resolve_escape(&roll, "thicket", &animal, &EscapeConfig::default(), &mut rng).unwrap();
        assert!((outcome.probability - 0.01).abs() < 1e-9);
    }
}

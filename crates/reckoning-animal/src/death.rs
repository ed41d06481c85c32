//! Terminal death conditions checked at the end of every turn.
//!
//! Conditions are checked in a fixed order and the first one that applies
//! ends the game:
//!
//! 1. HEA depleted to zero
//! 2. Weight below the starvation threshold
//! 3. A parasite at its critical stage (random roll per parasite)
//! 4. Old age past onset (escalating random roll)
//! 5. Semelparous parent after spawning

use reckoning_types::{AnimalState, GameRng, ReproductionState, SpeciesBundle, StatId};
use tracing::info;

use crate::health::critical_parasites;

/// Why the animal died of natural causes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeathCause {
    /// HEA reached zero.
    HealthDepletion,
    /// Weight fell below the starvation threshold.
    Starvation,
    /// A parasite at its final stage proved fatal.
    Disease {
        /// Display name of the parasite.
        parasite: String,
    },
    /// The old-age roll came up.
    OldAge {
        /// Age in whole years.
        years: u32,
    },
    /// The semelparous life cycle completed.
    PostSpawning,
}

impl core::fmt::Display for DeathCause {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::HealthDepletion => write!(f, "Your body, exhausted and failing, gave out."),
            Self::Starvation => write!(f, "Starved to death."),
            Self::Disease { parasite } => write!(
                f,
                "Died from complications of {parasite}. The infection reached a critical stage your body could not overcome."
            ),
            Self::OldAge { years } => write!(f, "Died of old age at {years} years."),
            Self::PostSpawning => write!(
                f,
                "Having completed the spawning that was your life's purpose, your body gives out."
            ),
        }
    }
}

/// Mark the animal dead. Returns `false` if it was already dead.
///
/// The cause is only recorded on the first call; death is final.
pub fn kill(animal: &mut AnimalState, cause: &str) -> bool {
    if !animal.alive {
        return false;
    }
    animal.alive = false;
    animal.cause_of_death = Some(cause.to_owned());
    info!(cause, "Animal died");
    true
}

/// Per-turn old-age death chance for an animal of `age_months`.
pub fn old_age_chance(age_months: u32, bundle: &SpeciesBundle) -> f64 {
    let age = &bundle.config.age;
    if age_months <= age.old_age_onset_months {
        return 0.0;
    }
    let years_over = f64::from(age_months.saturating_sub(age.old_age_onset_months)) / 12.0;
    (age.old_age_base_chance * age.old_age_escalation.powf(years_over)).min(age.max_old_age_chance)
}

/// Check every terminal condition in order.
///
/// Rolls consume the shared stream only for conditions that are reached.
/// Returns `None` if the animal survives or is already dead.
pub fn check_terminal_death(
    animal: &AnimalState,
    bundle: &SpeciesBundle,
    reproduction: &ReproductionState,
    rng: &mut GameRng,
) -> Option<DeathCause> {
    if !animal.alive {
        return None;
    }
    let config = &bundle.config;

    if animal.stats.effective(StatId::Hea) <= 0.0 {
        return Some(DeathCause::HealthDepletion);
    }

    if animal.weight < config.weight.starvation_death {
        return Some(DeathCause::Starvation);
    }

    for parasite_id in critical_parasites(animal, bundle) {
        if rng.chance(config.disease_death_chance_at_critical) {
            let name = bundle
                .parasite(parasite_id)
                .map_or_else(|| parasite_id.to_owned(), |d| d.name.clone());
            return Some(DeathCause::Disease { parasite: name });
        }
    }

    if animal.age_months > config.age.old_age_onset_months
        && rng.chance(old_age_chance(animal.age_months, bundle))
    {
        return Some(DeathCause::OldAge {
            years: animal.age_months / 12,
        });
    }

    if let ReproductionState::Semelparous { spawned: true, .. } = reproduction {
        return Some(DeathCause::PostSpawning);
    }

    None
}

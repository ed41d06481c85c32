//! Construction of a fresh animal from a species bundle.

use std::collections::BTreeSet;

use reckoning_types::{AnimalState, LifetimeCounters, Sex, SpeciesBundle, StatBlock};
use tracing::debug;

use crate::error::AnimalError;
use crate::stats::set_source_modifiers;

/// Modifier source for a backstory's permanent adjustments.
pub fn backstory_source(backstory_id: &str) -> String {
    format!("backstory:{backstory_id}")
}

/// Build the starting animal for `sex`, optionally shaped by a backstory.
///
/// Stats start from the species base values; a backstory adds its flags and
/// permanent stat adjustments.
pub fn create_animal(
    bundle: &SpeciesBundle,
    sex: Sex,
    backstory_id: Option<&str>,
) -> Result<AnimalState, AnimalError> {
    let config = &bundle.config;
    let weight = match sex {
        Sex::Male => config.starting_weight.male,
        Sex::Female => config.starting_weight.female,
    };

    let mut animal = AnimalState {
        species_id: config.id.clone(),
        sex,
        age_months: config.age.starting_age_months,
        weight,
        stats: StatBlock::from_base(&config.base_stats),
        parasites: Vec::new(),
        injuries: Vec::new(),
        flags: BTreeSet::new(),
        region: config.default_region.clone(),
        alive: true,
        cause_of_death: None,
        counters: LifetimeCounters::default(),
        backstory_id: None,
    };

    if let Some(id) = backstory_id {
        let backstory = bundle
            .backstories
            .iter()
            .find(|b| b.id == id)
            .ok_or_else(|| AnimalError::UnknownBackstory {
                backstory_id: id.to_owned(),
            })?;
        animal.flags.extend(backstory.flags.iter().cloned());
        set_source_modifiers(
            &mut animal.stats,
            &backstory_source(id),
            &backstory.stat_adjustments,
        );
        animal.backstory_id = Some(id.to_owned());
    }

    debug!(species = %config.id, ?sex, weight, "Animal created");
    Ok(animal)
}

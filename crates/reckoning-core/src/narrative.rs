//! Narrative templating.
//!
//! Event text may reference `{{animal.species}}`, `{{animal.region}}`,
//! `{{animal.sex_pronoun}}` and any `{{species.<key>}}` from the species'
//! template variables. Unknown variables are left in place.

use reckoning_types::{AnimalState, SpeciesConfig};

/// Fill template variables in `template`.
pub fn render(template: &str, animal: &AnimalState, species: &SpeciesConfig) -> String {
    if !template.contains("{{") {
        return template.to_owned();
    }
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let (before, tail) = rest.split_at(start);
        out.push_str(before);
        let Some(end) = tail.find("}}") else {
            out.push_str(tail);
            return out;
        };
        let (token, after) = tail.split_at(end.saturating_add(2));
        let key = token.trim_start_matches("{{").trim_end_matches("}}").trim();
        match lookup(key, animal, species) {
            Some(value) => out.push_str(&value),
            None => out.push_str(token),
        }
        rest = after;
    }
    out.push_str(rest);
    out
}

fn lookup(key: &str, animal: &AnimalState, species: &SpeciesConfig) -> Option<String> {
    match key {
        "animal.species" => Some(species.name.clone()),
        "animal.region" => Some(animal.region.clone()),
        "animal.sex_pronoun" => Some(animal.sex.pronoun().to_owned()),
        _ => key
            .strip_prefix("species.")
            .and_then(|k| species.template_vars.get(k))
            .cloned(),
    }
}

//! Species bundle loading and offline validation.
//!
//! Bundles are YAML documents deserialised into [`SpeciesBundle`]. At runtime
//! a consequence that names missing content is a logged no-op; the
//! validation pass here finds those references before a session starts.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use reckoning_types::{Condition, Consequence, EventChoice, ReproductionConfig, SpeciesBundle};

/// Errors that can occur while loading species content.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// The bundle file could not be read.
    #[error("failed to read species bundle {}: {source}", path.display())]
    Io {
        /// File that was read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The bundle is not a valid YAML species document.
    #[error("failed to parse species bundle {}: {source}", path.display())]
    Yaml {
        /// File that was parsed.
        path: PathBuf,
        /// The underlying YAML error.
        source: serde_yml::Error,
    },

    /// Validation found problems.
    #[error("species bundle {species_id} failed validation with {count} issue(s)")]
    Invalid {
        /// Species id of the bundle.
        species_id: String,
        /// Number of issues found.
        count: usize,
    },
}

/// Read and parse a species bundle.
///
/// # Errors
///
/// Returns [`ContentError::Io`] if the file cannot be read and
/// [`ContentError::Yaml`] if it does not parse.
pub fn load_species_bundle(path: &Path) -> Result<SpeciesBundle, ContentError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.to_owned(),
        source,
    })?;
    serde_yml::from_str(&contents).map_err(|source| ContentError::Yaml {
        path: path.to_owned(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// One problem found in a bundle. `location` reads like
/// `event wolf-pack / choice flee`.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationIssue {
    /// Two events share an id.
    DuplicateEvent {
        /// The repeated id.
        event_id: String,
    },
    /// Two choices of one event share an id.
    DuplicateChoice {
        /// Where it was found.
        location: String,
        /// The repeated id.
        choice_id: String,
    },
    /// Two escape options of one death chance share an id.
    DuplicateEscapeOption {
        /// Where it was found.
        location: String,
        /// The repeated id.
        option_id: String,
    },
    /// A condition or consequence names an undefined parasite.
    UnknownParasite {
        /// Where it was found.
        location: String,
        /// The missing id.
        parasite_id: String,
    },
    /// A condition or consequence names an undefined injury.
    UnknownInjury {
        /// Where it was found.
        location: String,
        /// The missing id.
        injury_id: String,
    },
    /// `introduce_npc` for a type without a name template.
    MissingNpcTemplate {
        /// Where it was found.
        location: String,
        /// The NPC type, snake case.
        npc_type: String,
    },
    /// `modify_population` for an untracked population.
    UnknownPopulation {
        /// Where it was found.
        location: String,
        /// The population name.
        name: String,
    },
    /// An event weight below zero.
    NegativeWeight {
        /// The event.
        event_id: String,
        /// The declared weight.
        weight: f64,
    },
    /// An infinite or NaN event weight.
    NonFiniteWeight {
        /// The event.
        event_id: String,
        /// The declared weight.
        weight: f64,
    },
    /// Two storylines share an id.
    DuplicateStoryline {
        /// The repeated id.
        storyline_id: String,
    },
    /// Two steps of one storyline share an id.
    DuplicateStep {
        /// Where it was found.
        location: String,
        /// The repeated id.
        step_id: String,
    },
    /// A storyline without steps.
    EmptyStoryline {
        /// The storyline.
        storyline_id: String,
    },
    /// Two voluntary actions share an id.
    DuplicateAction {
        /// The repeated id.
        action_id: String,
    },
    /// A probability outside `[0, 1]`.
    ProbabilityOutOfRange {
        /// Where it was found.
        location: String,
        /// The declared value.
        value: f64,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateEvent { event_id } => write!(f, "duplicate event id {event_id}"),
            Self::DuplicateChoice {
                location,
                choice_id,
            } => write!(f, "{location}: duplicate choice id {choice_id}"),
            Self::DuplicateEscapeOption {
                location,
                option_id,
            } => write!(f, "{location}: duplicate escape option {option_id}"),
            Self::UnknownParasite {
                location,
                parasite_id,
            } => write!(f, "{location}: unknown parasite {parasite_id}"),
            Self::UnknownInjury {
                location,
                injury_id,
            } => write!(f, "{location}: unknown injury {injury_id}"),
            Self::MissingNpcTemplate { location, npc_type } => {
                write!(f, "{location}: no NPC template for {npc_type}")
            }
            Self::UnknownPopulation { location, name } => {
                write!(f, "{location}: untracked population {name}")
            }
            Self::NegativeWeight { event_id, weight } => {
                write!(f, "event {event_id}: negative weight {weight}")
            }
            Self::NonFiniteWeight { event_id, weight } => {
                write!(f, "event {event_id}: weight {weight} is not finite")
            }
            Self::DuplicateStoryline { storyline_id } => {
                write!(f, "duplicate storyline id {storyline_id}")
            }
            Self::DuplicateStep { location, step_id } => {
                write!(f, "{location}: duplicate step id {step_id}")
            }
            Self::EmptyStoryline { storyline_id } => {
                write!(f, "storyline {storyline_id}: no steps")
            }
            Self::DuplicateAction { action_id } => write!(f, "duplicate action id {action_id}"),
            Self::ProbabilityOutOfRange { location, value } => {
                write!(f, "{location}: probability {value} outside [0, 1]")
            }
        }
    }
}

/// Everything validation found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    /// Problems in catalogue order.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Whether the bundle is clean.
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    /// Turn the report into a result for `species_id`.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Invalid`] if any issue was found.
    pub fn into_result(self, species_id: &str) -> Result<(), ContentError> {
        if self.is_valid() {
            return Ok(());
        }
        Err(ContentError::Invalid {
            species_id: species_id.to_owned(),
            count: self.issues.len(),
        })
    }
}

/// Check every cross-reference and value range in `bundle`.
pub fn validate_bundle(bundle: &SpeciesBundle) -> ValidationReport {
    let mut v = Validator {
        bundle,
        issues: Vec::new(),
    };

    let mut seen_events = BTreeSet::new();
    for event in &bundle.events {
        if !seen_events.insert(event.id.as_str()) {
            v.issues.push(ValidationIssue::DuplicateEvent {
                event_id: event.id.clone(),
            });
        }
        if !event.weight.is_finite() {
            v.issues.push(ValidationIssue::NonFiniteWeight {
                event_id: event.id.clone(),
                weight: event.weight,
            });
        } else if event.weight < 0.0 {
            v.issues.push(ValidationIssue::NegativeWeight {
                event_id: event.id.clone(),
                weight: event.weight,
            });
        }

        let at = format!("event {}", event.id);
        v.conditions(&at, &event.conditions);
        v.consequences(&at, &event.consequences);

        let mut seen_choices = BTreeSet::new();
        for choice in &event.choices {
            if !seen_choices.insert(choice.id.as_str()) {
                v.issues.push(ValidationIssue::DuplicateChoice {
                    location: at.clone(),
                    choice_id: choice.id.clone(),
                });
            }
            v.choice(&format!("{at} / choice {}", choice.id), choice);
        }

        for sub in &event.sub_events {
            let sub_at = format!("{at} / sub-event {}", sub.event_id);
            v.probability(&sub_at, sub.chance);
            v.conditions(&sub_at, &sub.conditions);
            v.consequences(&sub_at, &sub.consequences);
        }
    }

    for (id, parasite) in &bundle.parasites {
        for (i, stage) in parasite.stages.iter().enumerate() {
            let at = format!("parasite {id} / stage {i}");
            v.probability(&at, stage.progression_chance);
            v.probability(&at, stage.remission_chance);
        }
    }
    for (id, injury) in &bundle.injuries {
        for (i, level) in injury.severity_levels.iter().enumerate() {
            v.probability(&format!("injury {id} / level {i}"), level.worsening_chance);
        }
    }

    let mut seen_storylines = BTreeSet::new();
    for story in &bundle.storylines {
        if !seen_storylines.insert(story.id.as_str()) {
            v.issues.push(ValidationIssue::DuplicateStoryline {
                storyline_id: story.id.clone(),
            });
        }
        if story.steps.is_empty() {
            v.issues.push(ValidationIssue::EmptyStoryline {
                storyline_id: story.id.clone(),
            });
        }
        let at = format!("storyline {}", story.id);
        v.probability(&at, story.start_chance);
        v.conditions(&at, &story.start_conditions);

        let mut seen_steps = BTreeSet::new();
        for step in &story.steps {
            if !seen_steps.insert(step.id.as_str()) {
                v.issues.push(ValidationIssue::DuplicateStep {
                    location: at.clone(),
                    step_id: step.id.clone(),
                });
            }
            let step_at = format!("{at} / step {}", step.id);
            v.conditions(&step_at, &step.conditions);
            v.consequences(&step_at, &step.consequences);
        }
    }

    let mut seen_actions = BTreeSet::new();
    for action in &bundle.actions {
        if !seen_actions.insert(action.id.as_str()) {
            v.issues.push(ValidationIssue::DuplicateAction {
                action_id: action.id.clone(),
            });
        }
        let at = format!("action {}", action.id);
        v.conditions(&at, &action.conditions);
        v.consequences(&at, &action.consequences);
        if let Some(outcome) = &action.outcome {
            let outcome_at = format!("{at} / outcome");
            v.probability(&outcome_at, outcome.chance);
            v.consequences(&outcome_at, &outcome.consequences);
        }
    }

    if let ReproductionConfig::Iteroparous(repro) = &bundle.config.reproduction
        && let Some(contest) = &repro.male_competition
    {
        let at = "config / male competition";
        v.injury(at, &contest.loss_injury_id);
        v.probability(at, contest.loss_injury_chance);
        v.probability(at, contest.min_win_prob);
        v.probability(at, contest.max_win_prob);
    }

    v.probability("config", bundle.config.disease_death_chance_at_critical);
    ValidationReport { issues: v.issues }
}

struct Validator<'a> {
    bundle: &'a SpeciesBundle,
    issues: Vec<ValidationIssue>,
}

impl Validator<'_> {
    fn choice(&mut self, at: &str, choice: &EventChoice) {
        self.conditions(at, &choice.conditions);
        self.consequences(at, &choice.consequences);
        let Some(death) = &choice.death_chance else {
            return;
        };
        self.probability(&format!("{at} / death chance"), death.probability);
        let mut seen = BTreeSet::new();
        for option in &death.escape_options {
            if !seen.insert(option.id.as_str()) {
                self.issues.push(ValidationIssue::DuplicateEscapeOption {
                    location: at.to_owned(),
                    option_id: option.id.clone(),
                });
            }
        }
    }

    fn conditions(&mut self, at: &str, conditions: &[Condition]) {
        for condition in conditions {
            match condition {
                Condition::HasParasite { parasite_id } | Condition::NoParasite { parasite_id } => {
                    self.parasite(at, parasite_id);
                }
                Condition::HasInjury {
                    injury_id: Some(injury_id),
                }
                | Condition::NoInjury {
                    injury_id: Some(injury_id),
                } => self.injury(at, injury_id),
                _ => {}
            }
        }
    }

    fn consequences(&mut self, at: &str, consequences: &[Consequence]) {
        for consequence in consequences {
            match consequence {
                Consequence::AddParasite { parasite_id, .. }
                | Consequence::RemoveParasite { parasite_id } => self.parasite(at, parasite_id),
                Consequence::AddInjury { injury_id, .. } => self.injury(at, injury_id),
                Consequence::IntroduceNpc { npc_type } => {
                    if self.bundle.npc_template(*npc_type).is_none() {
                        self.issues.push(ValidationIssue::MissingNpcTemplate {
                            location: at.to_owned(),
                            npc_type: format!("{npc_type:?}").to_lowercase(),
                        });
                    }
                }
                Consequence::ModifyPopulation { species_name, .. } => {
                    let tracked = self
                        .bundle
                        .config
                        .populations
                        .iter()
                        .any(|p| p.name == *species_name);
                    if !tracked {
                        self.issues.push(ValidationIssue::UnknownPopulation {
                            location: at.to_owned(),
                            name: species_name.clone(),
                        });
                    }
                }
                _ => {}
            }
        }
    }

    fn parasite(&mut self, at: &str, parasite_id: &str) {
        if self.bundle.parasite(parasite_id).is_none() {
            self.issues.push(ValidationIssue::UnknownParasite {
                location: at.to_owned(),
                parasite_id: parasite_id.to_owned(),
            });
        }
    }

    fn injury(&mut self, at: &str, injury_id: &str) {
        if self.bundle.injury(injury_id).is_none() {
            self.issues.push(ValidationIssue::UnknownInjury {
                location: at.to_owned(),
                injury_id: injury_id.to_owned(),
            });
        }
    }

    fn probability(&mut self, at: &str, value: f64) {
        if !(0.0..=1.0).contains(&value) {
            self.issues.push(ValidationIssue::ProbabilityOutOfRange {
                location: at.to_owned(),
                value,
            });
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use reckoning_types::{
        EventCategory, EventType, NpcType, StorylineDefinition, StorylineStep, VoluntaryAction,
    };

    use super::*;
    use crate::testing::{event, sample_bundle};

    #[test]
    fn fixture_bundle_is_clean() {
        let report = validate_bundle(&sample_bundle());
        assert!(report.is_valid(), "{:?}", report.issues);
    }

    #[test]
    fn dangling_references_are_reported() {
        let mut bundle = sample_bundle();
        let mut bad = event("bad", EventType::Passive, EventCategory::Health);
        bad.consequences = vec![
            Consequence::AddParasite {
                parasite_id: "lyme".to_owned(),
                start_stage: None,
            },
            Consequence::AddInjury {
                injury_id: "antler-break".to_owned(),
                severity: None,
                body_part: None,
            },
            Consequence::IntroduceNpc {
                npc_type: NpcType::Mate,
            },
            Consequence::ModifyPopulation {
                species_name: "Moose".to_owned(),
                amount: 1.0,
            },
        ];
        bundle.events.push(bad);

        let report = validate_bundle(&bundle);
        assert_eq!(report.issues.len(), 4);
        assert!(matches!(
            report.issues.first(),
            Some(ValidationIssue::UnknownParasite { parasite_id, .. }) if parasite_id == "lyme"
        ));
        assert_eq!(
            report.issues.get(2).map(ToString::to_string).as_deref(),
            Some("event bad: no NPC template for mate")
        );
        assert!(matches!(
            report.clone().into_result("test-deer"),
            Err(ContentError::Invalid { count: 4, .. })
        ));
    }

    #[test]
    fn duplicates_and_ranges_are_reported() {
        let mut bundle = sample_bundle();
        let mut dup = event("forage-browse", EventType::Passive, EventCategory::Foraging);
        dup.weight = -1.0;
        bundle.events.push(dup);
        if let Some(wolves) = bundle.events.iter_mut().find(|e| e.id == "wolf-pack") {
            let flee = wolves.choices.first_mut().unwrap();
            let death = flee.death_chance.as_mut().unwrap();
            death.probability = 1.5;
            let first = death.escape_options.first().cloned().unwrap();
            death.escape_options.push(first);
        }

        let report = validate_bundle(&bundle);
        let kinds: Vec<String> = report.issues.iter().map(ToString::to_string).collect();
        assert!(kinds.contains(&"duplicate event id forage-browse".to_owned()));
        assert!(kinds.contains(&"event forage-browse: negative weight -1".to_owned()));
        assert!(kinds.contains(&"event wolf-pack / choice flee / death chance: probability 1.5 outside [0, 1]".to_owned()));
        assert!(kinds.contains(&"event wolf-pack / choice flee: duplicate escape option sprint".to_owned()));
    }

    #[test]
    fn male_competition_references_are_checked() {
        let mut bundle = sample_bundle();
        if let ReproductionConfig::Iteroparous(repro) = &mut bundle.config.reproduction {
            let contest = repro.male_competition.as_mut().unwrap();
            contest.loss_injury_id = "antler-break".to_owned();
            contest.loss_injury_chance = 2.0;
        }
        let kinds: Vec<String> = validate_bundle(&bundle).issues.iter().map(ToString::to_string).collect();
        assert_eq!(
            kinds,
            vec![
                "config / male competition: unknown injury antler-break".to_owned(),
                "config / male competition: probability 2 outside [0, 1]".to_owned(),
            ]
        );
    }

    #[test]
    fn storylines_and_actions_are_checked() {
        let mut bundle = sample_bundle();
        let step: StorylineStep = serde_yml::from_str(
            "id: arrives\nnarrative_text: A stranger.\ncompletion_flag: stranger-seen\nconsequences:\n  - type: add_parasite\n    parasite_id: lyme\n",
        )
        .unwrap();
        bundle.storylines = vec![
            StorylineDefinition {
                id: "stranger".to_owned(),
                name: "The Stranger".to_owned(),
                start_conditions: Vec::new(),
                start_chance: 1.2,
                tags: Vec::new(),
                steps: vec![step.clone(), step],
            },
            StorylineDefinition {
                id: "silence".to_owned(),
                name: "Silence".to_owned(),
                start_conditions: Vec::new(),
                start_chance: 0.1,
                tags: Vec::new(),
                steps: Vec::new(),
            },
        ];
        let rest: VoluntaryAction = serde_yml::from_str(
            "id: rest\nlabel: Rest\nnarrative_text: You rest.\noutcome:\n  chance: -0.5\n  narrative_text: Deep sleep.\n",
        )
        .unwrap();
        bundle.actions = vec![rest.clone(), rest];

        let kinds: Vec<String> = validate_bundle(&bundle).issues.iter().map(ToString::to_string).collect();
        assert_eq!(
            kinds,
            vec![
                "storyline stranger: probability 1.2 outside [0, 1]".to_owned(),
                "storyline stranger / step arrives: unknown parasite lyme".to_owned(),
                "storyline stranger: duplicate step id arrives".to_owned(),
                "storyline stranger / step arrives: unknown parasite lyme".to_owned(),
                "storyline silence: no steps".to_owned(),
                "action rest / outcome: probability -0.5 outside [0, 1]".to_owned(),
                "duplicate action id rest".to_owned(),
                "action rest / outcome: probability -0.5 outside [0, 1]".to_owned(),
            ]
        );
    }

    #[test]
    fn non_finite_weights_are_reported() {
        let mut bundle = sample_bundle();
        let mut endless = event("endless", EventType::Passive, EventCategory::Foraging);
        endless.weight = f64::INFINITY;
        let mut unknown = event("unknown", EventType::Passive, EventCategory::Foraging);
        unknown.weight = f64::NAN;
        bundle.events.push(endless);
        bundle.events.push(unknown);

        let report = validate_bundle(&bundle);
        let kinds: Vec<String> = report.issues.iter().map(ToString::to_string).collect();
        assert_eq!(
            kinds,
            vec![
                "event endless: weight inf is not finite".to_owned(),
                "event unknown: weight NaN is not finite".to_owned(),
            ]
        );
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = load_species_bundle(Path::new("/nonexistent/species.yaml"));
        assert!(matches!(result, Err(ContentError::Io { .. })));
    }
}

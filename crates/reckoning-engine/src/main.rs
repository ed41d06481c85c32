//! Headless engine binary for Wild Reckoning.
//!
//! Plays one seeded life from start to finish with an automated decision
//! source and optionally writes a JSON save that a later run resumes.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `$RECKONING_CONFIG` (default `reckoning.yaml`)
//! 2. Initialize structured logging (tracing)
//! 3. Load and validate the species bundle
//! 4. Resume the save at `session.save_path`, or start a new session
//! 5. Run the turn loop until death or `session.max_turns`
//! 6. Write the save and log the summary

mod driver;
mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use reckoning_core::{
    DecisionMode, EngineConfig, FirstChoiceDecisions, GameSession, SeededDecisions, SessionOptions,
    load_species_bundle, validate_bundle,
};
use reckoning_types::SpeciesBundle;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// Environment variable naming the config file.
const CONFIG_ENV: &str = "RECKONING_CONFIG";

/// Config file used when `RECKONING_CONFIG` is unset.
const DEFAULT_CONFIG: &str = "reckoning.yaml";

/// Set to `json` for one JSON object per log line.
const LOG_FORMAT_ENV: &str = "RECKONING_LOG_FORMAT";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Configuration first: it carries the fallback log level.
    let config_path = std::env::var_os(CONFIG_ENV).map_or_else(|| PathBuf::from(DEFAULT_CONFIG), PathBuf::from);
    let (config, from_file) =
        load_config(&config_path).with_context(|| format!("loading {}", config_path.display()))?;

    // 2. Logging.
    init_tracing(&config.session.log_level);
    info!("reckoning-engine starting");
    if from_file {
        info!(path = %config_path.display(), "Configuration loaded");
    } else {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }

    // 3. Species bundle.
    let bundle_path = &config.session.species_bundle;
    let bundle = load_species_bundle(bundle_path)
        .map_err(EngineError::from)
        .with_context(|| format!("loading species bundle {}", bundle_path.display()))?;
    let report = validate_bundle(&bundle);
    for issue in &report.issues {
        warn!(issue = %issue, "Content problem");
    }
    report
        .into_result(&bundle.config.id)
        .map_err(EngineError::from)
        .context("species bundle failed validation")?;
    info!(
        species = %bundle.config.id,
        events = bundle.events.len(),
        parasites = bundle.parasites.len(),
        injuries = bundle.injuries.len(),
        storylines = bundle.storylines.len(),
        actions = bundle.actions.len(),
        "Species bundle loaded"
    );
    let bundle = Arc::new(bundle);

    // 4. Session.
    let mut session = open_session(&config, bundle).await?;

    // 5. Turn loop.
    let max_turns = config.session.max_turns;
    let played = match config.session.decisions {
        DecisionMode::FirstChoice => driver::run(&mut session, &mut FirstChoiceDecisions, max_turns).await,
        DecisionMode::Seeded => {
            let mut decisions = SeededDecisions::new(config.session.seed);
            driver::run(&mut session, &mut decisions, max_turns).await
        }
    }
    .context("turn loop failed")?;
    info!(played, "Turn loop finished");

    // 6. Save and summary.
    if let Some(path) = &config.session.save_path {
        driver::write_save(&session, path).await.context("writing save")?;
    }
    driver::log_summary(&session);

    Ok(())
}

fn init_tracing(fallback_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback_level));
    let json = std::env::var(LOG_FORMAT_ENV).is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Load the config file, or defaults when it does not exist.
///
/// The flag reports whether the file was found.
fn load_config(path: &Path) -> Result<(EngineConfig, bool), EngineError> {
    if path.exists() {
        Ok((EngineConfig::from_file(path)?, true))
    } else {
        Ok((EngineConfig::default(), false))
    }
}

async fn open_session(config: &EngineConfig, bundle: Arc<SpeciesBundle>) -> anyhow::Result<GameSession> {
    if let Some(path) = &config.session.save_path
        && let Some(json) = driver::load_save(path).await?
    {
        let session = GameSession::restore(&json, bundle, config.clone())
            .map_err(EngineError::from)
            .with_context(|| format!("restoring {}", path.display()))?;
        info!(
            path = %path.display(),
            turn = session.state().time.turn,
            phase = ?session.phase(),
            "Save resumed"
        );
        return Ok(session);
    }

    let options = SessionOptions {
        sex: config.session.sex,
        backstory_id: config.session.backstory.clone(),
        seed: Some(config.session.seed),
        ..SessionOptions::default()
    };
    let session = GameSession::new(bundle, config.clone(), &options)
        .map_err(EngineError::from)
        .context("creating session")?;
    Ok(session)
}

//! Arena binary.
//!
//! Usage: `arena [config.toml]`. Without a path the built-in matchup runs.
//! See [`arena::ArenaConfig::with_env_overrides`] for environment overrides.

use std::path::PathBuf;

use anyhow::Result;
use arena::{Arena, ArenaConfig, logging};

fn main() -> Result<()> {
    // Load .env before reading any overrides
    dotenvy::dotenv().ok();

    let config = match std::env::args().nth(1).map(PathBuf::from) {
        Some(path) => ArenaConfig::from_file(&path)?,
        None => ArenaConfig::default(),
    }
    .with_env_overrides();
    config.validate()?;

    let _guard = logging::setup_logging(config.log_dir.as_deref())?;

    tracing::info!(
        "Starting arena: seed={}, ticks={}, tick_rate={}",
        config.seed,
        config.ticks,
        config.tick_rate
    );

    let mut arena = Arena::from_config(config)?;
    let summary = arena.run();

    tracing::info!(
        "Finished after {} ticks: {} transitions, {} skills used ({} ignored), {} hits, {} heals, {} deaths",
        summary.stats.ticks,
        summary.stats.transitions,
        summary.stats.skills_used,
        summary.stats.skills_ignored,
        summary.stats.hits,
        summary.stats.heals,
        summary.stats.deaths
    );
    for (team, alive) in &summary.survivors {
        tracing::info!("Team {}: {} standing", team.0, alive);
    }
    match summary.winner {
        Some(team) => tracing::info!("Team {} wins", team.0),
        None => tracing::info!("No winner"),
    }

    Ok(())
}

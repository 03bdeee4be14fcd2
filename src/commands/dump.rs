use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;

use super::watch::build_orchestrator;
use crate::core::Config;

/// Take one snapshot and write it as a dated JSON file.
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = Config::load()?;
    let dir = matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| config.dump_dir());

    println!("{}", "Collecting sensor data...".cyan());
    let mut orchestrator = build_orchestrator(&config, true);

    let path = orchestrator
        .dump(&dir)
        .with_context(|| format!("Failed to write dump into {}", dir.display()))?;

    println!("{} {}", "Saved:".green().bold(), path.display());
    Ok(())
}

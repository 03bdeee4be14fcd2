use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;

use crate::core::Config;

pub fn execute(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("show", _)) => show(),
        Some(("path", _)) => path(),
        Some(("set", sub_matches)) => set(sub_matches),
        Some(("reset", _)) => reset(),
        _ => {
            println!("Use 'sensorboard config --help' for more information.");
            Ok(())
        }
    }
}

fn show() -> Result<()> {
    let config = Config::load()?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn path() -> Result<()> {
    let path = Config::get_config_path()?;
    println!("{}", path.display().to_string().cyan());
    Ok(())
}

fn set(matches: &ArgMatches) -> Result<()> {
    let key = matches
        .get_one::<String>("key")
        .context("Key argument is required")?;
    let value = matches
        .get_one::<String>("value")
        .context("Value argument is required")?;

    let mut config = Config::load()?;
    config.set_value(key, value)?;
    config.save()?;

    println!("{} {} = {}", "✓".green(), key, value.cyan().bold());
    Ok(())
}

fn reset() -> Result<()> {
    Config::default().save()?;
    println!("{}", "✓ Configuration reset to defaults".green());
    Ok(())
}

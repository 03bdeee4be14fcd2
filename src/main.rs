use anyhow::Result;
use clap::{Arg, ArgAction, Command};

use sensorboard::commands;

fn cli() -> Command {
    Command::new("sensorboard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Live hardware sensor dashboard")
        .subcommand(
            Command::new("watch")
                .about("Show the live dashboard")
                .arg(
                    Arg::new("interval")
                        .short('i')
                        .long("interval")
                        .value_name("MS")
                        .help("Refresh interval in milliseconds (overrides config)")
                        .value_parser(clap::value_parser!(u64).range(1..)),
                )
                .arg(
                    Arg::new("fast")
                        .long("fast")
                        .help("Start at the fast refresh interval")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("gpu")
                        .long("gpu")
                        .help("Prefer the GPU panel over the battery panel")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print one JSON object per tick instead of the dashboard")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("ticks")
                        .short('n')
                        .long("ticks")
                        .value_name("N")
                        .help("Stop after N ticks")
                        .value_parser(clap::value_parser!(u64).range(1..)),
                ),
        )
        .subcommand(
            Command::new("dump")
                .about("Write the current sensor snapshot to a dated JSON file")
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("DIR")
                        .help("Output directory (defaults to the configured dump_dir)"),
                ),
        )
        .subcommand(
            Command::new("config")
                .about("Inspect or change the configuration")
                .subcommand_required(true)
                .arg_required_else_help(true)
                .subcommand(Command::new("show").about("Print the current configuration"))
                .subcommand(Command::new("path").about("Print the configuration file path"))
                .subcommand(
                    Command::new("set")
                        .about("Set one configuration value")
                        .arg(Arg::new("key").help("Configuration key").required(true).index(1))
                        .arg(Arg::new("value").help("New value").required(true).index(2)),
                )
                .subcommand(Command::new("reset").about("Restore the default configuration")),
        )
}

fn main() -> Result<()> {
    sensorboard::init_logging();

    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("watch", sub_matches)) => commands::watch(sub_matches)?,
        Some(("dump", sub_matches)) => commands::dump(sub_matches)?,
        Some(("config", sub_matches)) => commands::config::execute(sub_matches)?,
        _ => {
            println!("Use 'sensorboard --help' for more information.");
        }
    }

    Ok(())
}

//! Live dashboard command.

use std::io::{self, BufRead, Write};
use std::thread;

use anyhow::Result;
use clap::ArgMatches;
use colored::Colorize;

use crate::core::telemetry::{Orchestrator, OrchestratorOptions, Scheduler, SchedulerHandle, TickReport};
use crate::core::Config;
use crate::platform::{ConsoleNotifier, HostProbe, NetworkCounters, SysinfoProvider};

/// Build an orchestrator wired to the real host.
pub fn build_orchestrator(config: &Config, quiet: bool) -> Orchestrator {
    let sink = if quiet {
        ConsoleNotifier::quiet()
    } else {
        ConsoleNotifier::new()
    };

    Orchestrator::new(
        Box::new(SysinfoProvider::new()),
        Box::new(HostProbe::new()),
        Box::new(NetworkCounters::new()),
        Box::new(sink),
        OrchestratorOptions {
            alerts: config.alert_config(),
            prefer_gpu_panel: config.prefer_gpu_panel,
        },
    )
}

pub fn execute(matches: &ArgMatches) -> Result<()> {
    let mut config = Config::load()?;
    if let Some(&interval) = matches.get_one::<u64>("interval") {
        config.interval_ms = interval;
    }
    if matches.get_flag("gpu") {
        config.prefer_gpu_panel = true;
    }

    let json_output = matches.get_flag("json");
    let max_ticks = matches.get_one::<u64>("ticks").copied();

    let mut cadence = config.cadence();
    if matches.get_flag("fast") {
        cadence.toggle();
    }

    let mut orchestrator = build_orchestrator(&config, json_output);
    let mut scheduler = Scheduler::new(cadence)
        .with_max_ticks(max_ticks)
        .with_dump_dir(config.dump_dir());

    let handle = scheduler.handle();
    let stop_handle = handle.clone();
    ctrlc::set_handler(move || stop_handle.stop())
        .map_err(|e| anyhow::anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    if !json_output {
        spawn_key_reader(handle.clone());
    }

    scheduler.run(&mut orchestrator, |orchestrator, report| {
        if json_output {
            print_json(report);
        } else {
            print_frame(orchestrator, report, &handle);
        }
    });

    if !json_output {
        println!("{}", "Stopped.".dimmed());
    }
    Ok(())
}

fn print_json(report: &TickReport) {
    match serde_json::to_string(report) {
        Ok(line) => println!("{}", line),
        Err(e) => log::error!("Failed to serialize tick {}: {}", report.tick, e),
    }
}

fn print_frame(orchestrator: &Orchestrator, report: &TickReport, handle: &SchedulerHandle) {
    let interval = if handle.is_fast() { "fast" } else { "normal" };
    // Clear screen and home the cursor
    print!("\x1B[2J\x1B[H");
    print!("{}", crate::ui::render_frame(report, orchestrator, interval));
    println!(
        "{}",
        "[f]+Enter toggle speed  [d]+Enter dump  [r]+Enter rescan network".dimmed()
    );
    let _ = io::stdout().flush();
}

/// Line-based commands on stdin while the dashboard runs.
fn spawn_key_reader(handle: SchedulerHandle) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            match line.trim() {
                "f" => handle.toggle_cadence(),
                "d" => handle.request_dump(),
                "r" => handle.request_rediscover(),
                "q" => {
                    handle.stop();
                    break;
                }
                _ => {}
            }
        }
    });
}

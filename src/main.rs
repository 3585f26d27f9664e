//! Fleetprobe CLI binary entry point.
//! Delegates to the probe pipeline per check subcommand and prints results.

mod checks;
mod classify;
mod cli;
mod config;
mod executor;
mod filter;
mod models;
mod output;
mod pool;
mod probe;
mod provider;
mod report;
mod utils;

use checks::CheckKind;
use clap::Parser;
use cli::{Cli, Commands};
use config::Overrides;
use probe::RunSettings;
use provider::AzCli;

fn main() {
    let cli = Cli::parse();
    let code = match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            0
        }
        Commands::Disk {
            group,
            include,
            omit,
            max_parallel,
            status_timeout,
            command_timeout,
            threshold,
            output,
        } => run_probe(
            CheckKind::Disk,
            Overrides {
                group,
                include,
                omit,
                max_parallel,
                status_timeout_secs: status_timeout,
                command_timeout_secs: command_timeout,
                disk_pct: threshold,
                output,
                ..Overrides::default()
            },
        ),
        Commands::Memory {
            group,
            include,
            omit,
            max_parallel,
            status_timeout,
            command_timeout,
            threshold,
            output,
        } => run_probe(
            CheckKind::Memory,
            Overrides {
                group,
                include,
                omit,
                max_parallel,
                status_timeout_secs: status_timeout,
                command_timeout_secs: command_timeout,
                memory_pct: threshold,
                output,
                ..Overrides::default()
            },
        ),
        Commands::Uptime {
            group,
            include,
            omit,
            max_parallel,
            status_timeout,
            command_timeout,
            max_days,
            output,
        } => run_probe(
            CheckKind::Uptime,
            Overrides {
                group,
                include,
                omit,
                max_parallel,
                status_timeout_secs: status_timeout,
                command_timeout_secs: command_timeout,
                uptime_days: max_days,
                output,
                ..Overrides::default()
            },
        ),
        Commands::Patch {
            group,
            include,
            omit,
            max_parallel,
            status_timeout,
            command_timeout,
            output,
        } => run_probe(
            CheckKind::Patch,
            Overrides {
                group,
                include,
                omit,
                max_parallel,
                status_timeout_secs: status_timeout,
                command_timeout_secs: command_timeout,
                output,
                ..Overrides::default()
            },
        ),
    };
    std::process::exit(code);
}

/// Resolve configuration, run one check kind, print, and return the exit
/// code. `process::exit` runs no destructors, so this function returns
/// instead of exiting: the capture directory below must drop on every
/// path, success and failure alike.
///
/// Exit codes: 0 when the run completed (whether or not issues were
/// found), 2 on fatal pre-flight failure.
fn run_probe(kind: CheckKind, overrides: Overrides) -> i32 {
    let eff = match config::resolve_effective(&overrides) {
        Ok(eff) => eff,
        Err(e) => {
            eprintln!("{} {}", utils::error_prefix(), e);
            return 2;
        }
    };

    // Require a resource group (no default)
    let group = match eff.group.clone() {
        Some(g) => g,
        None => {
            eprintln!(
                "{} {}",
                utils::error_prefix(),
                "Resource group is not configured. Pass --group or add fleetprobe.toml."
            );
            return 2;
        }
    };
    // Friendly note if no fleetprobe config was found
    if !eff.config_found {
        eprintln!(
            "{} {}",
            utils::note_prefix(),
            "No fleetprobe.toml found; using defaults."
        );
    }

    // Per-run capture directory for provider stdio; removed on drop.
    let capture = match tempfile::tempdir() {
        Ok(d) => d,
        Err(e) => {
            eprintln!(
                "{} {}",
                utils::error_prefix(),
                format!("cannot create capture directory: {}", e)
            );
            return 2;
        }
    };
    let az = AzCli::new(capture.path());

    let settings = RunSettings {
        group: group.clone(),
        include: eff.include.clone(),
        omit: eff.omit.clone(),
        max_parallel: eff.max_parallel,
        timeouts: eff.timeouts,
        thresholds: eff.thresholds,
    };
    match probe::run(&az, kind, &settings) {
        Ok(report) => {
            if report.summary.resources == 0 && eff.output != "json" {
                eprintln!(
                    "{} {}",
                    utils::info_prefix(),
                    format!("No resources found in group '{}'.", group)
                );
            }
            output::print_report(&report, &eff.output);
            0
        }
        Err(e) => {
            eprintln!(
                "{} {}",
                utils::error_prefix(),
                format!("{} check aborted: {}", kind.name(), e)
            );
            2
        }
    }
}

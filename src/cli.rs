//! CLI argument parsing via `clap`.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "fleetprobe",
    version,
    about = "Fleetprobe — bounded-concurrency VM health checks",
    long_about = "Fleetprobe — run disk/memory/uptime/patch health checks across a VM resource group with a bounded worker pool.\n\nConfiguration precedence: CLI > fleetprobe.toml > defaults.",
    after_help = "Examples:\n  fleetprobe disk --group rg-prod --threshold 85\n  fleetprobe memory --group rg-prod --include 'web-*' --omit '*-canary'\n  fleetprobe uptime --group rg-prod --max-days 30 --output json\n  fleetprobe patch --group rg-prod --max-parallel 8",
    arg_required_else_help = true
)]
/// Top-level CLI options and subcommands.
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand)]
/// One subcommand per health check, plus version.
pub enum Commands {
    /// Show version
    #[command(
        about = "Show version",
        long_about = "Print the current fleetprobe version."
    )]
    Version,
    /// Check filesystem usage across the fleet
    #[command(
        about = "Run the disk usage check",
        long_about = "Probe each running Linux VM's filesystems and report mounts at or above the usage threshold.",
        after_help = "Examples:\n  fleetprobe disk --group rg-prod\n  fleetprobe disk --group rg-prod --threshold 90 --output json"
    )]
    Disk {
        #[arg(long, help = "Resource group to enumerate (required here or in config)")]
        group: Option<String>,
        #[arg(long, help = "Glob of VM names to include (repeatable)")]
        include: Vec<String>,
        #[arg(long, help = "Glob of VM names to omit (repeatable; wins over include)")]
        omit: Vec<String>,
        #[arg(long, help = "Maximum concurrent checks (default: 5)")]
        max_parallel: Option<usize>,
        #[arg(long, help = "Status probe timeout in seconds (default: 10)")]
        status_timeout: Option<u64>,
        #[arg(long, help = "Remote command timeout in seconds (default: 60)")]
        command_timeout: Option<u64>,
        #[arg(long, help = "Disk usage percentage threshold (default: 85)")]
        threshold: Option<f64>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
    /// Check memory usage across the fleet
    #[command(
        about = "Run the memory usage check",
        long_about = "Probe each running Linux VM's memory and report usage at or above the threshold.",
        after_help = "Examples:\n  fleetprobe memory --group rg-prod\n  fleetprobe memory --group rg-prod --threshold 95"
    )]
    Memory {
        #[arg(long, help = "Resource group to enumerate (required here or in config)")]
        group: Option<String>,
        #[arg(long, help = "Glob of VM names to include (repeatable)")]
        include: Vec<String>,
        #[arg(long, help = "Glob of VM names to omit (repeatable; wins over include)")]
        omit: Vec<String>,
        #[arg(long, help = "Maximum concurrent checks (default: 5)")]
        max_parallel: Option<usize>,
        #[arg(long, help = "Status probe timeout in seconds (default: 10)")]
        status_timeout: Option<u64>,
        #[arg(long, help = "Remote command timeout in seconds (default: 60)")]
        command_timeout: Option<u64>,
        #[arg(long, help = "Memory usage percentage threshold (default: 90)")]
        threshold: Option<f64>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
    /// Check time since last reboot across the fleet
    #[command(
        about = "Run the uptime check",
        long_about = "Probe each running Linux VM's uptime and report hosts up for at least the configured number of days.",
        after_help = "Examples:\n  fleetprobe uptime --group rg-prod\n  fleetprobe uptime --group rg-prod --max-days 45"
    )]
    Uptime {
        #[arg(long, help = "Resource group to enumerate (required here or in config)")]
        group: Option<String>,
        #[arg(long, help = "Glob of VM names to include (repeatable)")]
        include: Vec<String>,
        #[arg(long, help = "Glob of VM names to omit (repeatable; wins over include)")]
        omit: Vec<String>,
        #[arg(long, help = "Maximum concurrent checks (default: 5)")]
        max_parallel: Option<usize>,
        #[arg(long, help = "Status probe timeout in seconds (default: 10)")]
        status_timeout: Option<u64>,
        #[arg(long, help = "Remote command timeout in seconds (default: 60)")]
        command_timeout: Option<u64>,
        #[arg(long, help = "Uptime threshold in days (default: 30)")]
        max_days: Option<f64>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
    /// Check pending package updates across the fleet
    #[command(
        about = "Run the patch status check",
        long_about = "Probe each running Linux VM for pending package updates and report hosts with any outstanding.",
        after_help = "Examples:\n  fleetprobe patch --group rg-prod\n  fleetprobe patch --group rg-prod --output json"
    )]
    Patch {
        #[arg(long, help = "Resource group to enumerate (required here or in config)")]
        group: Option<String>,
        #[arg(long, help = "Glob of VM names to include (repeatable)")]
        include: Vec<String>,
        #[arg(long, help = "Glob of VM names to omit (repeatable; wins over include)")]
        omit: Vec<String>,
        #[arg(long, help = "Maximum concurrent checks (default: 5)")]
        max_parallel: Option<usize>,
        #[arg(long, help = "Status probe timeout in seconds (default: 10)")]
        status_timeout: Option<u64>,
        #[arg(long, help = "Remote command timeout in seconds (default: 60)")]
        command_timeout: Option<u64>,
        #[arg(long, help = "Output mode: human|json (default: human)")]
        output: Option<String>,
    },
}

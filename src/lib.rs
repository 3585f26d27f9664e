//! Fleetprobe core library.
//!
//! This crate exposes programmatic APIs for running bounded-concurrency
//! health checks (disk, memory, uptime, patch) across a fleet of VMs and
//! classifying the results into reportable issues.
//!
//! High-level modules:
//! - `cli`: CLI argument parsing (binary uses this).
//! - `config`: Discovery and effective configuration resolution.
//! - `provider`: Cloud provider seam; `az`-CLI implementation.
//! - `filter`: Include/omit glob filtering and OS gating.
//! - `executor`: Two-phase per-resource check execution.
//! - `pool`: Bounded worker pool over the executor.
//! - `probe`: Run orchestration from listing through classification.
//! - `checks`: Check catalogue, metric parsing, thresholds.
//! - `classify`: Outcome-to-issue classification.
//! - `report`: Result aggregation and the run report.
//! - `output`: Human/JSON printers for reports.
//! - `models`: Data models for resources, outcomes, and issues.
//! - `utils`: Supporting helpers.
pub mod checks;
pub mod classify;
pub mod cli;
pub mod config;
pub mod executor;
pub mod filter;
pub mod models;
pub mod output;
pub mod pool;
pub mod probe;
pub mod provider;
pub mod report;
pub mod utils;

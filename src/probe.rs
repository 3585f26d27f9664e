//! Probe run orchestration: list, filter, fan out, merge, classify.
//!
//! Per-resource failures never surface here as errors; they are states in
//! the result set. The only run-aborting failures are enumeration
//! (authentication included), invalid filter patterns, and internal pool
//! or merge faults.

use crate::checks::{CheckKind, Thresholds};
use crate::classify;
use crate::executor::ExecTimeouts;
use crate::filter;
use crate::models::Issue;
use crate::pool::{self, PoolError};
use crate::provider::{CloudProvider, ProviderError};
use crate::report::{self, MergeError, RunReport};
use std::fmt;

#[derive(Debug, Clone)]
/// Resolved settings for one probe run.
pub struct RunSettings {
    pub group: String,
    pub include: Vec<String>,
    pub omit: Vec<String>,
    pub max_parallel: usize,
    pub timeouts: ExecTimeouts,
    pub thresholds: Thresholds,
}

#[derive(Debug)]
/// Run-aborting failures. Everything else lands in the report.
pub enum RunError {
    Provider(ProviderError),
    BadPattern(glob::PatternError),
    Pool(PoolError),
    Merge(MergeError),
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Provider(e) => write!(f, "{}", e),
            RunError::BadPattern(e) => write!(f, "invalid glob pattern: {}", e),
            RunError::Pool(e) => write!(f, "{}", e),
            RunError::Merge(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for RunError {}

impl From<ProviderError> for RunError {
    fn from(e: ProviderError) -> RunError {
        RunError::Provider(e)
    }
}

impl From<glob::PatternError> for RunError {
    fn from(e: glob::PatternError) -> RunError {
        RunError::BadPattern(e)
    }
}

impl From<PoolError> for RunError {
    fn from(e: PoolError) -> RunError {
        RunError::Pool(e)
    }
}

impl From<MergeError> for RunError {
    fn from(e: MergeError) -> RunError {
        RunError::Merge(e)
    }
}

/// Run one check kind across the resource group and produce the report.
pub fn run(
    provider: &dyn CloudProvider,
    kind: CheckKind,
    settings: &RunSettings,
) -> Result<RunReport, RunError> {
    let include = filter::compile_patterns(&settings.include)?;
    let omit = filter::compile_patterns(&settings.omit)?;

    let resources = provider.list_resources(&settings.group)?;
    let split = filter::split(resources, &include, &omit);

    let mut outcomes = pool::run_pool(
        provider,
        &split.work,
        kind,
        &settings.timeouts,
        settings.max_parallel,
    )?;
    outcomes.extend(split.skipped);

    let results = report::merge_outcomes(outcomes)?;
    let issues: Vec<Issue> = results
        .values()
        .filter_map(|o| classify::classify(o, kind, &settings.thresholds))
        .collect();
    Ok(report::build_report(kind.name(), results, issues))
}

//! Filter engine: OS gating plus include/omit glob lists.
//!
//! Matching uses shell wildcard semantics (`*`, `?`, character classes)
//! via `glob::Pattern`, case-sensitive, against the resource name only.
//! Omit always takes precedence over include. Filtered resources are not
//! dropped: they come back as `FilteredOut` outcomes with their reason,
//! so the final report covers every enumerated resource.

use crate::models::{CheckOutcome, FilterReason, OsType, Resource};
use glob::Pattern;

/// Result of splitting the candidate list into dispatchable work and
/// already-decided `FilteredOut` outcomes.
pub struct FilterSplit {
    pub work: Vec<Resource>,
    pub skipped: Vec<CheckOutcome>,
}

/// Compile glob strings up front so an invalid pattern fails the run
/// before any dispatch, not mid-filter.
pub fn compile_patterns(patterns: &[String]) -> Result<Vec<Pattern>, glob::PatternError> {
    patterns.iter().map(|p| Pattern::new(p)).collect()
}

/// Split `resources` per the filter rules.
///
/// Order of evaluation per resource:
/// 1. non-Linux OS -> `UnsupportedOs`
/// 2. include list non-empty and no pattern matches -> `NotIncluded`
/// 3. any omit pattern matches -> `Omitted`
/// 4. otherwise dispatchable
pub fn split(resources: Vec<Resource>, include: &[Pattern], omit: &[Pattern]) -> FilterSplit {
    let mut work = Vec::new();
    let mut skipped = Vec::new();
    for res in resources {
        match decide(&res, include, omit) {
            Some(reason) => skipped.push(CheckOutcome::filtered(&res.name, reason)),
            None => work.push(res),
        }
    }
    FilterSplit { work, skipped }
}

fn decide(res: &Resource, include: &[Pattern], omit: &[Pattern]) -> Option<FilterReason> {
    if res.os_type != OsType::Linux {
        return Some(FilterReason::UnsupportedOs);
    }
    if !include.is_empty() && !include.iter().any(|p| p.matches(&res.name)) {
        return Some(FilterReason::NotIncluded);
    }
    if omit.iter().any(|p| p.matches(&res.name)) {
        return Some(FilterReason::Omitted);
    }
    None
}

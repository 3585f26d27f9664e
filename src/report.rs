//! Result aggregation: keyed merge of outcomes plus the final report
//! container handed to the printers.

use crate::models::{CheckOutcome, Issue, OutcomeState, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Mapping from resource name to its single outcome for this run.
pub type ResultSet = BTreeMap<String, CheckOutcome>;

#[derive(Debug)]
pub enum MergeError {
    /// Two outcomes share a resource name. The pool guarantees one
    /// outcome per resource, so this indicates a dispatch bug and must
    /// fail loudly instead of overwriting.
    Duplicate(String),
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeError::Duplicate(name) => {
                write!(f, "duplicate outcome for resource '{}'", name)
            }
        }
    }
}

impl std::error::Error for MergeError {}

/// Build the keyed result set. Order-independent; errors on duplicates.
pub fn merge_outcomes(outcomes: Vec<CheckOutcome>) -> Result<ResultSet, MergeError> {
    let mut set = ResultSet::new();
    for outcome in outcomes {
        let key = outcome.resource_name.clone();
        if set.insert(key.clone(), outcome).is_some() {
            return Err(MergeError::Duplicate(key));
        }
    }
    Ok(set)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Per-run totals used by the printers and the summary line.
pub struct Summary {
    pub criticals: usize,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    /// All resources in the result set, filtered ones included.
    pub resources: usize,
    /// Resources that were actually dispatched to a worker.
    pub checked: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// The complete run report: every outcome, the derived issues, totals.
pub struct RunReport {
    pub check: String,
    pub results: ResultSet,
    pub issues: Vec<Issue>,
    pub summary: Summary,
}

/// Assemble the report from merged results and classified issues.
pub fn build_report(check: &str, results: ResultSet, issues: Vec<Issue>) -> RunReport {
    let checked = results
        .values()
        .filter(|o| !matches!(o.state, OutcomeState::FilteredOut { .. }))
        .count();
    let mut summary = Summary {
        criticals: 0,
        errors: 0,
        warnings: 0,
        infos: 0,
        resources: results.len(),
        checked,
    };
    for issue in &issues {
        match issue.severity {
            Severity::Critical => summary.criticals += 1,
            Severity::Error => summary.errors += 1,
            Severity::Warning => summary.warnings += 1,
            Severity::Informational => summary.infos += 1,
        }
    }
    RunReport {
        check: check.to_string(),
        results,
        issues,
        summary,
    }
}

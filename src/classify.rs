//! Issue classifier: turn one `CheckOutcome` plus thresholds into at most
//! one reportable `Issue`.
//!
//! Pure function of its inputs. Filtered-out resources never produce an
//! issue; the report's result set is where their state is visible.

use crate::checks::{self, CheckKind, Metric, Thresholds};
use crate::models::{CheckOutcome, Issue, OutcomeState, Severity};

/// Classify `outcome` for the given check kind.
pub fn classify(outcome: &CheckOutcome, kind: CheckKind, thresholds: &Thresholds) -> Option<Issue> {
    let name = &outcome.resource_name;
    match &outcome.state {
        OutcomeState::FilteredOut { .. } => None,
        OutcomeState::ConnectionError => Some(Issue {
            title: format!("Unable to reach `{}` for {} check", name, kind.name()),
            severity: Severity::Informational,
            expected: format!("Status probe of `{}` succeeds", name),
            actual: outcome.stderr.clone(),
            details: outcome.stderr.clone(),
            next_steps: format!(
                "Verify connectivity and credentials for `{}`, then re-run the {} check.",
                name,
                kind.name()
            ),
        }),
        OutcomeState::CommandTimeout => Some(Issue {
            title: format!("{} check on `{}` did not complete in time", kind.name(), name),
            severity: Severity::Informational,
            expected: format!("{} check on `{}` completes within its timeout", kind.name(), name),
            actual: outcome.stderr.clone(),
            details: outcome.stderr.clone(),
            next_steps: format!(
                "Check load and agent health on `{}`; raise the command timeout if the fleet is slow.",
                name
            ),
        }),
        OutcomeState::InvalidResponse => Some(Issue {
            title: format!("Unreadable {} check response from `{}`", kind.name(), name),
            severity: Severity::Informational,
            expected: format!("`{}` returns a well-formed command response", name),
            actual: outcome.stderr.clone(),
            details: outcome.stderr.clone(),
            next_steps: format!(
                "Inspect the run-command agent on `{}`; the response envelope was missing expected fields.",
                name
            ),
        }),
        OutcomeState::OtherError => Some(Issue {
            title: format!("{} check on `{}` failed unexpectedly", kind.name(), name),
            severity: Severity::Informational,
            expected: format!("{} check on `{}` completes", kind.name(), name),
            actual: outcome.stderr.clone(),
            details: outcome.stderr.clone(),
            next_steps: format!("Re-run the {} check against `{}` and review the error.", kind.name(), name),
        }),
        OutcomeState::ResourceNotRunning => Some(Issue {
            title: format!("`{}` is not running", name),
            severity: Severity::Warning,
            expected: format!("`{}` is in a running state", name),
            actual: outcome.stderr.clone(),
            details: outcome.stderr.clone(),
            next_steps: format!(
                "Start `{}` if it should be serving, or omit it from the check set if the stop is intentional.",
                name
            ),
        }),
        OutcomeState::Success => classify_success(outcome, kind, thresholds),
    }
}

fn classify_success(
    outcome: &CheckOutcome,
    kind: CheckKind,
    thresholds: &Thresholds,
) -> Option<Issue> {
    let name = &outcome.resource_name;
    let metric = match checks::parse_metric(kind, &outcome.stdout) {
        Some(m) => m,
        None => {
            return Some(Issue {
                title: format!("{} output from `{}` could not be interpreted", kind.name(), name),
                severity: Severity::Informational,
                expected: format!("{} check output from `{}` is parseable", kind.name(), name),
                actual: outcome.stdout.clone(),
                details: outcome.stdout.clone(),
                next_steps: format!(
                    "Run `{}` manually on `{}` and compare the output shape.",
                    kind.script(),
                    name
                ),
            });
        }
    };
    match metric {
        Metric::DiskUsage { pct, mount } if checks::disk_over(pct, thresholds.disk_pct) => {
            Some(Issue {
                title: format!("High disk usage on `{}`", name),
                severity: Severity::Error,
                expected: format!(
                    "Disk usage on `{}` stays below {}%",
                    name, thresholds.disk_pct
                ),
                actual: format!("{}% used on `{}`", pct, mount),
                details: outcome.stdout.clone(),
                next_steps: format!(
                    "Free space on `{}` of `{}` (logs, caches, old kernels) or extend the disk.",
                    mount, name
                ),
            })
        }
        Metric::MemoryUsage { pct } if checks::memory_over(pct, thresholds.memory_pct) => {
            Some(Issue {
                title: format!("High memory usage on `{}`", name),
                severity: Severity::Error,
                expected: format!(
                    "Memory usage on `{}` stays below {}%",
                    name, thresholds.memory_pct
                ),
                actual: format!("{:.1}% of memory in use", pct),
                details: outcome.stdout.clone(),
                next_steps: format!(
                    "Identify the top memory consumers on `{}` and restart or resize as needed.",
                    name
                ),
            })
        }
        Metric::UptimeDays { days } if checks::uptime_over(days, thresholds.uptime_days) => {
            Some(Issue {
                title: format!("`{}` has not been rebooted recently", name),
                severity: Severity::Warning,
                expected: format!(
                    "`{}` is rebooted at least every {} days",
                    name, thresholds.uptime_days
                ),
                actual: format!("up for {:.1} days", days),
                details: outcome.stdout.clone(),
                next_steps: format!(
                    "Schedule a maintenance reboot for `{}` to pick up kernel and security updates.",
                    name
                ),
            })
        }
        Metric::PendingPatches { count } if checks::patches_pending(count) => Some(Issue {
            title: format!("`{}` has pending security patches", name),
            severity: Severity::Warning,
            expected: format!("`{}` has no pending package updates", name),
            actual: format!("{} pending updates", count),
            details: outcome.stdout.clone(),
            next_steps: format!("Apply pending updates on `{}` during the next patch window.", name),
        }),
        Metric::PatchStatusUnknown => Some(Issue {
            title: format!("Patch status of `{}` could not be determined", name),
            severity: Severity::Informational,
            expected: format!("`{}` reports its pending-update count", name),
            actual: outcome.stdout.clone(),
            details: outcome.stdout.clone(),
            next_steps: format!(
                "Confirm a supported package manager is available on `{}`.",
                name
            ),
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FilterReason;

    fn success(stdout: &str) -> CheckOutcome {
        CheckOutcome::success("web-01", stdout.into(), String::new())
    }

    const DF_90: &str = "\
Filesystem      Size  Used Avail Use% Mounted on
/dev/sda1       100G   90G   10G  90% /
";

    #[test]
    fn test_disk_over_threshold_emits_issue() {
        let t = Thresholds {
            disk_pct: 85.0,
            ..Thresholds::default()
        };
        let issue = classify(&success(DF_90), CheckKind::Disk, &t).unwrap();
        assert_eq!(issue.severity, Severity::Error);
        assert!(issue.actual.contains("90%"));
        assert!(issue.details.contains("/dev/sda1"));
    }

    #[test]
    fn test_disk_under_threshold_is_quiet() {
        let t = Thresholds {
            disk_pct: 95.0,
            ..Thresholds::default()
        };
        assert!(classify(&success(DF_90), CheckKind::Disk, &t).is_none());
    }

    #[test]
    fn test_classification_is_pure() {
        let t = Thresholds::default();
        let out = success(DF_90);
        assert_eq!(
            classify(&out, CheckKind::Disk, &t),
            classify(&out, CheckKind::Disk, &t)
        );
    }

    #[test]
    fn test_filtered_out_yields_no_issue() {
        let out = CheckOutcome::filtered("win-01", FilterReason::UnsupportedOs);
        assert!(classify(&out, CheckKind::Disk, &Thresholds::default()).is_none());
    }

    #[test]
    fn test_not_running_is_warning_with_observed_state() {
        let out = CheckOutcome::failure(
            "db-01",
            OutcomeState::ResourceNotRunning,
            "VM deallocated".into(),
        );
        let issue = classify(&out, CheckKind::Memory, &Thresholds::default()).unwrap();
        assert_eq!(issue.severity, Severity::Warning);
        assert_eq!(issue.actual, "VM deallocated");
    }

    #[test]
    fn test_transport_failures_are_informational() {
        for state in [
            OutcomeState::ConnectionError,
            OutcomeState::CommandTimeout,
            OutcomeState::InvalidResponse,
            OutcomeState::OtherError,
        ] {
            let out = CheckOutcome::failure("web-01", state, "boom".into());
            let issue = classify(&out, CheckKind::Uptime, &Thresholds::default()).unwrap();
            assert_eq!(issue.severity, Severity::Informational);
        }
    }

    #[test]
    fn test_unparseable_success_output_is_flagged() {
        let issue = classify(
            &success("garbage output"),
            CheckKind::Disk,
            &Thresholds::default(),
        )
        .unwrap();
        assert_eq!(issue.severity, Severity::Informational);
        assert!(issue.title.contains("could not be interpreted"));
    }

    #[test]
    fn test_pending_patches_and_unknown_marker() {
        let t = Thresholds::default();
        let issue = classify(&success("7"), CheckKind::Patch, &t).unwrap();
        assert_eq!(issue.severity, Severity::Warning);
        assert!(issue.actual.contains("7 pending"));

        assert!(classify(&success("0"), CheckKind::Patch, &t).is_none());

        let unknown = classify(
            &success("Unable to determine patch status"),
            CheckKind::Patch,
            &t,
        )
        .unwrap();
        assert_eq!(unknown.severity, Severity::Informational);
    }

    #[test]
    fn test_uptime_at_threshold_reports() {
        let t = Thresholds {
            uptime_days: 30.0,
            ..Thresholds::default()
        };
        // exactly 30 days of uptime
        let out = success("2592000.00 5184000.00");
        let issue = classify(&out, CheckKind::Uptime, &t).unwrap();
        assert_eq!(issue.severity, Severity::Warning);
        assert!(issue.actual.contains("30.0 days"));
    }
}

//! Report rendering for check runs.
//!
//! Supports `human` (default) and `json` outputs. The JSON form is the
//! reporting-layer contract: full result set, issue list, and summary.

use crate::models::{OutcomeState, Severity};
use crate::report::RunReport;
use owo_colors::OwoColorize;
use serde_json::Value as JsonVal;

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

/// Print a run report in the requested format.
pub fn print_report(report: &RunReport, output: &str) {
    match output {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&compose_report_json(report)).unwrap()
        ),
        _ => {
            let color = use_colors(output);
            for (name, outcome) in &report.results {
                if let OutcomeState::FilteredOut { reason } = &outcome.state {
                    let line = format!("⏭️  skipped: {} ({:?})", name, reason);
                    if color {
                        println!("{}", line.bright_black());
                    } else {
                        println!("{}", line);
                    }
                }
            }
            for issue in &report.issues {
                let badge = match issue.severity {
                    Severity::Critical => {
                        if color {
                            "⟦critical⟧".red().bold().to_string()
                        } else {
                            "⟦critical⟧".to_string()
                        }
                    }
                    Severity::Error => {
                        if color {
                            "⟦error⟧".red().bold().to_string()
                        } else {
                            "⟦error⟧".to_string()
                        }
                    }
                    Severity::Warning => {
                        if color {
                            "⟦warn⟧".yellow().bold().to_string()
                        } else {
                            "⟦warn⟧".to_string()
                        }
                    }
                    Severity::Informational => {
                        if color {
                            "⟦info⟧".blue().bold().to_string()
                        } else {
                            "⟦info⟧".to_string()
                        }
                    }
                };
                let icon = match issue.severity {
                    Severity::Critical | Severity::Error => "✖".red().to_string(),
                    Severity::Warning => "▲".yellow().to_string(),
                    Severity::Informational => "◆".blue().to_string(),
                };
                let title = if color {
                    issue.title.clone().bold().to_string()
                } else {
                    issue.title.clone()
                };
                println!("{} {} {} — {}", icon, badge, title, issue.actual);
                println!("    ↳ {}", issue.next_steps);
            }
            let summary = format!(
                "— Summary ({}) — critical={} errors={} warnings={} infos={} resources={} checked={}",
                report.check,
                report.summary.criticals,
                report.summary.errors,
                report.summary.warnings,
                report.summary.infos,
                report.summary.resources,
                report.summary.checked
            );
            if color {
                println!("{}", summary.bold());
            } else {
                println!("{}", summary);
            }
        }
    }
}

/// Compose the report JSON object (pure) for testing/snapshot purposes.
pub fn compose_report_json(report: &RunReport) -> JsonVal {
    // Serialize the report directly, keeping the stable contract shape.
    serde_json::to_value(report).unwrap()
}

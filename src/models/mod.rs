//! Shared data models for resources, check outcomes, and reportable issues.

pub mod envelope;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
/// Operating system reported by the provider for a resource.
pub enum OsType {
    Linux,
    Windows,
    Unknown,
}

impl OsType {
    /// Map a provider OS string to the closed set. Missing or unrecognized
    /// values fall back to `Unknown` rather than failing the parse.
    pub fn from_provider(s: Option<&str>) -> OsType {
        match s {
            Some(v) if v.eq_ignore_ascii_case("linux") => OsType::Linux,
            Some(v) if v.eq_ignore_ascii_case("windows") => OsType::Windows,
            _ => OsType::Unknown,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// One checkable target, as enumerated from the provider.
pub struct Resource {
    pub name: String,
    pub group: String,
    pub os_type: OsType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Why a resource was excluded from dispatch.
pub enum FilterReason {
    UnsupportedOs,
    NotIncluded,
    Omitted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
/// Classified result of one check attempt. Exactly one state per resource
/// per run.
pub enum OutcomeState {
    Success,
    ConnectionError,
    CommandTimeout,
    InvalidResponse,
    ResourceNotRunning,
    FilteredOut { reason: FilterReason },
    OtherError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// The outcome of attempting one check against one resource.
///
/// `stdout` is non-empty only when `state == Success`; all failure states
/// carry their diagnostic text in `stderr`.
pub struct CheckOutcome {
    pub resource_name: String,
    pub state: OutcomeState,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
}

impl CheckOutcome {
    /// A completed check with captured remote output.
    pub fn success(resource: &str, stdout: String, stderr: String) -> CheckOutcome {
        CheckOutcome {
            resource_name: resource.to_string(),
            state: OutcomeState::Success,
            stdout,
            stderr,
        }
    }

    /// A failed or skipped check; `detail` lands in `stderr`.
    pub fn failure(resource: &str, state: OutcomeState, detail: String) -> CheckOutcome {
        CheckOutcome {
            resource_name: resource.to_string(),
            state,
            stdout: String::new(),
            stderr: detail,
        }
    }

    /// A resource excluded before dispatch, with the reason recorded.
    pub fn filtered(resource: &str, reason: FilterReason) -> CheckOutcome {
        CheckOutcome::failure(
            resource,
            OutcomeState::FilteredOut { reason },
            String::new(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
/// Issue severity on the 1..=4 scale consumed by the reporting layer.
pub enum Severity {
    Critical = 1,
    Error = 2,
    Warning = 3,
    Informational = 4,
}

impl From<Severity> for u8 {
    fn from(s: Severity) -> u8 {
        s as u8
    }
}

impl TryFrom<u8> for Severity {
    type Error = String;

    fn try_from(v: u8) -> Result<Severity, String> {
        match v {
            1 => Ok(Severity::Critical),
            2 => Ok(Severity::Error),
            3 => Ok(Severity::Warning),
            4 => Ok(Severity::Informational),
            other => Err(format!("severity out of range: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// A reportable finding derived from a `CheckOutcome` plus thresholds.
///
/// Field names are the contract consumed by the downstream reporting layer
/// and must stay as-is in the serialized form.
pub struct Issue {
    pub title: String,
    pub severity: Severity,
    pub expected: String,
    pub actual: String,
    pub details: String,
    pub next_steps: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_type_fallback() {
        assert_eq!(OsType::from_provider(Some("Linux")), OsType::Linux);
        assert_eq!(OsType::from_provider(Some("windows")), OsType::Windows);
        assert_eq!(OsType::from_provider(Some("FreeBSD")), OsType::Unknown);
        assert_eq!(OsType::from_provider(None), OsType::Unknown);
    }

    #[test]
    fn test_outcome_serde_round_trip() {
        let out = CheckOutcome::filtered("db-01", FilterReason::Omitted);
        let s = serde_json::to_string(&out).unwrap();
        assert!(s.contains("\"resourceName\":\"db-01\""));
        assert!(s.contains("\"filteredOut\""));
        let back: CheckOutcome = serde_json::from_str(&s).unwrap();
        assert_eq!(back, out);
    }

    #[test]
    fn test_severity_serializes_as_number() {
        let is = Issue {
            title: "t".into(),
            severity: Severity::Warning,
            expected: "e".into(),
            actual: "a".into(),
            details: "d".into(),
            next_steps: "n".into(),
        };
        let v = serde_json::to_value(&is).unwrap();
        assert_eq!(v["severity"], 3);
        assert_eq!(v["nextSteps"], "n");
        let back: Issue = serde_json::from_value(v).unwrap();
        assert_eq!(back.severity, Severity::Warning);
    }

    #[test]
    fn test_severity_rejects_out_of_range() {
        let r: Result<Severity, _> = serde_json::from_str("7");
        assert!(r.is_err());
    }
}

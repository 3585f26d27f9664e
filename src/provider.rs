//! Cloud provider seam: resource enumeration, power-state probe, and
//! remote command execution.
//!
//! The `CloudProvider` trait is the boundary the check pipeline runs
//! against; `AzCli` implements it by shelling out to the `az` CLI with a
//! hard deadline per invocation. Provider stderr is classified once, at
//! this boundary, into a closed `ErrorMarker` set with an explicit
//! unknown fallback.

use crate::models::envelope::{self, InstanceStatus, RunCommandEnvelope, VmEntry};
use crate::models::{OsType, Resource};
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug)]
/// Failure modes of one provider call.
pub enum ProviderError {
    /// Credentials missing or expired; fatal for the whole run.
    AuthRequired(String),
    /// The group or resource does not exist.
    NotFound(String),
    /// The invocation exceeded its deadline and was killed.
    Timeout(Duration),
    /// Spawn/transport/throttling failure.
    Transport(String),
    /// The response arrived but did not have the expected shape.
    Malformed(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::AuthRequired(d) => {
                write!(f, "provider authentication required: {}", d)
            }
            ProviderError::NotFound(d) => write!(f, "resource not found: {}", d),
            ProviderError::Timeout(t) => {
                write!(f, "provider call timed out after {}s", t.as_secs())
            }
            ProviderError::Transport(d) => write!(f, "provider transport failure: {}", d),
            ProviderError::Malformed(d) => write!(f, "malformed provider response: {}", d),
        }
    }
}

impl std::error::Error for ProviderError {}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Observed power state of a resource.
pub enum PowerState {
    Running,
    /// Not running; carries the observed state string (e.g. "VM deallocated").
    NotRunning(String),
}

#[derive(Debug, Clone)]
/// stdout/stderr substreams extracted from a remote command response.
pub struct RemoteOutput {
    pub stdout: String,
    pub stderr: String,
}

/// The provider boundary the pipeline is written against. `Sync` because
/// worker threads share one provider reference.
pub trait CloudProvider: Sync {
    /// Enumerate checkable resources in `group`. An empty group is a valid
    /// empty sequence; inability to ask is an error.
    fn list_resources(&self, group: &str) -> Result<Vec<Resource>, ProviderError>;

    /// Cheap status probe, bounded by `timeout`.
    fn probe_power_state(
        &self,
        resource: &Resource,
        timeout: Duration,
    ) -> Result<PowerState, ProviderError>;

    /// Run `script` on the resource, bounded by `timeout`.
    fn run_remote(
        &self,
        resource: &Resource,
        script: &str,
        timeout: Duration,
    ) -> Result<RemoteOutput, ProviderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Recognized markers in provider stderr.
pub enum ErrorMarker {
    AuthRequired,
    NotFound,
    Throttled,
    Unknown,
}

/// Classify provider stderr into the closed marker set.
pub fn classify_stderr(stderr: &str) -> ErrorMarker {
    const AUTH: &[&str] = &["az login", "AADSTS", "authentication", "refresh token"];
    const NOT_FOUND: &[&str] = &["ResourceNotFound", "ResourceGroupNotFound", "was not found"];
    const THROTTLED: &[&str] = &["TooManyRequests", "429"];

    if AUTH.iter().any(|m| stderr.contains(m)) {
        ErrorMarker::AuthRequired
    } else if NOT_FOUND.iter().any(|m| stderr.contains(m)) {
        ErrorMarker::NotFound
    } else if THROTTLED.iter().any(|m| stderr.contains(m)) {
        ErrorMarker::Throttled
    } else {
        ErrorMarker::Unknown
    }
}

fn marker_error(stderr: String) -> ProviderError {
    match classify_stderr(&stderr) {
        ErrorMarker::AuthRequired => ProviderError::AuthRequired(first_line(&stderr)),
        ErrorMarker::NotFound => ProviderError::NotFound(first_line(&stderr)),
        ErrorMarker::Throttled | ErrorMarker::Unknown => {
            ProviderError::Transport(first_line(&stderr))
        }
    }
}

fn first_line(s: &str) -> String {
    s.lines().next().unwrap_or("").trim().to_string()
}

/// `CloudProvider` backed by the `az` CLI.
///
/// Each invocation captures stdio into its own files under `capture_dir`
/// (one pair per call, never shared between workers), polls the child,
/// and kills it once the deadline passes.
pub struct AzCli {
    capture_dir: PathBuf,
    seq: AtomicU64,
}

impl AzCli {
    pub fn new(capture_dir: &Path) -> AzCli {
        AzCli {
            capture_dir: capture_dir.to_path_buf(),
            seq: AtomicU64::new(0),
        }
    }

    fn invoke(&self, args: &[&str], timeout: Duration) -> Result<String, ProviderError> {
        let n = self.seq.fetch_add(1, Ordering::Relaxed);
        let stem = format!("az-{}-{}", std::process::id(), n);
        run_captured("az", args, timeout, &self.capture_dir, &stem)
    }
}

/// Spawn `program`, stdio captured to files, hard-killed at `timeout`.
/// Returns captured stdout on exit code 0; classifies stderr otherwise.
fn run_captured(
    program: &str,
    args: &[&str],
    timeout: Duration,
    capture_dir: &Path,
    stem: &str,
) -> Result<String, ProviderError> {
    let stdout_path = capture_dir.join(format!("{}.out", stem));
    let stderr_path = capture_dir.join(format!("{}.err", stem));
    let stdout_file = File::create(&stdout_path)
        .map_err(|e| ProviderError::Transport(format!("create capture file: {}", e)))?;
    let stderr_file = File::create(&stderr_path)
        .map_err(|e| ProviderError::Transport(format!("create capture file: {}", e)))?;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout_file))
        .stderr(Stdio::from(stderr_file))
        .spawn()
        .map_err(|e| ProviderError::Transport(format!("spawn `{}` failed: {}", program, e)))?;

    let started = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if started.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    cleanup(&stdout_path, &stderr_path);
                    return Err(ProviderError::Timeout(timeout));
                }
                thread::sleep(Duration::from_millis(50));
            }
            Err(e) => {
                cleanup(&stdout_path, &stderr_path);
                return Err(ProviderError::Transport(format!(
                    "wait for `{}` failed: {}",
                    program, e
                )));
            }
        }
    };

    let stdout = read_capture(&stdout_path);
    let stderr = read_capture(&stderr_path);
    cleanup(&stdout_path, &stderr_path);
    if status.success() {
        Ok(stdout)
    } else {
        Err(marker_error(stderr))
    }
}

fn read_capture(path: &Path) -> String {
    let mut buf = String::new();
    if let Ok(mut f) = File::open(path) {
        let _ = f.read_to_string(&mut buf);
    }
    buf
}

fn cleanup(stdout_path: &Path, stderr_path: &Path) {
    let _ = std::fs::remove_file(stdout_path);
    let _ = std::fs::remove_file(stderr_path);
}

impl CloudProvider for AzCli {
    fn list_resources(&self, group: &str) -> Result<Vec<Resource>, ProviderError> {
        let raw = self.invoke(
            &["vm", "list", "-g", group, "-o", "json"],
            Duration::from_secs(30),
        )?;
        let entries: Vec<VmEntry> = serde_json::from_str(&raw)
            .map_err(|e| ProviderError::Malformed(format!("vm list: {}", e)))?;
        let mut resources = Vec::new();
        for entry in entries {
            // Entries without a name cannot be addressed; skip them.
            let name = match entry.name.clone() {
                Some(n) => n,
                None => continue,
            };
            let os_type = OsType::from_provider(entry.os_type());
            resources.push(Resource {
                name,
                group: entry.resource_group.unwrap_or_else(|| group.to_string()),
                os_type,
            });
        }
        Ok(resources)
    }

    fn probe_power_state(
        &self,
        resource: &Resource,
        timeout: Duration,
    ) -> Result<PowerState, ProviderError> {
        let raw = self.invoke(
            &[
                "vm",
                "get-instance-view",
                "-g",
                &resource.group,
                "-n",
                &resource.name,
                "--query",
                "instanceView.statuses",
                "-o",
                "json",
            ],
            timeout,
        )?;
        let statuses: Vec<InstanceStatus> = serde_json::from_str(&raw)
            .map_err(|e| ProviderError::Malformed(format!("instance view: {}", e)))?;
        match envelope::power_state(&statuses) {
            Some(state) if state.to_ascii_lowercase().contains("running") => {
                Ok(PowerState::Running)
            }
            Some(state) => Ok(PowerState::NotRunning(state)),
            None => Ok(PowerState::NotRunning("unknown".to_string())),
        }
    }

    fn run_remote(
        &self,
        resource: &Resource,
        script: &str,
        timeout: Duration,
    ) -> Result<RemoteOutput, ProviderError> {
        let raw = self.invoke(
            &[
                "vm",
                "run-command",
                "invoke",
                "-g",
                &resource.group,
                "-n",
                &resource.name,
                "--command-id",
                "RunShellScript",
                "--scripts",
                script,
                "-o",
                "json",
            ],
            timeout,
        )?;
        let env: RunCommandEnvelope = serde_json::from_str(&raw)
            .map_err(|e| ProviderError::Malformed(format!("run-command: {}", e)))?;
        let message = env
            .value
            .first()
            .and_then(|r| r.message.clone())
            .ok_or_else(|| {
                ProviderError::Malformed("run-command response carries no message".to_string())
            })?;
        let (stdout, stderr) = envelope::split_streams(&message).ok_or_else(|| {
            ProviderError::Malformed("run-command message lacks stdout/stderr markers".to_string())
        })?;
        Ok(RemoteOutput { stdout, stderr })
    }
}

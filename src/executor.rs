//! Per-resource check executor: cheap status probe, then the remote
//! command.
//!
//! The probe runs first so stopped or deallocated resources cost only
//! `status_timeout`, never the full command budget. Every failure mode
//! is folded into a `CheckOutcome` here; nothing escapes as an error.

use crate::checks::CheckKind;
use crate::models::{CheckOutcome, OutcomeState, Resource};
use crate::provider::{CloudProvider, PowerState, ProviderError};
use std::time::Duration;

#[derive(Debug, Clone, Copy)]
/// Timeouts governing the two phases of one check.
pub struct ExecTimeouts {
    pub status: Duration,
    pub command: Duration,
}

impl Default for ExecTimeouts {
    fn default() -> ExecTimeouts {
        ExecTimeouts {
            status: Duration::from_secs(10),
            command: Duration::from_secs(60),
        }
    }
}

/// Run one check against one resource and classify the result.
///
/// Probe-phase failures of any kind (including probe timeout) classify as
/// `ConnectionError`; `CommandTimeout` is reserved for the main phase.
pub fn run_check(
    provider: &dyn CloudProvider,
    resource: &Resource,
    kind: CheckKind,
    timeouts: &ExecTimeouts,
) -> CheckOutcome {
    match provider.probe_power_state(resource, timeouts.status) {
        Ok(PowerState::Running) => {}
        Ok(PowerState::NotRunning(state)) => {
            return CheckOutcome::failure(
                &resource.name,
                OutcomeState::ResourceNotRunning,
                state,
            );
        }
        Err(e) => {
            return CheckOutcome::failure(
                &resource.name,
                OutcomeState::ConnectionError,
                e.to_string(),
            );
        }
    }

    match provider.run_remote(resource, kind.script(), timeouts.command) {
        Ok(output) => CheckOutcome::success(&resource.name, output.stdout, output.stderr),
        Err(ProviderError::Malformed(d)) => {
            CheckOutcome::failure(&resource.name, OutcomeState::InvalidResponse, d)
        }
        // Timeout and transport failure of the main command both read as
        // the command not completing in time.
        Err(e) => CheckOutcome::failure(&resource.name, OutcomeState::CommandTimeout, e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OsType;
    use crate::provider::RemoteOutput;
    use std::sync::Mutex;

    /// Scriptable provider for executor tests.
    pub struct FakeProvider {
        pub probe: Box<dyn Fn() -> Result<PowerState, ProviderError> + Sync>,
        pub remote: Box<dyn Fn() -> Result<RemoteOutput, ProviderError> + Sync>,
        pub remote_calls: Mutex<usize>,
    }

    impl CloudProvider for FakeProvider {
        fn list_resources(&self, _group: &str) -> Result<Vec<Resource>, ProviderError> {
            Ok(Vec::new())
        }

        fn probe_power_state(
            &self,
            _resource: &Resource,
            _timeout: Duration,
        ) -> Result<PowerState, ProviderError> {
            (self.probe)()
        }

        fn run_remote(
            &self,
            _resource: &Resource,
            _script: &str,
            _timeout: Duration,
        ) -> Result<RemoteOutput, ProviderError> {
            *self.remote_calls.lock().unwrap() += 1;
            (self.remote)()
        }
    }

    fn resource() -> Resource {
        Resource {
            name: "web-01".into(),
            group: "rg-test".into(),
            os_type: OsType::Linux,
        }
    }

    #[test]
    fn test_running_resource_success() {
        let p = FakeProvider {
            probe: Box::new(|| Ok(PowerState::Running)),
            remote: Box::new(|| {
                Ok(RemoteOutput {
                    stdout: "uptime 1 2".into(),
                    stderr: String::new(),
                })
            }),
            remote_calls: Mutex::new(0),
        };
        let out = run_check(&p, &resource(), CheckKind::Uptime, &ExecTimeouts::default());
        assert_eq!(out.state, OutcomeState::Success);
        assert_eq!(out.stdout, "uptime 1 2");
    }

    #[test]
    fn test_stopped_resource_skips_remote_command() {
        let p = FakeProvider {
            probe: Box::new(|| Ok(PowerState::NotRunning("VM deallocated".into()))),
            remote: Box::new(|| panic!("must not run the command phase")),
            remote_calls: Mutex::new(0),
        };
        let out = run_check(&p, &resource(), CheckKind::Disk, &ExecTimeouts::default());
        assert_eq!(out.state, OutcomeState::ResourceNotRunning);
        assert_eq!(out.stderr, "VM deallocated");
        assert_eq!(*p.remote_calls.lock().unwrap(), 0);
    }

    #[test]
    fn test_probe_timeout_is_connection_error() {
        let p = FakeProvider {
            probe: Box::new(|| Err(ProviderError::Timeout(Duration::from_secs(10)))),
            remote: Box::new(|| panic!("must not run the command phase")),
            remote_calls: Mutex::new(0),
        };
        let out = run_check(&p, &resource(), CheckKind::Disk, &ExecTimeouts::default());
        assert_eq!(out.state, OutcomeState::ConnectionError);
        assert!(out.stdout.is_empty());
    }

    #[test]
    fn test_command_timeout() {
        let p = FakeProvider {
            probe: Box::new(|| Ok(PowerState::Running)),
            remote: Box::new(|| Err(ProviderError::Timeout(Duration::from_secs(60)))),
            remote_calls: Mutex::new(0),
        };
        let out = run_check(&p, &resource(), CheckKind::Memory, &ExecTimeouts::default());
        assert_eq!(out.state, OutcomeState::CommandTimeout);
    }

    #[test]
    fn test_malformed_envelope_is_invalid_response() {
        let p = FakeProvider {
            probe: Box::new(|| Ok(PowerState::Running)),
            remote: Box::new(|| {
                Err(ProviderError::Malformed(
                    "run-command message lacks stdout/stderr markers".into(),
                ))
            }),
            remote_calls: Mutex::new(0),
        };
        let out = run_check(&p, &resource(), CheckKind::Patch, &ExecTimeouts::default());
        assert_eq!(out.state, OutcomeState::InvalidResponse);
    }
}

//! Bounded worker pool: fan out per-resource checks with a concurrency
//! cap and guarantee one recorded outcome per dispatched resource.
//!
//! A dedicated rayon thread pool sized to `max_parallel` carries the
//! bound; `par_iter().map().collect()` carries the one-outcome-per-input
//! guarantee structurally. A panicking check is caught and recorded as
//! `OtherError` rather than taking the run down.

use crate::checks::CheckKind;
use crate::executor::{self, ExecTimeouts};
use crate::models::{CheckOutcome, OutcomeState, Resource};
use crate::provider::CloudProvider;
use rayon::prelude::*;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

#[derive(Debug)]
pub enum PoolError {
    /// The worker pool itself could not be constructed.
    Build(String),
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::Build(d) => write!(f, "worker pool construction failed: {}", d),
        }
    }
}

impl std::error::Error for PoolError {}

/// Run `kind` against every resource, at most `max_parallel` in flight.
///
/// The returned vector has exactly one `CheckOutcome` per input resource,
/// in input order.
pub fn run_pool(
    provider: &dyn CloudProvider,
    resources: &[Resource],
    kind: CheckKind,
    timeouts: &ExecTimeouts,
    max_parallel: usize,
) -> Result<Vec<CheckOutcome>, PoolError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(max_parallel.max(1))
        .build()
        .map_err(|e| PoolError::Build(e.to_string()))?;

    let outcomes = pool.install(|| {
        resources
            .par_iter()
            .map(|res| checked_run(provider, res, kind, timeouts))
            .collect()
    });
    Ok(outcomes)
}

fn checked_run(
    provider: &dyn CloudProvider,
    resource: &Resource,
    kind: CheckKind,
    timeouts: &ExecTimeouts,
) -> CheckOutcome {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        executor::run_check(provider, resource, kind, timeouts)
    }));
    match result {
        Ok(outcome) => outcome,
        Err(payload) => CheckOutcome::failure(
            &resource.name,
            OutcomeState::OtherError,
            format!("check panicked: {}", panic_detail(&*payload)),
        ),
    }
}

fn panic_detail(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OsType;
    use crate::provider::{PowerState, ProviderError, RemoteOutput};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::{Duration, Instant};

    /// Provider that tracks in-flight probe concurrency and can be told
    /// to hang, fail, or panic per resource name.
    struct CountingProvider {
        in_flight: AtomicUsize,
        max_seen: AtomicUsize,
        probe_delay: Duration,
        panic_on: Option<&'static str>,
        timeout_on: Option<&'static str>,
    }

    impl CountingProvider {
        fn new(probe_delay: Duration) -> CountingProvider {
            CountingProvider {
                in_flight: AtomicUsize::new(0),
                max_seen: AtomicUsize::new(0),
                probe_delay,
                panic_on: None,
                timeout_on: None,
            }
        }
    }

    impl CloudProvider for CountingProvider {
        fn list_resources(&self, _group: &str) -> Result<Vec<Resource>, ProviderError> {
            Ok(Vec::new())
        }

        fn probe_power_state(
            &self,
            resource: &Resource,
            _timeout: Duration,
        ) -> Result<PowerState, ProviderError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_seen.fetch_max(now, Ordering::SeqCst);
            thread::sleep(self.probe_delay);
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.panic_on == Some(resource.name.as_str()) {
                panic!("injected probe panic");
            }
            if self.timeout_on == Some(resource.name.as_str()) {
                return Err(ProviderError::Timeout(Duration::from_millis(10)));
            }
            Ok(PowerState::Running)
        }

        fn run_remote(
            &self,
            _resource: &Resource,
            _script: &str,
            _timeout: Duration,
        ) -> Result<RemoteOutput, ProviderError> {
            Ok(RemoteOutput {
                stdout: "0".into(),
                stderr: String::new(),
            })
        }
    }

    fn fleet(n: usize) -> Vec<Resource> {
        (0..n)
            .map(|i| Resource {
                name: format!("vm-{:02}", i),
                group: "rg-test".into(),
                os_type: OsType::Linux,
            })
            .collect()
    }

    #[test]
    fn test_concurrency_never_exceeds_cap() {
        let provider = CountingProvider::new(Duration::from_millis(50));
        let resources = fleet(6);
        let outcomes = run_pool(
            &provider,
            &resources,
            CheckKind::Patch,
            &ExecTimeouts::default(),
            2,
        )
        .unwrap();
        assert_eq!(outcomes.len(), 6);
        assert!(provider.max_seen.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn test_every_resource_yields_exactly_one_outcome() {
        let provider = CountingProvider::new(Duration::from_millis(1));
        let resources = fleet(9);
        let outcomes = run_pool(
            &provider,
            &resources,
            CheckKind::Uptime,
            &ExecTimeouts::default(),
            3,
        )
        .unwrap();
        let mut names: Vec<&str> = outcomes.iter().map(|o| o.resource_name.as_str()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 9);
    }

    #[test]
    fn test_panicking_check_is_recorded_not_fatal() {
        let mut provider = CountingProvider::new(Duration::from_millis(1));
        provider.panic_on = Some("vm-02");
        let resources = fleet(5);
        let outcomes = run_pool(
            &provider,
            &resources,
            CheckKind::Disk,
            &ExecTimeouts::default(),
            2,
        )
        .unwrap();
        assert_eq!(outcomes.len(), 5);
        let bad = outcomes
            .iter()
            .find(|o| o.resource_name == "vm-02")
            .unwrap();
        assert_eq!(bad.state, OutcomeState::OtherError);
        assert!(bad.stderr.contains("injected probe panic"));
        let good = outcomes.iter().filter(|o| o.state == OutcomeState::Success);
        assert_eq!(good.count(), 4);
    }

    #[test]
    fn test_one_slow_failure_does_not_block_the_rest() {
        let mut provider = CountingProvider::new(Duration::from_millis(5));
        provider.timeout_on = Some("vm-01");
        let resources = fleet(5);
        let started = Instant::now();
        let outcomes = run_pool(
            &provider,
            &resources,
            CheckKind::Memory,
            &ExecTimeouts::default(),
            2,
        )
        .unwrap();
        assert_eq!(outcomes.len(), 5);
        let failed = outcomes
            .iter()
            .find(|o| o.resource_name == "vm-01")
            .unwrap();
        assert_eq!(failed.state, OutcomeState::ConnectionError);
        assert_eq!(
            outcomes
                .iter()
                .filter(|o| o.state == OutcomeState::Success)
                .count(),
            4
        );
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_zero_parallelism_is_clamped_to_one() {
        let provider = CountingProvider::new(Duration::from_millis(1));
        let resources = fleet(3);
        let outcomes = run_pool(
            &provider,
            &resources,
            CheckKind::Disk,
            &ExecTimeouts::default(),
            0,
        )
        .unwrap();
        assert_eq!(outcomes.len(), 3);
        assert_eq!(provider.max_seen.load(Ordering::SeqCst), 1);
    }
}

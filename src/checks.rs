//! Check catalogue: remote scripts, metric parsing, and threshold tests.
//!
//! Each check kind pairs a fixed remote shell script with a parser that
//! extracts a single metric from the captured stdout, and a pure
//! comparison deciding whether the metric crosses its threshold.
//! Boundary semantics: disk/memory/uptime report at `>=` their threshold,
//! pending patches report at `> 0`.

use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// The four supported health checks.
pub enum CheckKind {
    Disk,
    Memory,
    Uptime,
    Patch,
}

impl CheckKind {
    pub fn name(self) -> &'static str {
        match self {
            CheckKind::Disk => "disk",
            CheckKind::Memory => "memory",
            CheckKind::Uptime => "uptime",
            CheckKind::Patch => "patch",
        }
    }

    /// The shell script executed on the remote resource for this check.
    pub fn script(self) -> &'static str {
        match self {
            CheckKind::Disk => "df -h -x tmpfs -x devtmpfs -x overlay",
            CheckKind::Memory => "free -m",
            CheckKind::Uptime => "cat /proc/uptime",
            CheckKind::Patch => concat!(
                "if command -v apt-get >/dev/null 2>&1; then ",
                "apt-get -s upgrade 2>/dev/null | grep -c '^Inst ' || true; ",
                "elif command -v yum >/dev/null 2>&1; then ",
                "yum -q check-update 2>/dev/null | grep -c . || true; ",
                "else echo 'Unable to determine patch status'; fi",
            ),
        }
    }
}

/// Output marker recognized in patch-check stdout. Parsed once at the
/// boundary; everything unrecognized falls back to `Unknown`.
const PATCH_UNDETERMINED: &str = "Unable to determine patch status";

#[derive(Debug, Clone, PartialEq)]
/// A metric extracted from one check's stdout.
pub enum Metric {
    DiskUsage { pct: u64, mount: String },
    MemoryUsage { pct: f64 },
    UptimeDays { days: f64 },
    PendingPatches { count: u64 },
    PatchStatusUnknown,
}

/// Parse the metric for `kind` from captured stdout. `None` means the
/// output did not contain the expected shape.
pub fn parse_metric(kind: CheckKind, stdout: &str) -> Option<Metric> {
    match kind {
        CheckKind::Disk => parse_disk(stdout),
        CheckKind::Memory => parse_memory(stdout),
        CheckKind::Uptime => parse_uptime(stdout),
        CheckKind::Patch => parse_patch(stdout),
    }
}

/// Highest use% across mounted filesystems in `df -h` output.
fn parse_disk(stdout: &str) -> Option<Metric> {
    let re = Regex::new(r"(?m)^\S+\s+\S+\s+\S+\s+\S+\s+(\d+)%\s+(\S+)\s*$").ok()?;
    let mut worst: Option<(u64, String)> = None;
    for cap in re.captures_iter(stdout) {
        let pct: u64 = cap[1].parse().ok()?;
        let mount = cap[2].to_string();
        match &worst {
            Some((best, _)) if *best >= pct => {}
            _ => worst = Some((pct, mount)),
        }
    }
    worst.map(|(pct, mount)| Metric::DiskUsage { pct, mount })
}

/// Used-memory percentage from the `Mem:` line of `free -m`.
fn parse_memory(stdout: &str) -> Option<Metric> {
    let line = stdout.lines().find(|l| l.trim_start().starts_with("Mem:"))?;
    let mut fields = line.split_whitespace().skip(1);
    let total: f64 = fields.next()?.parse().ok()?;
    let used: f64 = fields.next()?.parse().ok()?;
    if total <= 0.0 {
        return None;
    }
    Some(Metric::MemoryUsage {
        pct: used / total * 100.0,
    })
}

/// Uptime in days from the first field of `/proc/uptime`.
fn parse_uptime(stdout: &str) -> Option<Metric> {
    let secs: f64 = stdout.split_whitespace().next()?.parse().ok()?;
    Some(Metric::UptimeDays {
        days: secs / 86_400.0,
    })
}

/// Pending-update count, or the recognized "cannot determine" marker.
fn parse_patch(stdout: &str) -> Option<Metric> {
    if stdout.contains(PATCH_UNDETERMINED) {
        return Some(Metric::PatchStatusUnknown);
    }
    let count: u64 = stdout.split_whitespace().last()?.parse().ok()?;
    Some(Metric::PendingPatches { count })
}

#[derive(Debug, Clone, Copy)]
/// Configured reporting thresholds, one per metric-bearing check.
pub struct Thresholds {
    pub disk_pct: f64,
    pub memory_pct: f64,
    pub uptime_days: f64,
}

impl Default for Thresholds {
    fn default() -> Thresholds {
        Thresholds {
            disk_pct: 85.0,
            memory_pct: 90.0,
            uptime_days: 30.0,
        }
    }
}

pub fn disk_over(pct: u64, threshold: f64) -> bool {
    pct as f64 >= threshold
}

pub fn memory_over(pct: f64, threshold: f64) -> bool {
    pct >= threshold
}

pub fn uptime_over(days: f64, max_days: f64) -> bool {
    days >= max_days
}

pub fn patches_pending(count: u64) -> bool {
    count > 0
}

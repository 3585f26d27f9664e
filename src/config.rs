//! Configuration discovery and effective settings resolution.
//!
//! Fleetprobe reads `fleetprobe.toml|yaml|yml` from the start directory
//! (or closest ancestor) and merges it with CLI flags into an `Effective`
//! config. Defaults:
//! - `output`: `human`
//! - `[pool].max_parallel`: 5
//! - `[timeouts].status_secs`: 10, `command_secs`: 60
//! - `[disk].threshold_pct`: 85, `[memory].threshold_pct`: 90,
//!   `[uptime].max_days`: 30
//!
//! Overrides precedence: CLI > config file > defaults. The resource group
//! has no default; it must come from a flag or the config file.

use crate::checks::Thresholds;
use crate::executor::ExecTimeouts;
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug)]
/// A config file that exists but cannot be used. Fatal: the run must not
/// proceed on defaults the operator did not choose.
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(p, e) => write!(f, "cannot read config '{}': {}", p.display(), e),
            ConfigError::Parse(p, e) => {
                write!(f, "config '{}' is not valid: {}", p.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Default, Deserialize, Clone)]
/// Root configuration loaded from `fleetprobe.toml|yaml`.
pub struct FleetConfig {
    pub group: Option<String>,
    pub output: Option<String>,
    #[serde(default)]
    pub filter: Option<FilterCfg>,
    #[serde(default)]
    pub pool: Option<PoolCfg>,
    #[serde(default)]
    pub timeouts: Option<TimeoutsCfg>,
    #[serde(default)]
    pub disk: Option<DiskCfg>,
    #[serde(default)]
    pub memory: Option<MemoryCfg>,
    #[serde(default)]
    pub uptime: Option<UptimeCfg>,
}

#[derive(Debug, Default, Deserialize, Clone)]
/// Include/omit glob lists under `[filter]`.
pub struct FilterCfg {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub omit: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct PoolCfg {
    pub max_parallel: Option<usize>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct TimeoutsCfg {
    pub status_secs: Option<u64>,
    pub command_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct DiskCfg {
    pub threshold_pct: Option<f64>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct MemoryCfg {
    pub threshold_pct: Option<f64>,
}

#[derive(Debug, Default, Deserialize, Clone)]
pub struct UptimeCfg {
    pub max_days: Option<f64>,
}

#[derive(Debug, Default, Clone)]
/// CLI-sourced overrides, `None`/empty meaning "not given".
pub struct Overrides {
    pub start_dir: Option<String>,
    pub group: Option<String>,
    pub include: Vec<String>,
    pub omit: Vec<String>,
    pub max_parallel: Option<usize>,
    pub status_timeout_secs: Option<u64>,
    pub command_timeout_secs: Option<u64>,
    pub output: Option<String>,
    pub disk_pct: Option<f64>,
    pub memory_pct: Option<f64>,
    pub uptime_days: Option<f64>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by commands after applying precedence.
pub struct Effective {
    pub root: PathBuf,
    /// Whether a config file was found (drives the "using defaults" note).
    pub config_found: bool,
    pub group: Option<String>,
    pub output: String,
    pub include: Vec<String>,
    pub omit: Vec<String>,
    pub max_parallel: usize,
    pub timeouts: ExecTimeouts,
    pub thresholds: Thresholds,
}

/// Config file names probed in order; first hit wins.
const CONFIG_FILES: &[&str] = &["fleetprobe.toml", "fleetprobe.yaml", "fleetprobe.yml"];

/// Walk upward from `start` to locate the configuration root.
///
/// Stops when a config file or a `.git` directory is found.
pub fn detect_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        let has_config = CONFIG_FILES.iter().any(|name| cur.join(name).exists());
        if has_config || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `FleetConfig` from the first config file present under `root`.
///
/// `Ok(None)` means no config file exists. A file that exists but cannot
/// be read or parsed is an error, never a silent fall back to defaults.
pub fn load_config(root: &Path) -> Result<Option<FleetConfig>, ConfigError> {
    for name in CONFIG_FILES {
        let path = root.join(name);
        if !path.exists() {
            continue;
        }
        let text =
            fs::read_to_string(&path).map_err(|e| ConfigError::Io(path.clone(), e))?;
        let cfg: FleetConfig = if name.ends_with(".toml") {
            toml::from_str(&text).map_err(|e| ConfigError::Parse(path.clone(), e.to_string()))?
        } else {
            serde_yaml::from_str(&text)
                .map_err(|e| ConfigError::Parse(path.clone(), e.to_string()))?
        };
        return Ok(Some(cfg));
    }
    Ok(None)
}

/// Resolve `Effective` by merging CLI overrides, discovered config, and
/// defaults. Errors when a config file is present but unusable.
pub fn resolve_effective(cli: &Overrides) -> Result<Effective, ConfigError> {
    let start = PathBuf::from(cli.start_dir.as_deref().unwrap_or("."));
    let root = detect_root(&start);
    let loaded = load_config(&root)?;
    let config_found = loaded.is_some();
    let cfg = loaded.unwrap_or_default();

    let group = cli.group.clone().or(cfg.group);

    let output = cli
        .output
        .clone()
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());

    let filter = cfg.filter.unwrap_or_default();
    let include = if cli.include.is_empty() {
        filter.include
    } else {
        cli.include.clone()
    };
    let omit = if cli.omit.is_empty() {
        filter.omit
    } else {
        cli.omit.clone()
    };

    let max_parallel = cli
        .max_parallel
        .or_else(|| cfg.pool.as_ref().and_then(|p| p.max_parallel))
        .unwrap_or(5);

    let status_secs = cli
        .status_timeout_secs
        .or_else(|| cfg.timeouts.as_ref().and_then(|t| t.status_secs))
        .unwrap_or(10);
    let command_secs = cli
        .command_timeout_secs
        .or_else(|| cfg.timeouts.as_ref().and_then(|t| t.command_secs))
        .unwrap_or(60);

    let defaults = Thresholds::default();
    let thresholds = Thresholds {
        disk_pct: cli
            .disk_pct
            .or_else(|| cfg.disk.as_ref().and_then(|d| d.threshold_pct))
            .unwrap_or(defaults.disk_pct),
        memory_pct: cli
            .memory_pct
            .or_else(|| cfg.memory.as_ref().and_then(|m| m.threshold_pct))
            .unwrap_or(defaults.memory_pct),
        uptime_days: cli
            .uptime_days
            .or_else(|| cfg.uptime.as_ref().and_then(|u| u.max_days))
            .unwrap_or(defaults.uptime_days),
    };

    Ok(Effective {
        root,
        config_found,
        group,
        output,
        include,
        omit,
        max_parallel,
        timeouts: ExecTimeouts {
            status: Duration::from_secs(status_secs),
            command: Duration::from_secs(command_secs),
        },
        thresholds,
    })
}

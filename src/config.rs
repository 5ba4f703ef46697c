// src/config.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::monitoring::MonitoringEntry;

const ENV_MONITORINGS_PATH: &str = "MONITORINGS_PATH";

/// Runtime knobs for the watch loop, all overridable from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchConfig {
    pub startup_delay: Duration,
    pub interval: Duration,
    pub request_timeout: Duration,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            startup_delay: Duration::from_secs(5),
            interval: Duration::from_secs(30),
            request_timeout: Duration::from_secs(20),
        }
    }
}

impl WatchConfig {
    /// WATCH_STARTUP_DELAY_SECS / WATCH_INTERVAL_SECS /
    /// WATCH_REQUEST_TIMEOUT_SECS, falling back to the defaults above.
    pub fn from_env() -> Self {
        fn secs(var: &str, default: Duration) -> Duration {
            std::env::var(var)
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(default)
        }
        let d = Self::default();
        Self {
            startup_delay: secs("WATCH_STARTUP_DELAY_SECS", d.startup_delay),
            interval: secs("WATCH_INTERVAL_SECS", d.interval),
            request_timeout: secs("WATCH_REQUEST_TIMEOUT_SECS", d.request_timeout),
        }
    }
}

/// Load seed monitorings from an explicit path. Supports TOML or JSON.
pub fn load_monitorings_from(path: &Path) -> Result<Vec<MonitoringEntry>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading monitorings from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_monitorings(&content, ext.as_str())
}

/// Load seed monitorings using env var + fallbacks:
/// 1) $MONITORINGS_PATH
/// 2) config/monitorings.toml
/// 3) config/monitorings.json
pub fn load_monitorings_default() -> Result<Vec<MonitoringEntry>> {
    if let Ok(p) = std::env::var(ENV_MONITORINGS_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_monitorings_from(&pb);
        }
        return Err(anyhow!("MONITORINGS_PATH points to non-existent path"));
    }
    let toml_p = PathBuf::from("config/monitorings.toml");
    if toml_p.exists() {
        return load_monitorings_from(&toml_p);
    }
    let json_p = PathBuf::from("config/monitorings.json");
    if json_p.exists() {
        return load_monitorings_from(&json_p);
    }
    Ok(Vec::new())
}

fn parse_monitorings(s: &str, hint_ext: &str) -> Result<Vec<MonitoringEntry>> {
    let try_toml = hint_ext == "toml" || s.contains("[[monitorings]]");
    if try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    if let Ok(v) = parse_json(s) {
        return Ok(v);
    }
    if !try_toml {
        if let Ok(v) = parse_toml(s) {
            return Ok(v);
        }
    }
    Err(anyhow!("unsupported monitorings format"))
}

fn parse_toml(s: &str) -> Result<Vec<MonitoringEntry>> {
    #[derive(serde::Deserialize)]
    struct TomlSeed {
        monitorings: Vec<MonitoringEntry>,
    }
    let v: TomlSeed = toml::from_str(s)?;
    Ok(v.monitorings)
}

fn parse_json(s: &str) -> Result<Vec<MonitoringEntry>> {
    let v: Vec<MonitoringEntry> = serde_json::from_str(s)?;
    Ok(v)
}

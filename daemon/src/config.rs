//! Daemon configuration with TOML file support.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use repwatch_monitor::MonitorConfig;
use repwatch_types::RepAddress;
use repwatch_utils::LogFormat;

/// Configuration for the `repwatch` binary.
///
/// Loaded from a TOML file via [`DaemonConfig::from_toml_file`]; command-line
/// flags and `REPWATCH_*` environment variables override file values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Ledger node RPC endpoint.
    #[serde(default = "default_node_url")]
    pub node_url: String,

    /// Uptime provider base URL. Empty means not configured.
    #[serde(default)]
    pub reputation_url: String,

    /// Crawler base URL. Empty means not configured.
    #[serde(default)]
    pub crawler_url: String,

    /// Wallet account ids to watch.
    #[serde(default)]
    pub accounts: Vec<RepAddress>,

    /// JSON file holding persisted state (the known list).
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Seconds between overview runs in watch mode.
    #[serde(default = "default_watch_interval_secs")]
    pub watch_interval_secs: u64,

    #[serde(default)]
    pub monitor: MonitorConfig,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_node_url() -> String {
    "https://kaliumapi.appditto.com/api".to_string()
}

fn default_data_file() -> PathBuf {
    PathBuf::from("./repwatch.json")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_watch_interval_secs() -> u64 {
    300
}

// ── Impl ───────────────────────────────────────────────────────────────

impl DaemonConfig {
    pub fn from_toml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            node_url: default_node_url(),
            reputation_url: String::new(),
            crawler_url: String::new(),
            accounts: Vec::new(),
            data_file: default_data_file(),
            log_format: LogFormat::default(),
            log_level: default_log_level(),
            watch_interval_secs: default_watch_interval_secs(),
            monitor: MonitorConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = DaemonConfig::from_toml_str("").unwrap();
        assert_eq!(config, DaemonConfig::default());
        assert_eq!(config.watch_interval_secs, 300);
        assert_eq!(config.monitor.store_key, "banvault-representatives");
    }

    #[test]
    fn full_file_parses() {
        let toml = r#"
            node_url = "http://localhost:7072"
            reputation_url = "https://uptime.example/api"
            crawler_url = "https://crawler.example/api"
            accounts = ["ban_1a", "ban_1b"]
            data_file = "/var/lib/repwatch/state.json"
            log_format = "json"
            log_level = "debug"
            watch_interval_secs = 60

            [monitor]
            crawler_min_weight = 2500
        "#;
        let config = DaemonConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.node_url, "http://localhost:7072");
        assert_eq!(config.accounts, vec![RepAddress::new("ban_1a"), RepAddress::new("ban_1b")]);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.watch_interval_secs, 60);
        assert_eq!(config.monitor.crawler_min_weight, 2500);
        assert_eq!(config.monitor.address_prefix, "ban_");
    }

    #[test]
    fn round_trips() {
        let config = DaemonConfig {
            accounts: vec![RepAddress::new("ban_1x")],
            ..Default::default()
        };
        let parsed = DaemonConfig::from_toml_str(&config.to_toml_string().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repwatch.toml");
        std::fs::write(&path, "log_level = \"warn\"\n").unwrap();
        assert_eq!(DaemonConfig::from_toml_file(&path).unwrap().log_level, "warn");
        assert!(DaemonConfig::from_toml_file(dir.path().join("missing.toml")).is_err());
    }
}

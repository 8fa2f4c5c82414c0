//! Monitor configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use repwatch_types::DEFAULT_PREFIX;

use crate::MonitorError;

/// Configuration for a [`crate::RepresentativeMonitor`].
///
/// Can be loaded from a TOML file via [`MonitorConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Store key holding the known-representative list.
    #[serde(default = "default_store_key")]
    pub store_key: String,

    /// Key an earlier release stored the list under. Migrated once, then removed.
    #[serde(default = "default_legacy_store_key")]
    pub legacy_store_key: String,

    /// Address prefix ids are normalised to (e.g. `ban_`).
    #[serde(default = "default_address_prefix")]
    pub address_prefix: String,

    /// Minimum weight a crawled representative needs to seed the known list.
    #[serde(default = "default_crawler_min_weight")]
    pub crawler_min_weight: u64,

    /// Only ask the crawler for representatives it currently sees online.
    #[serde(default = "default_true")]
    pub crawler_online_only: bool,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_store_key() -> String {
    "banvault-representatives".to_string()
}

fn default_legacy_store_key() -> String {
    "nanovault-representatives".to_string()
}

fn default_address_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_crawler_min_weight() -> u64 {
    100_000
}

fn default_true() -> bool {
    true
}

// ── Impl ───────────────────────────────────────────────────────────────

impl MonitorConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, MonitorError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| MonitorError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, MonitorError> {
        toml::from_str(s).map_err(|e| MonitorError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, MonitorError> {
        toml::to_string_pretty(self).map_err(|e| MonitorError::Config(e.to_string()))
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            store_key: default_store_key(),
            legacy_store_key: default_legacy_store_key(),
            address_prefix: default_address_prefix(),
            crawler_min_weight: default_crawler_min_weight(),
            crawler_online_only: default_true(),
        }
    }
}

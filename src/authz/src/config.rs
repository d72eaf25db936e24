//! Engine configuration loading and validation

use crate::roles::cache::DEFAULT_MAX_ENTRIES;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Authorization engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AuthzConfig {
    /// How long (in ms) authorization roles are cached. Zero or less
    /// disables the cache; role changes are then visible immediately.
    #[serde(default = "default_role_cache_ttl", alias = "authorizationRoleCacheTTL")]
    pub role_cache_ttl_ms: i64,

    /// Maximum number of (entity, group) role sets kept in the cache
    #[serde(default = "default_max_entries")]
    pub role_cache_max_entries: usize,

    /// Collect decision counters
    #[serde(default = "default_true")]
    pub enable_metrics: bool,

    /// Emit audit records for denials
    #[serde(default = "default_true")]
    pub enable_audit: bool,
}

fn default_true() -> bool { true }
fn default_role_cache_ttl() -> i64 { 2000 }
fn default_max_entries() -> usize { DEFAULT_MAX_ENTRIES }

impl Default for AuthzConfig {
    fn default() -> Self {
        Self {
            role_cache_ttl_ms: default_role_cache_ttl(),
            role_cache_max_entries: default_max_entries(),
            enable_metrics: true,
            enable_audit: true,
        }
    }
}

impl AuthzConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml_str(&contents)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Parse configuration from a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AuthzConfig =
            toml::from_str(contents).context("Failed to parse TOML config")?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.role_cache_max_entries == 0 {
            anyhow::bail!("role_cache_max_entries must be greater than zero");
        }
        Ok(())
    }

    /// Cache TTL, or `None` when caching is disabled
    pub fn cache_ttl(&self) -> Option<Duration> {
        (self.role_cache_ttl_ms > 0).then(|| Duration::from_millis(self.role_cache_ttl_ms as u64))
    }
}

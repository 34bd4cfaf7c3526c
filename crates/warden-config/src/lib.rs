//! Configuration management for Warden
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. Environment variables (WARDEN_* prefix, highest precedence)
//! 2. warden.local.toml (gitignored, local overrides)
//! 3. warden.toml (git-tracked, project config)
//! 4. ~/.config/warden/config.toml (user defaults)
//! 5. Built-in defaults (lowest precedence)

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::{ConfigLayer, Paths};

/// Main Warden configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WardenConfig {
    pub entitlements: EntitlementsConfig,
    pub scope: ScopeConfig,
    pub logging: LoggingConfig,
}

/// Entitlement cache and store settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntitlementsConfig {
    pub cache_ttl_secs: u64,
    pub cache_max_entries: usize,
    /// Upper bound on one store lookup. Unset waits indefinitely.
    pub lookup_timeout_ms: Option<u64>,
}

impl Default for EntitlementsConfig {
    fn default() -> Self {
        Self {
            cache_ttl_secs: 300,
            cache_max_entries: 10_000,
            lookup_timeout_ms: None,
        }
    }
}

impl EntitlementsConfig {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn lookup_timeout(&self) -> Option<Duration> {
        self.lookup_timeout_ms.map(Duration::from_millis)
    }
}

/// Region scoping settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    /// Cycle handling. Unset uses the build default.
    pub integrity: Option<IntegrityMode>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum IntegrityMode {
    Strict,
    FailClosed,
}

/// Tracing subscriber settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG` when set.
    pub filter: String,
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            ansi: true,
        }
    }
}

impl WardenConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Load configuration from specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// Parse a single TOML document, without layering
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values that would disable the entitlement cache
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entitlements.cache_ttl_secs == 0 {
            return Err(ConfigError::ValidationError(
                "entitlements.cache_ttl_secs must be greater than 0".to_string(),
            ));
        }
        if self.entitlements.cache_max_entries == 0 {
            return Err(ConfigError::ValidationError(
                "entitlements.cache_max_entries must be greater than 0".to_string(),
            ));
        }
        if self.entitlements.lookup_timeout_ms == Some(0) {
            return Err(ConfigError::ValidationError(
                "entitlements.lookup_timeout_ms must be greater than 0 when set".to_string(),
            ));
        }
        Ok(())
    }
}

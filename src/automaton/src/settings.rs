//! Automata settings loading and the process-wide state ceiling

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::info;

/// Default ceiling on determinized states
pub const DEFAULT_MAX_DETERMINIZED_STATES: usize = 100_000;

/// Smallest ceiling accepted from configuration
pub const MIN_MAX_DETERMINIZED_STATES: usize = 10_000;

static MAX_DETERMINIZED_STATES: AtomicUsize = AtomicUsize::new(DEFAULT_MAX_DETERMINIZED_STATES);

/// Current process-wide ceiling on determinized states
pub fn max_determinized_states() -> usize {
    MAX_DETERMINIZED_STATES.load(Ordering::Relaxed)
}

/// Automaton construction settings
///
/// ```toml
/// max_determinized_states = 50000
///
/// [cache]
/// enabled = true
/// size = 5000
/// ttl_secs = 3600
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AutomataSettings {
    #[serde(default = "default_max_determinized_states")]
    pub max_determinized_states: usize,

    #[serde(default)]
    pub cache: CacheSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CacheSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_cache_size")]
    pub size: usize,
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

// Default value functions
fn default_true() -> bool { true }
fn default_max_determinized_states() -> usize { DEFAULT_MAX_DETERMINIZED_STATES }
fn default_cache_size() -> usize { 10_000 }
fn default_cache_ttl() -> u64 { 48 * 60 * 60 }

impl Default for AutomataSettings {
    fn default() -> Self {
        Self {
            max_determinized_states: default_max_determinized_states(),
            cache: CacheSettings::default(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            size: default_cache_size(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl AutomataSettings {
    /// Load settings from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .context("Failed to read automata settings file")?;

        Self::from_toml_str(&contents)
    }

    /// Parse and validate settings from a TOML string
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let settings: AutomataSettings =
            toml::from_str(contents).context("Failed to parse automata settings")?;

        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings
    pub fn validate(&self) -> Result<()> {
        if self.max_determinized_states < MIN_MAX_DETERMINIZED_STATES {
            anyhow::bail!(
                "max_determinized_states must be at least {}, got {}",
                MIN_MAX_DETERMINIZED_STATES,
                self.max_determinized_states
            );
        }

        if self.cache.enabled && self.cache.size == 0 {
            anyhow::bail!("cache.size must be greater than 0 when the cache is enabled");
        }

        if self.cache.enabled && self.cache.ttl_secs == 0 {
            anyhow::bail!("cache.ttl_secs must be greater than 0 when the cache is enabled");
        }

        Ok(())
    }

    /// Publish the state ceiling process-wide
    ///
    /// Automata built afterwards use the new ceiling. The default compiler's
    /// cache is cleared so no entry outlives the ceiling it was built under.
    pub fn apply(&self) {
        let previous =
            MAX_DETERMINIZED_STATES.swap(self.max_determinized_states, Ordering::Relaxed);
        if previous != self.max_determinized_states {
            info!(
                "Automaton state ceiling changed from {} to {}",
                previous, self.max_determinized_states
            );
            crate::compiler::clear_default_cache();
        }
    }
}

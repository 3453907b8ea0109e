//! Configuration management for Fencepost.
//!
//! Provides the settings consumed by the barrier search pass. Values are
//! validated when loaded; the optimizer trusts what it is handed.

use std::path::Path;

use common_error::{FenceError, FenceResult, ensure};
use serde::{Deserialize, Serialize};

/// Smallest accepted cost-ratio threshold.
pub const MIN_THRESHOLD: f64 = 0.0;

/// Largest accepted cost-ratio threshold.
pub const MAX_THRESHOLD: f64 = 10_000.0;

/// Global Fencepost configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FencepostConfig {
    /// Barrier search configuration.
    pub barrier_search: BarrierSearchConfig,
}

impl FencepostConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(source: &str) -> FenceResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(source: &str) -> FenceResult<Self> {
        let config: Self = serde_json::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, choosing the format from its extension.
    pub fn from_file(path: impl AsRef<Path>) -> FenceResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&source),
            Some("json") => Self::from_json_str(&source),
            other => Err(FenceError::config(format!(
                "unsupported config format {:?} for {}",
                other.unwrap_or(""),
                path.display()
            ))),
        }
    }

    /// Check every section against its declared ranges.
    pub fn validate(&self) -> FenceResult<()> {
        self.barrier_search.validate()
    }
}

/// Settings for the offset-barrier search over existence-test subqueries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BarrierSearchConfig {
    /// When false, only the baseline plan is produced.
    pub enabled: bool,
    /// Minimum baseline/mutated cost ratio needed to keep a mutated plan.
    pub threshold: f64,
    /// Record every candidate in the search outcome.
    pub trace: bool,
}

impl Default for BarrierSearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold: 1.0,
            trace: false,
        }
    }
}

impl BarrierSearchConfig {
    /// Enable or disable the search.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the cost-ratio threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Enable or disable candidate tracing.
    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// Reject thresholds outside `[MIN_THRESHOLD, MAX_THRESHOLD]`.
    pub fn validate(&self) -> FenceResult<()> {
        ensure!(
            (MIN_THRESHOLD..=MAX_THRESHOLD).contains(&self.threshold),
            ConfigError: "barrier_search.threshold must be within [{MIN_THRESHOLD}, {MAX_THRESHOLD}], got {}",
            self.threshold
        );
        Ok(())
    }
}

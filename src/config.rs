use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PLACEHOLDER_CHAR: char = '\u{2021}';
pub const DEFAULT_DISPLAY_CHAR: char = '_';
pub const DEFAULT_MIN_LITERAL_RUN: usize = 2;
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.8;
pub const DEFAULT_ADAPT_DIFF_TOLERANCE: usize = 3;
pub const DEFAULT_DIFF_TIMEOUT_MS: u64 = 1000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("similarity threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),
    #[error("grouping key of item {index} contains the placeholder char {placeholder:?}")]
    PlaceholderInKey { index: usize, placeholder: char },
    #[error("config read error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunables for one grouping run. Passed by reference into every decision,
/// so runs with different settings never interfere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupingConfig {
    /// Internal marker for differing regions. Must never occur in a grouping key.
    pub placeholder_char: char,
    /// Substitute for `placeholder_char` in human-readable templates.
    pub placeholder_display_char: char,
    /// An equal run must be strictly longer than this to count as a literal.
    pub min_literal_run: usize,
    /// Accept/merge requires a similarity ratio strictly above this.
    pub similarity_threshold: f64,
    /// Reserved; no decision reads it yet.
    pub adapt_diff_tolerance: usize,
    /// Emit a trailing insert/delete run as a final placeholder instead of dropping it.
    pub flush_trailing_placeholder: bool,
    /// Wall-clock budget per diff. `None` disables the budget and the half-match speedup.
    pub diff_timeout_ms: Option<u64>,
}

impl Default for GroupingConfig {
    fn default() -> Self {
        Self {
            placeholder_char: DEFAULT_PLACEHOLDER_CHAR,
            placeholder_display_char: DEFAULT_DISPLAY_CHAR,
            min_literal_run: DEFAULT_MIN_LITERAL_RUN,
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            adapt_diff_tolerance: DEFAULT_ADAPT_DIFF_TOLERANCE,
            flush_trailing_placeholder: false,
            diff_timeout_ms: Some(DEFAULT_DIFF_TIMEOUT_MS),
        }
    }
}

impl GroupingConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: GroupingConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = self.similarity_threshold;
        if t.is_nan() || !(0.0..=1.0).contains(&t) {
            return Err(ConfigError::InvalidThreshold(t));
        }
        Ok(())
    }

    pub fn diff_timeout(&self) -> Option<Duration> {
        self.diff_timeout_ms.map(Duration::from_millis)
    }

    /// Fails on the first key that contains the placeholder char.
    pub fn check_keys<I, S>(&self, keys: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for (index, key) in keys.into_iter().enumerate() {
            if key.as_ref().contains(self.placeholder_char) {
                return Err(ConfigError::PlaceholderInKey { index, placeholder: self.placeholder_char });
            }
        }
        Ok(())
    }
}

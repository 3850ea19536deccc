//! Duplicate-detection configuration
//!
//! Loaded from YAML. Every field has a default, so an empty document is a
//! valid configuration.
//!
//! ```yaml
//! threshold: 3
//! display_limit: 10
//! limits:
//!   max_name_length: 500
//!   max_candidates: 5000
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{DedupError, Result};
use crate::matcher::{SimilarityMatcher, DEFAULT_THRESHOLD};
use crate::types::NamedCandidate;

/// Upper bound for `display_limit`, matching the server-side lookup
pub const MAX_DISPLAY_LIMIT: usize = 50;

/// Root configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Maximum edit distance reported as similar
    pub threshold: usize,
    /// Keep at most this many matches (closest first); `None` keeps all
    pub display_limit: Option<usize>,
    pub limits: InputLimits,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            display_limit: Some(10),
            limits: InputLimits::default(),
        }
    }
}

/// Caller-side bounds on matcher input.
///
/// Matching costs O(k·n·m) for k candidates and names of length n and m.
/// The engine and matcher never enforce these; callers check before
/// invoking them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputLimits {
    /// Maximum proposed name length, in characters
    pub max_name_length: usize,
    /// Maximum number of candidates compared in one check
    pub max_candidates: usize,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            max_name_length: 500,
            max_candidates: 5000,
        }
    }
}

impl InputLimits {
    /// Reject a proposed name longer than `max_name_length` characters.
    /// Surrounding whitespace does not count.
    pub fn check_name(&self, name: &str) -> Result<()> {
        let len = name.trim().chars().count();
        if len > self.max_name_length {
            return Err(DedupError::LimitExceeded {
                what: "name length",
                actual: len,
                max: self.max_name_length,
            });
        }
        Ok(())
    }

    pub fn check_candidates(&self, candidates: &[NamedCandidate]) -> Result<()> {
        if candidates.len() > self.max_candidates {
            return Err(DedupError::LimitExceeded {
                what: "candidate count",
                actual: candidates.len(),
                max: self.max_candidates,
            });
        }
        Ok(())
    }
}

impl DedupConfig {
    /// Load configuration from a YAML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DedupError::Config(format!("{}: {}", path, e)))?;
        Self::from_yaml(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: DedupConfig =
            serde_yaml::from_str(content).map_err(|e| DedupError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(limit) = self.display_limit {
            if limit == 0 || limit > MAX_DISPLAY_LIMIT {
                return Err(DedupError::Config(format!(
                    "display_limit must be between 1 and {}, got {}",
                    MAX_DISPLAY_LIMIT, limit
                )));
            }
        }
        if self.limits.max_name_length == 0 {
            return Err(DedupError::Config(
                "limits.max_name_length must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Matcher configured with this threshold and display limit
    pub fn matcher(&self) -> SimilarityMatcher {
        let matcher = SimilarityMatcher::new(self.threshold);
        match self.display_limit {
            Some(limit) => matcher.with_limit(limit),
            None => matcher,
        }
    }
}

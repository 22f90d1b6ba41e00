//! Classifier configuration.
//!
//! A TOML file may set any subset of the fields; missing ones keep their
//! defaults:
//!
//! ```toml
//! max_rank = 6
//! eta_interval = 50
//! cache_path = "ns_tools.json"
//! provable = false
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::div_set::MAX_RANK;
use crate::error::{LatticeError, Result};

/// Smallest rank that is classified.
pub const MIN_RANK: usize = 3;

/// Settings of a [`Classifier`](crate::Classifier).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Highest rank to classify (3..=9).
    pub max_rank: usize,
    /// Number of work units between progress reports.
    pub eta_interval: usize,
    /// JSON file backing the memoization cache.
    pub cache_path: Option<PathBuf>,
    /// Use the brute-force classification instead of the fast one.
    pub provable: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            max_rank: 7,
            eta_interval: 100,
            cache_path: None,
            provable: false,
        }
    }
}

impl ClassifierConfig {
    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::Config`] on syntax errors or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| LatticeError::Config(e.to_string()))?;
        Ok(config.validated())
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`LatticeError::Config`] when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| LatticeError::Config(format!("read {}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Clamps `max_rank` to 3..=9 and `eta_interval` to at least one.
    pub fn validated(mut self) -> Self {
        self.max_rank = self.max_rank.clamp(MIN_RANK, MAX_RANK);
        self.eta_interval = self.eta_interval.max(1);
        self
    }
}

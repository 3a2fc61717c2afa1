//! Runtime configuration for training and decoding.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::viterbi::{DEFAULT_BOUNDARY, DEFAULT_UNKNOWN_EMISSION};

/// Corpus location and decoding options.
///
/// Every field has a default, so a TOML file only needs the keys it
/// changes:
///
/// ```toml
/// corpus = "data/msr_training.utf8"
/// boundary_marker = " / "
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Pre-segmented training corpus, one sentence per line.
    pub corpus: Option<PathBuf>,
    /// Where the trained model is written and read.
    pub model_path: PathBuf,
    /// Inserted after every word-final character when segmenting.
    pub boundary_marker: String,
    /// Emission probability given to all four states for characters that
    /// never appeared in training. Clamped into (0, 1] by the decoder.
    pub unknown_emission: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            corpus: None,
            model_path: PathBuf::from("data/hmm.bincode"),
            boundary_marker: DEFAULT_BOUNDARY.to_string(),
            unknown_emission: DEFAULT_UNKNOWN_EMISSION,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Serialize configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

//! Error type shared by training, model assembly and persistence.
use thiserror::Error;

/// Errors raised by the library.
///
/// Recoverable corpus problems (blank lines, mis-aligned emission pairs,
/// unknown characters at decode time) are never reported here; they are
/// skipped and counted instead.
#[derive(Debug, Error)]
pub enum HmmError {
    /// Corpus or model file could not be read or written.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A matrix handed to model assembly has the wrong shape.
    #[error("{what}: expected {expected}, found {found}")]
    Dimension {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// Two count tables (or a table and a vocabulary) disagree on the
    /// number of characters.
    #[error("vocabulary size mismatch: expected {expected}, found {found}")]
    VocabularyMismatch { expected: usize, found: usize },

    /// Model file could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Configuration file could not be parsed.
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Configuration could not be rendered as TOML.
    #[error("config write error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, HmmError>;

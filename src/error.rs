//! Error types for leveled maps and their supporting setup code.

use thiserror::Error;

/// Coarse classification of a [`MapError`].
///
/// Callers that only care about the class of failure (a shape mismatch versus
/// a bad level argument, for example) can match on this instead of the
/// individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Depth, level-name or key-path-length mismatch
    Shape,
    /// Out-of-range or invalid level argument
    Level,
    /// Missing key, empty key path or unknown level name
    Key,
    /// Value of the wrong kind assigned into the structure
    Type,
    /// Conversion into an external representation failed
    Conversion,
}

/// Structural errors raised by [`LeveledMap`](crate::LeveledMap) operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapError {
    #[error("Shape mismatch: {0}")]
    Shape(String),

    #[error("Level {level} not valid for allowed levels {allowed}")]
    Level { level: isize, allowed: usize },

    #[error("Invalid level argument: {0}")]
    InvalidLevels(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Key path cannot be empty")]
    EmptyKeyPath,

    #[error("Filter criteria cannot be empty")]
    EmptyCriteria,

    #[error("Unknown level name: {0}")]
    UnknownLevelName(String),

    #[error("Type mismatch: {0}")]
    Type(String),

    #[error("Conversion failed: {0}")]
    Conversion(String),
}

impl MapError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            MapError::Shape(_) => ErrorKind::Shape,
            MapError::Level { .. } | MapError::InvalidLevels(_) => ErrorKind::Level,
            MapError::KeyNotFound(_)
            | MapError::EmptyKeyPath
            | MapError::EmptyCriteria
            | MapError::UnknownLevelName(_) => ErrorKind::Key,
            MapError::Type(_) => ErrorKind::Type,
            MapError::Conversion(_) => ErrorKind::Conversion,
        }
    }

    pub(crate) fn shape(msg: impl Into<String>) -> Self {
        MapError::Shape(msg.into())
    }

    pub(crate) fn invalid_levels(msg: impl Into<String>) -> Self {
        MapError::InvalidLevels(msg.into())
    }
}

/// Errors from configuration loading, logging setup and directory walking
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Map error: {0}")]
    Map(#[from] MapError),
}

impl From<config::ConfigError> for LoadError {
    fn from(err: config::ConfigError) -> Self {
        LoadError::Config(err.to_string())
    }
}

// src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Fatal engine failures. Recoverable conditions (degenerate clustering,
/// unresolved references, layout overflow) are diagnostics, not errors.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Structural input error: {reason} (path: {path})")]
    StructuralInput { path: String, reason: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Run cancelled before stage '{stage}'")]
    Cancelled { stage: &'static str },

    #[error("I/O error: {source} (path: {path})")]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Directory walk error: {0}")]
    Walk(String),
}

impl EngineError {
    /// Shorthand for a structural input failure on a specific record.
    #[must_use]
    pub fn structural(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::StructuralInput {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Attaches a path to an I/O failure.
    #[must_use]
    pub fn io(source: std::io::Error, path: impl Into<PathBuf>) -> Self {
        Self::Io {
            source,
            path: path.into(),
        }
    }

    /// True for failures caused by the input inventory itself.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::StructuralInput { .. } | Self::Json(_))
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

// Allow `?` on std::io::Error by converting to EngineError::Io with unknown path.
impl From<std::io::Error> for EngineError {
    fn from(source: std::io::Error) -> Self {
        EngineError::Io {
            source,
            path: PathBuf::from("<unknown>"),
        }
    }
}

// Gracefully convert WalkDir errors
impl From<walkdir::Error> for EngineError {
    fn from(e: walkdir::Error) -> Self {
        EngineError::Walk(e.to_string())
    }
}

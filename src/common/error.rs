//! Error types for the regression harness
//!
//! Only harness-level problems are errors. A target binary that misbehaves
//! (bad JSON, wrong status, timeout) produces a failed verdict instead.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Scenario Errors ===
    #[error("Invalid scenario suite: {0}")]
    ScenarioParse(String),

    #[error("Setup step '{step}' failed: {error}")]
    Setup { step: String, error: String },

    // === Target Binary Errors ===
    #[error("Target binary not found at '{}'. Build it first or pass --binary", path.display())]
    BinaryNotFound { path: PathBuf },

    #[error("Failed to spawn '{binary}': {error}")]
    Spawn { binary: String, error: String },
}

impl Error {
    /// Create a setup failure for a described step
    pub fn setup(step: impl std::fmt::Display, error: impl std::fmt::Display) -> Self {
        Self::Setup {
            step: step.to_string(),
            error: error.to_string(),
        }
    }

    /// Create a file read error for `path`
    pub fn file_read(path: &std::path::Path, error: impl std::fmt::Display) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }
}

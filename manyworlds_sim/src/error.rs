//! Error types for the simulator.

use manyworlds_core::MultiverseError;
use thiserror::Error;

/// Errors that can occur while running or exporting a scenario.
#[derive(Debug, Error)]
pub enum SimError {
    /// Branching engine failure
    #[error(transparent)]
    Multiverse(#[from] MultiverseError),

    /// Configuration rejected before running
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Export file could not be written or read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Export could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SimError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

//! Error types for the ManyWorlds branching engine.

use crate::universe::UniverseId;
use thiserror::Error;

/// Errors raised while building, measuring or exporting a multiverse.
#[derive(Debug, Error)]
pub enum MultiverseError {
    /// Malformed or non-normalizable quantum state
    #[error("Invalid quantum state: {0}")]
    InvalidState(String),

    /// Root weight is not a finite positive number
    #[error("Invalid weight {0}: must be finite and > 0")]
    InvalidWeight(f64),

    /// Observable was already measured in this universe
    #[error("Universe {universe} already measured observable '{observable}'")]
    AlreadyMeasured {
        universe: UniverseId,
        observable: String,
    },

    /// `prepare` on a universe that already has children
    #[error("Universe {0} has already branched; its state can no longer be prepared")]
    AlreadyBranched(UniverseId),

    /// A registered observer or hook failed during measurement
    #[error("Hook failed while measuring '{observable}': {message}")]
    Hook { observable: String, message: String },

    /// Export sink could not be written or read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Export could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MultiverseError {
    /// Creates an invalid-state error.
    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Returns true for `AlreadyMeasured`.
    pub fn is_already_measured(&self) -> bool {
        matches!(self, Self::AlreadyMeasured { .. })
    }
}

/// Error returned by a creation observer or post-measurement hook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct HookError(pub String);

impl HookError {
    /// Creates a hook error from any message.
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

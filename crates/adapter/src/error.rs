//! Adapter and registry errors.

use thiserror::Error;

/// Errors raised while registering or instantiating candidates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// No factory is registered under the id.
    #[error("unknown candidate: {0}")]
    UnknownCandidate(String),

    /// A factory is already registered under the id.
    #[error("candidate already registered: {0}")]
    DuplicateCandidate(String),

    /// The candidate's constructor reverted.
    #[error("deploying {candidate} failed: {reason}")]
    Deploy {
        /// Candidate id.
        candidate: String,
        /// Constructor revert.
        reason: String,
    },
}

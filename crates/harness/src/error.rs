//! Harness error types.

use std::path::PathBuf;

use thiserror::Error;
use tokencheck_adapter::AdapterError;
use tokencheck_config::ConfigError;
use tokencheck_signer::SignerError;

/// Errors that prevent a conformance run from starting.
///
/// Conformance failures are not errors; they are recorded in the report.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// A candidate could not be resolved or deployed.
    #[error(transparent)]
    Adapter(#[from] AdapterError),

    /// An actor key is not a valid secp256k1 scalar.
    #[error("invalid {actor} key: {source}")]
    InvalidKey {
        /// Actor whose key was rejected.
        actor: &'static str,
        /// Underlying signer error.
        source: SignerError,
    },

    /// Failed to read a divergence allow-list.
    #[error("failed to read divergence allow-list {path}: {source}")]
    AllowListRead {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse a divergence allow-list.
    #[error("failed to parse divergence allow-list: {0}")]
    AllowListParse(#[from] toml::de::Error),

    /// Configuration was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// There is nothing to run.
    #[error("no candidates registered")]
    NoCandidates,
}

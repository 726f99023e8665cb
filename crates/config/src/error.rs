//! Configuration error types.

use std::path::PathBuf;

/// Errors that can occur when loading configuration or resolving networks.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse TOML configuration.
    #[error("failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to parse JSON configuration.
    #[error("failed to parse JSON config: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// The network identifier is not in the address table.
    #[error("unknown network: {0}")]
    UnknownNetwork(String),

    /// Two actors were configured with the same private key.
    #[error("actors {first} and {second} share a private key")]
    DuplicateActorKey {
        /// First actor.
        first: &'static str,
        /// Second actor.
        second: &'static str,
    },

    /// The block timestamp is zero, so no permit deadline can lie in the past.
    #[error("timestamp must be greater than zero")]
    ZeroTimestamp,

    /// The initial supply cannot fund the scenario's one-token transfers.
    #[error("initial supply must be at least one token")]
    EmptyInitialSupply,
}

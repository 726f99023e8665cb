//! Conformance run configuration.

use std::path::{Path, PathBuf};

use alloy_primitives::{Address, B256, b256};
use serde::{Deserialize, Serialize};
use tokencheck_domain::{Deployment, tokens};

use crate::ConfigError;

/// Default chain id, matching a local hardhat node.
pub const DEFAULT_CHAIN_ID: u64 = 31337;

/// Default token name.
pub const DEFAULT_NAME: &str = "abc";

/// Default token symbol.
pub const DEFAULT_SYMBOL: &str = "ABC";

/// Default initial supply, in whole tokens.
pub const DEFAULT_INITIAL_SUPPLY: u64 = 1000;

/// Default block timestamp calls execute at.
pub const DEFAULT_TIMESTAMP: u64 = 1_700_000_000;

/// Default deployer key (hardhat account #0).
pub const DEFAULT_DEPLOYER_KEY: B256 =
    b256!("ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80");

/// Default holder key (hardhat account #1).
pub const DEFAULT_HOLDER_KEY: B256 =
    b256!("59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d");

/// Default outsider key (hardhat account #2).
pub const DEFAULT_OUTSIDER_KEY: B256 =
    b256!("5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a");

/// Configuration of one conformance run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Chain id the ledgers are deployed on.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,

    /// Token name.
    #[serde(default = "default_name")]
    pub name: String,

    /// Token symbol.
    #[serde(default = "default_symbol")]
    pub symbol: String,

    /// Initial supply credited to the deployer, in whole tokens.
    #[serde(default = "default_initial_supply")]
    pub initial_supply: u64,

    /// Block timestamp every call executes at.
    #[serde(default = "default_timestamp")]
    pub timestamp: u64,

    /// Private key of the deployer, owner and permit signer.
    #[serde(default = "default_deployer_key")]
    pub deployer_key: B256,

    /// Private key of the second holder.
    #[serde(default = "default_holder_key")]
    pub holder_key: B256,

    /// Private key of an account with no role.
    #[serde(default = "default_outsider_key")]
    pub outsider_key: B256,

    /// Ledger address override. Defaults to the deployer's first contract-creation address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ledger_address: Option<Address>,

    /// Divergence allow-list replacing the built-in one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowlist: Option<PathBuf>,

    /// Candidates to run, in order. Empty means every registered candidate.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<String>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            chain_id: DEFAULT_CHAIN_ID,
            name: DEFAULT_NAME.to_string(),
            symbol: DEFAULT_SYMBOL.to_string(),
            initial_supply: DEFAULT_INITIAL_SUPPLY,
            timestamp: DEFAULT_TIMESTAMP,
            deployer_key: DEFAULT_DEPLOYER_KEY,
            holder_key: DEFAULT_HOLDER_KEY,
            outsider_key: DEFAULT_OUTSIDER_KEY,
            ledger_address: None,
            allowlist: None,
            candidates: Vec::new(),
        }
    }
}

impl HarnessConfig {
    /// Load configuration from `path`, or the defaults when no path is given.
    ///
    /// Files ending in `.json` are parsed as JSON, anything else as TOML.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&contents)?
        } else {
            toml::from_str(&contents)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the canonical scenario cannot run meaningfully with.
    ///
    /// Two actors may not share a key. The timestamp must leave room for an expired
    /// deadline, and the deployer must start with at least one whole token.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timestamp == 0 {
            return Err(ConfigError::ZeroTimestamp);
        }
        if self.initial_supply == 0 {
            return Err(ConfigError::EmptyInitialSupply);
        }
        let keys = [
            ("deployer", self.deployer_key),
            ("holder", self.holder_key),
            ("outsider", self.outsider_key),
        ];
        for (i, &(first, key)) in keys.iter().enumerate() {
            if let Some(&(second, _)) = keys[i + 1..].iter().find(|(_, other)| *other == key) {
                return Err(ConfigError::DuplicateActorKey { first, second });
            }
        }
        Ok(())
    }

    /// Deployment parameters for a ledger owned by `owner`.
    pub fn deployment(&self, owner: Address) -> Deployment {
        let mut deployment = Deployment::from_owner(
            owner,
            self.name.clone(),
            self.symbol.clone(),
            self.chain_id,
            tokens(self.initial_supply),
        );
        if let Some(address) = self.ledger_address {
            deployment.address = address;
        }
        deployment
    }
}

const fn default_chain_id() -> u64 {
    DEFAULT_CHAIN_ID
}

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

fn default_symbol() -> String {
    DEFAULT_SYMBOL.to_string()
}

const fn default_initial_supply() -> u64 {
    DEFAULT_INITIAL_SUPPLY
}

const fn default_timestamp() -> u64 {
    DEFAULT_TIMESTAMP
}

const fn default_deployer_key() -> B256 {
    DEFAULT_DEPLOYER_KEY
}

const fn default_holder_key() -> B256 {
    DEFAULT_HOLDER_KEY
}

const fn default_outsider_key() -> B256 {
    DEFAULT_OUTSIDER_KEY
}

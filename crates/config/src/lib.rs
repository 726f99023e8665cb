//! Configuration types for tokencheck.
#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/refcell/tokencheck/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod error;
pub use error::ConfigError;

mod harness;
pub use harness::{
    DEFAULT_CHAIN_ID, DEFAULT_DEPLOYER_KEY, DEFAULT_HOLDER_KEY, DEFAULT_INITIAL_SUPPLY,
    DEFAULT_NAME, DEFAULT_OUTSIDER_KEY, DEFAULT_SYMBOL, DEFAULT_TIMESTAMP, HarnessConfig,
};

mod network;
pub use network::{MAINNET_WETH, Network, NetworkAddresses, OPTIMISM_WETH, POLYGON_WETH};

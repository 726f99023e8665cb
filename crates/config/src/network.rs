//! Well-known networks and their canonical contract addresses.

use std::{fmt, str::FromStr};

use alloy_primitives::{Address, address};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Canonical wrapped-ether deployment on mainnet, also used by a mainnet-forking hardhat node.
pub const MAINNET_WETH: Address = address!("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");

/// Canonical wrapped-ether deployment on Polygon PoS.
pub const POLYGON_WETH: Address = address!("0x7ceB23fD6bC0adD59E62ac25578270cFf1b9f619");

/// Wrapped-ether predeploy on Optimism.
pub const OPTIMISM_WETH: Address = address!("0x4200000000000000000000000000000000000006");

/// A network the harness knows addresses for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    /// Ethereum mainnet.
    Mainnet,
    /// Local hardhat node forking mainnet.
    Hardhat,
    /// Polygon PoS.
    Polygon,
    /// Optimism.
    Optimism,
    /// Goerli testnet.
    Goerli,
}

/// Contract addresses resolved for a network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkAddresses {
    /// Wrapped ether, if deployed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weth: Option<Address>,
}

impl Network {
    /// Every known network.
    pub const ALL: [Self; 5] = [Self::Mainnet, Self::Hardhat, Self::Polygon, Self::Optimism, Self::Goerli];

    /// Lowercase identifier.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mainnet => "mainnet",
            Self::Hardhat => "hardhat",
            Self::Polygon => "polygon",
            Self::Optimism => "optimism",
            Self::Goerli => "goerli",
        }
    }

    /// Canonical addresses on this network.
    pub const fn addresses(self) -> NetworkAddresses {
        let weth = match self {
            Self::Mainnet | Self::Hardhat => Some(MAINNET_WETH),
            Self::Polygon => Some(POLYGON_WETH),
            Self::Optimism => Some(OPTIMISM_WETH),
            Self::Goerli => None,
        };
        NetworkAddresses { weth }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|network| network.as_str() == lower)
            .ok_or_else(|| ConfigError::UnknownNetwork(s.to_string()))
    }
}

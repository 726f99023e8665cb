//! Ledger construction parameters.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Everything needed to instantiate one ledger.
///
/// Every candidate and every shadow model in a run is built from the same deployment, so
/// all of them share an address and therefore a domain separator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deployment {
    /// Address the ledger lives at.
    pub address: Address,
    /// Token name.
    pub name: String,
    /// Token symbol.
    pub symbol: String,
    /// Chain identifier bound into the domain separator.
    pub chain_id: u64,
    /// Sole minter; also receives the initial supply.
    pub owner: Address,
    /// Supply credited to `owner` at construction.
    pub initial_supply: U256,
}

impl Deployment {
    /// Deployment whose address is the owner's first contract-creation address.
    pub fn from_owner(
        owner: Address,
        name: impl Into<String>,
        symbol: impl Into<String>,
        chain_id: u64,
        initial_supply: U256,
    ) -> Self {
        Self {
            address: owner.create(0),
            name: name.into(),
            symbol: symbol.into(),
            chain_id,
            owner,
            initial_supply,
        }
    }
}

//! Ownership, nonce tracking and EIP-712 domain handling.

use std::collections::HashMap;

use alloy_primitives::{Address, B256, U256, keccak256};

use super::ReferenceError;

/// Single-owner access control.
#[derive(Clone, Debug)]
pub(crate) struct Ownable {
    owner: Address,
}

impl Ownable {
    pub(crate) const fn new(owner: Address) -> Self {
        Self { owner }
    }

    pub(crate) const fn owner(&self) -> Address {
        self.owner
    }

    pub(crate) fn check_owner(&self, caller: Address) -> Result<(), ReferenceError> {
        if caller != self.owner {
            return Err(ReferenceError::OwnableUnauthorizedAccount(caller));
        }
        Ok(())
    }
}

/// Per-account sequential nonces.
#[derive(Clone, Debug, Default)]
pub(crate) struct Nonces {
    nonces: HashMap<Address, U256>,
}

impl Nonces {
    pub(crate) fn nonces(&self, owner: Address) -> U256 {
        self.nonces.get(&owner).copied().unwrap_or_default()
    }

    /// Consume and return the current nonce.
    pub(crate) fn use_nonce(&mut self, owner: Address) -> U256 {
        let current = self.nonces(owner);
        self.nonces.insert(owner, current + U256::from(1u64));
        current
    }
}

/// EIP-712 domain with a cached separator.
#[derive(Clone, Debug)]
pub(crate) struct Eip712 {
    hashed_name: B256,
    hashed_version: B256,
    cached_chain_id: u64,
    cached_this: Address,
    cached_separator: B256,
}

const TYPE_HASH: &str =
    "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

impl Eip712 {
    pub(crate) fn new(name: &str, version: &str, chain_id: u64, this: Address) -> Self {
        let hashed_name = keccak256(name.as_bytes());
        let hashed_version = keccak256(version.as_bytes());
        let cached_separator = build_separator(hashed_name, hashed_version, chain_id, this);
        Self { hashed_name, hashed_version, cached_chain_id: chain_id, cached_this: this, cached_separator }
    }

    pub(crate) fn domain_separator_v4(&self, chain_id: u64, this: Address) -> B256 {
        if chain_id == self.cached_chain_id && this == self.cached_this {
            self.cached_separator
        } else {
            build_separator(self.hashed_name, self.hashed_version, chain_id, this)
        }
    }

    pub(crate) fn hash_typed_data_v4(&self, chain_id: u64, this: Address, struct_hash: B256) -> B256 {
        let mut data = Vec::with_capacity(66);
        data.extend_from_slice(b"\x19\x01");
        data.extend_from_slice(self.domain_separator_v4(chain_id, this).as_slice());
        data.extend_from_slice(struct_hash.as_slice());
        keccak256(data)
    }
}

fn build_separator(name: B256, version: B256, chain_id: u64, this: Address) -> B256 {
    let mut data = Vec::with_capacity(5 * 32);
    data.extend_from_slice(keccak256(TYPE_HASH).as_slice());
    data.extend_from_slice(name.as_slice());
    data.extend_from_slice(version.as_slice());
    data.extend_from_slice(&U256::from(chain_id).to_be_bytes::<32>());
    data.extend_from_slice(this.into_word().as_slice());
    keccak256(data)
}

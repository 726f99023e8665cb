//! EIP-712 domain separator.

use alloy_primitives::{Address, B256, U256, b256, keccak256};

use crate::{address_word, uint_word};

/// `keccak256("EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)")`.
pub const DOMAIN_TYPEHASH: B256 =
    b256!("8b73c3c69bb8fe3d512ecc4cf759cc79239f7b179b0ffacaa9a75d522b39400f");

/// Version tag every ledger binds into its domain.
pub const PERMIT_VERSION: &str = "1";

/// The fields a ledger binds its signatures to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Eip712Domain {
    /// Token name.
    pub name: String,
    /// Domain version.
    pub version: String,
    /// Chain identifier.
    pub chain_id: u64,
    /// Address of the ledger verifying signatures.
    pub verifying_contract: Address,
}

impl Eip712Domain {
    /// Domain for a ledger using the default version tag.
    pub fn new(name: impl Into<String>, chain_id: u64, verifying_contract: Address) -> Self {
        Self { name: name.into(), version: PERMIT_VERSION.to_string(), chain_id, verifying_contract }
    }

    /// Returns the 160-byte encoding hashed into the separator.
    pub fn encode(&self) -> [u8; 160] {
        let mut buf = [0u8; 160];
        buf[0..32].copy_from_slice(DOMAIN_TYPEHASH.as_slice());
        buf[32..64].copy_from_slice(keccak256(self.name.as_bytes()).as_slice());
        buf[64..96].copy_from_slice(keccak256(self.version.as_bytes()).as_slice());
        buf[96..128].copy_from_slice(&uint_word(U256::from(self.chain_id)));
        buf[128..160].copy_from_slice(&address_word(self.verifying_contract));
        buf
    }

    /// Computes the domain separator.
    pub fn separator(&self) -> B256 {
        keccak256(self.encode())
    }
}

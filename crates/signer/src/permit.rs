//! Permit struct encoding.

use alloy_primitives::{Address, B256, U256, b256, keccak256};

use crate::{address_word, uint_word};

/// `keccak256("Permit(address owner,address spender,uint256 value,uint256 nonce,uint256 deadline)")`.
pub const PERMIT_TYPEHASH: B256 =
    b256!("6e71edae12b1b97f4d1f60370fef10105fa2faae0126114a169c64845d6126c9");

/// Length of the encoded permit struct: the typehash plus five fields.
pub const PERMIT_STRUCT_LEN: usize = 6 * 32;

/// The message an owner signs to grant an allowance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PermitMessage {
    /// Account granting the allowance.
    pub owner: Address,
    /// Account receiving the allowance.
    pub spender: Address,
    /// Allowance to set.
    pub value: U256,
    /// The owner's current permit nonce.
    pub nonce: U256,
    /// Last valid timestamp.
    pub deadline: U256,
}

impl PermitMessage {
    /// Encode the struct as six 32-byte slots, typehash first.
    pub fn encode(&self) -> [u8; PERMIT_STRUCT_LEN] {
        let mut buf = [0u8; PERMIT_STRUCT_LEN];
        buf[0..32].copy_from_slice(PERMIT_TYPEHASH.as_slice());
        buf[32..64].copy_from_slice(&address_word(self.owner));
        buf[64..96].copy_from_slice(&address_word(self.spender));
        buf[96..128].copy_from_slice(&uint_word(self.value));
        buf[128..160].copy_from_slice(&uint_word(self.nonce));
        buf[160..192].copy_from_slice(&uint_word(self.deadline));
        buf
    }

    /// Hash of the struct encoding.
    pub fn struct_hash(&self) -> B256 {
        keccak256(self.encode())
    }
}

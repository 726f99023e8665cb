//! 32-byte ABI slot encoding.

use alloy_primitives::{Address, U256};

/// Left-pad an address into a 32-byte slot.
pub fn address_word(address: Address) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_slice());
    word
}

/// Encode an unsigned integer as a big-endian 32-byte slot.
pub fn uint_word(value: U256) -> [u8; 32] {
    value.to_be_bytes::<32>()
}

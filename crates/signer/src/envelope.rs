//! The `0x1901` envelope signed by the owner.

use alloy_primitives::{B256, keccak256};

/// EIP-191 version byte followed by the EIP-712 structured-data tag.
pub const ENVELOPE_PREFIX: [u8; 2] = [0x19, 0x01];

/// Returns `0x1901 ‖ domain_separator ‖ struct_hash`.
pub fn envelope_preimage(domain_separator: B256, struct_hash: B256) -> [u8; 66] {
    let mut buf = [0u8; 66];
    buf[0..2].copy_from_slice(&ENVELOPE_PREFIX);
    buf[2..34].copy_from_slice(domain_separator.as_slice());
    buf[34..66].copy_from_slice(struct_hash.as_slice());
    buf
}

/// Hash of the envelope preimage; this is what gets signed.
pub fn envelope_hash(domain_separator: B256, struct_hash: B256) -> B256 {
    keccak256(envelope_preimage(domain_separator, struct_hash))
}

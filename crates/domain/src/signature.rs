//! Recoverable ECDSA signature triple.

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

/// A secp256k1 signature in the `(v, r, s)` form `permit` accepts.
///
/// `v` is `27 + recovery_id`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature {
    /// Recovery byte, 27 or 28 for well-formed signatures.
    pub v: u8,
    /// The `r` scalar, big-endian.
    pub r: B256,
    /// The `s` scalar, big-endian.
    pub s: B256,
}

impl Signature {
    /// Create a signature from its parts.
    pub const fn new(v: u8, r: B256, s: B256) -> Self {
        Self { v, r, s }
    }

    /// Returns the 65-byte `r ‖ s ‖ v` encoding.
    pub fn to_bytes(&self) -> [u8; 65] {
        let mut buf = [0u8; 65];
        buf[..32].copy_from_slice(self.r.as_slice());
        buf[32..64].copy_from_slice(self.s.as_slice());
        buf[64] = self.v;
        buf
    }
}

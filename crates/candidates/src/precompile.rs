//! The `ecrecover` precompile.

use alloy_primitives::{Address, B256, keccak256};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

/// Recover the signer of `hash`, returning the zero address on any failure.
///
/// Follows precompile semantics: `v` must be 27 or 28, `r` and `s` must be non-zero and below
/// the curve order, and high `s` values are accepted.
pub fn ecrecover(hash: B256, v: u8, r: B256, s: B256) -> Address {
    let Some(mut recovery_id) = v.checked_sub(27).and_then(RecoveryId::from_byte) else {
        return Address::ZERO;
    };
    if recovery_id.is_x_reduced() {
        return Address::ZERO;
    }

    let mut sig_bytes = [0u8; 64];
    sig_bytes[..32].copy_from_slice(r.as_slice());
    sig_bytes[32..].copy_from_slice(s.as_slice());
    let Ok(mut signature) = Signature::from_slice(&sig_bytes) else {
        return Address::ZERO;
    };

    // Recovery only verifies low-s signatures; flip to the equivalent low-s form.
    if let Some(normalized) = signature.normalize_s() {
        signature = normalized;
        recovery_id = RecoveryId::new(!recovery_id.is_y_odd(), false);
    }

    match VerifyingKey::recover_from_prehash(hash.as_slice(), &signature, recovery_id) {
        Ok(key) => {
            let encoded = key.to_encoded_point(false);
            let digest = keccak256(&encoded.as_bytes()[1..]);
            Address::from_slice(&digest[12..])
        }
        Err(_) => Address::ZERO,
    }
}

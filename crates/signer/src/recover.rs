//! Signer recovery.

use alloy_primitives::{Address, B256};
use k256::ecdsa::{RecoveryId, Signature as EcdsaSignature, VerifyingKey};
use tokencheck_domain::Signature;

use crate::{SignerError, address_from_verifying_key};

/// Recover the address that signed `hash`.
///
/// Only canonical signatures are accepted: `v` must be 27 or 28 and `s` must be in the
/// lower half of the curve order.
pub fn recover_signer(hash: B256, signature: &Signature) -> Result<Address, SignerError> {
    let recovery_id = signature
        .v
        .checked_sub(27)
        .and_then(RecoveryId::from_byte)
        .filter(|id| !id.is_x_reduced())
        .ok_or(SignerError::InvalidRecoveryByte(signature.v))?;

    let mut sig_bytes = [0u8; 64];
    sig_bytes[..32].copy_from_slice(signature.r.as_slice());
    sig_bytes[32..].copy_from_slice(signature.s.as_slice());
    let sig = EcdsaSignature::from_slice(&sig_bytes).map_err(|_| SignerError::MalformedSignature)?;

    if sig.normalize_s().is_some() {
        return Err(SignerError::HighS);
    }

    let key = VerifyingKey::recover_from_prehash(hash.as_slice(), &sig, recovery_id)
        .map_err(|_| SignerError::RecoveryFailed)?;
    Ok(address_from_verifying_key(&key))
}

//! Raw-key permit signer.

use alloy_primitives::{Address, B256, U256, keccak256};
use k256::ecdsa::{SigningKey, VerifyingKey};
use tokencheck_domain::Signature;

use crate::{Eip712Domain, PermitMessage, SignerError, envelope_hash};

/// Derive the account address of a secp256k1 public key.
pub fn address_from_verifying_key(key: &VerifyingKey) -> Address {
    let encoded = key.to_encoded_point(false);
    let hash = keccak256(&encoded.as_bytes()[1..]);
    Address::from_slice(&hash[12..])
}

/// Signs permit envelopes with a raw private key.
///
/// Holds no state besides the key; every call is deterministic (RFC 6979).
#[derive(Clone)]
pub struct PermitSigner {
    key: SigningKey,
    address: Address,
}

impl std::fmt::Debug for PermitSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermitSigner").field("address", &self.address).finish_non_exhaustive()
    }
}

impl PermitSigner {
    /// Build a signer from 32 private key bytes.
    pub fn from_bytes(bytes: &B256) -> Result<Self, SignerError> {
        let key =
            SigningKey::from_slice(bytes.as_slice()).map_err(|_| SignerError::InvalidPrivateKey)?;
        let address = address_from_verifying_key(key.verifying_key());
        Ok(Self { key, address })
    }

    /// Returns the signer's account address.
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Sign a 32-byte prehash, returning `v = 27 + recovery_id`.
    pub fn sign_hash(&self, hash: B256) -> Result<Signature, SignerError> {
        let (sig, recid) = self
            .key
            .sign_prehash_recoverable(hash.as_slice())
            .map_err(|e| SignerError::Signing(e.to_string()))?;
        let bytes = sig.to_bytes();
        Ok(Signature::new(
            27 + recid.to_byte(),
            B256::from_slice(&bytes[..32]),
            B256::from_slice(&bytes[32..]),
        ))
    }

    /// Sign a permit granting `spender` an allowance of `value` over this signer's tokens.
    pub fn sign_permit(
        &self,
        domain: &Eip712Domain,
        spender: Address,
        value: U256,
        nonce: U256,
        deadline: U256,
    ) -> Result<Signature, SignerError> {
        let message = PermitMessage { owner: self.address, spender, value, nonce, deadline };
        self.sign_hash(envelope_hash(domain.separator(), message.struct_hash()))
    }
}

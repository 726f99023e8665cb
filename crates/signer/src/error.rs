//! Signer error types.

use thiserror::Error;

/// Errors that can occur while signing or recovering permit signatures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignerError {
    /// The private key bytes are not a valid secp256k1 scalar.
    #[error("invalid private key")]
    InvalidPrivateKey,

    /// The signing backend failed.
    #[error("signing failed: {0}")]
    Signing(String),

    /// `v` is not 27 or 28.
    #[error("invalid recovery byte {0}")]
    InvalidRecoveryByte(u8),

    /// `r` or `s` is zero or not below the curve order.
    #[error("malformed signature scalars")]
    MalformedSignature,

    /// `s` lies in the upper half of the curve order.
    #[error("signature s value is not normalized")]
    HighS,

    /// No public key recovers from the signature.
    #[error("public key recovery failed")]
    RecoveryFailed,
}

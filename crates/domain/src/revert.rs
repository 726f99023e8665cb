//! Revert taxonomy shared by the oracle and every adapter.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why a ledger operation reverted, independent of how a candidate reports it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum RevertKind {
    /// The debited account holds less than the requested amount.
    InsufficientBalance,
    /// The spender's allowance is below the requested amount.
    InsufficientAllowance,
    /// The caller is not allowed to perform the operation.
    Unauthorized,
    /// Minting would push the total supply past `U256::MAX`.
    SupplyOverflow,
    /// The permit deadline has passed.
    Expired,
    /// The permit signature does not recover to the owner.
    InvalidSignature,
    /// The recipient is the zero address.
    ZeroAddressRecipient,
    /// A candidate revert the adapter could not classify.
    Unrecognized(String),
}

impl fmt::Display for RevertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InsufficientBalance => f.write_str("InsufficientBalance"),
            Self::InsufficientAllowance => f.write_str("InsufficientAllowance"),
            Self::Unauthorized => f.write_str("Unauthorized"),
            Self::SupplyOverflow => f.write_str("SupplyOverflow"),
            Self::Expired => f.write_str("Expired"),
            Self::InvalidSignature => f.write_str("InvalidSignature"),
            Self::ZeroAddressRecipient => f.write_str("ZeroAddressRecipient"),
            Self::Unrecognized(detail) => write!(f, "Unrecognized({detail})"),
        }
    }
}

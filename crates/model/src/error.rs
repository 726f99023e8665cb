//! Ledger model error types.

use alloy_primitives::{Address, U256};
use thiserror::Error;
use tokencheck_domain::RevertKind;

/// Reasons a ledger operation reverts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The debited account holds less than requested.
    #[error("insufficient balance for {account}: have {balance}, need {needed}")]
    InsufficientBalance {
        /// Debited account.
        account: Address,
        /// Its balance.
        balance: U256,
        /// Requested amount.
        needed: U256,
    },

    /// The spender's allowance is below the requested amount.
    #[error("insufficient allowance of {spender} over {owner}: have {allowance}, need {needed}")]
    InsufficientAllowance {
        /// Token owner.
        owner: Address,
        /// Spender.
        spender: Address,
        /// Current allowance.
        allowance: U256,
        /// Requested amount.
        needed: U256,
    },

    /// Only the owner may mint.
    #[error("caller {caller} is not the ledger owner")]
    Unauthorized {
        /// Offending caller.
        caller: Address,
    },

    /// Minting would overflow the supply.
    #[error("minting {amount} overflows supply {supply}")]
    SupplyOverflow {
        /// Current supply.
        supply: U256,
        /// Requested amount.
        amount: U256,
    },

    /// The permit deadline lies in the past.
    #[error("permit expired at {deadline}, now {now}")]
    Expired {
        /// Permit deadline.
        deadline: U256,
        /// Execution timestamp.
        now: u64,
    },

    /// The permit signature does not recover to the owner.
    #[error("invalid permit signature for {owner}")]
    InvalidSignature {
        /// Claimed owner.
        owner: Address,
        /// Address the signature recovered to, if any.
        recovered: Option<Address>,
    },

    /// The recipient is the zero address.
    #[error("recipient is the zero address")]
    ZeroAddressRecipient,
}

impl LedgerError {
    /// Returns the implementation-independent revert kind.
    pub const fn kind(&self) -> RevertKind {
        match self {
            Self::InsufficientBalance { .. } => RevertKind::InsufficientBalance,
            Self::InsufficientAllowance { .. } => RevertKind::InsufficientAllowance,
            Self::Unauthorized { .. } => RevertKind::Unauthorized,
            Self::SupplyOverflow { .. } => RevertKind::SupplyOverflow,
            Self::Expired { .. } => RevertKind::Expired,
            Self::InvalidSignature { .. } => RevertKind::InvalidSignature,
            Self::ZeroAddressRecipient => RevertKind::ZeroAddressRecipient,
        }
    }
}

/// A broken ledger invariant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// Balances do not add up to the recorded supply.
    #[error("balances sum to {sum} but total supply is {supply}")]
    SupplyMismatch {
        /// Sum over all balances.
        sum: U256,
        /// Recorded total supply.
        supply: U256,
    },

    /// Balances add up to more than `U256::MAX`.
    #[error("sum of balances overflows")]
    BalanceSumOverflow,
}

//! Ledger calls issued by the scenario driver.

use std::fmt;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::Signature;

/// Execution context of a single call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    /// Account issuing the call.
    pub caller: Address,
    /// Block timestamp the call executes at, in seconds.
    pub timestamp: u64,
}

impl CallContext {
    /// Create a new call context.
    pub const fn new(caller: Address, timestamp: u64) -> Self {
        Self { caller, timestamp }
    }
}

/// Arguments of a `permit` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitCall {
    /// Account granting the allowance.
    pub owner: Address,
    /// Account receiving the allowance.
    pub spender: Address,
    /// Allowance to set.
    pub value: U256,
    /// Last timestamp at which the permit is valid.
    pub deadline: U256,
    /// Owner signature over the permit envelope.
    pub signature: Signature,
}

/// One of the ledger operations every candidate exposes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Call {
    /// Move `amount` from the caller to `to`.
    Transfer {
        /// Recipient.
        to: Address,
        /// Amount to move.
        amount: U256,
    },
    /// Set the caller's allowance for `spender`.
    Approve {
        /// Spender.
        spender: Address,
        /// New allowance.
        amount: U256,
    },
    /// Spend the caller's allowance over `from`.
    TransferFrom {
        /// Debited account.
        from: Address,
        /// Recipient.
        to: Address,
        /// Amount to move.
        amount: U256,
    },
    /// Set an allowance from an owner signature.
    Permit(PermitCall),
    /// Create `amount` tokens for `to`.
    Mint {
        /// Recipient.
        to: Address,
        /// Amount to create.
        amount: U256,
    },
    /// Destroy `amount` of the caller's tokens.
    Burn {
        /// Amount to destroy.
        amount: U256,
    },
    /// Read an account balance.
    BalanceOf {
        /// Account to read.
        account: Address,
    },
    /// Read an allowance.
    Allowance {
        /// Token owner.
        owner: Address,
        /// Spender.
        spender: Address,
    },
    /// Read the total supply.
    TotalSupply,
    /// Read the token name.
    Name,
    /// Read the token symbol.
    Symbol,
    /// Read the decimals.
    Decimals,
    /// Read the EIP-712 domain separator.
    DomainSeparator,
    /// Read an account's permit nonce.
    Nonces {
        /// Account to read.
        owner: Address,
    },
}

impl Call {
    /// Returns the ABI name of the operation.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Transfer { .. } => "transfer",
            Self::Approve { .. } => "approve",
            Self::TransferFrom { .. } => "transferFrom",
            Self::Permit(_) => "permit",
            Self::Mint { .. } => "mint",
            Self::Burn { .. } => "burn",
            Self::BalanceOf { .. } => "balanceOf",
            Self::Allowance { .. } => "allowance",
            Self::TotalSupply => "totalSupply",
            Self::Name => "name",
            Self::Symbol => "symbol",
            Self::Decimals => "decimals",
            Self::DomainSeparator => "DOMAIN_SEPARATOR",
            Self::Nonces { .. } => "nonces",
        }
    }

    /// Returns true for operations that may change ledger state.
    pub const fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::Transfer { .. }
                | Self::Approve { .. }
                | Self::TransferFrom { .. }
                | Self::Permit(_)
                | Self::Mint { .. }
                | Self::Burn { .. }
        )
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transfer { to, amount } => write!(f, "transfer({to}, {amount})"),
            Self::Approve { spender, amount } => write!(f, "approve({spender}, {amount})"),
            Self::TransferFrom { from, to, amount } => {
                write!(f, "transferFrom({from}, {to}, {amount})")
            }
            Self::Permit(permit) => write!(
                f,
                "permit({}, {}, {}, {}, v={})",
                permit.owner, permit.spender, permit.value, permit.deadline, permit.signature.v
            ),
            Self::Mint { to, amount } => write!(f, "mint({to}, {amount})"),
            Self::Burn { amount } => write!(f, "burn({amount})"),
            Self::BalanceOf { account } => write!(f, "balanceOf({account})"),
            Self::Allowance { owner, spender } => write!(f, "allowance({owner}, {spender})"),
            Self::Nonces { owner } => write!(f, "nonces({owner})"),
            other => write!(f, "{}()", other.name()),
        }
    }
}

//! Decoded ledger events.

use std::fmt;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Canonical signature of the `Transfer` event.
pub const TRANSFER_EVENT_SIGNATURE: &str = "Transfer(address,address,uint256)";

/// Canonical signature of the `Approval` event.
pub const APPROVAL_EVENT_SIGNATURE: &str = "Approval(address,address,uint256)";

/// An event emitted by a ledger, tagged with the address that emitted it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenEvent {
    /// Address of the emitting ledger.
    pub emitter: Address,
    /// Decoded event payload.
    pub kind: EventKind,
}

/// Decoded payload of a ledger event.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum EventKind {
    /// Tokens moved. Mints use the zero address as `from`, burns as `to`.
    Transfer {
        /// Debited account.
        from: Address,
        /// Credited account.
        to: Address,
        /// Amount moved.
        value: U256,
    },
    /// An allowance was set.
    Approval {
        /// Account whose tokens may be spent.
        owner: Address,
        /// Account allowed to spend.
        spender: Address,
        /// New allowance.
        value: U256,
    },
}

impl TokenEvent {
    /// Build a `Transfer` event.
    pub const fn transfer(emitter: Address, from: Address, to: Address, value: U256) -> Self {
        Self { emitter, kind: EventKind::Transfer { from, to, value } }
    }

    /// Build an `Approval` event.
    pub const fn approval(emitter: Address, owner: Address, spender: Address, value: U256) -> Self {
        Self { emitter, kind: EventKind::Approval { owner, spender, value } }
    }

    /// Returns the event name.
    pub const fn name(&self) -> &'static str {
        self.kind.name()
    }
}

impl EventKind {
    /// Returns the event name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Transfer { .. } => "Transfer",
            Self::Approval { .. } => "Approval",
        }
    }
}

impl fmt::Display for TokenEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            EventKind::Transfer { from, to, value } => {
                write!(f, "{}::Transfer({from}, {to}, {value})", self.emitter)
            }
            EventKind::Approval { owner, spender, value } => {
                write!(f, "{}::Approval({owner}, {spender}, {value})", self.emitter)
            }
        }
    }
}

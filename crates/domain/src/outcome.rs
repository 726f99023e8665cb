//! Uniform call outcome returned by every adapter.

use std::fmt;

use alloy_primitives::{B256, U256};
use serde::{Deserialize, Serialize};

use crate::{RevertKind, TokenEvent};

/// A value returned by a successful call.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ReturnValue {
    /// A boolean, as returned by `transfer`, `approve` and `transferFrom`.
    Bool(bool),
    /// An unsigned 256-bit integer.
    Uint(U256),
    /// A string, as returned by `name` and `symbol`.
    Text(String),
    /// The `decimals` byte.
    Decimals(u8),
    /// A 32-byte word, as returned by `DOMAIN_SEPARATOR`.
    Hash(B256),
}

impl fmt::Display for ReturnValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Uint(value) => write!(f, "{value}"),
            Self::Text(value) => write!(f, "{value:?}"),
            Self::Decimals(value) => write!(f, "{value}"),
            Self::Hash(value) => write!(f, "{value}"),
        }
    }
}

/// The externally observable result of one ledger call.
///
/// Reverted calls carry no events and no return value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallOutcome {
    /// Whether the call applied.
    pub success: bool,
    /// Value returned by a successful call, if the operation returns one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_value: Option<ReturnValue>,
    /// Events emitted, in emission order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<TokenEvent>,
    /// Revert reason for a failed call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverted_with: Option<RevertKind>,
}

impl CallOutcome {
    /// A successful call with no return value.
    pub const fn succeeded(events: Vec<TokenEvent>) -> Self {
        Self { success: true, return_value: None, events, reverted_with: None }
    }

    /// A successful call returning `value`.
    pub const fn returned(value: ReturnValue, events: Vec<TokenEvent>) -> Self {
        Self { success: true, return_value: Some(value), events, reverted_with: None }
    }

    /// A pure read returning `value`.
    pub const fn read(value: ReturnValue) -> Self {
        Self::returned(value, Vec::new())
    }

    /// A reverted call.
    pub const fn reverted(kind: RevertKind) -> Self {
        Self { success: false, return_value: None, events: Vec::new(), reverted_with: Some(kind) }
    }

    /// Returns the returned integer, if any.
    pub const fn uint(&self) -> Option<U256> {
        match self.return_value {
            Some(ReturnValue::Uint(value)) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for CallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.success {
            return match &self.reverted_with {
                Some(kind) => write!(f, "reverted with {kind}"),
                None => f.write_str("reverted"),
            };
        }
        f.write_str("ok")?;
        if let Some(value) = &self.return_value {
            write!(f, " -> {value}")?;
        }
        for event in &self.events {
            write!(f, " [{event}]")?;
        }
        Ok(())
    }
}

//! Custom errors raised by the reference token.

use alloy_primitives::{Address, B256, U256};
use thiserror::Error;

/// Solidity panic code for checked arithmetic over- or underflow.
pub const PANIC_ARITHMETIC: u8 = 0x11;

/// Reverts of the reference token, one variant per custom error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    /// `ERC20InsufficientBalance(address sender, uint256 balance, uint256 needed)`.
    #[error("ERC20InsufficientBalance({sender}, {balance}, {needed})")]
    Erc20InsufficientBalance {
        /// Debited account.
        sender: Address,
        /// Its balance.
        balance: U256,
        /// Requested amount.
        needed: U256,
    },

    /// `ERC20InvalidSender(address sender)`.
    #[error("ERC20InvalidSender({0})")]
    Erc20InvalidSender(Address),

    /// `ERC20InvalidReceiver(address receiver)`.
    #[error("ERC20InvalidReceiver({0})")]
    Erc20InvalidReceiver(Address),

    /// `ERC20InsufficientAllowance(address spender, uint256 allowance, uint256 needed)`.
    #[error("ERC20InsufficientAllowance({spender}, {allowance}, {needed})")]
    Erc20InsufficientAllowance {
        /// Spender.
        spender: Address,
        /// Current allowance.
        allowance: U256,
        /// Requested amount.
        needed: U256,
    },

    /// `OwnableUnauthorizedAccount(address account)`.
    #[error("OwnableUnauthorizedAccount({0})")]
    OwnableUnauthorizedAccount(Address),

    /// `ERC2612ExpiredSignature(uint256 deadline)`.
    #[error("ERC2612ExpiredSignature({0})")]
    Erc2612ExpiredSignature(U256),

    /// `ERC2612InvalidSigner(address signer, address owner)`.
    #[error("ERC2612InvalidSigner({signer}, {owner})")]
    Erc2612InvalidSigner {
        /// Recovered signer.
        signer: Address,
        /// Claimed owner.
        owner: Address,
    },

    /// `ECDSAInvalidSignature()`.
    #[error("ECDSAInvalidSignature()")]
    EcdsaInvalidSignature,

    /// `ECDSAInvalidSignatureS(bytes32 s)`.
    #[error("ECDSAInvalidSignatureS({0})")]
    EcdsaInvalidSignatureS(B256),

    /// `Panic(uint256 code)`.
    #[error("Panic({0:#04x})")]
    Panic(u8),
}

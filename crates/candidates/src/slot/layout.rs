//! Storage layout, function selectors and error signatures.

use alloy_primitives::{Address, B256, U256};
use sha3::{Digest, Keccak256};

/// Mapping root of `balanceOf`.
pub const BALANCES_SLOT: U256 = U256::ZERO;

/// Mapping root of `allowance`.
pub const ALLOWANCES_SLOT: U256 = U256::from_limbs([1, 0, 0, 0]);

/// Slot holding `totalSupply`.
pub const TOTAL_SUPPLY_SLOT: U256 = U256::from_limbs([2, 0, 0, 0]);

/// Mapping root of `nonces`.
pub const NONCES_SLOT: U256 = U256::from_limbs([3, 0, 0, 0]);

/// Slot holding the owner.
pub const OWNER_SLOT: U256 = U256::from_limbs([4, 0, 0, 0]);

/// `InsufficientBalance()`.
pub const INSUFFICIENT_BALANCE: &str = "InsufficientBalance()";
/// `InsufficientAllowance()`.
pub const INSUFFICIENT_ALLOWANCE: &str = "InsufficientAllowance()";
/// `Unauthorized()`.
pub const UNAUTHORIZED: &str = "Unauthorized()";
/// `Overflow()`.
pub const OVERFLOW: &str = "Overflow()";
/// `Expired()`.
pub const EXPIRED: &str = "Expired()";
/// `InvalidSignature()`.
pub const INVALID_SIGNATURE: &str = "InvalidSignature()";
/// `ZeroAddress()`.
pub const ZERO_ADDRESS: &str = "ZeroAddress()";

/// `Transfer(address,address,uint256)`.
pub const TRANSFER_EVENT: &str = "Transfer(address,address,uint256)";
/// `Approval(address,address,uint256)`.
pub const APPROVAL_EVENT: &str = "Approval(address,address,uint256)";

/// Externally callable functions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Function {
    /// `transfer(address,uint256)`
    Transfer,
    /// `approve(address,uint256)`
    Approve,
    /// `transferFrom(address,address,uint256)`
    TransferFrom,
    /// `permit(address,address,uint256,uint256,uint8,bytes32,bytes32)`
    Permit,
    /// `mint(address,uint256)`
    Mint,
    /// `burn(uint256)`
    Burn,
    /// `balanceOf(address)`
    BalanceOf,
    /// `allowance(address,address)`
    Allowance,
    /// `totalSupply()`
    TotalSupply,
    /// `name()`
    Name,
    /// `symbol()`
    Symbol,
    /// `decimals()`
    Decimals,
    /// `DOMAIN_SEPARATOR()`
    DomainSeparator,
    /// `nonces(address)`
    Nonces,
}

impl Function {
    /// All functions in dispatch order.
    pub const ALL: [Self; 14] = [
        Self::Transfer,
        Self::Approve,
        Self::TransferFrom,
        Self::Permit,
        Self::Mint,
        Self::Burn,
        Self::BalanceOf,
        Self::Allowance,
        Self::TotalSupply,
        Self::Name,
        Self::Symbol,
        Self::Decimals,
        Self::DomainSeparator,
        Self::Nonces,
    ];

    /// Canonical ABI signature.
    pub const fn signature(self) -> &'static str {
        match self {
            Self::Transfer => "transfer(address,uint256)",
            Self::Approve => "approve(address,uint256)",
            Self::TransferFrom => "transferFrom(address,address,uint256)",
            Self::Permit => "permit(address,address,uint256,uint256,uint8,bytes32,bytes32)",
            Self::Mint => "mint(address,uint256)",
            Self::Burn => "burn(uint256)",
            Self::BalanceOf => "balanceOf(address)",
            Self::Allowance => "allowance(address,address)",
            Self::TotalSupply => "totalSupply()",
            Self::Name => "name()",
            Self::Symbol => "symbol()",
            Self::Decimals => "decimals()",
            Self::DomainSeparator => "DOMAIN_SEPARATOR()",
            Self::Nonces => "nonces(address)",
        }
    }

    /// Number of 32-byte argument words.
    pub const fn arity(self) -> usize {
        match self {
            Self::Permit => 7,
            Self::TransferFrom => 3,
            Self::Transfer | Self::Approve | Self::Mint | Self::Allowance => 2,
            Self::Burn | Self::BalanceOf | Self::Nonces => 1,
            Self::TotalSupply | Self::Name | Self::Symbol | Self::Decimals | Self::DomainSeparator => {
                0
            }
        }
    }

    /// Four-byte selector.
    pub fn selector(self) -> [u8; 4] {
        selector(self.signature())
    }
}

/// Keccak-256 of `data`.
pub fn keccak(data: &[u8]) -> B256 {
    B256::from_slice(&Keccak256::digest(data))
}

/// First four bytes of the Keccak-256 of a signature.
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Solidity mapping slot `keccak256(pad(key) ++ pad(root))`.
pub fn mapping_slot(key: B256, root: U256) -> U256 {
    let mut preimage = [0u8; 64];
    preimage[..32].copy_from_slice(key.as_slice());
    preimage[32..].copy_from_slice(&root.to_be_bytes::<32>());
    U256::from_be_bytes(keccak(&preimage).0)
}

/// Slot of `balanceOf[account]`.
pub fn balance_slot(account: Address) -> U256 {
    mapping_slot(account.into_word(), BALANCES_SLOT)
}

/// Slot of `allowance[owner][spender]`.
pub fn allowance_slot(owner: Address, spender: Address) -> U256 {
    let inner = mapping_slot(owner.into_word(), ALLOWANCES_SLOT);
    mapping_slot(spender.into_word(), inner)
}

/// Slot of `nonces[owner]`.
pub fn nonce_slot(owner: Address) -> U256 {
    mapping_slot(owner.into_word(), NONCES_SLOT)
}

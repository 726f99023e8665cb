//! Reference token composed from separate ERC-20, ownership, nonce and EIP-712 parts.
//!
//! Reverts are typed [`ReferenceError`]s and logs are structured [`Erc20Event`]s.

use alloy_primitives::{Address, B256, U256, keccak256};

use crate::{Env, Journaled, ecrecover};

mod erc20;
use erc20::Erc20;

mod error;
pub use error::{PANIC_ARITHMETIC, ReferenceError};

mod extensions;
use extensions::{Eip712, Nonces, Ownable};

const PERMIT_TYPE: &str =
    "Permit(address owner,address spender,uint256 value,uint256 nonce,uint256 deadline)";

/// Half the secp256k1 order; `s` values above it are rejected.
const HALF_ORDER: B256 =
    alloy_primitives::b256!("7fffffffffffffffffffffffffffffff5d576e7357a4501ddfe92f46681b20a0");

/// Logs emitted by the reference token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Erc20Event {
    /// `Transfer(address indexed from, address indexed to, uint256 value)`.
    Transfer {
        /// Debited account.
        from: Address,
        /// Credited account.
        to: Address,
        /// Amount moved.
        value: U256,
    },
    /// `Approval(address indexed owner, address indexed spender, uint256 value)`.
    Approval {
        /// Granting account.
        owner: Address,
        /// Approved spender.
        spender: Address,
        /// New allowance.
        value: U256,
    },
}

#[derive(Clone, Debug, Default)]
struct ReferenceState {
    erc20: Erc20,
    nonces: Nonces,
}

/// The reference ERC-20 + ERC-2612 token.
#[derive(Clone, Debug)]
pub struct ReferenceToken {
    this: Address,
    name: String,
    symbol: String,
    ownable: Ownable,
    eip712: Eip712,
    journal: Journaled<ReferenceState, Erc20Event>,
}

impl ReferenceToken {
    /// Deploy at `this`, making `env.caller` the owner and crediting it `initial_supply`.
    pub fn deploy(
        this: Address,
        env: &Env,
        name: impl Into<String>,
        symbol: impl Into<String>,
        initial_supply: U256,
    ) -> Result<Self, ReferenceError> {
        let name = name.into();
        let eip712 = Eip712::new(&name, "1", env.chain_id, this);
        let mut token = Self {
            this,
            name,
            symbol: symbol.into(),
            ownable: Ownable::new(env.caller),
            eip712,
            journal: Journaled::new(ReferenceState::default()),
        };
        token.journal.transact(|state, logs| state.erc20.mint(logs, env.caller, initial_supply))?;
        Ok(token)
    }

    /// Deployed address.
    pub const fn address(&self) -> Address {
        self.this
    }

    /// Current owner.
    pub const fn owner(&self) -> Address {
        self.ownable.owner()
    }

    /// Token name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Token symbol.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Always 18.
    pub const fn decimals(&self) -> u8 {
        18
    }

    /// Total supply.
    pub const fn total_supply(&self) -> U256 {
        self.journal.state().erc20.total_supply()
    }

    /// Balance of `account`.
    pub fn balance_of(&self, account: Address) -> U256 {
        self.journal.state().erc20.balance_of(account)
    }

    /// Allowance of `spender` over `owner`.
    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.journal.state().erc20.allowance(owner, spender)
    }

    /// Next permit nonce of `owner`.
    pub fn nonces(&self, owner: Address) -> U256 {
        self.journal.state().nonces.nonces(owner)
    }

    /// `DOMAIN_SEPARATOR()` for the chain in `env`.
    pub fn domain_separator(&self, env: &Env) -> B256 {
        self.eip712.domain_separator_v4(env.chain_id, self.this)
    }

    /// `transfer(to, value)`.
    pub fn transfer(&mut self, env: &Env, to: Address, value: U256) -> Result<bool, ReferenceError> {
        self.journal.transact(|state, logs| {
            state.erc20.transfer(logs, env.caller, to, value)?;
            Ok(true)
        })
    }

    /// `approve(spender, value)`.
    pub fn approve(&mut self, env: &Env, spender: Address, value: U256) -> Result<bool, ReferenceError> {
        self.journal.transact(|state, logs| {
            state.erc20.approve(logs, env.caller, spender, value, true);
            Ok(true)
        })
    }

    /// `transferFrom(from, to, value)`.
    pub fn transfer_from(
        &mut self,
        env: &Env,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<bool, ReferenceError> {
        self.journal.transact(|state, logs| {
            state.erc20.spend_allowance(logs, from, env.caller, value)?;
            state.erc20.transfer(logs, from, to, value)?;
            Ok(true)
        })
    }

    /// `permit(owner, spender, value, deadline, v, r, s)`.
    #[allow(clippy::too_many_arguments)]
    pub fn permit(
        &mut self,
        env: &Env,
        owner: Address,
        spender: Address,
        value: U256,
        deadline: U256,
        v: u8,
        r: B256,
        s: B256,
    ) -> Result<(), ReferenceError> {
        if U256::from(env.timestamp) > deadline {
            return Err(ReferenceError::Erc2612ExpiredSignature(deadline));
        }
        let eip712 = &self.eip712;
        let this = self.this;
        self.journal.transact(|state, logs| {
            let nonce = state.nonces.use_nonce(owner);
            let mut encoded = Vec::with_capacity(6 * 32);
            encoded.extend_from_slice(keccak256(PERMIT_TYPE).as_slice());
            encoded.extend_from_slice(owner.into_word().as_slice());
            encoded.extend_from_slice(spender.into_word().as_slice());
            encoded.extend_from_slice(&value.to_be_bytes::<32>());
            encoded.extend_from_slice(&nonce.to_be_bytes::<32>());
            encoded.extend_from_slice(&deadline.to_be_bytes::<32>());
            let hash = eip712.hash_typed_data_v4(env.chain_id, this, keccak256(encoded));

            let signer = recover(hash, v, r, s)?;
            if signer != owner {
                return Err(ReferenceError::Erc2612InvalidSigner { signer, owner });
            }
            state.erc20.approve(logs, owner, spender, value, true);
            Ok(())
        })
    }

    /// `mint(to, value)`, owner only.
    pub fn mint(&mut self, env: &Env, to: Address, value: U256) -> Result<(), ReferenceError> {
        self.ownable.check_owner(env.caller)?;
        self.journal.transact(|state, logs| state.erc20.mint(logs, to, value))
    }

    /// `burn(value)` from the caller.
    pub fn burn(&mut self, env: &Env, value: U256) -> Result<(), ReferenceError> {
        self.journal.transact(|state, logs| state.erc20.burn(logs, env.caller, value))
    }

    /// Take the logs emitted since the last call.
    pub fn take_events(&mut self) -> Vec<Erc20Event> {
        self.journal.drain_logs()
    }
}

// Strict recovery: high `s` and a zero result both revert.
fn recover(hash: B256, v: u8, r: B256, s: B256) -> Result<Address, ReferenceError> {
    if s > HALF_ORDER {
        return Err(ReferenceError::EcdsaInvalidSignatureS(s));
    }
    let signer = ecrecover(hash, v, r, s);
    if signer.is_zero() {
        return Err(ReferenceError::EcdsaInvalidSignature);
    }
    Ok(signer)
}

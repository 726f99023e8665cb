//! Minimal token in a flat, gas-minded layout.
//!
//! Failures are either `require`-style string reasons or checked-arithmetic panics, and there
//! are no zero-address guards: tokens sent to the zero address are simply held there.

use std::collections::HashMap;

use alloy_primitives::{Address, B256, U256, keccak256};
use thiserror::Error;

use crate::{Env, Journaled, ecrecover};

/// Reason string of the owner check.
pub const UNAUTHORIZED: &str = "UNAUTHORIZED";

/// Reason string of an expired permit.
pub const PERMIT_DEADLINE_EXPIRED: &str = "PERMIT_DEADLINE_EXPIRED";

/// Reason string of a permit whose signer is not the owner.
pub const INVALID_SIGNER: &str = "INVALID_SIGNER";

/// Panic code of checked arithmetic.
pub const ARITHMETIC_PANIC: u8 = 0x11;

/// A revert of the minimal token.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MinimalError {
    /// `Panic(code)` raised while updating the storage variable named by `site`.
    #[error("panic {code:#04x} at {site}")]
    Panic {
        /// Panic code.
        code: u8,
        /// Storage variable whose update failed: `balanceOf`, `allowance` or `totalSupply`.
        site: &'static str,
    },
    /// `Error(string)`.
    #[error("reverted: {0}")]
    Reason(&'static str),
}

impl MinimalError {
    const fn arithmetic(site: &'static str) -> Self {
        Self::Panic { code: ARITHMETIC_PANIC, site }
    }
}

/// Logs emitted by the minimal token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MinimalEvent {
    /// `Transfer(from, to, amount)`.
    Transfer(Address, Address, U256),
    /// `Approval(owner, spender, amount)`.
    Approval(Address, Address, U256),
}

#[derive(Clone, Debug, Default)]
struct Storage {
    total_supply: U256,
    balance_of: HashMap<Address, U256>,
    allowance: HashMap<(Address, Address), U256>,
    nonces: HashMap<Address, U256>,
}

impl Storage {
    fn balance(&self, account: Address) -> U256 {
        self.balance_of.get(&account).copied().unwrap_or_default()
    }

    fn debit(&mut self, account: Address, amount: U256) -> Result<(), MinimalError> {
        let balance = self
            .balance(account)
            .checked_sub(amount)
            .ok_or(MinimalError::arithmetic("balanceOf"))?;
        self.balance_of.insert(account, balance);
        Ok(())
    }

    // Unchecked: a balance can never exceed the total supply.
    fn credit(&mut self, account: Address, amount: U256) {
        let balance = self.balance(account).wrapping_add(amount);
        self.balance_of.insert(account, balance);
    }
}

/// The minimal ERC-20 + ERC-2612 token.
#[derive(Clone, Debug)]
pub struct MinimalToken {
    this: Address,
    name: String,
    symbol: String,
    owner: Address,
    initial_chain_id: u64,
    initial_domain_separator: B256,
    journal: Journaled<Storage, MinimalEvent>,
}

impl MinimalToken {
    /// Deploy at `this` with `env.caller` as owner holding `initial_supply`.
    pub fn deploy(
        this: Address,
        env: &Env,
        name: impl Into<String>,
        symbol: impl Into<String>,
        initial_supply: U256,
    ) -> Result<Self, MinimalError> {
        let name = name.into();
        let initial_domain_separator = compute_domain_separator(&name, env.chain_id, this);
        let mut token = Self {
            this,
            name,
            symbol: symbol.into(),
            owner: env.caller,
            initial_chain_id: env.chain_id,
            initial_domain_separator,
            journal: Journaled::new(Storage::default()),
        };
        token.journal.transact(|storage, logs| mint(storage, logs, env.caller, initial_supply))?;
        Ok(token)
    }

    /// Deployed address.
    pub const fn address(&self) -> Address {
        self.this
    }

    /// Owner allowed to mint.
    pub const fn owner(&self) -> Address {
        self.owner
    }

    /// `name()`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `symbol()`.
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// `decimals()`.
    pub const fn decimals(&self) -> u8 {
        18
    }

    /// `totalSupply()`.
    pub const fn total_supply(&self) -> U256 {
        self.journal.state().total_supply
    }

    /// `balanceOf(account)`.
    pub fn balance_of(&self, account: Address) -> U256 {
        self.journal.state().balance(account)
    }

    /// `allowance(owner, spender)`.
    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.journal.state().allowance.get(&(owner, spender)).copied().unwrap_or_default()
    }

    /// `nonces(owner)`.
    pub fn nonces(&self, owner: Address) -> U256 {
        self.journal.state().nonces.get(&owner).copied().unwrap_or_default()
    }

    /// `DOMAIN_SEPARATOR()`, recomputed when the chain id differs from deployment.
    pub fn domain_separator(&self, env: &Env) -> B256 {
        if env.chain_id == self.initial_chain_id {
            self.initial_domain_separator
        } else {
            compute_domain_separator(&self.name, env.chain_id, self.this)
        }
    }

    /// `approve(spender, amount)`.
    pub fn approve(&mut self, env: &Env, spender: Address, amount: U256) -> Result<bool, MinimalError> {
        self.journal.transact(|storage, logs| {
            storage.allowance.insert((env.caller, spender), amount);
            logs.push(MinimalEvent::Approval(env.caller, spender, amount));
            Ok(true)
        })
    }

    /// `transfer(to, amount)`.
    pub fn transfer(&mut self, env: &Env, to: Address, amount: U256) -> Result<bool, MinimalError> {
        self.journal.transact(|storage, logs| {
            storage.debit(env.caller, amount)?;
            storage.credit(to, amount);
            logs.push(MinimalEvent::Transfer(env.caller, to, amount));
            Ok(true)
        })
    }

    /// `transferFrom(from, to, amount)`.
    pub fn transfer_from(
        &mut self,
        env: &Env,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<bool, MinimalError> {
        self.journal.transact(|storage, logs| {
            let key = (from, env.caller);
            let allowed = storage.allowance.get(&key).copied().unwrap_or_default();
            if allowed != U256::MAX {
                let remaining =
                    allowed.checked_sub(amount).ok_or(MinimalError::arithmetic("allowance"))?;
                storage.allowance.insert(key, remaining);
            }
            storage.debit(from, amount)?;
            storage.credit(to, amount);
            logs.push(MinimalEvent::Transfer(from, to, amount));
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
    ) -> Result<(), MinimalError> {
        if deadline < U256::from(env.timestamp) {
            return Err(MinimalError::Reason(PERMIT_DEADLINE_EXPIRED));
        }
        let separator = self.domain_separator(env);
        self.journal.transact(|storage, logs| {
            let nonce = storage.nonces.entry(owner).or_default();
            let current = *nonce;
            *nonce = nonce.wrapping_add(U256::from(1u64));

            let mut message = Vec::with_capacity(2 + 32 + 6 * 32);
            message.extend_from_slice(b"\x19\x01");
            message.extend_from_slice(separator.as_slice());
            message.extend_from_slice(
                keccak256(permit_struct(owner, spender, value, current, deadline)).as_slice(),
            );
            let recovered = ecrecover(keccak256(message), v, r, s);
            if recovered.is_zero() || recovered != owner {
                return Err(MinimalError::Reason(INVALID_SIGNER));
            }

            storage.allowance.insert((recovered, spender), value);
            logs.push(MinimalEvent::Approval(owner, spender, value));
            Ok(())
        })
    }

    /// `mint(to, amount)`.
    pub fn mint(&mut self, env: &Env, to: Address, amount: U256) -> Result<(), MinimalError> {
        if env.caller != self.owner {
            return Err(MinimalError::Reason(UNAUTHORIZED));
        }
        self.journal.transact(|storage, logs| mint(storage, logs, to, amount))
    }

    /// `burn(amount)`.
    pub fn burn(&mut self, env: &Env, amount: U256) -> Result<(), MinimalError> {
        self.journal.transact(|storage, logs| {
            storage.debit(env.caller, amount)?;
            storage.total_supply = storage.total_supply.wrapping_sub(amount);
            logs.push(MinimalEvent::Transfer(env.caller, Address::ZERO, amount));
            Ok(())
        })
    }

    /// Take the logs emitted since the last call.
    pub fn take_events(&mut self) -> Vec<MinimalEvent> {
        self.journal.drain_logs()
    }
}

fn mint(
    storage: &mut Storage,
    logs: &mut Vec<MinimalEvent>,
    to: Address,
    amount: U256,
) -> Result<(), MinimalError> {
    storage.total_supply =
        storage.total_supply.checked_add(amount).ok_or(MinimalError::arithmetic("totalSupply"))?;
    storage.credit(to, amount);
    logs.push(MinimalEvent::Transfer(Address::ZERO, to, amount));
    Ok(())
}

fn permit_struct(owner: Address, spender: Address, value: U256, nonce: U256, deadline: U256) -> Vec<u8> {
    let mut data = Vec::with_capacity(6 * 32);
    data.extend_from_slice(
        keccak256(
            "Permit(address owner,address spender,uint256 value,uint256 nonce,uint256 deadline)",
        )
        .as_slice(),
    );
    data.extend_from_slice(owner.into_word().as_slice());
    data.extend_from_slice(spender.into_word().as_slice());
    data.extend_from_slice(&value.to_be_bytes::<32>());
    data.extend_from_slice(&nonce.to_be_bytes::<32>());
    data.extend_from_slice(&deadline.to_be_bytes::<32>());
    data
}

fn compute_domain_separator(name: &str, chain_id: u64, this: Address) -> B256 {
    let mut data = Vec::with_capacity(5 * 32);
    data.extend_from_slice(
        keccak256(
            "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)",
        )
        .as_slice(),
    );
    data.extend_from_slice(keccak256(name.as_bytes()).as_slice());
    data.extend_from_slice(keccak256("1").as_slice());
    data.extend_from_slice(&U256::from(chain_id).to_be_bytes::<32>());
    data.extend_from_slice(this.into_word().as_slice());
    keccak256(data)
}

#[cfg(test)]
mod tests {
    use alloy_primitives::address;
    use rstest::rstest;

    use super::*;

    const OWNER: Address = address!("0x1000000000000000000000000000000000000001");
    const BOB: Address = address!("0x2000000000000000000000000000000000000002");
    const THIS: Address = address!("0x5FbDB2315678afecb367f032d93F642f64180aa3");

    fn env(caller: Address) -> Env {
        Env::new(caller, 1_000, 31337)
    }

    fn token() -> MinimalToken {
        let mut token = MinimalToken::deploy(THIS, &env(OWNER), "abc", "ABC", U256::from(100u64))
            .expect("deploy");
        token.take_events();
        token
    }

    #[test]
    fn transfer_to_zero_address_is_held() {
        let mut token = token();
        assert_eq!(token.transfer(&env(OWNER), Address::ZERO, U256::from(3u64)), Ok(true));
        assert_eq!(token.balance_of(Address::ZERO), U256::from(3u64));
        assert_eq!(token.total_supply(), U256::from(100u64));
        assert_eq!(
            token.take_events(),
            vec![MinimalEvent::Transfer(OWNER, Address::ZERO, U256::from(3u64))]
        );
    }

    #[rstest]
    #[case::balance(U256::from(101u64), MinimalError::arithmetic("balanceOf"))]
    #[case::max(U256::MAX, MinimalError::arithmetic("balanceOf"))]
    fn transfer_panics(#[case] amount: U256, #[case] expected: MinimalError) {
        let mut token = token();
        assert_eq!(token.transfer(&env(OWNER), BOB, amount), Err(expected));
        assert!(token.take_events().is_empty());
    }

    #[test]
    fn transfer_from_checks_allowance_first() {
        let mut token = token();
        assert_eq!(
            token.transfer_from(&env(BOB), OWNER, BOB, U256::from(1u64)),
            Err(MinimalError::arithmetic("allowance"))
        );
        token.approve(&env(OWNER), BOB, U256::from(500u64)).expect("approve");
        assert_eq!(
            token.transfer_from(&env(BOB), OWNER, BOB, U256::from(200u64)),
            Err(MinimalError::arithmetic("balanceOf"))
        );
        // The reverted call must not have spent allowance.
        assert_eq!(token.allowance(OWNER, BOB), U256::from(500u64));
    }

    #[rstest]
    #[case::not_owner(BOB, U256::from(1u64), MinimalError::Reason(UNAUTHORIZED))]
    #[case::overflow(OWNER, U256::MAX, MinimalError::arithmetic("totalSupply"))]
    fn mint_failures(#[case] caller: Address, #[case] amount: U256, #[case] expected: MinimalError) {
        let mut token = token();
        assert_eq!(token.mint(&env(caller), BOB, amount), Err(expected));
    }

    #[test]
    fn burn_reduces_supply() {
        let mut token = token();
        token.burn(&env(OWNER), U256::from(40u64)).expect("burn");
        assert_eq!(token.total_supply(), U256::from(60u64));
        assert_eq!(token.burn(&env(OWNER), U256::from(61u64)), Err(MinimalError::arithmetic("balanceOf")));
    }

    #[test]
    fn permit_garbage_signature_keeps_nonce() {
        let mut token = token();
        let err = token
            .permit(&env(BOB), OWNER, BOB, U256::from(1u64), U256::MAX, 27, B256::ZERO, B256::ZERO)
            .unwrap_err();
        assert_eq!(err, MinimalError::Reason(INVALID_SIGNER));
        assert_eq!(token.nonces(OWNER), U256::ZERO);
    }

    #[test]
    fn permit_deadline_is_inclusive() {
        let mut token = token();
        let expired =
            token.permit(&env(BOB), OWNER, BOB, U256::from(1u64), U256::from(999u64), 27, B256::ZERO, B256::ZERO);
        assert_eq!(expired, Err(MinimalError::Reason(PERMIT_DEADLINE_EXPIRED)));
        let at_deadline =
            token.permit(&env(BOB), OWNER, BOB, U256::from(1u64), U256::from(1_000u64), 27, B256::ZERO, B256::ZERO);
        assert_eq!(at_deadline, Err(MinimalError::Reason(INVALID_SIGNER)));
    }

    #[test]
    fn separator_follows_chain() {
        let token = token();
        assert_eq!(token.domain_separator(&env(OWNER)), token.initial_domain_separator);
        assert_ne!(
            token.domain_separator(&Env::new(OWNER, 0, 1)),
            token.initial_domain_separator
        );
    }
}

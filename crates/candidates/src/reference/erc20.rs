//! Core ERC-20 accounting.

use std::collections::HashMap;

use alloy_primitives::{Address, U256};

use super::{Erc20Event, ReferenceError, error::PANIC_ARITHMETIC};

/// Balances, allowances and supply.
#[derive(Clone, Debug, Default)]
pub(crate) struct Erc20 {
    balances: HashMap<Address, U256>,
    allowances: HashMap<Address, HashMap<Address, U256>>,
    total_supply: U256,
}

impl Erc20 {
    pub(crate) fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    pub(crate) fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&owner).and_then(|m| m.get(&spender)).copied().unwrap_or_default()
    }

    pub(crate) const fn total_supply(&self) -> U256 {
        self.total_supply
    }

    pub(crate) fn transfer(
        &mut self,
        events: &mut Vec<Erc20Event>,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<(), ReferenceError> {
        if from.is_zero() {
            return Err(ReferenceError::Erc20InvalidSender(Address::ZERO));
        }
        if to.is_zero() {
            return Err(ReferenceError::Erc20InvalidReceiver(Address::ZERO));
        }
        self.update(events, from, to, value)
    }

    pub(crate) fn mint(
        &mut self,
        events: &mut Vec<Erc20Event>,
        account: Address,
        value: U256,
    ) -> Result<(), ReferenceError> {
        if account.is_zero() {
            return Err(ReferenceError::Erc20InvalidReceiver(Address::ZERO));
        }
        self.update(events, Address::ZERO, account, value)
    }

    pub(crate) fn burn(
        &mut self,
        events: &mut Vec<Erc20Event>,
        account: Address,
        value: U256,
    ) -> Result<(), ReferenceError> {
        if account.is_zero() {
            return Err(ReferenceError::Erc20InvalidSender(Address::ZERO));
        }
        self.update(events, account, Address::ZERO, value)
    }

    pub(crate) fn approve(
        &mut self,
        events: &mut Vec<Erc20Event>,
        owner: Address,
        spender: Address,
        value: U256,
        emit: bool,
    ) {
        self.allowances.entry(owner).or_default().insert(spender, value);
        if emit {
            events.push(Erc20Event::Approval { owner, spender, value });
        }
    }

    pub(crate) fn spend_allowance(
        &mut self,
        events: &mut Vec<Erc20Event>,
        owner: Address,
        spender: Address,
        value: U256,
    ) -> Result<(), ReferenceError> {
        let current = self.allowance(owner, spender);
        if current != U256::MAX {
            if current < value {
                return Err(ReferenceError::Erc20InsufficientAllowance {
                    spender,
                    allowance: current,
                    needed: value,
                });
            }
            self.approve(events, owner, spender, current - value, false);
        }
        Ok(())
    }

    // Mints when `from` is zero, burns when `to` is zero.
    fn update(
        &mut self,
        events: &mut Vec<Erc20Event>,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<(), ReferenceError> {
        if from.is_zero() {
            self.total_supply = self
                .total_supply
                .checked_add(value)
                .ok_or(ReferenceError::Panic(PANIC_ARITHMETIC))?;
        } else {
            let from_balance = self.balance_of(from);
            if from_balance < value {
                return Err(ReferenceError::Erc20InsufficientBalance {
                    sender: from,
                    balance: from_balance,
                    needed: value,
                });
            }
            self.balances.insert(from, from_balance - value);
        }

        if to.is_zero() {
            self.total_supply -= value;
        } else {
            // Cannot overflow: a balance never exceeds the total supply.
            let to_balance = self.balance_of(to);
            self.balances.insert(to, to_balance + value);
        }

        events.push(Erc20Event::Transfer { from, to, value });
        Ok(())
    }
}

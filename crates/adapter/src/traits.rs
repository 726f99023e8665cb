//! The adapter interface.

use std::fmt;

use alloy_primitives::{Address, U256};
use tokencheck_candidates::Env;
use tokencheck_domain::{Call, CallContext, CallOutcome, PermitCall};

/// Drives one deployed candidate through the common ledger interface.
///
/// Every operation returns the uniform [`CallOutcome`]; a revert is an outcome, never a panic
/// or an `Err`. Reads take `&mut self` because some candidates only answer through a call.
pub trait TokenAdapter: fmt::Debug + Send {
    /// Registry id of the candidate.
    fn id(&self) -> &str;

    /// Address the candidate is deployed at.
    fn address(&self) -> Address;

    /// `transfer(to, amount)`.
    fn transfer(&mut self, ctx: &CallContext, to: Address, amount: U256) -> CallOutcome;

    /// `approve(spender, amount)`.
    fn approve(&mut self, ctx: &CallContext, spender: Address, amount: U256) -> CallOutcome;

    /// `transferFrom(from, to, amount)`.
    fn transfer_from(
        &mut self,
        ctx: &CallContext,
        from: Address,
        to: Address,
        amount: U256,
    ) -> CallOutcome;

    /// `permit(owner, spender, value, deadline, v, r, s)`.
    fn permit(&mut self, ctx: &CallContext, permit: &PermitCall) -> CallOutcome;

    /// `mint(to, amount)`.
    fn mint(&mut self, ctx: &CallContext, to: Address, amount: U256) -> CallOutcome;

    /// `burn(amount)`.
    fn burn(&mut self, ctx: &CallContext, amount: U256) -> CallOutcome;

    /// `balanceOf(account)`.
    fn balance_of(&mut self, ctx: &CallContext, account: Address) -> CallOutcome;

    /// `allowance(owner, spender)`.
    fn allowance(&mut self, ctx: &CallContext, owner: Address, spender: Address) -> CallOutcome;

    /// `totalSupply()`.
    fn total_supply(&mut self, ctx: &CallContext) -> CallOutcome;

    /// `name()`.
    fn name(&mut self, ctx: &CallContext) -> CallOutcome;

    /// `symbol()`.
    fn symbol(&mut self, ctx: &CallContext) -> CallOutcome;

    /// `decimals()`.
    fn decimals(&mut self, ctx: &CallContext) -> CallOutcome;

    /// `DOMAIN_SEPARATOR()`.
    fn domain_separator(&mut self, ctx: &CallContext) -> CallOutcome;

    /// `nonces(owner)`.
    fn nonces(&mut self, ctx: &CallContext, owner: Address) -> CallOutcome;

    /// Route a [`Call`] to the matching operation.
    fn dispatch(&mut self, ctx: &CallContext, call: &Call) -> CallOutcome {
        match call {
            Call::Transfer { to, amount } => self.transfer(ctx, *to, *amount),
            Call::Approve { spender, amount } => self.approve(ctx, *spender, *amount),
            Call::TransferFrom { from, to, amount } => self.transfer_from(ctx, *from, *to, *amount),
            Call::Permit(permit) => self.permit(ctx, permit),
            Call::Mint { to, amount } => self.mint(ctx, *to, *amount),
            Call::Burn { amount } => self.burn(ctx, *amount),
            Call::BalanceOf { account } => self.balance_of(ctx, *account),
            Call::Allowance { owner, spender } => self.allowance(ctx, *owner, *spender),
            Call::TotalSupply => self.total_supply(ctx),
            Call::Name => self.name(ctx),
            Call::Symbol => self.symbol(ctx),
            Call::Decimals => self.decimals(ctx),
            Call::DomainSeparator => self.domain_separator(ctx),
            Call::Nonces { owner } => self.nonces(ctx, *owner),
        }
    }
}

/// Candidate execution environment for a call context on `chain_id`.
pub(crate) const fn env(ctx: &CallContext, chain_id: u64) -> Env {
    Env::new(ctx.caller, ctx.timestamp, chain_id)
}

//! Call dispatch producing the outcome a conforming candidate must match.

use tokencheck_domain::{Call, CallContext, CallOutcome, ReturnValue, TokenEvent};

use crate::{LedgerError, LedgerModel};

impl LedgerModel {
    /// Apply `call` and return its expected observable outcome.
    pub fn execute(&mut self, ctx: &CallContext, call: &Call) -> CallOutcome {
        let caller = ctx.caller;
        match call {
            Call::Transfer { to, amount } => boolean(self.transfer(caller, *to, *amount)),
            Call::Approve { spender, amount } => boolean(self.approve(caller, *spender, *amount)),
            Call::TransferFrom { from, to, amount } => {
                boolean(self.transfer_from(caller, *from, *to, *amount))
            }
            Call::Permit(permit) => unit(self.permit(permit, ctx.timestamp)),
            Call::Mint { to, amount } => unit(self.mint(caller, *to, *amount)),
            Call::Burn { amount } => unit(self.burn(caller, *amount)),
            Call::BalanceOf { account } => {
                CallOutcome::read(ReturnValue::Uint(self.balance_of(*account)))
            }
            Call::Allowance { owner, spender } => {
                CallOutcome::read(ReturnValue::Uint(self.allowance(*owner, *spender)))
            }
            Call::TotalSupply => CallOutcome::read(ReturnValue::Uint(self.total_supply())),
            Call::Name => CallOutcome::read(ReturnValue::Text(self.name().to_string())),
            Call::Symbol => CallOutcome::read(ReturnValue::Text(self.symbol().to_string())),
            Call::Decimals => CallOutcome::read(ReturnValue::Decimals(self.decimals())),
            Call::DomainSeparator => CallOutcome::read(ReturnValue::Hash(self.domain_separator())),
            Call::Nonces { owner } => CallOutcome::read(ReturnValue::Uint(self.nonces(*owner))),
        }
    }
}

fn boolean(result: Result<Vec<TokenEvent>, LedgerError>) -> CallOutcome {
    match result {
        Ok(events) => CallOutcome::returned(ReturnValue::Bool(true), events),
        Err(err) => CallOutcome::reverted(err.kind()),
    }
}

fn unit(result: Result<Vec<TokenEvent>, LedgerError>) -> CallOutcome {
    match result {
        Ok(events) => CallOutcome::succeeded(events),
        Err(err) => CallOutcome::reverted(err.kind()),
    }
}

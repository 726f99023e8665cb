//! Adapter for the minimal token.

use alloy_primitives::{Address, U256};
use tokencheck_candidates::minimal::{
    ARITHMETIC_PANIC, INVALID_SIGNER, MinimalError, MinimalEvent, MinimalToken,
    PERMIT_DEADLINE_EXPIRED, UNAUTHORIZED,
};
use tokencheck_domain::{
    CallContext, CallOutcome, Deployment, PermitCall, ReturnValue, RevertKind, TokenEvent,
};

use crate::{AdapterError, TokenAdapter, traits::env};

/// Translates `require` reasons and arithmetic panics of [`MinimalToken`].
///
/// A panic is classified by the storage variable whose update underflowed or overflowed, the
/// same way a development node labels the failing line.
#[derive(Debug)]
pub struct MinimalAdapter {
    id: String,
    chain_id: u64,
    token: MinimalToken,
}

impl MinimalAdapter {
    /// Deploy a fresh minimal token.
    pub fn deploy(id: impl Into<String>, deployment: &Deployment) -> Result<Self, AdapterError> {
        let id = id.into();
        let ctx = CallContext::new(deployment.owner, 0);
        let mut token = MinimalToken::deploy(
            deployment.address,
            &env(&ctx, deployment.chain_id),
            deployment.name.clone(),
            deployment.symbol.clone(),
            deployment.initial_supply,
        )
        .map_err(|err| AdapterError::Deploy { candidate: id.clone(), reason: err.to_string() })?;
        token.take_events();
        Ok(Self { id, chain_id: deployment.chain_id, token })
    }

    fn finish(&mut self, result: Result<Option<ReturnValue>, MinimalError>) -> CallOutcome {
        match result {
            Ok(value) => {
                let emitter = self.token.address();
                let events =
                    self.token.take_events().into_iter().map(|e| convert(emitter, e)).collect();
                match value {
                    Some(value) => CallOutcome::returned(value, events),
                    None => CallOutcome::succeeded(events),
                }
            }
            Err(err) => CallOutcome::reverted(revert_kind(&err)),
        }
    }
}

const fn convert(emitter: Address, event: MinimalEvent) -> TokenEvent {
    match event {
        MinimalEvent::Transfer(from, to, value) => TokenEvent::transfer(emitter, from, to, value),
        MinimalEvent::Approval(owner, spender, value) => {
            TokenEvent::approval(emitter, owner, spender, value)
        }
    }
}

fn revert_kind(err: &MinimalError) -> RevertKind {
    match *err {
        MinimalError::Panic { code: ARITHMETIC_PANIC, site: "balanceOf" } => {
            RevertKind::InsufficientBalance
        }
        MinimalError::Panic { code: ARITHMETIC_PANIC, site: "allowance" } => {
            RevertKind::InsufficientAllowance
        }
        MinimalError::Panic { code: ARITHMETIC_PANIC, site: "totalSupply" } => {
            RevertKind::SupplyOverflow
        }
        MinimalError::Reason(UNAUTHORIZED) => RevertKind::Unauthorized,
        MinimalError::Reason(PERMIT_DEADLINE_EXPIRED) => RevertKind::Expired,
        MinimalError::Reason(INVALID_SIGNER) => RevertKind::InvalidSignature,
        _ => RevertKind::Unrecognized(err.to_string()),
    }
}

fn boolean(result: Result<bool, MinimalError>) -> Result<Option<ReturnValue>, MinimalError> {
    result.map(|value| Some(ReturnValue::Bool(value)))
}

fn unit(result: Result<(), MinimalError>) -> Result<Option<ReturnValue>, MinimalError> {
    result.map(|()| None)
}

impl TokenAdapter for MinimalAdapter {
    fn id(&self) -> &str {
        &self.id
    }

    fn address(&self) -> Address {
        self.token.address()
    }

    fn transfer(&mut self, ctx: &CallContext, to: Address, amount: U256) -> CallOutcome {
        let result = self.token.transfer(&env(ctx, self.chain_id), to, amount);
        self.finish(boolean(result))
    }

    fn approve(&mut self, ctx: &CallContext, spender: Address, amount: U256) -> CallOutcome {
        let result = self.token.approve(&env(ctx, self.chain_id), spender, amount);
        self.finish(boolean(result))
    }

    fn transfer_from(
        &mut self,
        ctx: &CallContext,
        from: Address,
        to: Address,
        amount: U256,
    ) -> CallOutcome {
        let result = self.token.transfer_from(&env(ctx, self.chain_id), from, to, amount);
        self.finish(boolean(result))
    }

    fn permit(&mut self, ctx: &CallContext, permit: &PermitCall) -> CallOutcome {
        let sig = &permit.signature;
        let result = self.token.permit(
            &env(ctx, self.chain_id),
            permit.owner,
            permit.spender,
            permit.value,
            permit.deadline,
            sig.v,
            sig.r,
            sig.s,
        );
        self.finish(unit(result))
    }

    fn mint(&mut self, ctx: &CallContext, to: Address, amount: U256) -> CallOutcome {
        let result = self.token.mint(&env(ctx, self.chain_id), to, amount);
        self.finish(unit(result))
    }

    fn burn(&mut self, ctx: &CallContext, amount: U256) -> CallOutcome {
        let result = self.token.burn(&env(ctx, self.chain_id), amount);
        self.finish(unit(result))
    }

    fn balance_of(&mut self, _ctx: &CallContext, account: Address) -> CallOutcome {
        CallOutcome::read(ReturnValue::Uint(self.token.balance_of(account)))
    }

    fn allowance(&mut self, _ctx: &CallContext, owner: Address, spender: Address) -> CallOutcome {
        CallOutcome::read(ReturnValue::Uint(self.token.allowance(owner, spender)))
    }

    fn total_supply(&mut self, _ctx: &CallContext) -> CallOutcome {
        CallOutcome::read(ReturnValue::Uint(self.token.total_supply()))
    }

    fn name(&mut self, _ctx: &CallContext) -> CallOutcome {
        CallOutcome::read(ReturnValue::Text(self.token.name().to_string()))
    }

    fn symbol(&mut self, _ctx: &CallContext) -> CallOutcome {
        CallOutcome::read(ReturnValue::Text(self.token.symbol().to_string()))
    }

    fn decimals(&mut self, _ctx: &CallContext) -> CallOutcome {
        CallOutcome::read(ReturnValue::Decimals(self.token.decimals()))
    }

    fn domain_separator(&mut self, ctx: &CallContext) -> CallOutcome {
        CallOutcome::read(ReturnValue::Hash(self.token.domain_separator(&env(ctx, self.chain_id))))
    }

    fn nonces(&mut self, _ctx: &CallContext, owner: Address) -> CallOutcome {
        CallOutcome::read(ReturnValue::Uint(self.token.nonces(owner)))
    }
}

//! Adapter for the reference token.

use alloy_primitives::{Address, U256};
use tokencheck_candidates::reference::{Erc20Event, ReferenceError, ReferenceToken};
use tokencheck_domain::{
    CallContext, CallOutcome, Deployment, PermitCall, ReturnValue, RevertKind, TokenEvent,
};

use crate::{AdapterError, TokenAdapter, traits::env};

/// Translates typed custom errors and structured events of [`ReferenceToken`].
#[derive(Debug)]
pub struct ReferenceAdapter {
    id: String,
    chain_id: u64,
    token: ReferenceToken,
}

impl ReferenceAdapter {
    /// Deploy a fresh reference token.
    pub fn deploy(id: impl Into<String>, deployment: &Deployment) -> Result<Self, AdapterError> {
        let id = id.into();
        let ctx = CallContext::new(deployment.owner, 0);
        let mut token = ReferenceToken::deploy(
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

    fn finish<T>(
        &mut self,
        result: Result<T, ReferenceError>,
        value: impl FnOnce(T) -> Option<ReturnValue>,
        classify: impl FnOnce(&ReferenceError) -> Option<RevertKind>,
    ) -> CallOutcome {
        match result {
            Ok(out) => {
                let emitter = self.token.address();
                let events = self.token.take_events().into_iter().map(|e| convert(emitter, e)).collect();
                match value(out) {
                    Some(value) => CallOutcome::returned(value, events),
                    None => CallOutcome::succeeded(events),
                }
            }
            Err(err) => CallOutcome::reverted(classify(&err).unwrap_or_else(|| revert_kind(&err))),
        }
    }
}

fn convert(emitter: Address, event: Erc20Event) -> TokenEvent {
    match event {
        Erc20Event::Transfer { from, to, value } => TokenEvent::transfer(emitter, from, to, value),
        Erc20Event::Approval { owner, spender, value } => {
            TokenEvent::approval(emitter, owner, spender, value)
        }
    }
}

fn revert_kind(err: &ReferenceError) -> RevertKind {
    match err {
        ReferenceError::Erc20InsufficientBalance { .. } => RevertKind::InsufficientBalance,
        ReferenceError::Erc20InsufficientAllowance { .. } => RevertKind::InsufficientAllowance,
        ReferenceError::Erc20InvalidReceiver(_) => RevertKind::ZeroAddressRecipient,
        ReferenceError::OwnableUnauthorizedAccount(_) => RevertKind::Unauthorized,
        ReferenceError::Erc2612ExpiredSignature(_) => RevertKind::Expired,
        ReferenceError::Erc2612InvalidSigner { .. }
        | ReferenceError::EcdsaInvalidSignature
        | ReferenceError::EcdsaInvalidSignatureS(_) => RevertKind::InvalidSignature,
        ReferenceError::Erc20InvalidSender(_) | ReferenceError::Panic(_) => {
            RevertKind::Unrecognized(err.to_string())
        }
    }
}

const fn no_override(_: &ReferenceError) -> Option<RevertKind> {
    None
}

fn boolean(value: bool) -> Option<ReturnValue> {
    Some(ReturnValue::Bool(value))
}

impl TokenAdapter for ReferenceAdapter {
    fn id(&self) -> &str {
        &self.id
    }

    fn address(&self) -> Address {
        self.token.address()
    }

    fn transfer(&mut self, ctx: &CallContext, to: Address, amount: U256) -> CallOutcome {
        let result = self.token.transfer(&env(ctx, self.chain_id), to, amount);
        self.finish(result, boolean, no_override)
    }

    fn approve(&mut self, ctx: &CallContext, spender: Address, amount: U256) -> CallOutcome {
        let result = self.token.approve(&env(ctx, self.chain_id), spender, amount);
        self.finish(result, boolean, no_override)
    }

    fn transfer_from(
        &mut self,
        ctx: &CallContext,
        from: Address,
        to: Address,
        amount: U256,
    ) -> CallOutcome {
        let result = self.token.transfer_from(&env(ctx, self.chain_id), from, to, amount);
        self.finish(result, boolean, no_override)
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
        self.finish(result, |()| None, no_override)
    }

    fn mint(&mut self, ctx: &CallContext, to: Address, amount: U256) -> CallOutcome {
        let result = self.token.mint(&env(ctx, self.chain_id), to, amount);
        // Checked addition on the supply is the only arithmetic that can panic in a mint.
        self.finish(result, |()| None, |err| {
            matches!(err, ReferenceError::Panic(_)).then_some(RevertKind::SupplyOverflow)
        })
    }

    fn burn(&mut self, ctx: &CallContext, amount: U256) -> CallOutcome {
        let result = self.token.burn(&env(ctx, self.chain_id), amount);
        self.finish(result, |()| None, no_override)
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

//! Adapter for the slot-level token.
//!
//! Encodes each operation as ABI calldata, then decodes return data, four-byte revert
//! selectors and raw logs back into the common outcome.

use std::collections::HashMap;

use alloy_primitives::{Address, B256, Bytes, Log, U256};
use tokencheck_candidates::slot::{
    SlotToken,
    layout::{self, Function},
};
use tokencheck_domain::{
    APPROVAL_EVENT_SIGNATURE, CallContext, CallOutcome, Deployment, PermitCall, ReturnValue,
    RevertKind, TRANSFER_EVENT_SIGNATURE, TokenEvent,
};
use tracing::warn;

use crate::{TokenAdapter, traits::env};

/// Talks to [`SlotToken`] through calldata, return data and logs only.
#[derive(Debug)]
pub struct SlotAdapter {
    id: String,
    chain_id: u64,
    token: SlotToken,
    reverts: HashMap<[u8; 4], RevertKind>,
    transfer_topic: B256,
    approval_topic: B256,
}

impl SlotAdapter {
    /// Deploy a fresh slot token.
    pub fn deploy(id: impl Into<String>, deployment: &Deployment) -> Self {
        let ctx = CallContext::new(deployment.owner, 0);
        let token = SlotToken::deploy(
            deployment.address,
            &env(&ctx, deployment.chain_id),
            deployment.name.clone(),
            deployment.symbol.clone(),
            deployment.initial_supply,
        );
        let reverts = [
            (layout::INSUFFICIENT_BALANCE, RevertKind::InsufficientBalance),
            (layout::INSUFFICIENT_ALLOWANCE, RevertKind::InsufficientAllowance),
            (layout::UNAUTHORIZED, RevertKind::Unauthorized),
            (layout::OVERFLOW, RevertKind::SupplyOverflow),
            (layout::EXPIRED, RevertKind::Expired),
            (layout::INVALID_SIGNATURE, RevertKind::InvalidSignature),
            (layout::ZERO_ADDRESS, RevertKind::ZeroAddressRecipient),
        ]
        .into_iter()
        .map(|(signature, kind)| (layout::selector(signature), kind))
        .collect();
        Self {
            id: id.into(),
            chain_id: deployment.chain_id,
            token,
            reverts,
            transfer_topic: layout::keccak(TRANSFER_EVENT_SIGNATURE.as_bytes()),
            approval_topic: layout::keccak(APPROVAL_EVENT_SIGNATURE.as_bytes()),
        }
    }

    fn call(
        &mut self,
        ctx: &CallContext,
        function: Function,
        args: &[U256],
        decode: fn(&[u8]) -> Option<ReturnValue>,
    ) -> CallOutcome {
        let calldata = encode(function, args);
        match self.token.call(&env(ctx, self.chain_id), &calldata) {
            Ok(output) => {
                let logs = self.token.take_logs();
                let events = logs.iter().filter_map(|log| self.decode_log(log)).collect();
                let return_value = if output.is_empty() { None } else { decode(&output) };
                if return_value.is_none() && !output.is_empty() {
                    warn!(target: "adapter::slot", ?function, %output, "undecodable return data");
                }
                CallOutcome { success: true, return_value, events, reverted_with: None }
            }
            Err(data) => CallOutcome::reverted(self.revert_kind(&data)),
        }
    }

    fn revert_kind(&self, data: &Bytes) -> RevertKind {
        if data.is_empty() {
            return RevertKind::Unrecognized("empty revert data".to_string());
        }
        data.get(..4)
            .and_then(|selector| self.reverts.get(selector))
            .cloned()
            .unwrap_or_else(|| RevertKind::Unrecognized(data.to_string()))
    }

    fn decode_log(&self, log: &Log) -> Option<TokenEvent> {
        let topics = log.topics();
        if topics.len() != 3 || log.data.data.len() != 32 {
            warn!(target: "adapter::slot", topics = topics.len(), "unexpected log shape");
            return None;
        }
        let first = Address::from_word(topics[1]);
        let second = Address::from_word(topics[2]);
        let value = U256::from_be_slice(&log.data.data);
        if topics[0] == self.transfer_topic {
            Some(TokenEvent::transfer(log.address, first, second, value))
        } else if topics[0] == self.approval_topic {
            Some(TokenEvent::approval(log.address, first, second, value))
        } else {
            warn!(target: "adapter::slot", topic = %topics[0], "unknown event topic");
            None
        }
    }
}

fn encode(function: Function, args: &[U256]) -> Vec<u8> {
    let mut calldata = Vec::with_capacity(4 + 32 * args.len());
    calldata.extend_from_slice(&function.selector());
    for arg in args {
        calldata.extend_from_slice(&arg.to_be_bytes::<32>());
    }
    calldata
}

fn word(address: Address) -> U256 {
    U256::from_be_bytes(address.into_word().0)
}

fn read_word(data: &[u8], offset: usize) -> Option<U256> {
    data.get(offset..offset.checked_add(32)?).map(U256::from_be_slice)
}

fn decode_bool(data: &[u8]) -> Option<ReturnValue> {
    match read_word(data, 0)? {
        w if w == U256::from(1u64) => Some(ReturnValue::Bool(true)),
        w if w.is_zero() => Some(ReturnValue::Bool(false)),
        _ => None,
    }
}

fn decode_uint(data: &[u8]) -> Option<ReturnValue> {
    read_word(data, 0).map(ReturnValue::Uint)
}

fn decode_decimals(data: &[u8]) -> Option<ReturnValue> {
    u8::try_from(read_word(data, 0)?).ok().map(ReturnValue::Decimals)
}

fn decode_hash(data: &[u8]) -> Option<ReturnValue> {
    read_word(data, 0).map(|w| ReturnValue::Hash(B256::from(w)))
}

fn decode_string(data: &[u8]) -> Option<ReturnValue> {
    let offset = usize::try_from(read_word(data, 0)?).ok()?;
    let len = usize::try_from(read_word(data, offset)?).ok()?;
    let start = offset.checked_add(32)?;
    let bytes = data.get(start..start.checked_add(len)?)?;
    String::from_utf8(bytes.to_vec()).ok().map(ReturnValue::Text)
}

const fn nothing(_: &[u8]) -> Option<ReturnValue> {
    None
}

impl TokenAdapter for SlotAdapter {
    fn id(&self) -> &str {
        &self.id
    }

    fn address(&self) -> Address {
        self.token.address()
    }

    fn transfer(&mut self, ctx: &CallContext, to: Address, amount: U256) -> CallOutcome {
        self.call(ctx, Function::Transfer, &[word(to), amount], decode_bool)
    }

    fn approve(&mut self, ctx: &CallContext, spender: Address, amount: U256) -> CallOutcome {
        self.call(ctx, Function::Approve, &[word(spender), amount], decode_bool)
    }

    fn transfer_from(
        &mut self,
        ctx: &CallContext,
        from: Address,
        to: Address,
        amount: U256,
    ) -> CallOutcome {
        self.call(ctx, Function::TransferFrom, &[word(from), word(to), amount], decode_bool)
    }

    fn permit(&mut self, ctx: &CallContext, permit: &PermitCall) -> CallOutcome {
        let sig = &permit.signature;
        let args = [
            word(permit.owner),
            word(permit.spender),
            permit.value,
            permit.deadline,
            U256::from(sig.v),
            U256::from_be_bytes(sig.r.0),
            U256::from_be_bytes(sig.s.0),
        ];
        self.call(ctx, Function::Permit, &args, nothing)
    }

    fn mint(&mut self, ctx: &CallContext, to: Address, amount: U256) -> CallOutcome {
        self.call(ctx, Function::Mint, &[word(to), amount], nothing)
    }

    fn burn(&mut self, ctx: &CallContext, amount: U256) -> CallOutcome {
        self.call(ctx, Function::Burn, &[amount], nothing)
    }

    fn balance_of(&mut self, ctx: &CallContext, account: Address) -> CallOutcome {
        self.call(ctx, Function::BalanceOf, &[word(account)], decode_uint)
    }

    fn allowance(&mut self, ctx: &CallContext, owner: Address, spender: Address) -> CallOutcome {
        self.call(ctx, Function::Allowance, &[word(owner), word(spender)], decode_uint)
    }

    fn total_supply(&mut self, ctx: &CallContext) -> CallOutcome {
        self.call(ctx, Function::TotalSupply, &[], decode_uint)
    }

    fn name(&mut self, ctx: &CallContext) -> CallOutcome {
        self.call(ctx, Function::Name, &[], decode_string)
    }

    fn symbol(&mut self, ctx: &CallContext) -> CallOutcome {
        self.call(ctx, Function::Symbol, &[], decode_string)
    }

    fn decimals(&mut self, ctx: &CallContext) -> CallOutcome {
        self.call(ctx, Function::Decimals, &[], decode_decimals)
    }

    fn domain_separator(&mut self, ctx: &CallContext) -> CallOutcome {
        self.call(ctx, Function::DomainSeparator, &[], decode_hash)
    }

    fn nonces(&mut self, ctx: &CallContext, owner: Address) -> CallOutcome {
        self.call(ctx, Function::Nonces, &[word(owner)], decode_uint)
    }
}

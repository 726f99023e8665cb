//! Hand-assembled token over raw word storage.
//!
//! The token is driven by ABI calldata. It answers with ABI return data, reverts with a bare
//! four-byte error selector, and emits raw logs. An unknown selector or short calldata reverts
//! with empty data.

use std::collections::HashMap;

use alloy_primitives::{Address, B256, Bytes, Log, U256};

use crate::{Env, Journaled, ecrecover};

pub mod layout;
use layout::{
    APPROVAL_EVENT, EXPIRED, Function, INSUFFICIENT_ALLOWANCE, INSUFFICIENT_BALANCE,
    INVALID_SIGNATURE, OVERFLOW, OWNER_SLOT, TOTAL_SUPPLY_SLOT, TRANSFER_EVENT, UNAUTHORIZED,
    ZERO_ADDRESS, allowance_slot, balance_slot, keccak, nonce_slot, selector,
};

mod memory;
use memory::Memory;

type Storage = HashMap<U256, U256>;

#[derive(Clone, Debug)]
struct Code {
    this: Address,
    name: String,
    symbol: String,
}

/// The slot-level ERC-20 + ERC-2612 token.
#[derive(Clone, Debug)]
pub struct SlotToken {
    code: Code,
    dispatch: HashMap<[u8; 4], Function>,
    journal: Journaled<Storage, Log>,
}

impl SlotToken {
    /// Deploy at `this`, storing `env.caller` as owner and crediting it `initial_supply`.
    pub fn deploy(
        this: Address,
        env: &Env,
        name: impl Into<String>,
        symbol: impl Into<String>,
        initial_supply: U256,
    ) -> Self {
        let mut storage = Storage::new();
        storage.insert(OWNER_SLOT, U256::from_be_bytes(env.caller.into_word().0));
        storage.insert(TOTAL_SUPPLY_SLOT, initial_supply);
        storage.insert(balance_slot(env.caller), initial_supply);
        let dispatch = Function::ALL.into_iter().map(|f| (f.selector(), f)).collect();
        Self {
            code: Code { this, name: name.into(), symbol: symbol.into() },
            dispatch,
            journal: Journaled::new(storage),
        }
    }

    /// Deployed address.
    pub const fn address(&self) -> Address {
        self.code.this
    }

    /// Raw storage word at `slot`.
    pub fn storage_at(&self, slot: U256) -> U256 {
        self.journal.state().get(&slot).copied().unwrap_or_default()
    }

    /// Execute `calldata`, returning the return data or the revert data.
    pub fn call(&mut self, env: &Env, calldata: &[u8]) -> Result<Bytes, Bytes> {
        let Some(function) = calldata.get(..4).and_then(|s| self.dispatch.get(s)).copied() else {
            return Err(Bytes::new());
        };
        let args = &calldata[4..];
        if args.len() < function.arity() * 32 {
            return Err(Bytes::new());
        }
        let words: Vec<U256> =
            args.chunks_exact(32).take(function.arity()).map(U256::from_be_slice).collect();

        let code = &self.code;
        self.journal.transact(|storage, logs| {
            let mut frame = Frame { code, env, storage, logs, memory: Memory::default() };
            frame.execute(function, &words)
        })
    }

    /// Take the logs emitted since the last call.
    pub fn take_logs(&mut self) -> Vec<Log> {
        self.journal.drain_logs()
    }
}

struct Frame<'a> {
    code: &'a Code,
    env: &'a Env,
    storage: &'a mut Storage,
    logs: &'a mut Vec<Log>,
    memory: Memory,
}

impl Frame<'_> {
    fn execute(&mut self, function: Function, args: &[U256]) -> Result<Bytes, Bytes> {
        let caller = self.env.caller;
        match function {
            Function::Transfer => {
                let to = address(args[0])?;
                if to.is_zero() {
                    return Err(revert(ZERO_ADDRESS));
                }
                self.move_balance(caller, to, args[1])?;
                Ok(self.return_word(U256::from(1u64)))
            }
            Function::Approve => {
                let spender = address(args[0])?;
                self.sstore(allowance_slot(caller, spender), args[1]);
                self.log(APPROVAL_EVENT, caller, spender, args[1]);
                Ok(self.return_word(U256::from(1u64)))
            }
            Function::TransferFrom => {
                let (from, to, amount) = (address(args[0])?, address(args[1])?, args[2]);
                let slot = allowance_slot(from, caller);
                let allowed = self.sload(slot);
                if allowed < amount {
                    return Err(revert(INSUFFICIENT_ALLOWANCE));
                }
                if to.is_zero() {
                    return Err(revert(ZERO_ADDRESS));
                }
                if allowed != U256::MAX {
                    self.sstore(slot, allowed - amount);
                }
                self.move_balance(from, to, amount)?;
                Ok(self.return_word(U256::from(1u64)))
            }
            Function::Permit => {
                let (owner, spender) = (address(args[0])?, address(args[1])?);
                self.permit(owner, spender, args[2], args[3], args[4], args[5], args[6])?;
                Ok(Bytes::new())
            }
            Function::Mint => {
                let to = address(args[0])?;
                let amount = args[1];
                if U256::from_be_bytes(caller.into_word().0) != self.sload(OWNER_SLOT) {
                    return Err(revert(UNAUTHORIZED));
                }
                if to.is_zero() {
                    return Err(revert(ZERO_ADDRESS));
                }
                let supply =
                    self.sload(TOTAL_SUPPLY_SLOT).checked_add(amount).ok_or_else(|| revert(OVERFLOW))?;
                self.sstore(TOTAL_SUPPLY_SLOT, supply);
                let balance = self.sload(balance_slot(to));
                self.sstore(balance_slot(to), balance + amount);
                self.log(TRANSFER_EVENT, Address::ZERO, to, amount);
                Ok(Bytes::new())
            }
            Function::Burn => {
                let amount = args[0];
                let balance = self.sload(balance_slot(caller));
                if balance < amount {
                    return Err(revert(INSUFFICIENT_BALANCE));
                }
                self.sstore(balance_slot(caller), balance - amount);
                let supply = self.sload(TOTAL_SUPPLY_SLOT);
                self.sstore(TOTAL_SUPPLY_SLOT, supply - amount);
                self.log(TRANSFER_EVENT, caller, Address::ZERO, amount);
                Ok(Bytes::new())
            }
            Function::BalanceOf => {
                let account = address(args[0])?;
                Ok(self.return_word(self.sload(balance_slot(account))))
            }
            Function::Allowance => {
                let (owner, spender) = (address(args[0])?, address(args[1])?);
                Ok(self.return_word(self.sload(allowance_slot(owner, spender))))
            }
            Function::TotalSupply => Ok(self.return_word(self.sload(TOTAL_SUPPLY_SLOT))),
            Function::Name => {
                let code = self.code;
                Ok(self.return_string(code.name.as_bytes()))
            }
            Function::Symbol => {
                let code = self.code;
                Ok(self.return_string(code.symbol.as_bytes()))
            }
            Function::Decimals => Ok(self.return_word(U256::from(18u64))),
            Function::DomainSeparator => {
                let separator = self.domain_separator();
                Ok(self.return_word(U256::from_be_bytes(separator.0)))
            }
            Function::Nonces => {
                let owner = address(args[0])?;
                Ok(self.return_word(self.sload(nonce_slot(owner))))
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn permit(
        &mut self,
        owner: Address,
        spender: Address,
        value: U256,
        deadline: U256,
        v: U256,
        r: U256,
        s: U256,
    ) -> Result<(), Bytes> {
        if U256::from(self.env.timestamp) > deadline {
            return Err(revert(EXPIRED));
        }
        let nonce = self.sload(nonce_slot(owner));
        let separator = self.domain_separator();

        let typehash = keccak(
            b"Permit(address owner,address spender,uint256 value,uint256 nonce,uint256 deadline)",
        );
        self.memory.mstore(0x00, U256::from_be_bytes(typehash.0));
        self.memory.mstore(0x20, word(owner));
        self.memory.mstore(0x40, word(spender));
        self.memory.mstore(0x60, value);
        self.memory.mstore(0x80, nonce);
        self.memory.mstore(0xa0, deadline);
        let struct_hash = self.memory.keccak(0x00, 0xc0);

        self.memory.mstore_bytes(0x00, &[0x19, 0x01]);
        self.memory.mstore_bytes(0x02, separator.as_slice());
        self.memory.mstore_bytes(0x22, struct_hash.as_slice());
        let digest = self.memory.keccak(0x00, 0x42);

        // A `v` that does not fit a byte can never recover.
        let v = u8::try_from(v).unwrap_or_default();
        let recovered = ecrecover(digest, v, B256::from(r), B256::from(s));
        if recovered.is_zero() || recovered != owner {
            return Err(revert(INVALID_SIGNATURE));
        }

        self.sstore(nonce_slot(owner), nonce + U256::from(1u64));
        self.sstore(allowance_slot(owner, spender), value);
        self.log(APPROVAL_EVENT, owner, spender, value);
        Ok(())
    }

    fn domain_separator(&mut self) -> B256 {
        let typehash = keccak(
            b"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)",
        );
        self.memory.mstore(0x00, U256::from_be_bytes(typehash.0));
        self.memory.mstore(0x20, U256::from_be_bytes(keccak(self.code.name.as_bytes()).0));
        self.memory.mstore(0x40, U256::from_be_bytes(keccak(b"1").0));
        self.memory.mstore(0x60, U256::from(self.env.chain_id));
        self.memory.mstore(0x80, word(self.code.this));
        self.memory.keccak(0x00, 0xa0)
    }

    fn move_balance(&mut self, from: Address, to: Address, amount: U256) -> Result<(), Bytes> {
        let from_balance = self.sload(balance_slot(from));
        if from_balance < amount {
            return Err(revert(INSUFFICIENT_BALANCE));
        }
        self.sstore(balance_slot(from), from_balance - amount);
        let to_balance = self.sload(balance_slot(to));
        self.sstore(balance_slot(to), to_balance.wrapping_add(amount));
        self.log(TRANSFER_EVENT, from, to, amount);
        Ok(())
    }

    fn sload(&self, slot: U256) -> U256 {
        self.storage.get(&slot).copied().unwrap_or_default()
    }

    fn sstore(&mut self, slot: U256, value: U256) {
        if value.is_zero() {
            self.storage.remove(&slot);
        } else {
            self.storage.insert(slot, value);
        }
    }

    fn log(&mut self, event: &str, first: Address, second: Address, amount: U256) {
        let topics = vec![keccak(event.as_bytes()), first.into_word(), second.into_word()];
        let data = Bytes::copy_from_slice(&amount.to_be_bytes::<32>());
        self.logs.push(Log::new_unchecked(self.code.this, topics, data));
    }

    fn return_word(&mut self, value: U256) -> Bytes {
        self.memory.mstore(0x00, value);
        self.memory.output(0x00, 0x20)
    }

    fn return_string(&mut self, bytes: &[u8]) -> Bytes {
        self.memory.mstore(0x00, U256::from(0x20u64));
        self.memory.mstore(0x20, U256::from(bytes.len()));
        self.memory.mstore_bytes(0x40, bytes);
        self.memory.output(0x00, 0x40 + bytes.len().div_ceil(32) * 32)
    }
}

fn revert(error: &str) -> Bytes {
    Bytes::copy_from_slice(&selector(error))
}

fn word(address: Address) -> U256 {
    U256::from_be_bytes(address.into_word().0)
}

// Dirty upper bits in an address argument fail ABI validation.
fn address(word: U256) -> Result<Address, Bytes> {
    if word >> 160 != U256::ZERO {
        return Err(Bytes::new());
    }
    Ok(Address::from_word(B256::from(word)))
}

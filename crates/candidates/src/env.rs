//! Execution environment shared by all candidates.

use alloy_primitives::Address;

/// Transaction and block context of one call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Env {
    /// `msg.sender`.
    pub caller: Address,
    /// `block.timestamp`.
    pub timestamp: u64,
    /// `block.chainid`.
    pub chain_id: u64,
}

impl Env {
    /// Create a new environment.
    pub const fn new(caller: Address, timestamp: u64, chain_id: u64) -> Self {
        Self { caller, timestamp, chain_id }
    }
}

/// Candidate state with revert semantics.
///
/// A call runs against a scratch copy of the state and a fresh log buffer. Both are
/// committed only if the call returns `Ok`.
#[derive(Clone, Debug)]
pub(crate) struct Journaled<S, L> {
    state: S,
    logs: Vec<L>,
}

impl<S: Clone, L> Journaled<S, L> {
    pub(crate) const fn new(state: S) -> Self {
        Self { state, logs: Vec::new() }
    }

    pub(crate) const fn state(&self) -> &S {
        &self.state
    }

    pub(crate) fn transact<T, E>(
        &mut self,
        f: impl FnOnce(&mut S, &mut Vec<L>) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut scratch = self.state.clone();
        let mut logs = Vec::new();
        let value = f(&mut scratch, &mut logs)?;
        self.state = scratch;
        self.logs.extend(logs);
        Ok(value)
    }

    pub(crate) fn drain_logs(&mut self) -> Vec<L> {
        std::mem::take(&mut self.logs)
    }
}

//! Byte-addressed scratch memory of a single call.

use alloy_primitives::{B256, Bytes, U256};

use super::layout::keccak;

/// Zero-initialised memory that grows in 32-byte words on access.
#[derive(Clone, Debug, Default)]
pub(crate) struct Memory {
    data: Vec<u8>,
}

impl Memory {
    fn expand(&mut self, end: usize) {
        if end > self.data.len() {
            self.data.resize(end.div_ceil(32) * 32, 0);
        }
    }

    /// Store a word at `offset`.
    pub(crate) fn mstore(&mut self, offset: usize, word: U256) {
        self.mstore_bytes(offset, &word.to_be_bytes::<32>());
    }

    /// Store raw bytes at `offset`.
    pub(crate) fn mstore_bytes(&mut self, offset: usize, bytes: &[u8]) {
        self.expand(offset + bytes.len());
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    /// Keccak-256 over `len` bytes from `offset`.
    pub(crate) fn keccak(&mut self, offset: usize, len: usize) -> B256 {
        self.expand(offset + len);
        keccak(&self.data[offset..offset + len])
    }

    /// Copy `len` bytes from `offset` out as return data.
    pub(crate) fn output(&mut self, offset: usize, len: usize) -> Bytes {
        self.expand(offset + len);
        Bytes::copy_from_slice(&self.data[offset..offset + len])
    }
}

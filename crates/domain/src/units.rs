//! Token unit helpers.

use alloy_primitives::U256;

/// Decimals every conforming ledger reports.
pub const DECIMALS: u8 = 18;

/// One whole token expressed in base units (`10^18`).
pub const ONE_TOKEN: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Convert a whole-token count into base units.
pub fn tokens(count: u64) -> U256 {
    U256::from(count) * ONE_TOKEN
}

//! Token amount scaling helpers.

use alloy_core::primitives::{U256, utils::format_units};
use anyhow::{Context, Result};

/// Number of decimals used by every token deployed by this crate.
pub const TOKEN_DECIMALS: u8 = 18;

/// Scale a whole-token quantity into its on-chain integer representation.
///
/// `scale(42069, 18)` is `42069 * 10^18`. Fails when the result does not fit
/// in 256 bits.
pub fn scale(amount: u128, decimals: u8) -> Result<U256> {
    U256::from(10u64)
        .checked_pow(U256::from(decimals))
        .and_then(|factor| U256::from(amount).checked_mul(factor))
        .with_context(|| format!("{} * 10^{} overflows a uint256", amount, decimals))
}

/// Scale a whole-token quantity using [`TOKEN_DECIMALS`].
pub fn tokens(amount: u128) -> U256 {
    // u128::MAX * 10^18 is below 2^256.
    U256::from(amount) * U256::from(10u64).pow(U256::from(TOKEN_DECIMALS))
}

/// Render an on-chain amount in token units for log lines.
pub fn format_token(amount: U256) -> String {
    format_units(amount, TOKEN_DECIMALS).unwrap_or_else(|_| amount.to_string())
}

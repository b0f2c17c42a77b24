//! Gas-to-fee arithmetic.
//!
//! Simulated gas is padded by the configured adjustment, capped at the
//! chain's maximum, and multiplied by the gas price with exact rational
//! arithmetic so the fee is never rounded down.

use num_bigint::BigInt;
use num_rational::BigRational;
use tracing::warn;

use crate::coin::Coin;
use crate::config::{GasConfig, GasPrice};
use crate::tx::fee::Fee;

/// `ceil(amount * factor)` computed exactly.
///
/// `factor` must be finite; gas prices come from configuration, whose
/// parser rejects non-finite values before they reach this point.
pub fn mul_ceil(amount: u64, factor: f64) -> BigInt {
    let factor = BigRational::from_float(factor).expect("factor is finite");
    (factor * BigInt::from(amount)).ceil().to_integer()
}

/// Pads a simulated gas amount by the configured adjustment and caps the
/// result at `max_gas`.
pub fn adjust_gas(config: &GasConfig, gas_amount: u64) -> u64 {
    if gas_amount == 0 {
        return 0;
    }

    let adjusted = mul_ceil(gas_amount, 1.0 + config.gas_adjustment);

    // A result wider than u64 can only come from a pathological
    // adjustment; saturate and let the max_gas cap take over.
    let (_, digits) = adjusted.to_u64_digits();
    let adjusted = match digits.as_slice() {
        [] => 0,
        [value] => *value,
        _ => u64::MAX,
    };

    if adjusted > config.max_gas {
        warn!(
            gas_amount,
            adjusted, max_gas = config.max_gas, "adjusted gas exceeds the configured maximum"
        );
    }

    adjusted.min(config.max_gas)
}

/// Fee amount for an already-adjusted gas limit: `ceil(gas * price)` in
/// the price's denomination.
pub fn calculate_fee(adjusted_gas: u64, gas_price: &GasPrice) -> Coin {
    let amount = mul_ceil(adjusted_gas, gas_price.price);
    let amount = u128::try_from(amount).unwrap_or(u128::MAX);

    Coin::new(gas_price.denom.clone(), amount)
}

/// The full simulated-gas-to-fee pipeline: adjust, cap, price.
pub fn gas_amount_to_fee(config: &GasConfig, gas_amount: u64) -> Fee {
    let adjusted_gas = adjust_gas(config, gas_amount);
    let amount = calculate_fee(adjusted_gas, &config.gas_price);

    Fee::new(adjusted_gas, vec![amount])
}

//! Per-chain client configuration.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

pub const DEFAULT_GAS_LIMIT: u64 = 200_000;
pub const DEFAULT_MAX_GAS: u64 = 400_000;
pub const DEFAULT_GAS_ADJUSTMENT: f64 = 0.1;

/// Price of one unit of gas in a given denomination, e.g. `0.025uluna`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GasPrice {
    pub price: f64,
    pub denom: String,
}

impl GasPrice {
    pub fn new(price: f64, denom: impl Into<String>) -> Self {
        Self {
            price,
            denom: denom.into(),
        }
    }
}

impl fmt::Display for GasPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.price, self.denom)
    }
}

impl FromStr for GasPrice {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = s
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .ok_or_else(|| Error::invalid_coin(s.to_string()))?;

        let (price, denom) = s.split_at(split);
        if denom.is_empty() {
            return Err(Error::invalid_coin(s.to_string()));
        }

        let price = price
            .parse::<f64>()
            .map_err(|_| Error::invalid_coin(s.to_string()))?;

        // A long enough digit string parses to infinity rather than
        // failing; infinite prices cannot be priced into a fee.
        if !price.is_finite() {
            return Err(Error::invalid_coin(s.to_string()));
        }

        Ok(Self::new(price, denom))
    }
}

/// Chain-level settings the signing flow needs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub chain_id: String,
    /// Bech32 human-readable prefix for account addresses.
    pub account_prefix: String,
    pub gas_price: GasPrice,
    /// Safety margin applied on top of simulated gas, as a fraction
    /// (0.1 adds 10%).
    #[serde(default = "default_gas_adjustment")]
    pub gas_adjustment: f64,
    #[serde(default = "default_max_gas")]
    pub max_gas: u64,
    #[serde(default)]
    pub memo: String,
}

fn default_gas_adjustment() -> f64 {
    DEFAULT_GAS_ADJUSTMENT
}

fn default_max_gas() -> u64 {
    DEFAULT_MAX_GAS
}

impl ChainConfig {
    pub fn new(chain_id: impl Into<String>, account_prefix: impl Into<String>, gas_price: GasPrice) -> Self {
        Self {
            chain_id: chain_id.into(),
            account_prefix: account_prefix.into(),
            gas_price,
            gas_adjustment: DEFAULT_GAS_ADJUSTMENT,
            max_gas: DEFAULT_MAX_GAS,
            memo: String::new(),
        }
    }
}

/// The gas knobs extracted from a [`ChainConfig`].
#[derive(Clone, Debug, PartialEq)]
pub struct GasConfig {
    pub default_gas: u64,
    pub max_gas: u64,
    pub gas_adjustment: f64,
    pub gas_price: GasPrice,
}

impl From<&ChainConfig> for GasConfig {
    fn from(config: &ChainConfig) -> Self {
        Self {
            default_gas: DEFAULT_GAS_LIMIT,
            max_gas: config.max_gas,
            gas_adjustment: config.gas_adjustment,
            gas_price: config.gas_price.clone(),
        }
    }
}

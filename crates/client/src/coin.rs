//! Coin amounts: a denomination plus a non-negative integer amount.
//!
//! Wire forms carry amounts as decimal strings (`"100"`), the text form is
//! `100uluna`.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use cosmos_client_proto::cosmos::base::v1beta1 as proto_base;

use crate::error::Error;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    #[serde(with = "string_amount")]
    pub amount: u128,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }

    pub fn to_proto(&self) -> proto_base::Coin {
        proto_base::Coin {
            denom: self.denom.clone(),
            amount: self.amount.to_string(),
        }
    }

    pub fn from_proto(proto: &proto_base::Coin) -> Result<Self, Error> {
        let amount = proto
            .amount
            .parse::<u128>()
            .map_err(|_| Error::invalid_coin(format!("{}{}", proto.amount, proto.denom)))?;

        Ok(Self {
            denom: proto.denom.clone(),
            amount,
        })
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

impl FromStr for Coin {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = s
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| Error::invalid_coin(s.to_string()))?;

        let (amount, denom) = s.split_at(split);
        if amount.is_empty() || denom.is_empty() {
            return Err(Error::invalid_coin(s.to_string()));
        }

        let amount = amount
            .parse::<u128>()
            .map_err(|_| Error::invalid_coin(s.to_string()))?;

        Ok(Self {
            denom: denom.to_string(),
            amount,
        })
    }
}

/// Merges duplicate denominations by summation and sorts by denom, the
/// canonical order fee amounts are carried in.
pub fn merge_coins(coins: &[Coin]) -> Vec<Coin> {
    let mut merged: Vec<Coin> = Vec::new();

    for coin in coins {
        match merged.iter_mut().find(|c| c.denom == coin.denom) {
            Some(existing) => existing.amount += coin.amount,
            None => merged.push(coin.clone()),
        }
    }

    merged.sort_by(|a, b| a.denom.cmp(&b.denom));
    merged
}

mod string_amount {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(amount: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&amount.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<u128>().map_err(serde::de::Error::custom)
    }
}

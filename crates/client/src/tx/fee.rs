//! Transaction fees: coin amounts against a gas limit.

use core::str::FromStr;

use prost::Message;
use serde_json::{json, Value};

use cosmos_client_proto::cosmos::tx::v1beta1 as proto_tx;

use crate::address::AccAddress;
use crate::coin::{merge_coins, Coin};
use crate::config::GasPrice;
use crate::error::Error;

#[derive(Clone, Debug, PartialEq)]
pub struct Fee {
    /// Fee amounts, duplicate denominations merged, sorted by denom.
    pub amount: Vec<Coin>,
    pub gas_limit: u64,
    pub payer: Option<AccAddress>,
    pub granter: Option<AccAddress>,
}

impl Fee {
    pub fn new(gas_limit: u64, amount: Vec<Coin>) -> Self {
        Self {
            amount: merge_coins(&amount),
            gas_limit,
            payer: None,
            granter: None,
        }
    }

    /// Effective gas price per denomination: `amount / gas_limit`.
    pub fn gas_prices(&self) -> Result<Vec<GasPrice>, Error> {
        if self.gas_limit == 0 {
            return Err(Error::zero_gas_limit());
        }

        Ok(self
            .amount
            .iter()
            .map(|coin| GasPrice::new(coin.amount as f64 / self.gas_limit as f64, &coin.denom))
            .collect())
    }

    pub fn to_proto(&self) -> proto_tx::Fee {
        proto_tx::Fee {
            amount: self.amount.iter().map(Coin::to_proto).collect(),
            gas_limit: self.gas_limit,
            payer: self
                .payer
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            granter: self
                .granter
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
        }
    }

    pub fn from_proto(proto: &proto_tx::Fee) -> Result<Self, Error> {
        let amount = proto
            .amount
            .iter()
            .map(Coin::from_proto)
            .collect::<Result<Vec<_>, _>>()?;

        let payer = match proto.payer.as_str() {
            "" => None,
            payer => Some(AccAddress::from_str(payer)?),
        };
        let granter = match proto.granter.as_str() {
            "" => None,
            granter => Some(AccAddress::from_str(granter)?),
        };

        Ok(Self {
            amount: merge_coins(&amount),
            gas_limit: proto.gas_limit,
            payer,
            granter,
        })
    }

    /// Serialized protobuf bytes of the fee alone.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_proto().encode_to_vec()
    }

    /// Legacy amino JSON shape: `gas` (not `gas_limit`), decimal strings.
    pub fn to_amino(&self) -> Value {
        json!({
            "amount": self.amount,
            "gas": self.gas_limit.to_string(),
        })
    }

    pub fn to_data(&self) -> Value {
        json!({
            "amount": self.amount,
            "gas_limit": self.gas_limit.to_string(),
            "payer": self.payer.as_ref().map(ToString::to_string).unwrap_or_default(),
            "granter": self.granter.as_ref().map(ToString::to_string).unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_denoms_are_merged() {
        let fee = Fee::new(
            200_000,
            vec![Coin::new("uluna", 60), Coin::new("uluna", 40)],
        );

        assert_eq!(fee.amount, vec![Coin::new("uluna", 100)]);
    }

    #[test]
    fn gas_prices_divide_by_gas_limit() {
        let fee = Fee::new(200_000, vec![Coin::new("uluna", 100_000)]);
        let prices = fee.gas_prices().unwrap();

        assert_eq!(prices.len(), 1);
        assert_eq!(prices[0].denom, "uluna");
        assert!((prices[0].price - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_gas_limit_is_an_error() {
        let fee = Fee::new(0, vec![Coin::new("uluna", 1)]);
        assert!(fee.gas_prices().is_err());
    }

    #[test]
    fn proto_round_trip() {
        let fee = Fee::new(150_000, vec![Coin::new("uatom", 5), Coin::new("uluna", 7)]);
        assert_eq!(Fee::from_proto(&fee.to_proto()).unwrap(), fee);
    }

    #[test]
    fn amino_form_uses_gas_key_and_string_integers() {
        let fee = Fee::new(200_000, vec![Coin::new("uluna", 100)]);
        let amino = fee.to_amino();

        assert_eq!(
            amino,
            json!({
                "amount": [{ "amount": "100", "denom": "uluna" }],
                "gas": "200000",
            })
        );
    }
}

//! The body of a transaction: the ordered message list, memo and timeout.

use prost::Message;
use serde_json::{json, Value};

use cosmos_client_proto::cosmos::tx::v1beta1 as proto_tx;
use cosmos_client_proto::Any;

use crate::error::Error;
use crate::keys::{decode_base64, encode_base64};

/// Message payloads are opaque to the codec; their order is part of the
/// signed content and is preserved across all three encodings.
#[derive(Clone, Debug, PartialEq)]
pub struct TxBody {
    pub messages: Vec<Any>,
    pub memo: String,
    pub timeout_height: Option<u64>,
}

impl TxBody {
    pub fn new(messages: Vec<Any>, memo: impl Into<String>, timeout_height: Option<u64>) -> Self {
        Self {
            messages,
            memo: memo.into(),
            timeout_height,
        }
    }

    pub fn to_proto(&self) -> proto_tx::TxBody {
        proto_tx::TxBody {
            messages: self.messages.clone(),
            memo: self.memo.clone(),
            timeout_height: self.timeout_height.unwrap_or(0),
            extension_options: Vec::new(),
            non_critical_extension_options: Vec::new(),
        }
    }

    pub fn from_proto(proto: &proto_tx::TxBody) -> Self {
        Self {
            messages: proto.messages.clone(),
            memo: proto.memo.clone(),
            timeout_height: (proto.timeout_height != 0).then_some(proto.timeout_height),
        }
    }

    /// Serialized protobuf bytes, the `body_bytes` of `SignDoc` and `TxRaw`.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.to_proto().encode_to_vec()
    }

    pub fn to_data(&self) -> Value {
        json!({
            "messages": self.messages.iter().map(any_to_data).collect::<Vec<_>>(),
            "memo": self.memo,
            "timeout_height": self.timeout_height.unwrap_or(0).to_string(),
        })
    }

    pub fn from_data(data: &Value) -> Result<Self, Error> {
        let messages = data
            .get("messages")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                Error::malformed_data("TxBody".to_string(), "missing messages".to_string())
            })?
            .iter()
            .map(any_from_data)
            .collect::<Result<Vec<_>, _>>()?;

        let memo = data
            .get("memo")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let timeout_height = match data.get("timeout_height").and_then(Value::as_str) {
            Some(height) => {
                let height = height.parse::<u64>().map_err(|_| {
                    Error::malformed_data(
                        "TxBody".to_string(),
                        "timeout_height is not an integer".to_string(),
                    )
                })?;
                (height != 0).then_some(height)
            }
            None => None,
        };

        Ok(Self {
            messages,
            memo,
            timeout_height,
        })
    }
}

/// Data JSON rendering of an opaque payload. Typed rendering of the inner
/// fields belongs to the module that owns the message type; the codec only
/// guarantees the bytes and their order.
pub(crate) fn any_to_data(any: &Any) -> Value {
    json!({
        "@type": any.type_url,
        "value": encode_base64(&any.value),
    })
}

pub(crate) fn any_from_data(data: &Value) -> Result<Any, Error> {
    let type_url = data
        .get("@type")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::malformed_data("Any".to_string(), "missing @type".to_string()))?
        .to_string();

    let value = data
        .get("value")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::malformed_data("Any".to_string(), "missing value".to_string()))?;

    Ok(Any {
        type_url,
        value: decode_base64(value)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_msg(tag: u8) -> Any {
        Any {
            type_url: "/cosmos.bank.v1beta1.MsgSend".to_string(),
            value: vec![tag, 1, 2, 3],
        }
    }

    #[test]
    fn proto_round_trip_preserves_message_order() {
        let body = TxBody::new(vec![test_msg(9), test_msg(1), test_msg(5)], "memo", Some(100));
        let round_tripped = TxBody::from_proto(&body.to_proto());

        assert_eq!(round_tripped, body);
        let tags: Vec<u8> = round_tripped.messages.iter().map(|m| m.value[0]).collect();
        assert_eq!(tags, vec![9, 1, 5]);
    }

    #[test]
    fn zero_timeout_height_is_absent() {
        let body = TxBody::new(vec![test_msg(0)], "", None);
        let proto = body.to_proto();

        assert_eq!(proto.timeout_height, 0);
        assert_eq!(TxBody::from_proto(&proto).timeout_height, None);
    }

    #[test]
    fn data_round_trip() {
        let body = TxBody::new(vec![test_msg(7)], "hello", Some(42));
        let data = body.to_data();

        assert_eq!(data["timeout_height"], "42");
        assert_eq!(TxBody::from_data(&data).unwrap(), body);
    }
}

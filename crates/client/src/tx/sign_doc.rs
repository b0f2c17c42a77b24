//! The canonical payloads a signer commits to.
//!
//! Direct mode signs the protobuf `SignDoc`; legacy amino mode signs a
//! canonical JSON rendering with sorted keys, no insignificant whitespace
//! and string-encoded integers.

use prost::Message;
use serde_json::{json, Map, Value};

use cosmos_client_proto::cosmos::tx::v1beta1 as proto_tx;
use cosmos_client_proto::Any;

use crate::error::Error;
use crate::keys::encode_base64;
use crate::tx::auth_info::AuthInfo;
use crate::tx::body::TxBody;
use crate::tx::SignMode;

#[derive(Clone, Debug, PartialEq)]
pub struct SignDoc {
    pub chain_id: String,
    pub account_number: u64,
    /// Only part of the signed payload in legacy amino mode; direct mode
    /// carries the sequence inside `auth_info` instead.
    pub sequence: u64,
    pub auth_info: AuthInfo,
    pub body: TxBody,
}

impl SignDoc {
    pub fn new(
        chain_id: impl Into<String>,
        account_number: u64,
        sequence: u64,
        auth_info: AuthInfo,
        body: TxBody,
    ) -> Self {
        Self {
            chain_id: chain_id.into(),
            account_number,
            sequence,
            auth_info,
            body,
        }
    }

    /// Direct-mode sign bytes: the serialized protobuf `SignDoc`.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        if self.chain_id.is_empty() {
            return Err(Error::invalid_sign_doc("empty chain id".to_string()));
        }

        let sign_doc = proto_tx::SignDoc {
            body_bytes: self.body.to_bytes(),
            auth_info_bytes: self.auth_info.to_bytes()?,
            chain_id: self.chain_id.clone(),
            account_number: self.account_number,
        };

        Ok(sign_doc.encode_to_vec())
    }

    /// Legacy-amino-mode sign bytes: the canonical JSON document.
    ///
    /// Two signers producing this document independently must get
    /// byte-identical output, so keys are sorted, whitespace is omitted
    /// and null values are stripped before rendering.
    pub fn to_amino_json(&self) -> Result<String, Error> {
        if self.chain_id.is_empty() {
            return Err(Error::invalid_sign_doc("empty chain id".to_string()));
        }

        let mut doc = json!({
            "account_number": self.account_number.to_string(),
            "chain_id": self.chain_id,
            "fee": self.auth_info.fee.to_amino(),
            "memo": self.body.memo,
            "msgs": self
                .body
                .messages
                .iter()
                .map(any_to_amino)
                .collect::<Vec<_>>(),
            "sequence": self.sequence.to_string(),
        });

        if let Some(height) = self.body.timeout_height {
            doc["timeout_height"] = Value::String(height.to_string());
        }

        Ok(strip_nulls(doc).to_string())
    }

    pub fn sign_bytes(&self, mode: SignMode) -> Result<Vec<u8>, Error> {
        match mode {
            SignMode::Direct => self.to_bytes(),
            SignMode::LegacyAminoJson => Ok(self.to_amino_json()?.into_bytes()),
        }
    }
}

/// Amino rendering of an opaque payload: the type URL tagged `type`, the
/// raw bytes base64 under `value`. Modules owning a message type render
/// its fields themselves; the codec does not look inside.
fn any_to_amino(any: &Any) -> Value {
    json!({
        "type": any.type_url,
        "value": encode_base64(&any.value),
    })
}

/// Removes null members recursively so that an absent field and a field
/// explicitly set to null render identically.
fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect::<Map<_, _>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_nulls).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coin::Coin;
    use crate::tx::fee::Fee;

    fn test_doc() -> SignDoc {
        let body = TxBody::new(
            vec![Any {
                type_url: "/cosmos.bank.v1beta1.MsgSend".to_string(),
                value: vec![1, 2],
            }],
            "",
            None,
        );
        let auth_info = AuthInfo::new(Vec::new(), Fee::new(200_000, vec![Coin::new("uluna", 100)]));

        SignDoc::new("test-1", 12, 5, auth_info, body)
    }

    #[test]
    fn empty_chain_id_is_rejected_in_both_modes() {
        let mut doc = test_doc();
        doc.chain_id.clear();

        assert!(doc.to_bytes().is_err());
        assert!(doc.to_amino_json().is_err());
    }

    #[test]
    fn direct_bytes_decode_to_the_same_doc() {
        let doc = test_doc();
        let bytes = doc.to_bytes().unwrap();
        let decoded = proto_tx::SignDoc::decode(bytes.as_slice()).unwrap();

        assert_eq!(decoded.chain_id, "test-1");
        assert_eq!(decoded.account_number, 12);
        assert_eq!(decoded.body_bytes, doc.body.to_bytes());
        assert_eq!(decoded.auth_info_bytes, doc.auth_info.to_bytes().unwrap());
    }

    #[test]
    fn amino_json_is_canonical() {
        let json = test_doc().to_amino_json().unwrap();

        // Sorted keys, no whitespace, string-encoded integers, `value`
        // carrying the raw message bytes in base64 (0x01 0x02 -> "AQI=").
        assert_eq!(
            json,
            "{\"account_number\":\"12\",\"chain_id\":\"test-1\",\
             \"fee\":{\"amount\":[{\"amount\":\"100\",\"denom\":\"uluna\"}],\"gas\":\"200000\"},\
             \"memo\":\"\",\
             \"msgs\":[{\"type\":\"/cosmos.bank.v1beta1.MsgSend\",\"value\":\"AQI=\"}],\
             \"sequence\":\"5\"}"
        );
    }

    #[test]
    fn direct_sign_bytes_match_known_answer() {
        // Same fixed scenario as the signing known-answer tests: the
        // serialized sign doc for one MsgSend payload [1, 2, 3], a single
        // secp256k1 signer in direct mode at sequence 5, 100uluna fee at
        // 200k gas, account 12, chain "test-1". Bytes computed
        // independently from the wire schema.
        use crate::keys::PublicKey;
        use crate::tx::auth_info::{ModeInfo, SignerInfo};

        let public_key = PublicKey::Secp256k1(
            hex::decode("0324653eac434488002cc06bbfb7f10fe18991e35f9fe4302dbea6d2353dc0ab1c")
                .unwrap(),
        );

        let mut doc = test_doc();
        doc.auth_info.signer_infos.push(SignerInfo {
            public_key: Some(public_key),
            sequence: 5,
            mode_info: ModeInfo::single(SignMode::Direct),
        });
        doc.body.messages[0].value = vec![1, 2, 3];

        assert_eq!(
            hex::encode(doc.to_bytes().unwrap()),
            "0a250a230a1c2f636f736d6f732e62616e6b2e763162657461312e4d73675365\
             6e64120301020312660a500a460a1f2f636f736d6f732e63727970746f2e7365\
             63703235366b312e5075624b657912230a210324653eac434488002cc06bbfb7\
             f10fe18991e35f9fe4302dbea6d2353dc0ab1c12040a02080118051212\
             0a0c0a05756c756e61120331303010c09a0c1a06746573742d31200c"
        );
    }

    #[test]
    fn amino_json_is_independent_of_construction_order() {
        let a = test_doc().to_amino_json().unwrap();
        let b = test_doc().to_amino_json().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn timeout_height_appears_only_when_set() {
        let mut doc = test_doc();
        assert!(!doc.to_amino_json().unwrap().contains("timeout_height"));

        doc.body.timeout_height = Some(42);
        assert!(doc
            .to_amino_json()
            .unwrap()
            .contains("\"timeout_height\":\"42\""));
    }

    #[test]
    fn null_stripping_makes_absent_and_null_identical() {
        let with_null = strip_nulls(json!({"a": "1", "b": null, "c": {"d": null, "e": "2"}}));
        let without = strip_nulls(json!({"a": "1", "c": {"e": "2"}}));

        assert_eq!(with_null.to_string(), without.to_string());
    }

    #[test]
    fn sign_bytes_dispatch_on_mode() {
        let doc = test_doc();

        assert_eq!(doc.sign_bytes(SignMode::Direct).unwrap(), doc.to_bytes().unwrap());
        assert_eq!(
            doc.sign_bytes(SignMode::LegacyAminoJson).unwrap(),
            doc.to_amino_json().unwrap().into_bytes()
        );
    }
}

//! Public key variants and their address-derivation rules.
//!
//! Keys are a closed sum: the wire formats tag each variant with its own
//! discriminator (a `"type"` constant in amino, a type URL in protobuf and
//! Data JSON) and decoding dispatches on that tag exhaustively. Simple keys
//! derive their address as RIPEMD160(SHA256(key)); legacy multisig keys
//! hash their amino encoding instead and truncate SHA256 to 20 bytes. That
//! asymmetry is part of the chain's address scheme and must not be
//! "simplified" away.

pub mod amino;

use prost::Message;
use ripemd::Ripemd160;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use subtle_encoding::base64;

use cosmos_client_proto::cosmos::crypto::ed25519 as proto_ed25519;
use cosmos_client_proto::cosmos::crypto::multisig::LegacyAminoPubKey;
use cosmos_client_proto::cosmos::crypto::secp256k1 as proto_secp256k1;
use cosmos_client_proto::Any;

use crate::address::{encode_bech32, Address, ADDRESS_LENGTH, PUBKEY_SUFFIX};
use crate::error::Error;

pub const TYPE_URL_SECP256K1: &str = "/cosmos.crypto.secp256k1.PubKey";
pub const TYPE_URL_ED25519: &str = "/cosmos.crypto.ed25519.PubKey";
pub const TYPE_URL_LEGACY_AMINO_MULTISIG: &str = "/cosmos.crypto.multisig.LegacyAminoPubKey";

pub const AMINO_TYPE_SECP256K1: &str = "tendermint/PubKeySecp256k1";
pub const AMINO_TYPE_ED25519: &str = "tendermint/PubKeyEd25519";
pub const AMINO_TYPE_MULTISIG: &str = "tendermint/PubKeyMultisigThreshold";

/// A capability-tagged public key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PublicKey {
    /// Compressed secp256k1 account key (33 bytes).
    Secp256k1(Vec<u8>),
    /// Ed25519 validator consensus key (32 bytes).
    Ed25519(Vec<u8>),
    /// k-of-n aggregate over an ordered list of member keys.
    LegacyAminoMultisig {
        threshold: u32,
        public_keys: Vec<PublicKey>,
    },
}

impl PublicKey {
    pub fn type_url(&self) -> &'static str {
        match self {
            PublicKey::Secp256k1(_) => TYPE_URL_SECP256K1,
            PublicKey::Ed25519(_) => TYPE_URL_ED25519,
            PublicKey::LegacyAminoMultisig { .. } => TYPE_URL_LEGACY_AMINO_MULTISIG,
        }
    }

    pub fn amino_type(&self) -> &'static str {
        match self {
            PublicKey::Secp256k1(_) => AMINO_TYPE_SECP256K1,
            PublicKey::Ed25519(_) => AMINO_TYPE_ED25519,
            PublicKey::LegacyAminoMultisig { .. } => AMINO_TYPE_MULTISIG,
        }
    }

    /// Raw 20-byte address material.
    ///
    /// Simple keys: RIPEMD160(SHA256(key)). Multisig keys: the first 20
    /// bytes of SHA256 over the amino encoding of the whole aggregate.
    pub fn raw_address(&self) -> Result<Vec<u8>, Error> {
        match self {
            PublicKey::Secp256k1(bytes) | PublicKey::Ed25519(bytes) => {
                let sha = Sha256::digest(bytes);
                let rip = Ripemd160::digest(sha);
                Ok(rip.to_vec())
            }
            PublicKey::LegacyAminoMultisig { .. } => {
                let encoded = amino::encode_amino_pubkey(self)?;
                let sha = Sha256::digest(&encoded);
                Ok(sha[..ADDRESS_LENGTH].to_vec())
            }
        }
    }

    /// The account address of this key under the given bech32 prefix.
    pub fn address(&self, prefix: &str) -> Result<Address, Error> {
        Address::new(prefix, self.raw_address()?)
    }

    /// Bech32 rendering of the key itself, under the `pub`-suffixed prefix.
    pub fn to_bech32_pubkey(&self, prefix: &str) -> Result<String, Error> {
        let hrp = format!("{prefix}{PUBKEY_SUFFIX}");
        encode_bech32(&hrp, &amino::encode_amino_pubkey(self)?)
    }

    /// Protobuf `Any` packing, per-variant type URL.
    pub fn to_any(&self) -> Result<Any, Error> {
        let value = match self {
            PublicKey::Secp256k1(bytes) => proto_secp256k1::PubKey {
                key: bytes.clone(),
            }
            .encode_to_vec(),
            PublicKey::Ed25519(bytes) => proto_ed25519::PubKey {
                key: bytes.clone(),
            }
            .encode_to_vec(),
            PublicKey::LegacyAminoMultisig {
                threshold,
                public_keys,
            } => {
                let members = public_keys
                    .iter()
                    .map(PublicKey::to_any)
                    .collect::<Result<Vec<_>, _>>()?;

                LegacyAminoPubKey {
                    threshold: *threshold,
                    public_keys: members,
                }
                .encode_to_vec()
            }
        };

        Ok(Any {
            type_url: self.type_url().to_string(),
            value,
        })
    }

    /// Resolves the concrete variant from an `Any` by its type URL.
    pub fn from_any(any: &Any) -> Result<Self, Error> {
        match any.type_url.as_str() {
            TYPE_URL_SECP256K1 => {
                let pk = proto_secp256k1::PubKey::decode(any.value.as_slice())
                    .map_err(|e| Error::protobuf_decode("PubKey".to_string(), e))?;
                Ok(PublicKey::Secp256k1(pk.key))
            }
            TYPE_URL_ED25519 => {
                let pk = proto_ed25519::PubKey::decode(any.value.as_slice())
                    .map_err(|e| Error::protobuf_decode("PubKey".to_string(), e))?;
                Ok(PublicKey::Ed25519(pk.key))
            }
            TYPE_URL_LEGACY_AMINO_MULTISIG => {
                let pk = LegacyAminoPubKey::decode(any.value.as_slice())
                    .map_err(|e| Error::protobuf_decode("LegacyAminoPubKey".to_string(), e))?;

                let public_keys = pk
                    .public_keys
                    .iter()
                    .map(PublicKey::from_any)
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(PublicKey::LegacyAminoMultisig {
                    threshold: pk.threshold,
                    public_keys,
                })
            }
            other => Err(Error::unknown_key_type(other.to_string())),
        }
    }

    /// REST "Data" JSON form, tagged with `@type`.
    pub fn to_data(&self) -> Value {
        match self {
            PublicKey::Secp256k1(bytes) | PublicKey::Ed25519(bytes) => json!({
                "@type": self.type_url(),
                "key": encode_base64(bytes),
            }),
            PublicKey::LegacyAminoMultisig {
                threshold,
                public_keys,
            } => json!({
                "@type": self.type_url(),
                "threshold": threshold.to_string(),
                "public_keys": public_keys.iter().map(PublicKey::to_data).collect::<Vec<_>>(),
            }),
        }
    }

    pub fn from_data(data: &Value) -> Result<Self, Error> {
        let discriminator = data
            .get("@type")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::malformed_data("PublicKey".to_string(), "missing @type".to_string()))?;

        match discriminator {
            TYPE_URL_SECP256K1 => Ok(PublicKey::Secp256k1(decode_base64_field(data, "key")?)),
            TYPE_URL_ED25519 => Ok(PublicKey::Ed25519(decode_base64_field(data, "key")?)),
            TYPE_URL_LEGACY_AMINO_MULTISIG => {
                let threshold = decode_integer_field(data, "threshold")?;
                let members = data
                    .get("public_keys")
                    .and_then(Value::as_array)
                    .ok_or_else(|| {
                        Error::malformed_data(
                            "PublicKey".to_string(),
                            "missing public_keys".to_string(),
                        )
                    })?;

                let public_keys = members
                    .iter()
                    .map(PublicKey::from_data)
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(PublicKey::LegacyAminoMultisig {
                    threshold,
                    public_keys,
                })
            }
            other => Err(Error::unknown_key_type(other.to_string())),
        }
    }

    /// Legacy amino JSON form, tagged with `type`.
    pub fn to_amino(&self) -> Value {
        match self {
            PublicKey::Secp256k1(bytes) | PublicKey::Ed25519(bytes) => json!({
                "type": self.amino_type(),
                "value": encode_base64(bytes),
            }),
            PublicKey::LegacyAminoMultisig {
                threshold,
                public_keys,
            } => json!({
                "type": self.amino_type(),
                "value": {
                    "threshold": threshold.to_string(),
                    "pubkeys": public_keys.iter().map(PublicKey::to_amino).collect::<Vec<_>>(),
                },
            }),
        }
    }

    pub fn from_amino(data: &Value) -> Result<Self, Error> {
        let discriminator = data
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::malformed_data("PublicKey".to_string(), "missing type".to_string()))?;

        match discriminator {
            AMINO_TYPE_SECP256K1 => Ok(PublicKey::Secp256k1(decode_base64_field(data, "value")?)),
            AMINO_TYPE_ED25519 => Ok(PublicKey::Ed25519(decode_base64_field(data, "value")?)),
            AMINO_TYPE_MULTISIG => {
                let value = data.get("value").ok_or_else(|| {
                    Error::malformed_data("PublicKey".to_string(), "missing value".to_string())
                })?;

                let threshold = decode_integer_field(value, "threshold")?;
                let members = value
                    .get("pubkeys")
                    .and_then(Value::as_array)
                    .ok_or_else(|| {
                        Error::malformed_data("PublicKey".to_string(), "missing pubkeys".to_string())
                    })?;

                let public_keys = members
                    .iter()
                    .map(PublicKey::from_amino)
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(PublicKey::LegacyAminoMultisig {
                    threshold,
                    public_keys,
                })
            }
            other => Err(Error::unknown_key_type(other.to_string())),
        }
    }
}

// Aggregator state is serialized through the Data form so partial multisig
// state survives a process boundary losslessly.
impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_data().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        PublicKey::from_data(&value).map_err(D::Error::custom)
    }
}

pub(crate) fn encode_base64(bytes: &[u8]) -> String {
    let encoded = base64::encode(bytes);
    String::from_utf8(encoded).expect("base64-encoded string should always be valid UTF-8")
}

pub(crate) fn decode_base64(input: &str) -> Result<Vec<u8>, Error> {
    base64::decode(input).map_err(Error::base64_decode)
}

fn decode_base64_field(data: &Value, field: &str) -> Result<Vec<u8>, Error> {
    let encoded = data.get(field).and_then(Value::as_str).ok_or_else(|| {
        Error::malformed_data("PublicKey".to_string(), format!("missing {field}"))
    })?;

    decode_base64(encoded)
}

// Integers arrive as decimal strings from Data JSON but as plain numbers
// from some older gateways; accept both.
fn decode_integer_field(data: &Value, field: &str) -> Result<u32, Error> {
    let value = data.get(field).ok_or_else(|| {
        Error::malformed_data("PublicKey".to_string(), format!("missing {field}"))
    })?;

    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()).ok_or_else(|| {
            Error::malformed_data("PublicKey".to_string(), format!("{field} out of range"))
        }),
        Value::String(s) => s.parse::<u32>().map_err(|_| {
            Error::malformed_data("PublicKey".to_string(), format!("{field} is not an integer"))
        }),
        _ => Err(Error::malformed_data(
            "PublicKey".to_string(),
            format!("{field} has the wrong JSON type"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secp_key(fill: u8) -> PublicKey {
        let mut bytes = vec![fill; 33];
        bytes[0] = 0x02;
        PublicKey::Secp256k1(bytes)
    }

    fn multisig_2_of_3() -> PublicKey {
        PublicKey::LegacyAminoMultisig {
            threshold: 2,
            public_keys: vec![secp_key(0x11), secp_key(0x22), secp_key(0x33)],
        }
    }

    #[test]
    fn address_is_deterministic() {
        let key = secp_key(0x11);
        assert_eq!(key.raw_address().unwrap(), key.raw_address().unwrap());
        assert_eq!(key.raw_address().unwrap().len(), ADDRESS_LENGTH);
    }

    #[test]
    fn one_byte_difference_changes_address() {
        assert_ne!(
            secp_key(0x11).raw_address().unwrap(),
            secp_key(0x12).raw_address().unwrap()
        );
    }

    #[test]
    fn multisig_address_is_not_a_member_address() {
        let multisig = multisig_2_of_3();
        let address = multisig.raw_address().unwrap();

        assert_eq!(address.len(), ADDRESS_LENGTH);
        for member in [secp_key(0x11), secp_key(0x22), secp_key(0x33)] {
            assert_ne!(address, member.raw_address().unwrap());
        }
    }

    #[test]
    fn multisig_address_matches_known_answer() {
        // 2-of-3 over the three fixed member keys above; raw address and
        // bech32 rendering computed independently from the amino layout
        // (SHA256 of the aggregate's amino bytes, truncated to 20). A
        // wrong registered prefix, field tag or hashing order shows up
        // here.
        let multisig = multisig_2_of_3();

        assert_eq!(
            hex::encode(multisig.raw_address().unwrap()),
            "c894c7dba1c908649af2889fb1d8140f22af940f"
        );
        assert_eq!(
            multisig.address("cosmos").unwrap().to_string(),
            "cosmos1ez2v0kapeyyxfxhj3z0mrkq5pu32l9q0ytyhtx"
        );
    }

    #[test]
    fn multisig_address_depends_on_member_order() {
        let reordered = PublicKey::LegacyAminoMultisig {
            threshold: 2,
            public_keys: vec![secp_key(0x22), secp_key(0x11), secp_key(0x33)],
        };

        assert_ne!(
            multisig_2_of_3().raw_address().unwrap(),
            reordered.raw_address().unwrap()
        );
    }

    #[test]
    fn bech32_address_round_trips() {
        let address = multisig_2_of_3().address("cosmos").unwrap();
        let rendered = address.to_string();
        let parsed: Address = rendered.parse().unwrap();

        assert_eq!(parsed, address);
        assert!(rendered.starts_with("cosmos1"));
    }

    #[test]
    fn any_round_trip() {
        for key in [secp_key(0x11), PublicKey::Ed25519(vec![0x44; 32]), multisig_2_of_3()] {
            let any = key.to_any().unwrap();
            assert_eq!(any.type_url, key.type_url());
            assert_eq!(PublicKey::from_any(&any).unwrap(), key);
        }
    }

    #[test]
    fn data_round_trip() {
        for key in [secp_key(0x11), PublicKey::Ed25519(vec![0x44; 32]), multisig_2_of_3()] {
            let data = key.to_data();
            assert_eq!(data["@type"], key.type_url());
            assert_eq!(PublicKey::from_data(&data).unwrap(), key);
        }
    }

    #[test]
    fn amino_round_trip() {
        for key in [secp_key(0x11), PublicKey::Ed25519(vec![0x44; 32]), multisig_2_of_3()] {
            let amino = key.to_amino();
            assert_eq!(amino["type"], key.amino_type());
            assert_eq!(PublicKey::from_amino(&amino).unwrap(), key);
        }
    }

    #[test]
    fn numeric_threshold_is_accepted() {
        let mut data = multisig_2_of_3().to_data();
        data["threshold"] = json!(2);
        assert_eq!(PublicKey::from_data(&data).unwrap(), multisig_2_of_3());
    }

    #[test]
    fn unknown_discriminators_are_rejected() {
        let data = json!({ "@type": "/cosmos.crypto.sr25519.PubKey", "key": "AA==" });
        assert!(PublicKey::from_data(&data).is_err());

        let amino = json!({ "type": "tendermint/PubKeySr25519", "value": "AA==" });
        assert!(PublicKey::from_amino(&amino).is_err());

        let any = Any {
            type_url: "/cosmos.crypto.sr25519.PubKey".to_string(),
            value: vec![],
        };
        assert!(PublicKey::from_any(&any).is_err());
    }
}

//! Transaction structure and the three-way encoding.
//!
//! A [`Tx`] is a [`TxBody`], an [`AuthInfo`] and one raw signature per
//! signer, positionally matched to `auth_info.signer_infos`. The canonical
//! bytes a signer commits to live in [`SignDoc`]; conversion between the
//! wire encodings lives in [`codec`].

pub mod auth_info;
pub mod body;
pub mod codec;
pub mod fee;
pub mod sign_doc;

use prost::Message;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use cosmos_client_proto::cosmos::crypto::multisig::v1beta1::MultiSignature;
use cosmos_client_proto::cosmos::tx::signing::v1beta1 as proto_signing;
use cosmos_client_proto::cosmos::tx::signing::v1beta1::signature_descriptor;
use cosmos_client_proto::cosmos::tx::v1beta1 as proto_tx;

use crate::error::Error;
use crate::keys::PublicKey;
use crate::multisig::CompactBitArray;

pub use auth_info::{placeholder_signature, AuthInfo, ModeInfo, SignerInfo};
pub use body::TxBody;
pub use codec::TxCodec;
pub use fee::Fee;
pub use sign_doc::SignDoc;

/// Which canonicalization produced a signature.
///
/// Recorded next to every signature so verifiers can reconstruct the
/// signed bytes; the sign-doc encoding and this tag must always agree.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignMode {
    Direct,
    LegacyAminoJson,
}

impl SignMode {
    pub fn to_proto(self) -> proto_signing::SignMode {
        match self {
            SignMode::Direct => proto_signing::SignMode::Direct,
            SignMode::LegacyAminoJson => proto_signing::SignMode::LegacyAminoJson,
        }
    }

    pub fn from_proto(value: i32) -> Result<Self, Error> {
        match proto_signing::SignMode::from_i32(value) {
            Some(proto_signing::SignMode::Direct) => Ok(SignMode::Direct),
            Some(proto_signing::SignMode::LegacyAminoJson) => Ok(SignMode::LegacyAminoJson),
            _ => Err(Error::malformed_data(
                "SignMode".to_string(),
                format!("unsupported sign mode {value}"),
            )),
        }
    }
}

/// A signature with its structural description: either one signer's raw
/// bytes plus the mode that produced them, or a multisig aggregate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SignatureData {
    Single {
        mode: SignMode,
        signature: Vec<u8>,
    },
    Multi {
        bitarray: CompactBitArray,
        signatures: Vec<SignatureData>,
    },
}

impl SignatureData {
    /// The raw bytes as they appear in `Tx.signatures`: single signatures
    /// verbatim, multisig aggregates as an encoded `MultiSignature`.
    pub fn to_raw_bytes(&self) -> Vec<u8> {
        match self {
            SignatureData::Single { signature, .. } => signature.clone(),
            SignatureData::Multi { signatures, .. } => MultiSignature {
                signatures: signatures.iter().map(SignatureData::to_raw_bytes).collect(),
            }
            .encode_to_vec(),
        }
    }

    /// The `ModeInfo` recorded alongside the raw bytes.
    pub fn to_mode_info(&self) -> ModeInfo {
        match self {
            SignatureData::Single { mode, .. } => ModeInfo::single(*mode),
            SignatureData::Multi {
                bitarray,
                signatures,
            } => ModeInfo::Multi {
                bitarray: bitarray.clone(),
                mode_infos: signatures.iter().map(SignatureData::to_mode_info).collect(),
            },
        }
    }

    pub fn to_proto(&self) -> signature_descriptor::Data {
        let sum = match self {
            SignatureData::Single { mode, signature } => {
                signature_descriptor::data::Sum::Single(signature_descriptor::data::Single {
                    mode: mode.to_proto() as i32,
                    signature: signature.clone(),
                })
            }
            SignatureData::Multi {
                bitarray,
                signatures,
            } => signature_descriptor::data::Sum::Multi(signature_descriptor::data::Multi {
                bitarray: Some(bitarray.to_proto()),
                signatures: signatures.iter().map(SignatureData::to_proto).collect(),
            }),
        };

        signature_descriptor::Data { sum: Some(sum) }
    }

    pub fn from_proto(proto: &signature_descriptor::Data) -> Result<Self, Error> {
        match &proto.sum {
            Some(signature_descriptor::data::Sum::Single(single)) => Ok(SignatureData::Single {
                mode: SignMode::from_proto(single.mode)?,
                signature: single.signature.clone(),
            }),
            Some(signature_descriptor::data::Sum::Multi(multi)) => {
                let bitarray = multi.bitarray.as_ref().ok_or_else(|| {
                    Error::malformed_data(
                        "SignatureData".to_string(),
                        "multi without bitarray".to_string(),
                    )
                })?;

                Ok(SignatureData::Multi {
                    bitarray: CompactBitArray::from_proto(bitarray)?,
                    signatures: multi
                        .signatures
                        .iter()
                        .map(SignatureData::from_proto)
                        .collect::<Result<Vec<_>, _>>()?,
                })
            }
            None => Err(Error::malformed_data(
                "SignatureData".to_string(),
                "missing sum".to_string(),
            )),
        }
    }
}

/// One signer's complete contribution: public key, structured signature
/// data and the account sequence it was produced at.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SignatureV2 {
    pub public_key: PublicKey,
    pub data: SignatureData,
    pub sequence: u64,
}

impl SignatureV2 {
    pub fn to_signer_info(&self) -> SignerInfo {
        SignerInfo {
            public_key: Some(self.public_key.clone()),
            sequence: self.sequence,
            mode_info: self.data.to_mode_info(),
        }
    }

    pub fn to_proto(&self) -> Result<proto_signing::SignatureDescriptor, Error> {
        Ok(proto_signing::SignatureDescriptor {
            public_key: Some(self.public_key.to_any()?),
            data: Some(self.data.to_proto()),
            sequence: self.sequence,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tx {
    pub body: TxBody,
    pub auth_info: AuthInfo,
    pub signatures: Vec<Vec<u8>>,
}

impl Tx {
    pub fn new(body: TxBody, auth_info: AuthInfo, signatures: Vec<Vec<u8>>) -> Self {
        Self {
            body,
            auth_info,
            signatures,
        }
    }

    /// Attaches fully-formed signatures: one `SignerInfo` plus one raw
    /// signature per entry, appended positionally.
    pub fn append_signatures(&mut self, signatures: Vec<SignatureV2>) {
        for signature in signatures {
            self.auth_info.signer_infos.push(signature.to_signer_info());
            self.signatures.push(signature.data.to_raw_bytes());
        }
    }

    pub fn to_proto(&self) -> Result<proto_tx::Tx, Error> {
        Ok(proto_tx::Tx {
            body: Some(self.body.to_proto()),
            auth_info: Some(self.auth_info.to_proto()?),
            signatures: self.signatures.clone(),
        })
    }

    pub fn from_proto(proto: &proto_tx::Tx) -> Result<Self, Error> {
        let body = proto
            .body
            .as_ref()
            .ok_or_else(|| Error::malformed_tx("missing body".to_string()))?;
        let auth_info = proto
            .auth_info
            .as_ref()
            .ok_or_else(|| Error::malformed_tx("missing auth_info".to_string()))?;

        let tx = Self {
            body: TxBody::from_proto(body),
            auth_info: AuthInfo::from_proto(auth_info)?,
            signatures: proto.signatures.clone(),
        };

        if tx.auth_info.signer_infos.len() != tx.signatures.len() {
            return Err(Error::signature_count_mismatch(
                tx.auth_info.signer_infos.len(),
                tx.signatures.len(),
            ));
        }

        Ok(tx)
    }

    pub fn to_data(&self) -> Value {
        json!({
            "body": self.body.to_data(),
            "auth_info": self.auth_info.to_data(),
            "signatures": self
                .signatures
                .iter()
                .map(|sig| crate::keys::encode_base64(sig))
                .collect::<Vec<_>>(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coin::Coin;
    use cosmos_client_proto::Any;

    fn unsigned_tx() -> Tx {
        let body = TxBody::new(
            vec![Any {
                type_url: "/cosmos.bank.v1beta1.MsgSend".to_string(),
                value: vec![1, 2, 3],
            }],
            "",
            None,
        );
        let fee = Fee::new(200_000, vec![Coin::new("uluna", 100)]);

        Tx::new(body, AuthInfo::new(Vec::new(), fee), Vec::new())
    }

    fn secp_key() -> PublicKey {
        PublicKey::Secp256k1(vec![0x02; 33])
    }

    #[test]
    fn append_signatures_stays_positionally_matched() {
        let mut tx = unsigned_tx();

        tx.append_signatures(vec![SignatureV2 {
            public_key: secp_key(),
            data: SignatureData::Single {
                mode: SignMode::Direct,
                signature: vec![0xab; 64],
            },
            sequence: 5,
        }]);

        assert_eq!(tx.auth_info.signer_infos.len(), 1);
        assert_eq!(tx.signatures.len(), 1);
        assert_eq!(tx.auth_info.signer_infos[0].sequence, 5);
        assert_eq!(tx.signatures[0], vec![0xab; 64]);
    }

    #[test]
    fn proto_round_trip_preserves_structure() {
        let mut tx = unsigned_tx();
        tx.append_signatures(vec![SignatureV2 {
            public_key: secp_key(),
            data: SignatureData::Single {
                mode: SignMode::LegacyAminoJson,
                signature: vec![7; 64],
            },
            sequence: 9,
        }]);

        let proto = tx.to_proto().unwrap();
        assert_eq!(Tx::from_proto(&proto).unwrap(), tx);
    }

    #[test]
    fn signer_and_signature_counts_must_match() {
        let mut proto = unsigned_tx().to_proto().unwrap();
        proto.signatures.push(vec![1; 64]);

        assert!(Tx::from_proto(&proto).is_err());
    }

    #[test]
    fn multi_signature_data_flattens_to_multisignature_bytes() {
        let mut bitarray = CompactBitArray::from_bits(3).unwrap();
        bitarray.set_index(0, true);
        bitarray.set_index(2, true);

        let data = SignatureData::Multi {
            bitarray,
            signatures: vec![
                SignatureData::Single {
                    mode: SignMode::LegacyAminoJson,
                    signature: vec![1; 64],
                },
                SignatureData::Single {
                    mode: SignMode::LegacyAminoJson,
                    signature: vec![2; 64],
                },
            ],
        };

        let decoded = MultiSignature::decode(data.to_raw_bytes().as_slice()).unwrap();
        assert_eq!(decoded.signatures, vec![vec![1; 64], vec![2; 64]]);
    }

    #[test]
    fn sign_mode_proto_round_trip() {
        for mode in [SignMode::Direct, SignMode::LegacyAminoJson] {
            assert_eq!(SignMode::from_proto(mode.to_proto() as i32).unwrap(), mode);
        }
        assert!(SignMode::from_proto(2).is_err());
        assert!(SignMode::from_proto(-1).is_err());
    }

    #[test]
    fn signature_descriptor_proto_round_trip() {
        let data = SignatureData::Single {
            mode: SignMode::Direct,
            signature: vec![5; 64],
        };
        let descriptor = SignatureV2 {
            public_key: secp_key(),
            data: data.clone(),
            sequence: 3,
        }
        .to_proto()
        .unwrap();

        assert_eq!(
            SignatureData::from_proto(descriptor.data.as_ref().unwrap()).unwrap(),
            data
        );
    }
}

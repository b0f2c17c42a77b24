//! Signer metadata: who signs, with which mode, at which sequence.

use prost::Message;
use serde_json::{json, Value};

use cosmos_client_proto::cosmos::crypto::multisig::v1beta1::MultiSignature;
use cosmos_client_proto::cosmos::tx::v1beta1 as proto_tx;
use cosmos_client_proto::cosmos::tx::v1beta1::mode_info;

use crate::error::Error;
use crate::keys::PublicKey;
use crate::multisig::CompactBitArray;
use crate::tx::fee::Fee;
use crate::tx::SignMode;

/// Length of a raw secp256k1 signature (r || s).
pub const SECP256K1_SIGNATURE_LENGTH: usize = 64;

/// How the signature for one signer slot is structured.
#[derive(Clone, Debug, PartialEq)]
pub enum ModeInfo {
    Single {
        mode: SignMode,
    },
    Multi {
        bitarray: CompactBitArray,
        mode_infos: Vec<ModeInfo>,
    },
}

impl ModeInfo {
    pub fn single(mode: SignMode) -> Self {
        ModeInfo::Single { mode }
    }

    pub fn to_proto(&self) -> proto_tx::ModeInfo {
        let sum = match self {
            ModeInfo::Single { mode } => mode_info::Sum::Single(mode_info::Single {
                mode: mode.to_proto() as i32,
            }),
            ModeInfo::Multi {
                bitarray,
                mode_infos,
            } => mode_info::Sum::Multi(mode_info::Multi {
                bitarray: Some(bitarray.to_proto()),
                mode_infos: mode_infos.iter().map(ModeInfo::to_proto).collect(),
            }),
        };

        proto_tx::ModeInfo { sum: Some(sum) }
    }

    pub fn from_proto(proto: &proto_tx::ModeInfo) -> Result<Self, Error> {
        match &proto.sum {
            Some(mode_info::Sum::Single(single)) => Ok(ModeInfo::Single {
                mode: SignMode::from_proto(single.mode)?,
            }),
            Some(mode_info::Sum::Multi(multi)) => {
                let bitarray = multi.bitarray.as_ref().ok_or_else(|| {
                    Error::malformed_data("ModeInfo".to_string(), "multi without bitarray".to_string())
                })?;

                Ok(ModeInfo::Multi {
                    bitarray: CompactBitArray::from_proto(bitarray)?,
                    mode_infos: multi
                        .mode_infos
                        .iter()
                        .map(ModeInfo::from_proto)
                        .collect::<Result<Vec<_>, _>>()?,
                })
            }
            None => Err(Error::malformed_data(
                "ModeInfo".to_string(),
                "missing sum".to_string(),
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SignerInfo {
    /// `None` for accounts whose key is already known on-chain.
    pub public_key: Option<PublicKey>,
    pub sequence: u64,
    pub mode_info: ModeInfo,
}

impl SignerInfo {
    pub fn to_proto(&self) -> Result<proto_tx::SignerInfo, Error> {
        let public_key = match &self.public_key {
            Some(key) => Some(key.to_any()?),
            None => None,
        };

        Ok(proto_tx::SignerInfo {
            public_key,
            mode_info: Some(self.mode_info.to_proto()),
            sequence: self.sequence,
        })
    }

    pub fn from_proto(proto: &proto_tx::SignerInfo) -> Result<Self, Error> {
        let public_key = match &proto.public_key {
            Some(any) => Some(PublicKey::from_any(any)?),
            None => None,
        };

        let mode_info = proto.mode_info.as_ref().ok_or_else(|| {
            Error::malformed_data("SignerInfo".to_string(), "missing mode_info".to_string())
        })?;

        Ok(Self {
            public_key,
            sequence: proto.sequence,
            mode_info: ModeInfo::from_proto(mode_info)?,
        })
    }

    /// A signer slot for gas simulation only, sized like the real thing.
    ///
    /// Simulated gas is sensitive to transaction byte length, so the
    /// placeholder pass must produce a correctly-sized transaction before
    /// real signatures exist: multisig keys get a `Multi` mode sized to
    /// their member count, unknown keys a sentinel empty secp256k1 key.
    pub fn placeholder(public_key: Option<&PublicKey>, sequence: u64) -> Result<Self, Error> {
        match public_key {
            Some(key @ PublicKey::LegacyAminoMultisig { public_keys, .. }) => {
                let bitarray = CompactBitArray::from_bits(public_keys.len())?;
                let mode_infos = public_keys
                    .iter()
                    .map(|_| ModeInfo::single(SignMode::LegacyAminoJson))
                    .collect();

                Ok(Self {
                    public_key: Some(key.clone()),
                    sequence,
                    mode_info: ModeInfo::Multi {
                        bitarray,
                        mode_infos,
                    },
                })
            }
            Some(key) => Ok(Self {
                public_key: Some(key.clone()),
                sequence,
                mode_info: ModeInfo::single(SignMode::Direct),
            }),
            None => Ok(Self {
                public_key: Some(PublicKey::Secp256k1(Vec::new())),
                sequence,
                mode_info: ModeInfo::single(SignMode::Direct),
            }),
        }
    }
}

/// Byte-length-accurate stand-in for a signature that does not exist yet.
pub fn placeholder_signature(public_key: Option<&PublicKey>) -> Vec<u8> {
    match public_key {
        Some(PublicKey::LegacyAminoMultisig { threshold, .. }) => MultiSignature {
            signatures: vec![vec![0u8; SECP256K1_SIGNATURE_LENGTH]; *threshold as usize],
        }
        .encode_to_vec(),
        _ => vec![0u8; SECP256K1_SIGNATURE_LENGTH],
    }
}

/// Signer list (positionally parallel to the transaction's signatures)
/// plus the fee.
#[derive(Clone, Debug, PartialEq)]
pub struct AuthInfo {
    pub signer_infos: Vec<SignerInfo>,
    pub fee: Fee,
}

impl AuthInfo {
    pub fn new(signer_infos: Vec<SignerInfo>, fee: Fee) -> Self {
        Self { signer_infos, fee }
    }

    pub fn to_proto(&self) -> Result<proto_tx::AuthInfo, Error> {
        Ok(proto_tx::AuthInfo {
            signer_infos: self
                .signer_infos
                .iter()
                .map(SignerInfo::to_proto)
                .collect::<Result<Vec<_>, _>>()?,
            fee: Some(self.fee.to_proto()),
        })
    }

    pub fn from_proto(proto: &proto_tx::AuthInfo) -> Result<Self, Error> {
        let fee = proto.fee.as_ref().ok_or_else(|| {
            Error::malformed_data("AuthInfo".to_string(), "missing fee".to_string())
        })?;

        Ok(Self {
            signer_infos: proto
                .signer_infos
                .iter()
                .map(SignerInfo::from_proto)
                .collect::<Result<Vec<_>, _>>()?,
            fee: Fee::from_proto(fee)?,
        })
    }

    /// Serialized protobuf bytes, the `auth_info_bytes` of `SignDoc` and
    /// `TxRaw`.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(self.to_proto()?.encode_to_vec())
    }

    pub fn to_data(&self) -> Value {
        let signer_infos = self
            .signer_infos
            .iter()
            .map(|info| {
                json!({
                    "public_key": info.public_key.as_ref().map(PublicKey::to_data),
                    "sequence": info.sequence.to_string(),
                })
            })
            .collect::<Vec<_>>();

        json!({
            "signer_infos": signer_infos,
            "fee": self.fee.to_data(),
        })
    }
}

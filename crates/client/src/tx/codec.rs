//! Base64 transport encoding and transaction hashing.

use prost::Message;
use sha2::{Digest, Sha256};
use tracing::warn;

use cosmos_client_proto::cosmos::tx::v1beta1 as proto_tx;

use crate::error::Error;
use crate::keys::{decode_base64, encode_base64};
use crate::registry::MsgRegistry;
use crate::tx::Tx;

/// Encodes transactions for transport and decodes untrusted input back,
/// validating every message payload against its [`MsgRegistry`].
#[derive(Debug, Default)]
pub struct TxCodec {
    registry: MsgRegistry,
}

impl TxCodec {
    pub fn new(registry: MsgRegistry) -> Self {
        Self { registry }
    }

    pub fn registry_mut(&mut self) -> &mut MsgRegistry {
        &mut self.registry
    }

    /// Base64 of the serialized protobuf transaction, as broadcast
    /// endpoints expect it.
    pub fn encode(&self, tx: &Tx) -> Result<String, Error> {
        Ok(encode_base64(&tx.to_proto()?.encode_to_vec()))
    }

    /// Decodes a base64 transaction, checking structure and message types.
    pub fn decode(&self, encoded: &str) -> Result<Tx, Error> {
        let bytes = decode_base64(encoded)?;
        let proto = proto_tx::Tx::decode(bytes.as_slice())
            .map_err(|e| Error::protobuf_decode("Tx".to_string(), e))?;

        let tx = Tx::from_proto(&proto)?;

        for msg in &tx.body.messages {
            self.registry.validate(msg)?;
        }

        Ok(tx)
    }

    /// The transaction hash: uppercase hex of SHA-256 over the serialized
    /// protobuf transaction. Matches the `txhash` reported by nodes.
    pub fn hash(&self, tx: &Tx) -> Result<String, Error> {
        Ok(hash_bytes(&tx.to_proto()?.encode_to_vec()))
    }

    /// Decodes `encoded` and confirms that re-encoding reproduces the same
    /// transaction hash, guarding against lossy decoding of payloads the
    /// structured model does not capture.
    pub fn verify_round_trip(&self, encoded: &str) -> Result<Tx, Error> {
        let bytes = decode_base64(encoded)?;
        let expected = hash_bytes(&bytes);

        let tx = self.decode(encoded)?;
        let actual = self.hash(&tx)?;

        if actual != expected {
            warn!(
                expected = %expected,
                actual = %actual,
                "transaction did not survive decode/re-encode"
            );
            return Err(Error::hash_mismatch(expected, actual));
        }

        Ok(tx)
    }
}

fn hash_bytes(bytes: &[u8]) -> String {
    hex::encode_upper(Sha256::digest(bytes))
}

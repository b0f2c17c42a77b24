//! Accumulates member signatures for a legacy amino multisig key.

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::keys::PublicKey;
use crate::multisig::CompactBitArray;
use crate::tx::SignatureData;

/// Collects signatures from the members of a `LegacyAminoMultisig` key and
/// packs them into one [`SignatureData::Multi`].
///
/// Signatures are stored densely in member order regardless of the order
/// they arrive in: the bit array records which members have signed, and
/// [`CompactBitArray::num_true_bits_before`] maps a member index to its
/// slot in the dense list. The aggregator state is serializable so a
/// partially-collected multisig can be persisted between signing parties.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MultiSignatureAggregator {
    threshold: u32,
    members: Vec<PublicKey>,
    bitarray: CompactBitArray,
    signatures: Vec<SignatureData>,
}

impl MultiSignatureAggregator {
    /// Starts an empty aggregation for the given multisig public key.
    pub fn new(public_key: &PublicKey) -> Result<Self, Error> {
        match public_key {
            PublicKey::LegacyAminoMultisig {
                threshold,
                public_keys,
            } => Ok(Self {
                threshold: *threshold,
                members: public_keys.clone(),
                bitarray: CompactBitArray::from_bits(public_keys.len())?,
                signatures: Vec::new(),
            }),
            other => Err(Error::malformed_key_data(format!(
                "expected a multisig public key, got {}",
                other.type_url()
            ))),
        }
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    /// Number of member signatures collected so far.
    pub fn count(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_complete(&self) -> bool {
        self.signatures.len() >= self.threshold as usize
    }

    /// Records `data` as the signature of the member at `index`.
    ///
    /// The signature is inserted at its dense position, so the final
    /// aggregate is identical no matter the order members sign in. A
    /// second signature from the same member replaces the first.
    pub fn append_signature_for_index(
        &mut self,
        index: usize,
        data: SignatureData,
    ) -> Result<(), Error> {
        if index >= self.members.len() {
            return Err(Error::index_out_of_range(index, self.members.len()));
        }

        let slot = self.bitarray.num_true_bits_before(index);

        if self.bitarray.get_index(index) {
            self.signatures[slot] = data;
        } else {
            self.bitarray.set_index(index, true);
            self.signatures.insert(slot, data);
        }

        Ok(())
    }

    /// Records `data` as the signature of the member whose public key is
    /// `public_key`.
    pub fn append_signature(
        &mut self,
        public_key: &PublicKey,
        data: SignatureData,
    ) -> Result<(), Error> {
        let index = self
            .members
            .iter()
            .position(|member| member == public_key)
            .ok_or_else(|| Error::unknown_signer(public_key.to_data().to_string()))?;

        self.append_signature_for_index(index, data)
    }

    /// The aggregate signature collected so far.
    ///
    /// Completeness is not checked here; callers enforcing the threshold
    /// check [`is_complete`](Self::is_complete) first.
    pub fn to_signature_data(&self) -> SignatureData {
        SignatureData::Multi {
            bitarray: self.bitarray.clone(),
            signatures: self.signatures.clone(),
        }
    }
}

//! A space-efficient fixed-capacity bit array recording which of N
//! potential signers have contributed a signature.

use serde::{Deserialize, Serialize};

use cosmos_client_proto::cosmos::crypto::multisig::v1beta1 as proto_multisig;

use crate::error::Error;

/// Bits are stored most-significant-first within each byte;
/// `extra_bits_stored` is the number of bits used in the last byte (0 when
/// the last byte is full).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactBitArray {
    extra_bits_stored: u32,
    elems: Vec<u8>,
}

impl CompactBitArray {
    /// Creates an all-false bit array able to hold `bits` bits.
    pub fn from_bits(bits: usize) -> Result<Self, Error> {
        if bits == 0 {
            return Err(Error::invalid_capacity(bits));
        }

        let num_bytes = (bits + 7) / 8;

        Ok(Self {
            extra_bits_stored: (bits % 8) as u32,
            elems: vec![0u8; num_bytes],
        })
    }

    /// Number of bit positions this array holds.
    pub fn count(&self) -> usize {
        if self.extra_bits_stored == 0 {
            self.elems.len() * 8
        } else {
            (self.elems.len() - 1) * 8 + self.extra_bits_stored as usize
        }
    }

    /// Returns the bit at `index`, or `false` when `index` is out of range.
    pub fn get_index(&self, index: usize) -> bool {
        if index >= self.count() {
            return false;
        }

        self.elems[index >> 3] & (0x80 >> (index & 0x07)) != 0
    }

    /// Sets the bit at `index`; returns `false` (and changes nothing) when
    /// `index` is out of range. Callers needing strict bounds check
    /// [`count`](Self::count) first.
    pub fn set_index(&mut self, index: usize, value: bool) -> bool {
        if index >= self.count() {
            return false;
        }

        let mask = 0x80 >> (index & 0x07);
        if value {
            self.elems[index >> 3] |= mask;
        } else {
            self.elems[index >> 3] &= !mask;
        }

        true
    }

    /// Number of set bits at positions strictly before `index`, clamped to
    /// the array's capacity.
    ///
    /// This is the index-remapping function that places a signature at its
    /// densely-packed offset in the signature list even though the bit
    /// array is sparse over signer identity.
    pub fn num_true_bits_before(&self, index: usize) -> usize {
        let limit = index.min(self.count());

        (0..limit).filter(|i| self.get_index(*i)).count()
    }

    pub fn to_proto(&self) -> proto_multisig::CompactBitArray {
        proto_multisig::CompactBitArray {
            extra_bits_stored: self.extra_bits_stored,
            elems: self.elems.clone(),
        }
    }

    pub fn from_proto(proto: &proto_multisig::CompactBitArray) -> Result<Self, Error> {
        if proto.extra_bits_stored > 7 {
            return Err(Error::malformed_data(
                "CompactBitArray".to_string(),
                format!("extra_bits_stored is {}", proto.extra_bits_stored),
            ));
        }

        if proto.elems.is_empty() {
            return Err(Error::invalid_capacity(0));
        }

        Ok(Self {
            extra_bits_stored: proto.extra_bits_stored,
            elems: proto.elems.clone(),
        })
    }
}

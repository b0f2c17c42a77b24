//! Legacy amino binary encoding of public keys.
//!
//! Amino identifies a key type by a fixed 4-byte registered prefix followed
//! by a uvarint length. These bytes feed multisig address derivation, so
//! they must match the registered constants exactly.

use crate::error::Error;
use crate::keys::PublicKey;

/// Registered amino prefix for `tendermint/PubKeySecp256k1`.
pub const AMINO_PREFIX_SECP256K1: [u8; 4] = [0xeb, 0x5a, 0xe9, 0x87];

/// Registered amino prefix for `tendermint/PubKeyEd25519`.
pub const AMINO_PREFIX_ED25519: [u8; 4] = [0x16, 0x24, 0xde, 0x64];

/// Registered amino prefix for `tendermint/PubKeyMultisigThreshold`.
pub const AMINO_PREFIX_MULTISIG: [u8; 4] = [0x22, 0xc1, 0xf7, 0xe2];

/// Appends the unsigned LEB128 encoding of `value` to `buf`.
///
/// Handles the full u64 range; some SDKs cap this at 127 and silently
/// break for larger multisigs.
pub fn encode_uvarint(value: u64, buf: &mut Vec<u8>) {
    let mut value = value;
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

/// Amino-encodes a public key: registered prefix, uvarint length, raw key
/// bytes. Multisig keys nest the encodings of their members.
pub fn encode_amino_pubkey(key: &PublicKey) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();

    match key {
        PublicKey::Secp256k1(bytes) => {
            out.extend_from_slice(&AMINO_PREFIX_SECP256K1);
            encode_uvarint(bytes.len() as u64, &mut out);
            out.extend_from_slice(bytes);
        }
        PublicKey::Ed25519(bytes) => {
            out.extend_from_slice(&AMINO_PREFIX_ED25519);
            encode_uvarint(bytes.len() as u64, &mut out);
            out.extend_from_slice(bytes);
        }
        PublicKey::LegacyAminoMultisig {
            threshold,
            public_keys,
        } => {
            if *threshold == 0 || *threshold as usize > public_keys.len() {
                return Err(Error::malformed_key_data(format!(
                    "multisig threshold {} out of range for {} member keys",
                    threshold,
                    public_keys.len()
                )));
            }

            out.extend_from_slice(&AMINO_PREFIX_MULTISIG);
            // Field 1 (threshold), varint wire type.
            out.push(0x08);
            encode_uvarint(u64::from(*threshold), &mut out);

            for member in public_keys {
                let member_bytes = encode_amino_pubkey(member)?;
                // Field 2 (pubkeys), length-delimited wire type.
                out.push(0x12);
                encode_uvarint(member_bytes.len() as u64, &mut out);
                out.extend_from_slice(&member_bytes);
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uvarint(value: u64) -> Vec<u8> {
        let mut buf = Vec::new();
        encode_uvarint(value, &mut buf);
        buf
    }

    #[test]
    fn uvarint_single_byte_range() {
        assert_eq!(uvarint(0), vec![0x00]);
        assert_eq!(uvarint(1), vec![0x01]);
        assert_eq!(uvarint(127), vec![0x7f]);
    }

    #[test]
    fn uvarint_is_not_capped_at_127() {
        assert_eq!(uvarint(128), vec![0x80, 0x01]);
        assert_eq!(uvarint(300), vec![0xac, 0x02]);
        assert_eq!(
            uvarint(u64::MAX),
            vec![0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]
        );
    }

    #[test]
    fn secp256k1_encoding_carries_registered_prefix_and_length() {
        let key = PublicKey::Secp256k1(vec![0x02; 33]);
        let encoded = encode_amino_pubkey(&key).unwrap();

        assert_eq!(&encoded[..4], &AMINO_PREFIX_SECP256K1);
        assert_eq!(encoded[4], 0x21);
        assert_eq!(encoded.len(), 5 + 33);
    }

    #[test]
    fn multisig_encoding_nests_members() {
        let member = PublicKey::Secp256k1(vec![0x03; 33]);
        let key = PublicKey::LegacyAminoMultisig {
            threshold: 2,
            public_keys: vec![member.clone(), member.clone(), member],
        };

        let encoded = encode_amino_pubkey(&key).unwrap();
        assert_eq!(&encoded[..4], &AMINO_PREFIX_MULTISIG);
        assert_eq!(encoded[4], 0x08);
        assert_eq!(encoded[5], 0x02);
        // Three members, each length-prefixed 38-byte encodings.
        assert_eq!(encoded.len(), 6 + 3 * (2 + 38));
    }

    #[test]
    fn multisig_threshold_must_be_satisfiable() {
        let member = PublicKey::Secp256k1(vec![0x03; 33]);

        for threshold in [0, 2] {
            let key = PublicKey::LegacyAminoMultisig {
                threshold,
                public_keys: vec![member.clone()],
            };
            assert!(encode_amino_pubkey(&key).is_err());
        }
    }
}

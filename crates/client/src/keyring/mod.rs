//! The signer seam between the codec core and key material.
//!
//! Mnemonic and BIP32 derivation deliberately live outside this crate; all
//! the signing orchestrator needs is something that exposes a public key
//! and signs opaque bytes. [`Secp256k1KeyPair`] is the stock
//! implementation over raw private key bytes.

pub mod errors;

use k256::ecdsa::signature::Signer;
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};

use crate::keys::PublicKey;

use errors::Error;

/// Capability to sign arbitrary bytes on behalf of one public key.
///
/// Implementations must be deterministic for a given `(key, message)` pair
/// so that re-signing an identical sign doc is idempotent.
pub trait SigningKeyPair {
    /// The public key signatures will verify under.
    fn public_key(&self) -> PublicKey;

    /// Sign the given canonical sign-doc bytes.
    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, Error>;
}

/// A secp256k1 key pair over raw 32-byte private key material.
///
/// Signatures are RFC 6979 deterministic ECDSA over SHA-256 of the message,
/// with the `s` component normalized to the lower half of the curve order,
/// as Cosmos SDK verifiers require.
#[derive(Clone)]
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
}

impl Secp256k1KeyPair {
    pub fn from_private_key(private_key: &[u8]) -> Result<Self, Error> {
        let signing_key = SigningKey::from_slice(private_key).map_err(Error::invalid_key)?;

        Ok(Self { signing_key })
    }

    /// The 33-byte compressed SEC1 encoding of the public key.
    pub fn public_key_bytes(&self) -> Vec<u8> {
        let verifying_key: &VerifyingKey = self.signing_key.verifying_key();
        verifying_key.to_encoded_point(true).as_bytes().to_vec()
    }
}

impl SigningKeyPair for Secp256k1KeyPair {
    fn public_key(&self) -> PublicKey {
        PublicKey::Secp256k1(self.public_key_bytes())
    }

    fn sign(&self, message: &[u8]) -> Result<Vec<u8>, Error> {
        let signature: Signature = self.signing_key.sign(message);

        // Verifiers reject high-s signatures.
        let signature = signature.normalize_s().unwrap_or(signature);

        Ok(signature.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use k256::ecdsa::signature::Verifier;

    use super::*;

    fn test_key() -> Secp256k1KeyPair {
        Secp256k1KeyPair::from_private_key(&[0x42; 32]).unwrap()
    }

    #[test]
    fn public_key_is_compressed() {
        let key = test_key();
        let bytes = key.public_key_bytes();

        assert_eq!(bytes.len(), 33);
        assert!(bytes[0] == 0x02 || bytes[0] == 0x03);
    }

    #[test]
    fn public_key_matches_known_answer() {
        // Compressed SEC1 point for the private key 0x42 repeated,
        // derived independently.
        assert_eq!(
            hex::encode(test_key().public_key_bytes()),
            "0324653eac434488002cc06bbfb7f10fe18991e35f9fe4302dbea6d2353dc0ab1c"
        );
    }

    #[test]
    fn signing_is_deterministic_and_verifies() {
        let key = test_key();
        let message = b"canonical sign doc bytes";

        let first = key.sign(message).unwrap();
        let second = key.sign(message).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);

        let verifying_key = *key.signing_key.verifying_key();
        let signature = Signature::from_slice(&first).unwrap();
        verifying_key.verify(message, &signature).unwrap();
    }

    #[test]
    fn rejects_short_private_key() {
        assert!(Secp256k1KeyPair::from_private_key(&[1, 2, 3]).is_err());
    }
}

//! Bech32 account and validator addresses.
//!
//! Raw address bytes are always the 20-byte RIPEMD160(SHA256(pubkey))
//! digest (or its multisig analogue, see [`crate::keys`]); the textual
//! rendering is bech32 under a chain-configured prefix. Encoding is a pure
//! function of `(prefix, bytes)` and decoding rejects bad checksums.

use core::fmt;
use core::str::FromStr;

use bech32::{FromBase32, ToBase32, Variant};

use crate::error::Error;

/// Account and validator-operator addresses are 20 bytes long.
pub const ADDRESS_LENGTH: usize = 20;

/// Suffix appended to the account prefix for validator operator addresses.
pub const VALIDATOR_OPERATOR_SUFFIX: &str = "valoper";

/// Suffix appended to the account prefix for validator consensus addresses.
pub const VALIDATOR_CONSENSUS_SUFFIX: &str = "valcons";

/// Suffix appended to any address prefix for its public key rendering.
pub const PUBKEY_SUFFIX: &str = "pub";

pub fn encode_bech32(prefix: &str, data: &[u8]) -> Result<String, Error> {
    bech32::encode(prefix, data.to_base32(), Variant::Bech32)
        .map_err(|e| Error::bech32_encode(prefix.to_string(), e))
}

pub fn decode_bech32(input: &str) -> Result<(String, Vec<u8>), Error> {
    let (prefix, data, variant) =
        bech32::decode(input).map_err(|e| Error::bech32_decode(input.to_string(), e))?;

    if variant != Variant::Bech32 {
        return Err(Error::bech32_decode(
            input.to_string(),
            bech32::Error::InvalidChecksum,
        ));
    }

    let bytes = Vec::from_base32(&data).map_err(|e| Error::bech32_decode(input.to_string(), e))?;

    Ok((prefix, bytes))
}

/// Checks that `input` is a well-formed bech32 string under the expected
/// prefix with the expected total string length.
///
/// This is the cheap predicate used at API boundaries before values reach
/// the codec; it never allocates an error.
pub fn is_valid(input: &str, expected_prefix: &str, expected_length: usize) -> bool {
    if input.len() != expected_length {
        return false;
    }

    match decode_bech32(input) {
        Ok((prefix, _)) => prefix == expected_prefix,
        Err(_) => false,
    }
}

/// A raw 20-byte address paired with the bech32 prefix it renders under.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Address {
    prefix: String,
    bytes: Vec<u8>,
}

impl Address {
    pub fn new(prefix: impl Into<String>, bytes: Vec<u8>) -> Result<Self, Error> {
        let prefix = prefix.into();

        if bytes.len() != ADDRESS_LENGTH {
            return Err(Error::invalid_address_length(
                prefix,
                ADDRESS_LENGTH,
                bytes.len(),
            ));
        }

        Ok(Self { prefix, bytes })
    }

    /// Builds an address without the length check.
    ///
    /// Replaces the ambient validation toggle some SDKs carry; callers that
    /// need non-standard address material (tests, exotic chains) opt in
    /// here, explicitly.
    pub fn new_unchecked(prefix: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            prefix: prefix.into(),
            bytes,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_bech32(&self) -> Result<String, Error> {
        encode_bech32(&self.prefix, &self.bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_bech32() {
            Ok(encoded) => f.write_str(&encoded),
            Err(_) => Err(fmt::Error),
        }
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, bytes) = decode_bech32(s)?;

        if bytes.len() != ADDRESS_LENGTH {
            return Err(Error::invalid_address_length(
                s.to_string(),
                ADDRESS_LENGTH,
                bytes.len(),
            ));
        }

        Ok(Self { prefix, bytes })
    }
}

macro_rules! address_newtype {
    ($name:ident, $doc:literal, $matches:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, PartialEq, Eq, Hash)]
        pub struct $name(Address);

        impl $name {
            pub fn new(address: Address) -> Result<Self, Error> {
                let check: fn(&str) -> bool = $matches;
                if !check(address.prefix()) {
                    return Err(Error::invalid_address_prefix(
                        address.prefix().to_string(),
                        stringify!($name).to_string(),
                    ));
                }
                Ok(Self(address))
            }

            pub fn address(&self) -> &Address {
                &self.0
            }

            /// The `pub`-suffixed prefix this address class renders public
            /// keys under.
            pub fn pubkey_prefix(&self) -> String {
                format!("{}{}", self.0.prefix(), PUBKEY_SUFFIX)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(Address::from_str(s)?)
            }
        }
    };
}

address_newtype!(
    AccAddress,
    "An account address: bare chain prefix, 20 bytes.",
    |prefix| {
        !prefix.ends_with(VALIDATOR_OPERATOR_SUFFIX) && !prefix.ends_with(VALIDATOR_CONSENSUS_SUFFIX)
    }
);

address_newtype!(
    ValAddress,
    "A validator operator address: `<chain>valoper` prefix.",
    |prefix| prefix.ends_with(VALIDATOR_OPERATOR_SUFFIX)
);

address_newtype!(
    ValConsAddress,
    "A validator consensus address: `<chain>valcons` prefix.",
    |prefix| prefix.ends_with(VALIDATOR_CONSENSUS_SUFFIX)
);

impl AccAddress {
    /// The validator operator address with the same key material.
    pub fn to_val_address(&self) -> ValAddress {
        let prefix = format!("{}{}", self.0.prefix(), VALIDATOR_OPERATOR_SUFFIX);
        ValAddress(Address::new_unchecked(prefix, self.0.as_bytes().to_vec()))
    }
}

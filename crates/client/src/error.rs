//! This module defines the various errors raised by the codec and signing
//! core.
//!
//! Every conversion either returns a definite result or a definite,
//! specific error; no partially-decoded value is ever handed back.

use flex_error::{define_error, TraceError};

use crate::keyring;

define_error! {
    Error {
        Bech32Encode
            { prefix: String }
            [ TraceError<bech32::Error> ]
            |e| {
                format!("failed to bech32-encode under prefix '{}'", e.prefix)
            },

        Bech32Decode
            { input: String }
            [ TraceError<bech32::Error> ]
            |e| {
                format!("failed to decode bech32 string '{}'", e.input)
            },

        InvalidAddressLength
            {
                input: String,
                expected: usize,
                actual: usize,
            }
            |e| {
                format!("address '{}' has {} bytes, expected {}",
                    e.input, e.actual, e.expected)
            },

        InvalidAddressPrefix
            {
                prefix: String,
                expected: String,
            }
            |e| {
                format!("address prefix '{}' is not a valid {} prefix",
                    e.prefix, e.expected)
            },

        UnknownKeyType
            { discriminator: String }
            |e| {
                format!("unknown public key type discriminator '{}'", e.discriminator)
            },

        MalformedKeyData
            { reason: String }
            |e| {
                format!("malformed public key data: {}", e.reason)
            },

        InvalidCapacity
            { bits: usize }
            |e| {
                format!("a bit array must hold at least one bit, got {}", e.bits)
            },

        IndexOutOfRange
            {
                index: usize,
                capacity: usize,
            }
            |e| {
                format!("signer index {} out of range for a {}-member multisig",
                    e.index, e.capacity)
            },

        UnknownSigner
            { pubkey: String }
            |e| {
                format!("public key {} is not a member of the multisig", e.pubkey)
            },

        ZeroGasLimit
            |_| { "cannot derive gas prices from a zero gas limit" },

        InvalidCoin
            { input: String }
            |e| {
                format!("could not parse '{}' as a coin", e.input)
            },

        ProtobufEncode
            { payload_type: String }
            [ TraceError<prost::EncodeError> ]
            |e| {
                format!("error encoding protobuf message {}", e.payload_type)
            },

        ProtobufDecode
            { payload_type: String }
            [ TraceError<prost::DecodeError> ]
            |e| {
                format!("error decoding protobuf message {}", e.payload_type)
            },

        Base64Decode
            [ TraceError<subtle_encoding::Error> ]
            |_| { "error decoding base64 transaction bytes" },

        MalformedTx
            { reason: String }
            |e| {
                format!("malformed transaction: {}", e.reason)
            },

        UnknownMsgType
            { type_url: String }
            |e| {
                format!("no decoder registered for message type URL '{}'", e.type_url)
            },

        Json
            { payload_type: String }
            [ TraceError<serde_json::Error> ]
            |e| {
                format!("error serializing or parsing JSON form of {}", e.payload_type)
            },

        MalformedData
            {
                payload_type: String,
                reason: String,
            }
            |e| {
                format!("malformed Data JSON for {}: {}", e.payload_type, e.reason)
            },

        InvalidSignDoc
            { reason: String }
            |e| {
                format!("refusing to produce sign bytes: {}", e.reason)
            },

        IncompleteMultisig
            {
                threshold: u32,
                collected: usize,
            }
            |e| {
                format!("multisig has {} of {} required signatures",
                    e.collected, e.threshold)
            },

        IncompleteTx
            { missing: String }
            |e| {
                format!("transaction is not ready to sign: missing {}", e.missing)
            },

        SignatureCountMismatch
            {
                signer_infos: usize,
                signatures: usize,
            }
            |e| {
                format!("transaction carries {} signer infos but {} signatures",
                    e.signer_infos, e.signatures)
            },

        HashMismatch
            {
                expected: String,
                actual: String,
            }
            |e| {
                format!("re-encoded transaction hash {} does not match expected {}",
                    e.actual, e.expected)
            },

        KeyRing
            [ keyring::errors::Error ]
            |_| { "keyring error" },

        Signer
            {
                index: usize,
                encoding: String,
            }
            [ keyring::errors::Error ]
            |e| {
                format!("signer at index {} failed while producing a {} signature",
                    e.index, e.encoding)
            },
    }
}

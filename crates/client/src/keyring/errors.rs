use flex_error::{define_error, TraceError};

define_error! {
    Error {
        InvalidKey
            [ TraceError<k256::ecdsa::Error> ]
            |_| { "invalid key: could not build signing key from private key bytes" },

        InvalidKeyLength
            {
                expected: usize,
                actual: usize,
            }
            |e| {
                format!("invalid key length: expected {} bytes, got {}",
                    e.expected, e.actual)
            },

        SigningFailed
            [ TraceError<k256::ecdsa::Error> ]
            |_| { "failed to produce a signature" },

        PublicKeyMismatch
            {
                expected: Vec<u8>,
                actual: Vec<u8>,
            }
            |_| { "mismatch between the signing key and the expected public key" },
    }
}

//! Protobuf struct definitions for the subset of the Cosmos SDK wire schema
//! that transaction construction and signing needs.
//!
//! The files under `src/prost` are generated with `prost-build` from the
//! published `.proto` schema and checked in; field numbers and nesting are
//! owned by the upstream schema, not by this crate.

// This module setup is necessary because the generated code contains
// "super::" calls for dependencies.

#![deny(warnings, trivial_casts, trivial_numeric_casts, unused_import_braces)]
#![allow(clippy::large_enum_variant)]
#![forbid(unsafe_code)]

pub mod cosmos {
    pub mod base {
        pub mod v1beta1 {
            include!("prost/cosmos.base.v1beta1.rs");
        }
    }
    pub mod crypto {
        pub mod secp256k1 {
            include!("prost/cosmos.crypto.secp256k1.rs");
        }
        pub mod ed25519 {
            include!("prost/cosmos.crypto.ed25519.rs");
        }
        pub mod multisig {
            include!("prost/cosmos.crypto.multisig.rs");
            pub mod v1beta1 {
                include!("prost/cosmos.crypto.multisig.v1beta1.rs");
            }
        }
    }
    pub mod tx {
        pub mod v1beta1 {
            include!("prost/cosmos.tx.v1beta1.rs");
        }
        pub mod signing {
            pub mod v1beta1 {
                include!("prost/cosmos.tx.signing.v1beta1.rs");
            }
        }
    }
}

pub use prost_types::Any;

//! Transaction codec and signing core for Cosmos SDK chains.
//!
//! This crate implements the pieces of a chain client SDK that carry real
//! design weight: Bech32 address handling, the public key variants and
//! their address-derivation rules, legacy amino multisignature aggregation
//! over a compact bit array, canonical `SignDoc` construction for both
//! signing modes, and the three-way transaction encoding (protobuf binary,
//! legacy amino JSON, REST "Data" JSON).
//!
//! The core is synchronous, pure data transformation: it performs no I/O
//! and accepts gas-simulation results as plain input. Network transports
//! (blocking or async) are expected to layer on top of it.

#![forbid(unsafe_code)]
#![deny(trivial_casts, trivial_numeric_casts, unused_import_braces)]

pub mod address;
pub mod coin;
pub mod config;
pub mod error;
pub mod gas;
pub mod keyring;
pub mod keys;
pub mod multisig;
pub mod registry;
pub mod signing;
pub mod tx;

pub use error::Error;

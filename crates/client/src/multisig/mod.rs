//! Legacy amino multisig support: the signer bit array and the
//! aggregator that assembles member signatures into one multisig
//! signature.

pub mod aggregator;
pub mod bitarray;

pub use aggregator::MultiSignatureAggregator;
pub use bitarray::CompactBitArray;

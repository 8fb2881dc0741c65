//! Merkle airdrop toolkit.
//!
//! The off-chain builder turns a frozen list of `(index, account, amount)`
//! allocations into a Keccak-256 Merkle root plus one proof per record.
//! The claim side recomputes the path from a submitted triple and proof,
//! accepts it only against the published root, and consumes each index once.

pub mod adapters;
pub mod crypto;
pub mod distribution;
pub mod distributor;
pub mod domain;
pub mod ports;

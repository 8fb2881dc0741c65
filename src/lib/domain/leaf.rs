use alloy_primitives::{Address, B256, U256};

use crate::crypto::keccak::leaf_hash;

/// A leaf is the tree's representation of one allocation record.
/// leaf = keccak256(keccak256(index || account || amount))
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Leaf(pub B256);

impl Leaf {
    pub fn new(index: u64, account: Address, amount: U256) -> Self {
        Self(leaf_hash(index, account, amount))
    }
}

impl From<B256> for Leaf {
    fn from(value: B256) -> Self {
        Self(value)
    }
}

impl From<Leaf> for B256 {
    fn from(value: Leaf) -> Self {
        value.0
    }
}

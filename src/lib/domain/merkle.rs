//! Sorted-pair Keccak-256 Merkle tree over allocation leaves.
//!
//! Layer 0 holds the leaves in index order. Each layer above pairs adjacent
//! nodes with `hash_pair`. When a layer has odd length its last node has no
//! partner and is promoted to the next layer unchanged; proofs carry no
//! sibling for that layer. An empty tree has root `keccak256("")`.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use super::allocation::Allocation;
use crate::crypto::keccak::{empty_root, hash_pair, leaf_hash};

/// Inclusion proof: sibling hashes from the leaf layer upward, root excluded.
///
/// Layers where the node was promoted contribute nothing, so the length can
/// be shorter than the tree depth.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MerkleProof {
    pub siblings: Vec<B256>,
}

impl MerkleProof {
    pub fn len(&self) -> usize {
        self.siblings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.siblings.is_empty()
    }

    /// Verify that `leaf` is included in a tree with the given `root`.
    pub fn verify(&self, leaf: B256, root: B256) -> bool {
        verify_proof(&self.siblings, leaf, root)
    }
}

impl From<Vec<B256>> for MerkleProof {
    fn from(siblings: Vec<B256>) -> Self {
        Self { siblings }
    }
}

impl From<MerkleProof> for Vec<B256> {
    fn from(proof: MerkleProof) -> Self {
        proof.siblings
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("allocation at position {position} carries index {index}")]
    IndexMismatch { position: usize, index: u64 },
}

/// A fully materialized Merkle tree. All layers are kept for proof extraction.
#[derive(Debug, Clone)]
pub struct AirdropTree {
    /// `layers[0]` = leaves, last layer = `[root]`. Empty when there are no leaves.
    layers: Vec<Vec<B256>>,
}

impl AirdropTree {
    /// Build a tree from a frozen allocation set.
    ///
    /// Allocation `i` must carry index `i`; the index is part of the leaf, and
    /// a mismatch would make the published proofs unusable.
    pub fn from_allocations(allocations: &[Allocation]) -> Result<Self, TreeError> {
        let mut leaves = Vec::with_capacity(allocations.len());
        for (position, allocation) in allocations.iter().enumerate() {
            if allocation.index != position as u64 {
                return Err(TreeError::IndexMismatch {
                    position,
                    index: allocation.index,
                });
            }
            leaves.push(allocation.leaf().into());
        }
        Ok(Self::from_leaves(leaves))
    }

    /// Build a tree from pre-hashed leaves.
    pub fn from_leaves(leaves: Vec<B256>) -> Self {
        if leaves.is_empty() {
            return Self { layers: Vec::new() };
        }

        let mut layers = vec![leaves];
        loop {
            let prev = &layers[layers.len() - 1];
            if prev.len() <= 1 {
                break;
            }
            let next: Vec<B256> = prev
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => hash_pair(*left, *right),
                    [lone] => *lone,
                    _ => unreachable!("chunks(2) yields one or two nodes"),
                })
                .collect();
            layers.push(next);
        }

        Self { layers }
    }

    /// The Merkle root; `keccak256("")` for an empty tree.
    pub fn root(&self) -> B256 {
        self.layers
            .last()
            .and_then(|top| top.first())
            .copied()
            .unwrap_or_else(empty_root)
    }

    /// Number of leaves.
    pub fn len(&self) -> usize {
        self.layers.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of layers above the leaves.
    pub fn depth(&self) -> usize {
        self.layers.len().saturating_sub(1)
    }

    /// The leaf at `position`, if any.
    pub fn leaf(&self, position: usize) -> Option<B256> {
        self.layers.first()?.get(position).copied()
    }

    /// Generate the inclusion proof for the leaf at `position`.
    ///
    /// Returns `None` if the position is out of range.
    pub fn proof(&self, position: usize) -> Option<MerkleProof> {
        if position >= self.len() {
            return None;
        }

        let mut siblings = Vec::with_capacity(self.depth());
        let mut idx = position;

        for layer in &self.layers[..self.depth()] {
            // Partner in the pair; absent for a promoted node.
            if let Some(sibling) = layer.get(idx ^ 1) {
                siblings.push(*sibling);
            }
            idx /= 2;
        }

        Some(MerkleProof { siblings })
    }
}

/// Recompute the root from `leaf` and `siblings` and compare with `root`.
///
/// Pure: no state is read or written.
pub fn verify_proof(siblings: &[B256], leaf: B256, root: B256) -> bool {
    let computed = siblings
        .iter()
        .fold(leaf, |current, sibling| hash_pair(current, *sibling));
    computed == root
}

/// Verify an allocation triple against `root`.
pub fn verify_allocation(
    index: u64,
    account: Address,
    amount: U256,
    siblings: &[B256],
    root: B256,
) -> bool {
    verify_proof(siblings, leaf_hash(index, account, amount), root)
}

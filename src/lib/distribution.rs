//! Builder output: the root, the token total and one proof per recipient,
//! serialized as the JSON document handed to claimants and front-ends.

use std::path::Path;

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::allocation::{index_allocations, Allocation, AllocationError, AllocationInput};
use crate::domain::claim::Claim;
use crate::domain::merkle::{verify_allocation, AirdropTree, TreeError};

/// One recipient's entry in a distribution file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimEntry {
    pub index: u64,
    pub account: Address,
    pub amount: U256,
    pub proof: Vec<B256>,
}

impl ClaimEntry {
    pub fn allocation(&self) -> Allocation {
        Allocation::new(self.index, self.account, self.amount)
    }
}

impl From<ClaimEntry> for Claim {
    fn from(entry: ClaimEntry) -> Self {
        Claim {
            index: entry.index,
            account: entry.account,
            amount: entry.amount,
            proof: entry.proof,
        }
    }
}

/// A complete airdrop distribution, ordered by index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    pub merkle_root: B256,
    /// Sum of all amounts; what the distributor must be able to pay out.
    pub token_total: U256,
    pub claims: Vec<ClaimEntry>,
}

#[derive(Debug, thiserror::Error)]
pub enum DistributionError {
    #[error("allocation error: {0}")]
    Allocation(#[from] AllocationError),

    #[error("tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("token total overflows uint256")]
    TotalOverflow,

    #[error("proof for allocation {index} does not verify against the root")]
    InvalidProof { index: u64 },

    #[error("root mismatch: declared {declared}, rebuilt {rebuilt}")]
    RootMismatch { declared: B256, rebuilt: B256 },

    #[error("token total mismatch: declared {declared}, computed {computed}")]
    TotalMismatch { declared: U256, computed: U256 },

    #[error("failed to read or write file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse json: {0}")]
    Json(#[from] serde_json::Error),
}

fn sum_amounts<'a>(
    mut amounts: impl Iterator<Item = &'a U256>,
) -> Result<U256, DistributionError> {
    amounts.try_fold(U256::ZERO, |acc, amount| {
        acc.checked_add(*amount)
            .ok_or(DistributionError::TotalOverflow)
    })
}

impl Distribution {
    /// Build the tree over a frozen allocation set and extract every proof.
    pub fn build(allocations: &[Allocation]) -> Result<Self, DistributionError> {
        let tree = AirdropTree::from_allocations(allocations)?;
        let token_total = sum_amounts(allocations.iter().map(|a| &a.amount))?;

        let claims = allocations
            .iter()
            .enumerate()
            .map(|(position, a)| ClaimEntry {
                index: a.index,
                account: a.account,
                amount: a.amount,
                proof: tree
                    .proof(position)
                    .map(|p| p.siblings)
                    .unwrap_or_default(),
            })
            .collect();

        let distribution = Self {
            merkle_root: tree.root(),
            token_total,
            claims,
        };
        info!(
            root = %distribution.merkle_root,
            recipients = distribution.claims.len(),
            total = %distribution.token_total,
            "distribution built"
        );
        Ok(distribution)
    }

    /// Freeze raw input records and build.
    pub fn from_inputs(
        inputs: &[AllocationInput],
        decimals: u8,
    ) -> Result<Self, DistributionError> {
        let allocations = index_allocations(inputs, decimals)?;
        Self::build(&allocations)
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// The entry for `account`, if it is a recipient.
    pub fn claim_for(&self, account: Address) -> Option<&ClaimEntry> {
        self.claims.iter().find(|c| c.account == account)
    }

    /// A ready-to-submit claim for `account`.
    pub fn to_claim(&self, account: Address) -> Option<Claim> {
        self.claim_for(account).cloned().map(Claim::from)
    }

    /// Re-validate a distribution received from elsewhere.
    ///
    /// Checks that every proof verifies against the declared root, that the
    /// root rebuilt from the entries matches, and that the declared total is
    /// the sum of the amounts.
    pub fn verify(&self) -> Result<(), DistributionError> {
        for entry in &self.claims {
            if !verify_allocation(
                entry.index,
                entry.account,
                entry.amount,
                &entry.proof,
                self.merkle_root,
            ) {
                return Err(DistributionError::InvalidProof { index: entry.index });
            }
        }

        let allocations: Vec<Allocation> =
            self.claims.iter().map(ClaimEntry::allocation).collect();
        let rebuilt = AirdropTree::from_allocations(&allocations)?.root();
        if rebuilt != self.merkle_root {
            return Err(DistributionError::RootMismatch {
                declared: self.merkle_root,
                rebuilt,
            });
        }

        let computed = sum_amounts(self.claims.iter().map(|c| &c.amount))?;
        if computed != self.token_total {
            return Err(DistributionError::TotalMismatch {
                declared: self.token_total,
                computed,
            });
        }

        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, DistributionError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), DistributionError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Read a JSON array of allocation records.
pub fn load_allocations(path: &Path) -> Result<Vec<AllocationInput>, DistributionError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

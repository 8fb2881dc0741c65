use std::collections::HashSet;

use alloy_primitives::utils::parse_units;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use super::leaf::Leaf;

/// One recipient's entitlement. Immutable once the tree is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    /// Dense, 0-based position of the record in the frozen set.
    pub index: u64,
    pub account: Address,
    /// Amount in the token's smallest unit.
    pub amount: U256,
}

impl Allocation {
    pub fn new(index: u64, account: Address, amount: U256) -> Self {
        Self {
            index,
            account,
            amount,
        }
    }

    pub fn leaf(&self) -> Leaf {
        Leaf::new(self.index, self.account, self.amount)
    }
}

/// Raw allocation record as read from an allocation file.
///
/// `amount` is a decimal string in whole token units (`"2.5"`), scaled by the
/// token's decimals when the set is frozen. `index` is optional: records
/// without one are numbered by their position in the input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u64>,
    pub account: Address,
    pub amount: String,
}

impl AllocationInput {
    pub fn new(account: Address, amount: impl Into<String>) -> Self {
        Self {
            index: None,
            account,
            amount: amount.into(),
        }
    }

    pub fn with_index(index: u64, account: Address, amount: impl Into<String>) -> Self {
        Self {
            index: Some(index),
            account,
            amount: amount.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AllocationError {
    #[error("invalid amount {amount:?} for {account}: {reason}")]
    InvalidAmount {
        account: Address,
        amount: String,
        reason: String,
    },

    #[error("negative amount {amount:?} for {account}")]
    NegativeAmount { account: Address, amount: String },

    #[error("zero amount for {0}")]
    ZeroAmount(Address),

    #[error("duplicate account: {0}")]
    DuplicateAccount(Address),

    #[error("duplicate index: {0}")]
    DuplicateIndex(u64),

    #[error("indices must be dense from 0: expected {expected}, found {found}")]
    NonDenseIndex { expected: u64, found: u64 },

    #[error("either every record carries an index or none does")]
    MixedIndexing,
}

/// Scale a decimal token amount into base units.
///
/// Fails on malformed input, negative values and values that do not fit in
/// 256 bits. Nothing is ever truncated.
pub fn parse_amount(account: Address, amount: &str, decimals: u8) -> Result<U256, AllocationError> {
    let trimmed = amount.trim();
    let parsed =
        parse_units(trimmed, decimals).map_err(|e| AllocationError::InvalidAmount {
            account,
            amount: amount.to_string(),
            reason: e.to_string(),
        })?;
    if parsed.is_negative() {
        return Err(AllocationError::NegativeAmount {
            account,
            amount: amount.to_string(),
        });
    }
    Ok(parsed.get_absolute())
}

/// Freeze a list of raw records into the final, dense allocation set.
///
/// Unindexed input is numbered in iteration order. Pre-indexed input is
/// sorted by index and must cover exactly `0..n`.
pub fn index_allocations(
    inputs: &[AllocationInput],
    decimals: u8,
) -> Result<Vec<Allocation>, AllocationError> {
    let indexed = inputs.iter().filter(|i| i.index.is_some()).count();
    if indexed != 0 && indexed != inputs.len() {
        return Err(AllocationError::MixedIndexing);
    }

    let mut ordered: Vec<(u64, &AllocationInput)> = inputs
        .iter()
        .enumerate()
        .map(|(position, input)| (input.index.unwrap_or(position as u64), input))
        .collect();
    ordered.sort_by_key(|(index, _)| *index);

    let mut seen = HashSet::with_capacity(ordered.len());
    let mut allocations = Vec::with_capacity(ordered.len());

    for (expected, (index, input)) in ordered.into_iter().enumerate() {
        let expected = expected as u64;
        if index != expected {
            return Err(if index < expected {
                AllocationError::DuplicateIndex(index)
            } else {
                AllocationError::NonDenseIndex {
                    expected,
                    found: index,
                }
            });
        }
        if !seen.insert(input.account) {
            return Err(AllocationError::DuplicateAccount(input.account));
        }

        let amount = parse_amount(input.account, &input.amount, decimals)?;
        if amount.is_zero() {
            return Err(AllocationError::ZeroAmount(input.account));
        }
        allocations.push(Allocation::new(index, input.account, amount));
    }

    Ok(allocations)
}

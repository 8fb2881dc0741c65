use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// A claim submitted by a recipient: the allocation triple plus its proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub index: u64,
    pub account: Address,
    pub amount: U256,
    pub proof: Vec<B256>,
}

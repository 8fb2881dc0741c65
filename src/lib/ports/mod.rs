pub mod auth;
pub mod claims;
pub mod token;

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// Receipt for a token credit performed by a `TokenSink`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditReceipt {
    /// Identifier of the credit operation (transaction hash on a real chain).
    pub tx_hash: B256,
    pub account: Address,
    pub amount: U256,
}

/// Record of an accepted claim, the `Claimed` event of a distributor contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimReceipt {
    pub index: u64,
    pub account: Address,
    pub amount: U256,
    pub credit: CreditReceipt,
}

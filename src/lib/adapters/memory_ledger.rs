use std::collections::HashSet;
use tokio::sync::Mutex;

use crate::ports::claims::{ClaimLedger, LedgerError};

/// In-memory implementation of `ClaimLedger` for PoC and testing.
///
/// A single mutex guards the set, so check-and-insert in `mark_claimed` is
/// atomic across tasks.
pub struct InMemoryClaimLedger {
    claimed: Mutex<HashSet<u64>>,
}

impl InMemoryClaimLedger {
    pub fn new() -> Self {
        Self {
            claimed: Mutex::new(HashSet::new()),
        }
    }
}

impl Default for InMemoryClaimLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimLedger for InMemoryClaimLedger {
    async fn is_claimed(&self, index: u64) -> Result<bool, LedgerError> {
        Ok(self.claimed.lock().await.contains(&index))
    }

    async fn mark_claimed(&self, index: u64) -> Result<bool, LedgerError> {
        Ok(self.claimed.lock().await.insert(index))
    }

    async fn release(&self, index: u64) -> Result<(), LedgerError> {
        if self.claimed.lock().await.remove(&index) {
            Ok(())
        } else {
            Err(LedgerError::NotClaimed(index))
        }
    }

    async fn claimed_count(&self) -> Result<usize, LedgerError> {
        Ok(self.claimed.lock().await.len())
    }
}

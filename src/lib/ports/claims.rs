use std::future::Future;

/// Port for the append-only set of consumed allocation indices.
///
/// `mark_claimed` is the serialization point for concurrent claims: it must
/// check and insert atomically, so that of two racing callers exactly one
/// observes `true`.
///
/// Implementations:
/// - `InMemoryClaimLedger` (for PoC/testing)
pub trait ClaimLedger: Send + Sync {
    /// Whether `index` has already been consumed.
    fn is_claimed(&self, index: u64) -> impl Future<Output = Result<bool, LedgerError>> + Send;

    /// Atomically consume `index`. Returns `false` if it was already consumed.
    fn mark_claimed(&self, index: u64) -> impl Future<Output = Result<bool, LedgerError>> + Send;

    /// Undo a mark whose claim did not complete (the credit failed).
    fn release(&self, index: u64) -> impl Future<Output = Result<(), LedgerError>> + Send;

    /// Number of consumed indices.
    fn claimed_count(&self) -> impl Future<Output = Result<usize, LedgerError>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("index {0} is not marked as claimed")]
    NotClaimed(u64),

    #[error("internal ledger error: {0}")]
    Internal(String),
}

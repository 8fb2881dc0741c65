use std::sync::OnceLock;

use alloy_primitives::{Address, B256};
use tracing::{debug, error, info, warn};

use crate::domain::claim::Claim;
use crate::domain::merkle::verify_allocation;
use crate::ports::auth::Authorizer;
use crate::ports::claims::{ClaimLedger, LedgerError};
use crate::ports::token::{TokenError, TokenSink};
use crate::ports::ClaimReceipt;

/// Error type for root publication and claim processing.
#[derive(Debug, thiserror::Error)]
pub enum DistributorError {
    #[error("merkle root has not been published")]
    RootNotPublished,

    #[error("merkle root already published: {0}")]
    RootAlreadyPublished(B256),

    #[error("refusing to publish the zero root")]
    ZeroRoot,

    #[error("caller {0} is not authorized")]
    Unauthorized(Address),

    #[error("allocation {0} already claimed")]
    AlreadyClaimed(u64),

    #[error("invalid proof for allocation {index}")]
    InvalidProof { index: u64 },

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// The credit failed and the index could not be released either. The
    /// index stays consumed until an operator releases it.
    #[error("credit failed ({token}); index {index} left consumed: {release}")]
    CreditFailed {
        index: u64,
        token: TokenError,
        release: LedgerError,
    },
}

/// Claim-side verifier of a Merkle airdrop.
///
/// Holds the trusted root (set once), the claimed-set and the token the
/// allocations are paid in. Generic over `ClaimLedger` (claimed-set),
/// `TokenSink` (credit side effect) and `Authorizer` (who may publish).
pub struct MerkleDistributor<L: ClaimLedger, T: TokenSink, A: Authorizer> {
    ledger: L,
    token: T,
    authorizer: A,
    root: OnceLock<B256>,
}

impl<L: ClaimLedger, T: TokenSink, A: Authorizer> MerkleDistributor<L, T, A> {
    pub fn new(ledger: L, token: T, authorizer: A) -> Self {
        Self {
            ledger,
            token,
            authorizer,
            root: OnceLock::new(),
        }
    }

    /// Publish the Builder's root. Succeeds exactly once, for an authorized caller.
    pub fn publish_root(&self, caller: Address, root: B256) -> Result<(), DistributorError> {
        if !self.authorizer.is_authorized(caller) {
            warn!(%caller, "unauthorized root publication");
            return Err(DistributorError::Unauthorized(caller));
        }
        if root == B256::ZERO {
            return Err(DistributorError::ZeroRoot);
        }
        self.root.set(root).map_err(|_| {
            // OnceLock::set only fails once a value is present.
            let existing = self.root.get().copied().unwrap_or_default();
            DistributorError::RootAlreadyPublished(existing)
        })?;

        info!(%root, "merkle root published");
        Ok(())
    }

    /// The published root, if any.
    pub fn root(&self) -> Option<B256> {
        self.root.get().copied()
    }

    pub async fn is_claimed(&self, index: u64) -> Result<bool, DistributorError> {
        Ok(self.ledger.is_claimed(index).await?)
    }

    pub async fn claimed_count(&self) -> Result<usize, DistributorError> {
        Ok(self.ledger.claimed_count().await?)
    }

    pub fn token(&self) -> &T {
        &self.token
    }

    /// Process a claim.
    ///
    /// - Root must be published.
    /// - An already consumed index is rejected before any hashing.
    /// - An invalid proof is rejected with no state touched.
    /// - The index is then consumed atomically; a racing claim for the same
    ///   index loses here and gets `AlreadyClaimed`.
    /// - Finally the token is credited. If that fails the index is released
    ///   so the claim can be retried, as a reverted transaction would. If the
    ///   release fails too, `CreditFailed` carries both errors.
    pub async fn claim(&self, claim: Claim) -> Result<ClaimReceipt, DistributorError> {
        let root = self.root().ok_or(DistributorError::RootNotPublished)?;
        let Claim {
            index,
            account,
            amount,
            proof,
        } = claim;

        if self.ledger.is_claimed(index).await? {
            debug!(index, %account, "claim rejected: already claimed");
            return Err(DistributorError::AlreadyClaimed(index));
        }

        if !verify_allocation(index, account, amount, &proof, root) {
            debug!(index, %account, "claim rejected: invalid proof");
            return Err(DistributorError::InvalidProof { index });
        }

        if !self.ledger.mark_claimed(index).await? {
            debug!(index, %account, "claim rejected: lost race");
            return Err(DistributorError::AlreadyClaimed(index));
        }

        let credit = match self.token.credit(account, amount).await {
            Ok(credit) => credit,
            Err(e) => {
                warn!(index, %account, error = %e, "credit failed, releasing claim");
                if let Err(release) = self.ledger.release(index).await {
                    error!(
                        index,
                        %account,
                        error = %release,
                        "release failed, index left consumed"
                    );
                    return Err(DistributorError::CreditFailed {
                        index,
                        token: e,
                        release,
                    });
                }
                return Err(e.into());
            }
        };

        info!(index, %account, %amount, "claimed");
        Ok(ClaimReceipt {
            index,
            account,
            amount,
            credit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory_ledger::InMemoryClaimLedger;
    use crate::adapters::memory_token::InMemoryToken;
    use crate::adapters::owner::OwnerAuthorizer;
    use crate::domain::allocation::Allocation;
    use crate::domain::merkle::AirdropTree;
    use alloy_primitives::U256;

    type TestDistributor = MerkleDistributor<InMemoryClaimLedger, InMemoryToken, OwnerAuthorizer>;

    fn owner() -> Address {
        Address::repeat_byte(0x0A)
    }

    fn fixture(n: usize) -> (Vec<Allocation>, AirdropTree) {
        let allocations: Vec<Allocation> = (0..n)
            .map(|i| {
                Allocation::new(
                    i as u64,
                    Address::repeat_byte(0x10 + i as u8),
                    U256::from(1_000u64 * (i as u64 + 1)),
                )
            })
            .collect();
        let tree = AirdropTree::from_allocations(&allocations).unwrap();
        (allocations, tree)
    }

    fn distributor() -> TestDistributor {
        MerkleDistributor::new(
            InMemoryClaimLedger::new(),
            InMemoryToken::new(),
            OwnerAuthorizer::new(owner()),
        )
    }

    fn claim_for(allocation: &Allocation, tree: &AirdropTree) -> Claim {
        Claim {
            index: allocation.index,
            account: allocation.account,
            amount: allocation.amount,
            proof: tree.proof(allocation.index as usize).unwrap().siblings,
        }
    }

    #[test]
    fn test_publish_root_once() {
        let d = distributor();
        let root = B256::repeat_byte(0x01);

        d.publish_root(owner(), root).unwrap();
        assert_eq!(d.root(), Some(root));

        let err = d.publish_root(owner(), B256::repeat_byte(0x02)).unwrap_err();
        assert!(matches!(err, DistributorError::RootAlreadyPublished(r) if r == root));
        assert_eq!(d.root(), Some(root));
    }

    #[test]
    fn test_publish_root_requires_owner() {
        let d = distributor();
        let stranger = Address::repeat_byte(0x0B);
        let err = d.publish_root(stranger, B256::repeat_byte(0x01)).unwrap_err();
        assert!(matches!(err, DistributorError::Unauthorized(a) if a == stranger));
        assert!(d.root().is_none());
    }

    #[test]
    fn test_publish_zero_root_rejected() {
        let d = distributor();
        let err = d.publish_root(owner(), B256::ZERO).unwrap_err();
        assert!(matches!(err, DistributorError::ZeroRoot));
        assert!(d.root().is_none());
    }

    #[tokio::test]
    async fn claim_before_root_rejected() {
        let (allocations, tree) = fixture(3);
        let d = distributor();

        let err = d.claim(claim_for(&allocations[0], &tree)).await.unwrap_err();
        assert!(matches!(err, DistributorError::RootNotPublished));
        assert!(!d.is_claimed(0).await.unwrap());
    }

    #[tokio::test]
    async fn valid_claim_credits_once() {
        let (allocations, tree) = fixture(3);
        let d = distributor();
        d.publish_root(owner(), tree.root()).unwrap();

        let a = &allocations[1];
        let receipt = d.claim(claim_for(a, &tree)).await.unwrap();
        assert_eq!(receipt.index, 1);
        assert_eq!(receipt.amount, a.amount);
        assert_eq!(receipt.credit.account, a.account);
        assert!(d.is_claimed(1).await.unwrap());
        assert_eq!(d.token().balance_of(a.account).await.unwrap(), a.amount);

        let err = d.claim(claim_for(a, &tree)).await.unwrap_err();
        assert!(matches!(err, DistributorError::AlreadyClaimed(1)));
        assert_eq!(d.token().balance_of(a.account).await.unwrap(), a.amount);
    }

    #[tokio::test]
    async fn invalid_proof_leaves_no_trace() {
        let (allocations, tree) = fixture(4);
        let d = distributor();
        d.publish_root(owner(), tree.root()).unwrap();

        let mut claim = claim_for(&allocations[2], &tree);
        claim.amount += U256::from(1u64);

        let err = d.claim(claim).await.unwrap_err();
        assert!(matches!(err, DistributorError::InvalidProof { index: 2 }));
        assert!(!d.is_claimed(2).await.unwrap());
        assert_eq!(d.token().total_supply().await, U256::ZERO);

        // The honest claim still goes through afterwards.
        d.claim(claim_for(&allocations[2], &tree)).await.unwrap();
    }

    #[tokio::test]
    async fn already_claimed_short_circuits_before_proof() {
        let (allocations, tree) = fixture(2);
        let d = distributor();
        d.publish_root(owner(), tree.root()).unwrap();
        d.claim(claim_for(&allocations[0], &tree)).await.unwrap();

        // A garbage proof for a consumed index reports AlreadyClaimed, not InvalidProof.
        let mut claim = claim_for(&allocations[0], &tree);
        claim.proof = vec![B256::repeat_byte(0xEE)];
        let err = d.claim(claim).await.unwrap_err();
        assert!(matches!(err, DistributorError::AlreadyClaimed(0)));
    }

    #[tokio::test]
    async fn failed_credit_releases_index() {
        let (allocations, tree) = fixture(2);
        let d = MerkleDistributor::new(
            InMemoryClaimLedger::new(),
            InMemoryToken::with_cap(U256::from(1u64)),
            OwnerAuthorizer::new(owner()),
        );
        d.publish_root(owner(), tree.root()).unwrap();

        let err = d.claim(claim_for(&allocations[0], &tree)).await.unwrap_err();
        assert!(matches!(
            err,
            DistributorError::Token(TokenError::CapExceeded { .. })
        ));
        assert!(!d.is_claimed(0).await.unwrap());
        assert_eq!(d.claimed_count().await.unwrap(), 0);
    }

    /// Ledger whose `release` always fails, backed by a working in-memory set.
    struct StuckLedger(InMemoryClaimLedger);

    impl ClaimLedger for StuckLedger {
        async fn is_claimed(&self, index: u64) -> Result<bool, LedgerError> {
            self.0.is_claimed(index).await
        }

        async fn mark_claimed(&self, index: u64) -> Result<bool, LedgerError> {
            self.0.mark_claimed(index).await
        }

        async fn release(&self, _index: u64) -> Result<(), LedgerError> {
            Err(LedgerError::Internal("store unavailable".into()))
        }

        async fn claimed_count(&self) -> Result<usize, LedgerError> {
            self.0.claimed_count().await
        }
    }

    #[tokio::test]
    async fn failed_release_keeps_credit_error() {
        let (allocations, tree) = fixture(2);
        let d = MerkleDistributor::new(
            StuckLedger(InMemoryClaimLedger::new()),
            InMemoryToken::with_cap(U256::from(1u64)),
            OwnerAuthorizer::new(owner()),
        );
        d.publish_root(owner(), tree.root()).unwrap();

        let err = d.claim(claim_for(&allocations[0], &tree)).await.unwrap_err();
        match err {
            DistributorError::CreditFailed {
                index,
                token,
                release,
            } => {
                assert_eq!(index, 0);
                assert!(matches!(token, TokenError::CapExceeded { .. }));
                assert!(matches!(release, LedgerError::Internal(_)));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(d.is_claimed(0).await.unwrap());
        assert_eq!(d.token().balance_of(allocations[0].account).await.unwrap(), U256::ZERO);
    }
}

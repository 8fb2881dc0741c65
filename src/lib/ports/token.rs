use alloy_primitives::{Address, U256};
use std::future::Future;

use super::CreditReceipt;

/// Port for the downstream effect of an accepted claim: minting or
/// transferring `amount` tokens to `account`.
///
/// Implementations:
/// - `InMemoryToken` (for PoC/testing)
pub trait TokenSink: Send + Sync {
    fn credit(
        &self,
        account: Address,
        amount: U256,
    ) -> impl Future<Output = Result<CreditReceipt, TokenError>> + Send;

    fn balance_of(&self, account: Address) -> impl Future<Output = Result<U256, TokenError>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("supply cap exceeded: cap {cap}, requested total {requested}")]
    CapExceeded { cap: U256, requested: U256 },

    #[error("balance overflow for {0}")]
    Overflow(Address),

    #[error("token error: {0}")]
    Internal(String),
}

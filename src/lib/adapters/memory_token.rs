use alloy_primitives::{keccak256, Address, U256};
use std::collections::HashMap;
use tokio::sync::Mutex;

use crate::ports::token::{TokenError, TokenSink};
use crate::ports::CreditReceipt;

#[derive(Default)]
struct Ledger {
    balances: HashMap<Address, U256>,
    total_supply: U256,
    nonce: u64,
}

/// Minimal mintable token for PoC and testing.
///
/// Each credit mints new supply. An optional cap bounds the total supply,
/// standing in for a distributor whose funding runs out.
pub struct InMemoryToken {
    cap: Option<U256>,
    state: Mutex<Ledger>,
}

impl InMemoryToken {
    pub fn new() -> Self {
        Self {
            cap: None,
            state: Mutex::new(Ledger::default()),
        }
    }

    pub fn with_cap(cap: U256) -> Self {
        Self {
            cap: Some(cap),
            state: Mutex::new(Ledger::default()),
        }
    }

    pub async fn total_supply(&self) -> U256 {
        self.state.lock().await.total_supply
    }
}

impl Default for InMemoryToken {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenSink for InMemoryToken {
    async fn credit(&self, account: Address, amount: U256) -> Result<CreditReceipt, TokenError> {
        let mut state = self.state.lock().await;

        let requested = state
            .total_supply
            .checked_add(amount)
            .ok_or(TokenError::Overflow(account))?;
        if let Some(cap) = self.cap {
            if requested > cap {
                return Err(TokenError::CapExceeded { cap, requested });
            }
        }
        let balance = state.balances.get(&account).copied().unwrap_or_default();
        let new_balance = balance
            .checked_add(amount)
            .ok_or(TokenError::Overflow(account))?;

        state.balances.insert(account, new_balance);
        state.total_supply = requested;
        state.nonce += 1;

        let mut preimage = Vec::with_capacity(8 + 20 + 32);
        preimage.extend_from_slice(&state.nonce.to_be_bytes());
        preimage.extend_from_slice(account.as_slice());
        preimage.extend_from_slice(&amount.to_be_bytes::<32>());

        Ok(CreditReceipt {
            tx_hash: keccak256(preimage),
            account,
            amount,
        })
    }

    async fn balance_of(&self, account: Address) -> Result<U256, TokenError> {
        Ok(self
            .state
            .lock()
            .await
            .balances
            .get(&account)
            .copied()
            .unwrap_or_default())
    }
}

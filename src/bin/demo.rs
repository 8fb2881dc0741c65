//! Merkle Airdrop Demo
//!
//! Builds the tree for five recipients, publishes the root into an
//! in-memory distributor and walks through accepted and rejected claims.
//!
//! Run with: `cargo run --bin demo`

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use anyhow::{ensure, Context, Result};

use merkle_airdrop::adapters::memory_ledger::InMemoryClaimLedger;
use merkle_airdrop::adapters::memory_token::InMemoryToken;
use merkle_airdrop::adapters::owner::OwnerAuthorizer;
use merkle_airdrop::distribution::Distribution;
use merkle_airdrop::distributor::{DistributorError, MerkleDistributor};
use merkle_airdrop::domain::allocation::AllocationInput;

const DECIMALS: u8 = 18;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .without_time()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    println!("=== Merkle Airdrop Demo ===\n");

    // ── Phase 1: Build ──
    println!("[Build] Freezing allocations...");
    let records = [
        (0x11, "5"),
        (0x22, "2.5"),
        (0x33, "3"),
        (0x44, "5"),
        (0x55, "10"),
    ];
    let inputs: Vec<AllocationInput> = records
        .into_iter()
        .map(|(byte, amount)| AllocationInput::new(Address::repeat_byte(byte), amount))
        .collect();
    let distribution = Distribution::from_inputs(&inputs, DECIMALS)?;
    distribution.verify()?;
    for entry in &distribution.claims {
        println!(
            "  #{} {} amount={} proof_len={}",
            entry.index,
            entry.account,
            entry.amount,
            entry.proof.len()
        );
    }
    println!("  root:  {}", distribution.merkle_root);
    println!("  total: {}", distribution.token_total);

    // ── Phase 2: Publish ──
    println!("\n[Publish] Owner publishes the root...");
    let owner = Address::repeat_byte(0x0A);
    let distributor = Arc::new(MerkleDistributor::new(
        InMemoryClaimLedger::new(),
        InMemoryToken::with_cap(distribution.token_total),
        OwnerAuthorizer::new(owner),
    ));
    let stranger = Address::repeat_byte(0x0B);
    let rejected = distributor.publish_root(stranger, distribution.merkle_root);
    println!("  stranger: {}", describe(&rejected));
    distributor.publish_root(owner, distribution.merkle_root)?;
    println!("  owner:    published");

    // ── Phase 3: Claim ──
    println!("\n[Claim] Every recipient claims concurrently...");
    let mut handles = Vec::new();
    for entry in distribution.claims.iter().cloned() {
        let distributor = distributor.clone();
        handles.push(tokio::spawn(async move { distributor.claim(entry.into()).await }));
    }
    for handle in handles {
        let receipt = handle.await.context("claim task panicked")??;
        println!("  #{} credited {} to {}", receipt.index, receipt.amount, receipt.account);
    }

    println!("\n[Claim] Replays and forgeries...");
    let first = distribution.claims[0].clone();
    let replay = distributor.claim(first.clone().into()).await;
    println!("  replay of #0:      {}", describe(&replay));
    ensure!(matches!(replay, Err(DistributorError::AlreadyClaimed(0))));

    let mut inflated = distribution.claims[1].clone();
    inflated.index = 7;
    inflated.amount += U256::from(1u64);
    let forged = distributor.claim(inflated.into()).await;
    println!("  forged index #7:   {}", describe(&forged));
    ensure!(matches!(forged, Err(DistributorError::InvalidProof { index: 7 })));

    // ── Summary ──
    let supply = distributor.token().total_supply().await;
    println!("\n[Summary]");
    println!("  claimed: {}/{}", distributor.claimed_count().await?, distribution.len());
    println!("  minted:  {supply}");
    ensure!(supply == distribution.token_total, "minted supply must equal the token total");

    println!("\n=== Demo completed successfully ===");
    Ok(())
}

fn describe<T>(result: &Result<T, DistributorError>) -> String {
    match result {
        Ok(_) => "accepted".to_string(),
        Err(e) => format!("rejected ({e})"),
    }
}

//! Airdrop builder CLI.
//!
//! - `build`: freeze the allocation file, build the tree and write the
//!   distribution (root, total, one proof per recipient).
//! - `verify`: independently re-check a distribution file.
//! - `proof`: print the claim payload for one account.

mod config;

use std::path::{Path, PathBuf};

use alloy_primitives::Address;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use merkle_airdrop::distribution::{load_allocations, Distribution};

use config::AirdropConfig;

#[derive(Parser)]
#[command(name = "airdrop")]
#[command(about = "Build and check Merkle airdrop distributions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a distribution from the configured allocation file
    Build {
        /// Path to the TOML configuration file.
        #[arg(long, default_value = "./airdrop.toml")]
        config: PathBuf,
        /// Override the configured allocation file
        #[arg(long)]
        input: Option<PathBuf>,
        /// Override the configured distribution file
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Verify every proof, the root and the total of a distribution file
    Verify {
        #[arg(long)]
        distribution: PathBuf,
    },

    /// Print the claim for one account as JSON
    Proof {
        #[arg(long)]
        distribution: PathBuf,
        #[arg(long)]
        account: Address,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Build {
            config,
            input,
            output,
        } => build(&config, input, output),
        Commands::Verify { distribution } => verify(&distribution),
        Commands::Proof {
            distribution,
            account,
        } => proof(&distribution, account),
    }
}

fn build(config_path: &Path, input: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let config = AirdropConfig::load(config_path)
        .and_then(|config| config.with_overrides(input, output))
        .with_context(|| format!("loading {}", config_path.display()))?;
    let input = &config.campaign.input;
    let output = &config.campaign.output;

    info!("Reading allocations from {}", input.display());
    let inputs = load_allocations(input)?;
    let distribution = Distribution::from_inputs(&inputs, config.token.decimals)?;
    distribution.save(output)?;

    info!("  Recipients:  {}", distribution.len());
    info!(
        "  Total:       {} (base units of {}, {} decimals)",
        distribution.token_total, config.token.symbol, config.token.decimals
    );
    info!("  Merkle root: {}", distribution.merkle_root);
    info!("  Owner:       {}", config.campaign.owner);
    info!("Wrote {}", output.display());
    Ok(())
}

fn verify(path: &Path) -> Result<()> {
    let distribution = Distribution::load(path)?;
    distribution
        .verify()
        .with_context(|| format!("{} failed verification", path.display()))?;
    info!(
        "OK: {} claims verify against {}",
        distribution.len(),
        distribution.merkle_root
    );
    Ok(())
}

fn proof(path: &Path, account: Address) -> Result<()> {
    let distribution = Distribution::load(path)?;
    let Some(claim) = distribution.to_claim(account) else {
        bail!("{account} is not a recipient in {}", path.display());
    };
    println!("{}", serde_json::to_string_pretty(&claim)?);
    Ok(())
}

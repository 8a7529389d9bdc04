//! Merkle root verification binary
//!
//! Opens a block store and checks the transaction Merkle root of every block
//! on every chain. Mismatches are logged; they do not change the exit status.

use clap::Parser;
use merkle_verify::{
    config::ConfigLoader,
    errors::VerifyResult,
    BlockStore, HashEncoding, LogSink, MerkleVerifier, RocksBlockStore, VerifyConfig,
};
use std::path::PathBuf;

/// Block store Merkle root verifier
#[derive(Parser, Debug)]
#[command(name = "merkle-verify")]
#[command(about = "Recompute block Merkle roots and report mismatches")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data directory of the block store
    #[arg(short, long)]
    data_dir: Option<String>,

    /// Encoding of stored hashes (binary or hex)
    #[arg(long)]
    hash_encoding: Option<HashEncoding>,

    /// Only verify this chain
    #[arg(long)]
    chain: Option<u64>,

    /// Print the final totals as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn apply(&self, config: &mut VerifyConfig) {
        if let Some(data_dir) = &self.data_dir {
            config.storage.data_directory = data_dir.clone();
        }
        if let Some(encoding) = self.hash_encoding {
            config.storage.hash_encoding = encoding;
        }
        if self.chain.is_some() {
            config.verification.chain_id = self.chain;
        }
    }
}

fn main() -> VerifyResult<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_path(path);
    }
    let config = loader.load_with(|config| cli.apply(config))?;

    log::debug!(
        "opening block store at {} ({} hashes)",
        config.storage.data_directory,
        config.storage.hash_encoding
    );
    let store = RocksBlockStore::open_with_config(&config.storage)?;

    let total = run(&store, &config)?;

    if cli.json {
        match serde_json::to_string(&total) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("failed to encode totals: {}", e),
        }
    }

    Ok(())
}

fn run<S: BlockStore + ?Sized>(
    store: &S,
    config: &VerifyConfig,
) -> VerifyResult<merkle_verify::VerificationResult> {
    let mut verifier = MerkleVerifier::with_config(store, LogSink::new(), &config.verification);
    match config.verification.chain_id {
        Some(chain_id) => verifier.verify_chains(&[chain_id]),
        None => verifier.verify_all(),
    }
}

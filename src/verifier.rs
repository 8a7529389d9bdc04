//! Merkle root verification over a block store
//!
//! Recomputes every block's transaction Merkle root and compares it with the
//! recorded one. Mismatches are reported to the diagnostic sink and counted;
//! only store failures end a run early.

use crate::common::traits::{BlockStore, DiagnosticLevel, DiagnosticSink};
use crate::common::types::{BlockRecord, ChainId, Hash32, VerificationResult};
use crate::config::{VerificationConfig, DEFAULT_PROGRESS_INTERVAL};
use crate::errors::VerifyResult;
use crate::merkle::transactions_root;

pub struct MerkleVerifier<'a, S: BlockStore + ?Sized, D: DiagnosticSink> {
    store: &'a S,
    sink: D,
    progress_interval: u64,
}

impl<'a, S: BlockStore + ?Sized, D: DiagnosticSink> MerkleVerifier<'a, S, D> {
    pub fn new(store: &'a S, sink: D) -> Self {
        Self {
            store,
            sink,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
        }
    }

    pub fn with_config(store: &'a S, sink: D, config: &VerificationConfig) -> Self {
        Self::new(store, sink).progress_interval(config.progress_interval)
    }

    /// Blocks between progress diagnostics; zero is treated as one
    pub fn progress_interval(mut self, blocks: u64) -> Self {
        self.progress_interval = blocks.max(1);
        self
    }

    pub fn sink(&self) -> &D {
        &self.sink
    }

    pub fn into_sink(self) -> D {
        self.sink
    }

    /// Verify every chain in the store and report the combined totals
    pub fn verify_all(&mut self) -> VerifyResult<VerificationResult> {
        let chain_ids = self.store.list_chain_ids()?;
        self.verify_chains(&chain_ids)
    }

    /// Verify the given chains in order and report the combined totals
    pub fn verify_chains(&mut self, chain_ids: &[ChainId]) -> VerifyResult<VerificationResult> {
        let mut total = VerificationResult::default();

        for &chain_id in chain_ids {
            self.sink
                .emit(DiagnosticLevel::Info, format_args!("checking chain {}", chain_id));
            total += self.verify_chain(chain_id)?;
        }

        self.sink.emit(
            DiagnosticLevel::Info,
            format_args!("All chains: {} Merkle trees, {} bad", total.checked, total.bad),
        );
        Ok(total)
    }

    /// Verify every block that belongs to `chain_id`
    pub fn verify_chain(&mut self, chain_id: ChainId) -> VerifyResult<VerificationResult> {
        let mut result = VerificationResult::default();

        for block in self.store.list_blocks_for_chain(chain_id)? {
            if !self.verify_block(&block)? {
                result.bad += 1;
            }
            result.checked += 1;

            if result.checked % self.progress_interval == 0 {
                self.report_progress(&result);
            }
        }

        if result.checked % self.progress_interval > 0 {
            self.report_progress(&result);
        }

        Ok(result)
    }

    /// Recompute one block's root and compare it with the recorded values.
    ///
    /// Returns whether the root matched. A count mismatch is only reported.
    pub fn verify_block(&mut self, block: &BlockRecord) -> VerifyResult<bool> {
        let recorded_root = self.store.canonicalize_hash(&block.merkle_root)?;

        let tx_hashes = self
            .store
            .list_tx_hashes_for_block(block.block_id)?
            .iter()
            .map(|stored| self.store.canonicalize_hash(stored))
            .collect::<VerifyResult<Vec<Hash32>>>()?;

        if tx_hashes.len() as u64 != block.num_tx {
            self.sink.emit(
                DiagnosticLevel::Warning,
                format_args!(
                    "block {}: block_num_tx={} but found {}",
                    block.block_id,
                    block.num_tx,
                    tx_hashes.len()
                ),
            );
        }

        let root_matches = transactions_root(&tx_hashes) == recorded_root;
        if !root_matches {
            self.sink.emit(
                DiagnosticLevel::Error,
                format_args!("block {}: block_hashMerkleRoot mismatch.", block.block_id),
            );
        }

        Ok(root_matches)
    }

    fn report_progress(&mut self, result: &VerificationResult) {
        self.sink.emit(
            DiagnosticLevel::Info,
            format_args!("{} Merkle trees, {} bad", result.checked, result.bad),
        );
    }
}

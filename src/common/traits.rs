//! Shared traits and interfaces
//!
//! The verifier only talks to its collaborators through these two traits, so
//! any backing store or diagnostic destination can be plugged in.

use crate::common::types::{BlockId, BlockRecord, ChainId, Hash32, StoredHash};
use crate::errors::VerifyResult;
use std::fmt;

/// Read-only access to chains, blocks and their transaction hashes
pub trait BlockStore {
    /// All chain identifiers known to the store
    fn list_chain_ids(&self) -> VerifyResult<Vec<ChainId>>;

    /// Every block that is a candidate member of `chain_id`
    fn list_blocks_for_chain(&self, chain_id: ChainId) -> VerifyResult<Vec<BlockRecord>>;

    /// Transaction hashes of a block, ordered by position within the block
    fn list_tx_hashes_for_block(&self, block_id: BlockId) -> VerifyResult<Vec<StoredHash>>;

    /// Convert a stored hash into its canonical 32-byte form
    fn canonicalize_hash(&self, stored: &StoredHash) -> VerifyResult<Hash32>;
}

/// Severity of a diagnostic
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// Destination for leveled diagnostics
pub trait DiagnosticSink {
    fn emit(&mut self, level: DiagnosticLevel, message: fmt::Arguments<'_>);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn emit(&mut self, level: DiagnosticLevel, message: fmt::Arguments<'_>) {
        (**self).emit(level, message)
    }
}

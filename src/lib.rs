//! Merkle Verify - transaction Merkle root checker for block stores
//!
//! Walks every chain in a block store, recomputes each block's transaction
//! Merkle root with double SHA-256 and reports blocks whose recorded root or
//! transaction count disagree with their transactions.

pub mod common;
pub mod config;
pub mod diagnostics;
pub mod errors;
pub mod memory_store;
pub mod merkle;
pub mod storage;
pub mod verifier;

pub use common::traits::{BlockStore, DiagnosticLevel, DiagnosticSink};
pub use common::types::{
    BlockId, BlockRecord, ChainId, Hash32, HashEncoding, StoredHash, VerificationResult, NULL_HASH,
};
pub use config::{ConfigLoader, VerifyConfig};
pub use diagnostics::{LogSink, RecordingSink};
pub use errors::{VerifyError, VerifyResult};
pub use memory_store::MemoryStore;
pub use merkle::{double_sha256, merkle_root_with, transactions_root};
pub use storage::RocksBlockStore;
pub use verifier::MerkleVerifier;

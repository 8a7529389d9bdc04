//! In-memory block store
//!
//! Holds chains, blocks and transaction hashes in ordered maps. Used by tests
//! and by callers that already have block data loaded.

use crate::common::traits::BlockStore;
use crate::common::types::{
    BlockId, BlockRecord, ChainId, Hash32, HashEncoding, StoredHash,
};
use crate::errors::VerifyResult;
use crate::merkle::transactions_root;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug)]
struct MemoryBlock {
    merkle_root: StoredHash,
    num_tx: u64,
    tx_hashes: Vec<StoredHash>,
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    encoding: HashEncoding,
    chains: BTreeMap<ChainId, BTreeSet<BlockId>>,
    blocks: BTreeMap<BlockId, MemoryBlock>,
}

impl MemoryStore {
    pub fn new(encoding: HashEncoding) -> Self {
        Self {
            encoding,
            ..Default::default()
        }
    }

    /// Register a chain with no blocks
    pub fn add_chain(&mut self, chain_id: ChainId) -> &mut Self {
        self.chains.entry(chain_id).or_default();
        self
    }

    /// Insert a block with an explicit recorded root and count
    pub fn insert_block(
        &mut self,
        chain_id: ChainId,
        block_id: BlockId,
        merkle_root: Hash32,
        num_tx: u64,
        tx_hashes: &[Hash32],
    ) -> &mut Self {
        let tx_hashes = tx_hashes.iter().map(|h| self.encoding.encode(h)).collect();
        let block = MemoryBlock {
            merkle_root: self.encoding.encode(&merkle_root),
            num_tx,
            tx_hashes,
        };
        self.blocks.insert(block_id, block);
        self.chains.entry(chain_id).or_default().insert(block_id);
        self
    }

    /// Insert a consistent block: correct root and count
    pub fn insert_valid_block(
        &mut self,
        chain_id: ChainId,
        block_id: BlockId,
        tx_hashes: &[Hash32],
    ) -> &mut Self {
        let root = transactions_root(tx_hashes);
        self.insert_block(chain_id, block_id, root, tx_hashes.len() as u64, tx_hashes)
    }

    /// Make an existing block a candidate of another chain as well
    pub fn add_chain_candidate(&mut self, chain_id: ChainId, block_id: BlockId) -> &mut Self {
        self.chains.entry(chain_id).or_default().insert(block_id);
        self
    }
}

impl BlockStore for MemoryStore {
    fn list_chain_ids(&self) -> VerifyResult<Vec<ChainId>> {
        Ok(self.chains.keys().copied().collect())
    }

    fn list_blocks_for_chain(&self, chain_id: ChainId) -> VerifyResult<Vec<BlockRecord>> {
        let Some(members) = self.chains.get(&chain_id) else {
            return Ok(Vec::new());
        };

        Ok(members
            .iter()
            .filter_map(|id| {
                self.blocks.get(id).map(|b| BlockRecord {
                    block_id: *id,
                    merkle_root: b.merkle_root.clone(),
                    num_tx: b.num_tx,
                })
            })
            .collect())
    }

    fn list_tx_hashes_for_block(&self, block_id: BlockId) -> VerifyResult<Vec<StoredHash>> {
        Ok(self
            .blocks
            .get(&block_id)
            .map(|b| b.tx_hashes.clone())
            .unwrap_or_default())
    }

    fn canonicalize_hash(&self, stored: &StoredHash) -> VerifyResult<Hash32> {
        Ok(self.encoding.decode(stored)?)
    }
}

//! RocksDB-backed block store
//!
//! Rows are laid out like the relational tables the verifier reads:
//!
//! ```text
//! chain:{chain_id}            -> ChainRow
//! block:{block_id}            -> BlockRow
//! cc:{chain_id}{block_id}     -> ()        chain candidate membership
//! btx:{block_id}{tx_pos}      -> tx_id     block/transaction link
//! tx:{tx_id}                  -> TxRow
//! ```
//!
//! Ids are big-endian so prefix scans come back in ascending order.

use crate::common::traits::BlockStore;
use crate::common::types::{BlockId, BlockRecord, ChainId, Hash32, HashEncoding, StoredHash};
use crate::config::StorageConfig;
use crate::errors::{StorageError, VerifyError, VerifyResult};
use rocksdb::{Direction, IteratorMode, Options, WriteBatch, DB};
use serde::{Deserialize, Serialize};
use std::path::Path;

const CHAIN_PREFIX: &[u8] = b"chain:";
const BLOCK_PREFIX: &[u8] = b"block:";
const CHAIN_CANDIDATE_PREFIX: &[u8] = b"cc:";
const BLOCK_TX_PREFIX: &[u8] = b"btx:";
const TX_PREFIX: &[u8] = b"tx:";

/// Transaction id type used by the block/transaction link rows
pub type TxId = u64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainRow {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRow {
    pub merkle_root: StoredHash,
    pub num_tx: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxRow {
    pub hash: StoredHash,
}

fn id_key(prefix: &[u8], id: u64) -> Vec<u8> {
    let mut key = Vec::with_capacity(prefix.len() + 8);
    key.extend_from_slice(prefix);
    key.extend_from_slice(&id.to_be_bytes());
    key
}

fn pair_key(prefix: &[u8], first: u64, second: u64) -> Vec<u8> {
    let mut key = id_key(prefix, first);
    key.extend_from_slice(&second.to_be_bytes());
    key
}

/// Read the big-endian id that ends `key`
fn trailing_id(key: &[u8]) -> VerifyResult<u64> {
    if key.len() < 8 {
        return Err(StorageError::CorruptedData(format!(
            "Key too short for id: {}",
            String::from_utf8_lossy(key)
        ))
        .into());
    }
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&key[key.len() - 8..]);
    Ok(u64::from_be_bytes(bytes))
}

pub struct RocksBlockStore {
    db: DB,
    encoding: HashEncoding,
}

impl RocksBlockStore {
    pub fn open<P: AsRef<Path>>(
        path: P,
        encoding: HashEncoding,
        create_if_missing: bool,
    ) -> VerifyResult<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(create_if_missing);

        let db = DB::open(&opts, path.as_ref()).map_err(|e| {
            VerifyError::Storage(StorageError::DatabaseOpenFailed(format!(
                "{}: {}",
                path.as_ref().display(),
                e
            )))
        })?;

        Ok(Self { db, encoding })
    }

    pub fn open_with_config(config: &StorageConfig) -> VerifyResult<Self> {
        Self::open(
            &config.data_directory,
            config.hash_encoding,
            config.create_if_missing,
        )
    }

    /// Rows whose key starts with `prefix`, in key order
    fn scan_prefix(&self, prefix: &[u8]) -> VerifyResult<Vec<(Box<[u8]>, Box<[u8]>)>> {
        let mut rows = Vec::new();
        for item in self.db.iterator(IteratorMode::From(prefix, Direction::Forward)) {
            let (key, value) = item?;
            if !key.starts_with(prefix) {
                break;
            }
            rows.push((key, value));
        }
        Ok(rows)
    }

    fn get_row<T: for<'de> Deserialize<'de>>(&self, key: &[u8]) -> VerifyResult<Option<T>> {
        match self.db.get(key)? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn write(&self, batch: WriteBatch) -> VerifyResult<()> {
        self.db
            .write(batch)
            .map_err(|e| StorageError::WriteFailed(e.to_string()).into())
    }

    pub fn put_chain(&self, chain_id: ChainId, name: &str) -> VerifyResult<()> {
        let row = bincode::serialize(&ChainRow { name: name.to_string() })?;
        let mut batch = WriteBatch::default();
        batch.put(id_key(CHAIN_PREFIX, chain_id), row);
        self.write(batch)
    }

    pub fn get_chain(&self, chain_id: ChainId) -> VerifyResult<Option<ChainRow>> {
        self.get_row(&id_key(CHAIN_PREFIX, chain_id))
    }

    pub fn put_block(&self, block_id: BlockId, merkle_root: &Hash32, num_tx: u64) -> VerifyResult<()> {
        let mut batch = WriteBatch::default();
        self.stage_block(&mut batch, block_id, merkle_root, num_tx)?;
        self.write(batch)
    }

    pub fn add_chain_candidate(&self, chain_id: ChainId, block_id: BlockId) -> VerifyResult<()> {
        let mut batch = WriteBatch::default();
        batch.put(pair_key(CHAIN_CANDIDATE_PREFIX, chain_id, block_id), b"");
        self.write(batch)
    }

    pub fn put_tx(&self, tx_id: TxId, hash: &Hash32) -> VerifyResult<()> {
        let mut batch = WriteBatch::default();
        self.stage_tx(&mut batch, tx_id, hash)?;
        self.write(batch)
    }

    pub fn link_block_tx(&self, block_id: BlockId, tx_pos: u64, tx_id: TxId) -> VerifyResult<()> {
        let mut batch = WriteBatch::default();
        batch.put(pair_key(BLOCK_TX_PREFIX, block_id, tx_pos), tx_id.to_be_bytes());
        self.write(batch)
    }

    /// Write a block, its chain membership and its transactions atomically.
    ///
    /// `txs` are `(tx_id, hash)` pairs in block position order.
    pub fn insert_block(
        &self,
        chain_id: ChainId,
        block_id: BlockId,
        merkle_root: &Hash32,
        num_tx: u64,
        txs: &[(TxId, Hash32)],
    ) -> VerifyResult<()> {
        let mut batch = WriteBatch::default();
        self.stage_block(&mut batch, block_id, merkle_root, num_tx)?;
        batch.put(pair_key(CHAIN_CANDIDATE_PREFIX, chain_id, block_id), b"");

        for (pos, (tx_id, hash)) in txs.iter().enumerate() {
            self.stage_tx(&mut batch, *tx_id, hash)?;
            batch.put(pair_key(BLOCK_TX_PREFIX, block_id, pos as u64), tx_id.to_be_bytes());
        }

        self.write(batch)
    }

    fn stage_block(
        &self,
        batch: &mut WriteBatch,
        block_id: BlockId,
        merkle_root: &Hash32,
        num_tx: u64,
    ) -> VerifyResult<()> {
        let row = BlockRow {
            merkle_root: self.encoding.encode(merkle_root),
            num_tx,
        };
        batch.put(id_key(BLOCK_PREFIX, block_id), bincode::serialize(&row)?);
        Ok(())
    }

    fn stage_tx(&self, batch: &mut WriteBatch, tx_id: TxId, hash: &Hash32) -> VerifyResult<()> {
        let row = TxRow {
            hash: self.encoding.encode(hash),
        };
        batch.put(id_key(TX_PREFIX, tx_id), bincode::serialize(&row)?);
        Ok(())
    }
}

impl BlockStore for RocksBlockStore {
    fn list_chain_ids(&self) -> VerifyResult<Vec<ChainId>> {
        self.scan_prefix(CHAIN_PREFIX)?
            .iter()
            .map(|(key, _)| trailing_id(key))
            .collect()
    }

    // Membership rows without a block row are skipped, like an inner join.
    fn list_blocks_for_chain(&self, chain_id: ChainId) -> VerifyResult<Vec<BlockRecord>> {
        let prefix = id_key(CHAIN_CANDIDATE_PREFIX, chain_id);
        let mut blocks = Vec::new();

        for (key, _) in self.scan_prefix(&prefix)? {
            let block_id = trailing_id(&key)?;
            match self.get_row::<BlockRow>(&id_key(BLOCK_PREFIX, block_id))? {
                Some(row) => blocks.push(BlockRecord {
                    block_id,
                    merkle_root: row.merkle_root,
                    num_tx: row.num_tx,
                }),
                None => log::debug!("chain {}: candidate block {} has no block row", chain_id, block_id),
            }
        }

        Ok(blocks)
    }

    fn list_tx_hashes_for_block(&self, block_id: BlockId) -> VerifyResult<Vec<StoredHash>> {
        let prefix = id_key(BLOCK_TX_PREFIX, block_id);
        let mut hashes = Vec::new();

        for (key, value) in self.scan_prefix(&prefix)? {
            let tx_id = trailing_id(&value)?;
            match self.get_row::<TxRow>(&id_key(TX_PREFIX, tx_id))? {
                Some(row) => hashes.push(row.hash),
                None => log::debug!(
                    "block {}: tx {} at position {} has no tx row",
                    block_id,
                    tx_id,
                    trailing_id(&key)?
                ),
            }
        }

        Ok(hashes)
    }

    fn canonicalize_hash(&self, stored: &StoredHash) -> VerifyResult<Hash32> {
        Ok(self.encoding.decode(stored)?)
    }
}

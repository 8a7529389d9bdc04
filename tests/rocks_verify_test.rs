//! End-to-end verification against an on-disk RocksDB block store

use merkle_verify::{
    double_sha256, BlockStore, DiagnosticLevel, Hash32, HashEncoding, MerkleVerifier,
    RecordingSink, RocksBlockStore, VerificationResult,
};
use tempfile::TempDir;

fn tx_hash(n: u64) -> Hash32 {
    double_sha256(&n.to_le_bytes())
}

fn pair(a: &Hash32, b: &Hash32) -> Hash32 {
    let mut buf = a.to_vec();
    buf.extend_from_slice(b);
    double_sha256(&buf)
}

fn open_store(dir: &TempDir, encoding: HashEncoding) -> RocksBlockStore {
    RocksBlockStore::open(dir.path(), encoding, true).expect("open test store")
}

#[test]
fn test_consistent_chain_has_no_errors() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, HashEncoding::Binary);
    store.put_chain(1, "Bitcoin").unwrap();

    let (h1, h2, h3) = (tx_hash(1), tx_hash(2), tx_hash(3));
    let root = pair(&pair(&h1, &h2), &pair(&h3, &h3));
    store
        .insert_block(1, 100, &root, 3, &[(1, h1), (2, h2), (3, h3)])
        .unwrap();

    let mut verifier = MerkleVerifier::new(&store, RecordingSink::new());
    let total = verifier.verify_all().unwrap();

    assert_eq!(total, VerificationResult::new(1, 0));
    assert_eq!(verifier.sink().count(DiagnosticLevel::Error), 0);
    assert_eq!(verifier.sink().count(DiagnosticLevel::Warning), 0);
}

#[test]
fn test_wrong_root_and_short_block() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, HashEncoding::Hex);
    store.put_chain(1, "Bitcoin").unwrap();

    let txs = [(1, tx_hash(1)), (2, tx_hash(2)), (3, tx_hash(3))];
    store.insert_block(1, 1, &[0x5a; 32], 3, &txs).unwrap();

    let leaves: Vec<Hash32> = txs.iter().map(|(_, h)| *h).collect();
    let good_root = merkle_verify::transactions_root(&leaves);
    store.insert_block(1, 2, &good_root, 5, &txs).unwrap();

    let mut verifier = MerkleVerifier::new(&store, RecordingSink::new());
    let total = verifier.verify_all().unwrap();
    let sink = verifier.into_sink();

    assert_eq!(total, VerificationResult::new(2, 1));
    let errors: Vec<_> = sink.at_level(DiagnosticLevel::Error).collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.starts_with("block 1:"));
    let warnings: Vec<_> = sink.at_level(DiagnosticLevel::Warning).collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].message, "block 2: block_num_tx=5 but found 3");
}

#[test]
fn test_mismatch_in_one_chain_does_not_stop_the_next() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, HashEncoding::Binary);
    store.put_chain(1, "Bitcoin").unwrap();
    store.put_chain(2, "Namecoin").unwrap();

    store.insert_block(1, 10, &[1; 32], 1, &[(10, tx_hash(10))]).unwrap();
    let h = tx_hash(20);
    store.insert_block(2, 20, &h, 1, &[(20, h)]).unwrap();

    let mut verifier = MerkleVerifier::new(&store, RecordingSink::new());
    let total = verifier.verify_all().unwrap();

    assert_eq!(total, VerificationResult::new(2, 1));
    let last = verifier.sink().records().last().unwrap();
    assert_eq!(last.level, DiagnosticLevel::Info);
    assert_eq!(last.message, "All chains: 2 Merkle trees, 1 bad");
}

#[test]
fn test_block_shared_by_two_chains_is_checked_twice() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, HashEncoding::Binary);
    store.put_chain(1, "main").unwrap();
    store.put_chain(2, "fork").unwrap();

    let h = tx_hash(1);
    store.insert_block(1, 1, &h, 1, &[(1, h)]).unwrap();
    store.add_chain_candidate(2, 1).unwrap();

    let mut verifier = MerkleVerifier::new(&store, RecordingSink::new());
    assert_eq!(verifier.verify_all().unwrap(), VerificationResult::new(2, 0));
}

#[test]
fn test_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let h = tx_hash(7);
    {
        let store = open_store(&dir, HashEncoding::Hex);
        store.put_chain(1, "Bitcoin").unwrap();
        store.insert_block(1, 1, &h, 1, &[(7, h)]).unwrap();
    }

    let store = RocksBlockStore::open(dir.path(), HashEncoding::Hex, false).unwrap();
    assert_eq!(store.list_chain_ids().unwrap(), vec![1]);

    let mut verifier = MerkleVerifier::new(&store, RecordingSink::new());
    assert_eq!(verifier.verify_all().unwrap(), VerificationResult::new(1, 0));
}

#[test]
fn test_empty_store() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir, HashEncoding::Binary);

    let mut verifier = MerkleVerifier::new(&store, RecordingSink::new());
    assert_eq!(verifier.verify_all().unwrap(), VerificationResult::default());
}

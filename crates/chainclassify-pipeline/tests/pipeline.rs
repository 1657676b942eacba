//! Pipeline scenarios against an in-memory blockchain client.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use chainclassify_core::{to_checksum_address, DecodedValue, ErrorKind, RawLog};
use chainclassify_evm::{encode_call, transfer_topic, InterfaceRegistry};
use chainclassify_pipeline::{Pipeline, PipelineConfig, Report};
use chainclassify_rpc::{BlockInfo, BlockchainClient, ReceiptInfo, TransactionInfo, TransportError};

// ─── Mock client ──────────────────────────────────────────────────────────────

#[derive(Default)]
struct MockChain {
    txs: HashMap<String, TransactionInfo>,
    blocks: HashMap<u64, BlockInfo>,
    receipts: HashMap<String, ReceiptInfo>,
    /// Hashes whose transaction fetch fails at the transport level
    broken: Vec<String>,
    /// Hashes whose transaction fetch never returns in time
    slow: Vec<String>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    fetched: Mutex<Vec<String>>,
}

impl MockChain {
    fn add_tx(&mut self, hash: &str, to: Option<Address>, input: Vec<u8>, block: Option<u64>) {
        self.txs.insert(
            hash.to_string(),
            TransactionInfo { hash: hash.to_string(), to, input, block_number: block },
        );
    }

    fn add_block(&mut self, number: u64, timestamp: u64) {
        self.blocks.insert(number, BlockInfo { number, timestamp });
    }
}

#[async_trait]
impl BlockchainClient for MockChain {
    async fn get_transaction(&self, hash: &str) -> Result<Option<TransactionInfo>, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        self.fetched.lock().unwrap().push(hash.to_string());

        let delay = if self.slow.iter().any(|h| h == hash) { 5_000 } else { 2 };
        tokio::time::sleep(Duration::from_millis(delay)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.broken.iter().any(|h| h == hash) {
            return Err(TransportError::Http("HTTP 503: unavailable".into()));
        }
        Ok(self.txs.get(hash).cloned())
    }

    async fn get_block(&self, number: u64) -> Result<Option<BlockInfo>, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.blocks.get(&number).copied())
    }

    async fn get_transaction_receipt(&self, hash: &str) -> Result<Option<ReceiptInfo>, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.receipts.get(hash).cloned())
    }
}

// ─── Fixtures ─────────────────────────────────────────────────────────────────

const ABI: &str = r#"[
    {"type": "function", "name": "transitState", "inputs": [
        {"name": "id", "type": "uint256"},
        {"name": "oldState", "type": "uint256"},
        {"name": "newState", "type": "uint256"},
        {"name": "isOldStateGenesis", "type": "bool"}
    ]},
    {"type": "event", "name": "Transfer", "inputs": [
        {"name": "from", "type": "address", "indexed": true},
        {"name": "to", "type": "address", "indexed": true},
        {"name": "tokenId", "type": "uint256", "indexed": true}
    ]}
]"#;

fn contract() -> Address {
    Address::repeat_byte(0xcc)
}

fn registry() -> Arc<InterfaceRegistry> {
    Arc::new(InterfaceRegistry::from_json(ABI).unwrap())
}

fn transit_call(reg: &InterfaceRegistry, id: u64, genesis: bool) -> Vec<u8> {
    let entry = reg.function_by_signature("transitState(uint256,uint256,uint256,bool)").unwrap();
    let u = |v: u64| DecodedValue::Uint(U256::from(v));
    encode_call(entry, &[u(id), u(0), u(1), DecodedValue::Bool(genesis)]).unwrap()
}

fn hash(i: usize) -> String {
    format!("0x{i:064x}")
}

fn word(a: Address) -> B256 {
    a.into_word()
}

fn transfer_log(from: Address, to: Address, token_id: u64) -> RawLog {
    RawLog {
        address: Some(contract().to_string()),
        topics: vec![
            transfer_topic(),
            word(from),
            word(to),
            B256::from(U256::from(token_id).to_be_bytes::<32>()),
        ],
        data: vec![],
    }
}

fn config(mode: &str, workers: usize) -> PipelineConfig {
    PipelineConfig { workers, ..PipelineConfig::for_mode(mode) }
}

/// A chain where item `i` fails in one of five ways or succeeds, by `i % 6`.
fn mixed_chain(reg: &InterfaceRegistry, n: usize) -> MockChain {
    let mut chain = MockChain::default();
    chain.add_block(1, 1_000);
    for i in 0..n {
        let h = hash(i);
        match i % 6 {
            0 => {} // NotFound
            1 => chain.add_tx(&h, Some(contract()), vec![], None),
            2 => chain.add_tx(&h, Some(contract()), vec![], Some(99)),
            3 => chain.add_tx(&h, None, vec![], Some(1)),
            4 => chain.broken.push(h),
            _ => chain.add_tx(&h, Some(contract()), transit_call(reg, i as u64, i % 2 == 0), Some(1)),
        }
    }
    chain
}

async fn run(chain: Arc<MockChain>, cfg: PipelineConfig, hashes: Vec<String>) -> Report {
    let pipeline = Pipeline::new(chain, registry(), cfg).unwrap();
    pipeline.run(hashes).await
}

// ─── Scenarios ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn every_hash_yields_exactly_one_entry_for_any_worker_count() {
    let reg = registry();
    let n = 18;
    for workers in [1, 2, 5, n] {
        let chain = Arc::new(mixed_chain(&reg, n));
        let hashes: Vec<_> = (0..n).map(hash).collect();
        let report = run(chain.clone(), config("privado", workers), hashes.clone()).await;

        assert_eq!(report.len(), n, "workers = {workers}");
        for h in &hashes {
            assert!(report.get(h).is_some(), "missing {h} with {workers} workers");
        }
        assert!(chain.max_in_flight.load(Ordering::SeqCst) <= workers);
        assert_eq!(report.summary().successful, n / 6);
    }
}

#[tokio::test]
async fn failures_are_typed_per_item() {
    let reg = registry();
    let chain = Arc::new(mixed_chain(&reg, 6));
    let report = run(chain, config("privado", 3), (0..6).map(hash).collect()).await;

    let kind = |i: usize| report.get(&hash(i)).unwrap().error.as_ref().map(|e| e.kind);
    assert_eq!(kind(0), Some(ErrorKind::NotFound));
    assert_eq!(kind(1), Some(ErrorKind::PendingTransaction));
    assert_eq!(kind(2), Some(ErrorKind::MissingTimestamp));
    assert_eq!(kind(3), Some(ErrorKind::AddressUnavailable));
    assert_eq!(kind(4), Some(ErrorKind::NetworkError));
    assert_eq!(kind(5), None);

    // timestamp known once the block was fetched
    assert_eq!(report.get(&hash(3)).unwrap().timestamp, Some(1_000));
    assert_eq!(report.get(&hash(1)).unwrap().timestamp, None);
}

#[tokio::test]
async fn privado_decodes_and_flags_genesis() {
    let reg = registry();
    let mut chain = MockChain::default();
    chain.add_block(7, 1_700_000_000);
    chain.add_tx("0xaa", Some(contract()), transit_call(&reg, 42, true), Some(7));
    chain.add_tx("0xbb", Some(contract()), vec![], Some(7));

    let report = run(Arc::new(chain), config("privado", 2), vec!["0xaa".into(), "0xbb".into()]).await;

    let ok = report.get("0xaa").unwrap();
    assert!(ok.success);
    assert_eq!(ok.function_name.as_deref(), Some("transitState"));
    assert_eq!(ok.params.as_ref().unwrap()["id"], DecodedValue::Uint(U256::from(42u64)));
    assert!(ok.is_genesis());
    assert_eq!(ok.timestamp, Some(1_700_000_000));

    let empty = report.get("0xbb").unwrap();
    assert!(!empty.success);
    assert_eq!(empty.error.as_ref().unwrap().kind, ErrorKind::EmptyInput);
    assert_eq!(empty.is_mint, None);
    assert_eq!(empty.recipient, None);
    assert_eq!(empty.token_id, None);
}

#[tokio::test]
async fn civic_finds_the_single_mint_among_five_logs() {
    let recipient = Address::repeat_byte(0x77);
    let other = Address::repeat_byte(0x55);
    let mut chain = MockChain::default();
    chain.add_block(3, 500);
    chain.add_tx("0xcafe", Some(contract()), vec![], Some(3));

    let noise = RawLog {
        address: None,
        topics: vec![B256::repeat_byte(0x01), word(Address::ZERO)],
        data: vec![0; 32],
    };
    let logs = vec![
        noise.clone(),
        RawLog { topics: vec![transfer_topic(), word(Address::ZERO), word(other)], ..noise.clone() },
        transfer_log(Address::ZERO, recipient, 9_001),
        transfer_log(other, recipient, 1),
        noise,
    ];
    chain.receipts.insert("0xcafe".into(), ReceiptInfo { logs });

    let report = run(Arc::new(chain), config("civic", 1), vec!["0xcafe".into()]).await;
    let r = report.get("0xcafe").unwrap();
    assert!(r.success);
    assert!(r.is_mint());
    assert_eq!(r.mint_count, Some(1));
    assert_eq!(r.recipient, Some(to_checksum_address(&recipient)));
    assert_eq!(r.token_id, Some(U256::from(9_001u64)));
    assert_eq!(report.summary().mints, 1);
}

#[tokio::test]
async fn civic_missing_receipt_is_not_found() {
    let mut chain = MockChain::default();
    chain.add_block(3, 500);
    chain.add_tx("0xcafe", Some(contract()), vec![], Some(3));

    let report = run(Arc::new(chain), config("civic", 1), vec!["0xcafe".into()]).await;
    let r = report.get("0xcafe").unwrap();
    assert_eq!(r.error.as_ref().unwrap().kind, ErrorKind::NotFound);
    assert_eq!(r.timestamp, Some(500));
}

#[tokio::test]
async fn target_override_replaces_missing_to() {
    let reg = registry();
    let mut chain = MockChain::default();
    chain.add_block(1, 10);
    chain.add_tx("0xaa", None, transit_call(&reg, 1, false), Some(1));

    let cfg = PipelineConfig { target_address: Some(contract()), ..config("privado", 1) };
    let report = run(Arc::new(chain), cfg, vec!["0xaa".into()]).await;
    assert!(report.get("0xaa").unwrap().success);
}

#[tokio::test]
async fn unsupported_mode_fails_every_item_without_network() {
    let chain = Arc::new(mixed_chain(&registry(), 4));
    let report = run(chain.clone(), config("polygonid", 2), (0..4).map(hash).collect()).await;

    assert_eq!(report.len(), 4);
    assert!(report
        .iter()
        .all(|r| r.error.as_ref().map(|e| e.kind) == Some(ErrorKind::UnsupportedMode)));
    assert_eq!(chain.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn slow_item_times_out_alone() {
    let reg = registry();
    let mut chain = MockChain::default();
    chain.add_block(1, 10);
    chain.add_tx("0xfast", Some(contract()), transit_call(&reg, 1, false), Some(1));
    chain.add_tx("0xslow", Some(contract()), transit_call(&reg, 2, false), Some(1));
    chain.slow.push("0xslow".into());

    let cfg = PipelineConfig { item_timeout_secs: 1, ..config("privado", 2) };
    let report = run(Arc::new(chain), cfg, vec!["0xfast".into(), "0xslow".into()]).await;

    assert!(report.get("0xfast").unwrap().success);
    let slow = report.get("0xslow").unwrap();
    assert_eq!(slow.error.as_ref().unwrap().kind, ErrorKind::NetworkError);
}

#[tokio::test]
async fn duplicate_hashes_collapse_and_progress_counts_submissions() {
    let reg = registry();
    let chain = Arc::new(mixed_chain(&reg, 6));
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();

    let pipeline = Pipeline::new(chain, registry(), config("privado", 2))
        .unwrap()
        .with_progress(move |done: usize, total: usize| sink.lock().unwrap().push((done, total)));
    let report = pipeline.run(vec![hash(5), hash(0), hash(5)]).await;

    assert_eq!(report.len(), 2);
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen.last(), Some(&(3, 3)));
}

#[test]
fn zero_workers_is_rejected() {
    let chain: Arc<dyn BlockchainClient> = Arc::new(MockChain::default());
    assert!(Pipeline::new(chain, registry(), config("privado", 0)).is_err());
}

//! In-memory collaborator doubles shared by the unit tests: a `Store`
//! over plain collections and a scripted `ChainClient` with call counters
//! and per-entity failure injection.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::ops::Range;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use alloy::primitives::{Address, B256, Bytes, U256};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::data::provider::ChainClient;
use crate::data::store::{BlockFilter, Store, TxFilter, TxSort};
use crate::data::types::{
    Account, Block, ChainBlock, Contract, InternalTx, Receipt, SpecialAccount, TokenTx,
    Transaction,
};
use crate::error::{Error, Result};

pub fn addr(n: u8) -> Address {
    Address::from_slice(&[n; 20])
}

pub fn hash(n: u64) -> B256 {
    let mut bytes = [0u8; 32];
    bytes[24..].copy_from_slice(&n.to_be_bytes());
    B256::new(bytes)
}

pub fn block(number: u64) -> Block {
    Block {
        number,
        hash: hash(number),
        parent_hash: hash(number.saturating_sub(1)),
        timestamp: 1_700_000_000 + number,
        tx_count: 0,
        gas_used: 0,
        gas_limit: 30_000_000,
        miner: addr(0xee),
    }
}

pub fn confirmed_tx(seq: u64, block_number: u64, from: Address, to: Option<Address>) -> Transaction {
    Transaction {
        hash: hash(0xc0_0000 + seq),
        from,
        to,
        contract_address: if to.is_none() { Some(addr(0xcc)) } else { None },
        block_number: Some(block_number),
        is_pending: false,
        status: Some(true),
        input: Bytes::new(),
        value: U256::from(1_000u64),
        gas: 21_000,
        gas_price: Some(250_000_000),
        created_at: Utc.timestamp_opt(1_700_000_000 + seq as i64, 0).unwrap(),
    }
}

pub fn pending_tx(seq: u64, from: Address, to: Option<Address>) -> Transaction {
    Transaction {
        hash: hash(0xe0_0000 + seq),
        from,
        to,
        contract_address: None,
        block_number: None,
        is_pending: true,
        status: None,
        input: Bytes::new(),
        value: U256::from(1_000u64),
        gas: 21_000,
        gas_price: Some(250_000_000),
        created_at: Utc.timestamp_opt(1_700_000_000 + seq as i64, 0).unwrap(),
    }
}

// --- Store double ---

#[derive(Default)]
pub struct MemoryStore {
    pub blocks: Mutex<BTreeMap<u64, Block>>,
    pub txs: Mutex<Vec<Transaction>>,
    pub accounts: Mutex<Vec<Account>>,
    pub contracts: Mutex<Vec<Contract>>,
    pub specials: Mutex<HashMap<String, SpecialAccount>>,
    pub token_txs: Mutex<Vec<TokenTx>>,
    pub internal_txs: Mutex<Vec<InternalTx>>,
}

impl MemoryStore {
    pub fn seed_block(&self, number: u64) {
        self.blocks.lock().unwrap().insert(number, block(number));
    }

    pub fn seed_block_record(&self, record: Block) {
        self.blocks.lock().unwrap().insert(record.number, record);
    }

    pub fn seed_tx(&self, tx: Transaction) {
        self.txs.lock().unwrap().push(tx);
    }

    pub fn seed_account(&self, address: Address, is_contract: bool, name: Option<&str>) {
        self.accounts.lock().unwrap().push(Account {
            hash: address,
            is_contract,
            account_name: name.map(str::to_owned),
        });
    }

    pub fn seed_contract(&self, contract: Contract) {
        self.contracts.lock().unwrap().push(contract);
    }

    pub fn seed_special(&self, key: &str, count: u64) {
        self.specials.lock().unwrap().insert(
            key.to_owned(),
            SpecialAccount {
                hash: key.to_owned(),
                total_transaction_count: count,
            },
        );
    }

    pub fn seed_token_tx(&self, token_tx: TokenTx) {
        self.token_txs.lock().unwrap().push(token_tx);
    }

    pub fn seed_internal_tx(&self, internal: InternalTx) {
        self.internal_txs.lock().unwrap().push(internal);
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn block_by_number(&self, number: u64) -> Result<Option<Block>> {
        Ok(self.blocks.lock().unwrap().get(&number).cloned())
    }

    async fn block_by_hash(&self, hash: B256) -> Result<Option<Block>> {
        Ok(self
            .blocks
            .lock()
            .unwrap()
            .values()
            .find(|b| b.hash == hash)
            .cloned())
    }

    async fn insert_block(&self, block: &Block) -> Result<()> {
        self.blocks
            .lock()
            .unwrap()
            .insert(block.number, block.clone());
        Ok(())
    }

    async fn distinct_block_numbers(&self, numbers: &[u64]) -> Result<Vec<u64>> {
        let blocks = self.blocks.lock().unwrap();
        Ok(numbers
            .iter()
            .copied()
            .filter(|n| blocks.contains_key(n))
            .collect())
    }

    async fn blocks_page(
        &self,
        filter: &BlockFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Block>> {
        let blocks = self.blocks.lock().unwrap();
        let mut selected: Vec<Block> = match filter {
            BlockFilter::Numbers(numbers) => {
                let wanted: HashSet<u64> = numbers.iter().copied().collect();
                blocks
                    .values()
                    .filter(|b| wanted.contains(&b.number))
                    .cloned()
                    .collect()
            }
            BlockFilter::All => blocks.values().cloned().collect(),
        };
        selected.sort_by(|a, b| b.number.cmp(&a.number));
        Ok(selected
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn transaction_by_hash(&self, hash: B256) -> Result<Option<Transaction>> {
        Ok(self
            .txs
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.hash == hash)
            .cloned())
    }

    async fn transactions_page(
        &self,
        filter: &TxFilter,
        sort: TxSort,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Transaction>> {
        let txs = self.txs.lock().unwrap();
        let mut selected: Vec<Transaction> =
            txs.iter().filter(|t| filter.matches(t)).cloned().collect();
        match sort {
            TxSort::BlockNumberDesc => selected
                .sort_by(|a, b| b.block_number.unwrap_or(0).cmp(&a.block_number.unwrap_or(0))),
            TxSort::CreatedAtDesc => selected.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
        Ok(selected
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_block_transactions(&self, number: u64) -> Result<u64> {
        Ok(self
            .txs
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.block_number == Some(number))
            .count() as u64)
    }

    async fn account_by_hash(&self, address: Address) -> Result<Option<Account>> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.hash == address)
            .cloned())
    }

    async fn accounts_by_hash(&self, addresses: &[Address]) -> Result<Vec<Account>> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts
            .iter()
            .filter(|a| addresses.contains(&a.hash))
            .cloned()
            .collect())
    }

    async fn contract_by_hash(&self, address: Address) -> Result<Option<Contract>> {
        Ok(self
            .contracts
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.hash == address)
            .cloned())
    }

    async fn special_account(&self, key: &str) -> Result<Option<SpecialAccount>> {
        Ok(self.specials.lock().unwrap().get(key).cloned())
    }

    async fn token_transactions(&self, transaction_hash: B256) -> Result<Vec<TokenTx>> {
        Ok(self
            .token_txs
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.transaction_hash == transaction_hash)
            .cloned()
            .collect())
    }

    async fn internal_transactions_page(
        &self,
        address: Address,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<InternalTx>> {
        let internal = self.internal_txs.lock().unwrap();
        let mut selected: Vec<InternalTx> = internal
            .iter()
            .filter(|t| t.from == address || t.to == address)
            .cloned()
            .collect();
        selected.sort_by(|a, b| b.block_number.cmp(&a.block_number));
        Ok(selected
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_internal_transactions(&self, address: Address) -> Result<u64> {
        Ok(self
            .internal_txs
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.from == address || t.to == address)
            .count() as u64)
    }
}

// --- Chain client double ---

#[derive(Default)]
pub struct ScriptedChain {
    pub head: u64,
    pub blocks: HashMap<u64, ChainBlock>,
    pub txs: HashMap<B256, Transaction>,
    pub receipts: HashMap<B256, Receipt>,
    pub failing_blocks: HashSet<u64>,
    pub failing_txs: HashSet<B256>,
    pub failing_receipts: HashSet<B256>,
    /// Per-hash response delays in milliseconds, for exercising
    /// out-of-completion-order joins.
    pub delays: HashMap<B256, u64>,
    pub head_fails: bool,
    pub block_fetches: AtomicUsize,
    pub tx_fetches: AtomicUsize,
    pub receipt_fetches: AtomicUsize,
}

impl ScriptedChain {
    pub fn new(head: u64) -> Self {
        Self {
            head,
            ..Self::default()
        }
    }

    /// Script empty blocks (no transactions) for every number in `range`.
    pub fn with_empty_blocks(mut self, range: Range<u64>) -> Self {
        for number in range {
            self.blocks.insert(
                number,
                ChainBlock {
                    header: block(number),
                    transactions: Vec::new(),
                },
            );
        }
        self
    }

    pub fn with_block(mut self, chain_block: ChainBlock) -> Self {
        self.blocks.insert(chain_block.header.number, chain_block);
        self
    }

    pub fn with_transaction(mut self, tx: Transaction) -> Self {
        self.txs.insert(tx.hash, tx);
        self
    }

    pub fn with_receipt(mut self, transaction_hash: B256, status: bool) -> Self {
        self.receipts.insert(
            transaction_hash,
            Receipt {
                transaction_hash,
                status,
            },
        );
        self
    }

    pub fn failing_block(mut self, number: u64) -> Self {
        self.failing_blocks.insert(number);
        self
    }

    pub fn failing_transaction(mut self, hash: B256) -> Self {
        self.failing_txs.insert(hash);
        self
    }

    pub fn failing_receipt(mut self, hash: B256) -> Self {
        self.failing_receipts.insert(hash);
        self
    }

    pub fn failing_head(mut self) -> Self {
        self.head_fails = true;
        self
    }

    /// Delay responses for `hash` so it completes after later requests.
    pub fn with_delay(mut self, hash: B256, millis: u64) -> Self {
        self.delays.insert(hash, millis);
        self
    }

    async fn apply_delay(&self, hash: &B256) {
        if let Some(&millis) = self.delays.get(hash) {
            tokio::time::sleep(std::time::Duration::from_millis(millis)).await;
        }
    }
}

#[async_trait]
impl ChainClient for ScriptedChain {
    async fn head_number(&self) -> Result<u64> {
        if self.head_fails {
            return Err(Error::upstream("injected head failure"));
        }
        Ok(self.head)
    }

    async fn block_by_number(&self, number: u64) -> Result<Option<ChainBlock>> {
        self.block_fetches.fetch_add(1, Ordering::SeqCst);
        if self.failing_blocks.contains(&number) {
            return Err(Error::upstream("injected block failure"));
        }
        Ok(self.blocks.get(&number).cloned())
    }

    async fn block_by_hash(&self, hash: B256) -> Result<Option<ChainBlock>> {
        self.block_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .blocks
            .values()
            .find(|b| b.header.hash == hash)
            .cloned())
    }

    async fn transaction(&self, hash: B256) -> Result<Option<Transaction>> {
        self.tx_fetches.fetch_add(1, Ordering::SeqCst);
        self.apply_delay(&hash).await;
        if self.failing_txs.contains(&hash) {
            return Err(Error::upstream("injected transaction failure"));
        }
        Ok(self.txs.get(&hash).cloned())
    }

    async fn transaction_receipt(&self, hash: B256) -> Result<Option<Receipt>> {
        self.receipt_fetches.fetch_add(1, Ordering::SeqCst);
        self.apply_delay(&hash).await;
        if self.failing_receipts.contains(&hash) {
            return Err(Error::upstream("injected receipt failure"));
        }
        Ok(self.receipts.get(&hash).cloned())
    }
}

use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use serde::Deserialize;

use crate::data::known;
use crate::data::types::{
    Account, Block, Contract, InternalTx, SpecialAccount, TokenTx, Transaction,
};
use crate::error::Result;

/// Direction narrowing for address-scoped transaction queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Match the recipient.
    In,
    /// Match the sender.
    Out,
}

/// Named transaction categories accepted by the listing endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum TxCategory {
    /// Transactions signed into the block-signer system contract.
    #[serde(rename = "signTxs")]
    SignTxs,
    /// Transactions to anything but the system contracts.
    #[serde(rename = "otherTxs")]
    OtherTxs,
    #[serde(rename = "pending")]
    Pending,
    #[serde(rename = "all")]
    All,
}

/// Query intent resolved by the router. Exactly one variant applies per
/// request; each carries only the fields relevant to its class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxFilter {
    /// Transactions touching an address, optionally narrowed by direction.
    ByAddress {
        address: Address,
        direction: Option<Direction>,
    },
    /// Transactions mined in one specific block.
    ByBlock(u64),
    /// One of the fixed named categories.
    ByCategory(TxCategory),
    /// All non-pending transactions (the default classification).
    Confirmed,
}

impl TxFilter {
    /// Predicate semantics of this filter, the reference a store
    /// implementation must agree with however it translates the query.
    pub fn matches(&self, tx: &Transaction) -> bool {
        match self {
            TxFilter::ByAddress { address, direction } => match direction {
                Some(Direction::In) => tx.to == Some(*address),
                Some(Direction::Out) => tx.from == *address,
                None => tx.from == *address || tx.to == Some(*address),
            },
            TxFilter::ByBlock(number) => tx.block_number == Some(*number),
            TxFilter::ByCategory(TxCategory::SignTxs) => {
                tx.to == Some(known::BLOCK_SIGNER) && !tx.is_pending
            }
            TxFilter::ByCategory(TxCategory::OtherTxs) => {
                !tx.is_pending
                    && tx
                        .to
                        .is_none_or(|to| !known::SYSTEM_CONTRACTS.contains(&to))
            }
            TxFilter::ByCategory(TxCategory::Pending) => tx.is_pending,
            TxFilter::ByCategory(TxCategory::All) | TxFilter::Confirmed => !tx.is_pending,
        }
    }
}

/// Sort order attached to a resolved query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxSort {
    BlockNumberDesc,
    /// Used for pending transactions, which have no block number yet.
    CreatedAtDesc,
}

/// Block listing predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockFilter {
    /// Exactly this set of block numbers.
    Numbers(Vec<u64>),
    /// Unfiltered scan.
    All,
}

/// The generic document store chain data is mirrored into.
///
/// Implementations live outside this crate; the entities and their
/// consistency rules are described in [`crate::data::types`]. All reads
/// and writes here are per-entity, so a cancelled request never leaves a
/// partially visible batch.
#[async_trait]
pub trait Store: Send + Sync {
    async fn block_by_number(&self, number: u64) -> Result<Option<Block>>;
    async fn block_by_hash(&self, hash: B256) -> Result<Option<Block>>;

    /// Upsert keyed on the block number. Re-inserting an already-mirrored
    /// block must not create a duplicate.
    async fn insert_block(&self, block: &Block) -> Result<()>;

    /// The subset of `numbers` already present locally. A cheap existence
    /// probe, not a record fetch.
    async fn distinct_block_numbers(&self, numbers: &[u64]) -> Result<Vec<u64>>;

    /// Blocks matching `filter`, number-descending.
    async fn blocks_page(
        &self,
        filter: &BlockFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Block>>;

    async fn transaction_by_hash(&self, hash: B256) -> Result<Option<Transaction>>;

    /// Transactions matching `filter` in `sort` order.
    async fn transactions_page(
        &self,
        filter: &TxFilter,
        sort: TxSort,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Transaction>>;

    /// Number of locally mirrored transactions for one block.
    async fn count_block_transactions(&self, number: u64) -> Result<u64>;

    async fn account_by_hash(&self, address: Address) -> Result<Option<Account>>;

    /// Batch account lookup used by the enrichment pipeline.
    async fn accounts_by_hash(&self, addresses: &[Address]) -> Result<Vec<Account>>;

    async fn contract_by_hash(&self, address: Address) -> Result<Option<Contract>>;

    /// Aggregate counter row for a category key, when one is maintained.
    async fn special_account(&self, key: &str) -> Result<Option<SpecialAccount>>;

    async fn token_transactions(&self, transaction_hash: B256) -> Result<Vec<TokenTx>>;

    /// Internal transactions with `address` as sender or recipient,
    /// block-number descending.
    async fn internal_transactions_page(
        &self,
        address: Address,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<InternalTx>>;

    async fn count_internal_transactions(&self, address: Address) -> Result<u64>;
}

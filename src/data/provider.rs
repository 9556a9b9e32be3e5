use alloy::consensus::Transaction as ConsensusTransaction;
use alloy::primitives::B256;
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::BlockNumberOrTag;
use async_trait::async_trait;
use chrono::Utc;

use crate::data::types::{Block, ChainBlock, Receipt, Transaction};
use crate::error::{Error, Result};

/// The authoritative chain node, reduced to the calls this crate performs.
///
/// No retries and no timeouts beyond the transport's own: an absent
/// response is a failure, surfaced as [`Error::Upstream`].
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Current head block number.
    async fn head_number(&self) -> Result<u64>;

    /// A block by number, with its transaction hash list.
    async fn block_by_number(&self, number: u64) -> Result<Option<ChainBlock>>;

    /// A block by hash, with its transaction hash list.
    async fn block_by_hash(&self, hash: B256) -> Result<Option<ChainBlock>>;

    async fn transaction(&self, hash: B256) -> Result<Option<Transaction>>;

    async fn transaction_receipt(&self, hash: B256) -> Result<Option<Receipt>>;
}

/// [`ChainClient`] backed by an alloy HTTP provider.
///
/// A trait-object wrapper avoids spelling out the full generic type
/// returned by `ProviderBuilder::new().on_http(url)`.
pub struct EthProvider {
    provider: Box<dyn Provider + Send + Sync>,
}

impl EthProvider {
    /// Connect to a chain node via HTTP RPC.
    pub async fn connect(rpc_url: &str) -> Result<Self> {
        let url = rpc_url.parse().map_err(Error::upstream)?;
        let provider = ProviderBuilder::new().on_http(url);
        Ok(Self {
            provider: Box::new(provider),
        })
    }
}

#[async_trait]
impl ChainClient for EthProvider {
    async fn head_number(&self) -> Result<u64> {
        self.provider
            .get_block_number()
            .await
            .map_err(Error::upstream)
    }

    async fn block_by_number(&self, number: u64) -> Result<Option<ChainBlock>> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Number(number))
            .await
            .map_err(Error::upstream)?;
        Ok(block.as_ref().map(block_from_rpc))
    }

    async fn block_by_hash(&self, hash: B256) -> Result<Option<ChainBlock>> {
        let block = self
            .provider
            .get_block_by_hash(hash)
            .await
            .map_err(Error::upstream)?;
        Ok(block.as_ref().map(block_from_rpc))
    }

    async fn transaction(&self, hash: B256) -> Result<Option<Transaction>> {
        let tx = self
            .provider
            .get_transaction_by_hash(hash)
            .await
            .map_err(Error::upstream)?;
        Ok(tx.as_ref().map(transaction_from_rpc))
    }

    async fn transaction_receipt(&self, hash: B256) -> Result<Option<Receipt>> {
        let receipt = self
            .provider
            .get_transaction_receipt(hash)
            .await
            .map_err(Error::upstream)?;
        Ok(receipt.map(|r| Receipt {
            transaction_hash: r.transaction_hash,
            status: r.status(),
        }))
    }
}

// --- Conversions from alloy RPC types ---

fn block_from_rpc(block: &alloy::rpc::types::Block) -> ChainBlock {
    let transactions: Vec<B256> = block
        .transactions
        .as_hashes()
        .map(|hashes| hashes.to_vec())
        .unwrap_or_else(|| {
            block
                .transactions
                .as_transactions()
                .map(|txs| txs.iter().map(|t| *t.inner.tx_hash()).collect())
                .unwrap_or_default()
        });

    let header = Block {
        number: block.header.number,
        hash: block.header.hash,
        parent_hash: block.header.parent_hash,
        timestamp: block.header.timestamp,
        tx_count: transactions.len() as u64,
        gas_used: block.header.gas_used,
        gas_limit: block.header.gas_limit,
        miner: block.header.beneficiary,
    };

    ChainBlock {
        header,
        transactions,
    }
}

fn transaction_from_rpc(tx: &alloy::rpc::types::Transaction) -> Transaction {
    Transaction {
        hash: *tx.inner.tx_hash(),
        from: tx.inner.signer(),
        to: tx.inner.to(),
        contract_address: None,
        block_number: tx.block_number,
        is_pending: tx.block_number.is_none(),
        // Status stays unresolved here; the enrichment pipeline fills it
        // from the receipt on demand.
        status: None,
        input: tx.inner.input().clone(),
        value: tx.inner.value(),
        gas: tx.inner.gas_limit(),
        gas_price: tx.inner.gas_price(),
        created_at: Utc::now(),
    }
}

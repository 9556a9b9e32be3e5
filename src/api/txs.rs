use std::sync::Arc;
use std::time::Instant;

use alloy::primitives::{Address, B256};
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::data::decoder::InputDecoder;
use crate::data::provider::ChainClient;
use crate::data::store::{Store, TxFilter};
use crate::data::types::{InternalTx, TokenTx, Transaction};
use crate::enrich::{self, EnrichedTx};
use crate::error::{Error, Result};
use crate::page::{PageRequest, Paginated};
use crate::query::{self, TxListQuery};

/// Fully assembled single-transaction view for `GET /txs/:slug`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxDetail {
    #[serde(flatten)]
    pub tx: EnrichedTx,
    pub token_txs: Vec<TokenTx>,
    pub latest_block_number: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_data: Option<String>,
}

/// Read service for transaction listings, detail and internal transfers.
pub struct Txs {
    store: Arc<dyn Store>,
    chain: Arc<dyn ChainClient>,
    limited_records: u64,
}

impl Txs {
    pub fn new(store: Arc<dyn Store>, chain: Arc<dyn ChainClient>, settings: &Settings) -> Self {
        Self {
            store,
            chain,
            limited_records: settings.limited_records,
        }
    }

    /// List transactions for one classified query intent. Every returned
    /// page goes through the enrichment pipeline.
    pub async fn list(&self, query: &TxListQuery) -> Result<Paginated<EnrichedTx>> {
        let request = PageRequest::transactions(query.page, query.limit);
        let resolved = query::resolve(query);
        let mut started = Instant::now();

        let total = match resolved.counter {
            Some(key) => self
                .store
                .special_account(key)
                .await?
                .map(|counter| counter.total_transaction_count)
                .unwrap_or(0),
            None => 0,
        };
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            filter = ?resolved.filter,
            total,
            "transaction query prepared"
        );
        started = Instant::now();

        let from_chain = if let TxFilter::ByBlock(number) = resolved.filter {
            if self.under_mirrored(number).await? {
                Some(self.page_from_chain(number, request).await?)
            } else {
                None
            }
        } else {
            None
        };

        let envelope = match from_chain {
            Some(envelope) => envelope,
            None => {
                let items = self
                    .store
                    .transactions_page(
                        &resolved.filter,
                        resolved.sort,
                        request.offset(),
                        request.per_page,
                    )
                    .await?;
                Paginated::assemble(items, total, Some(total), request, self.limited_records)
            }
        };
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            items = envelope.items.len(),
            "transaction page read"
        );
        started = Instant::now();

        let Paginated {
            real_total,
            total,
            per_page,
            current_page,
            pages,
            items,
        } = envelope;
        let items =
            enrich::enrich_transactions(self.store.as_ref(), self.chain.as_ref(), items).await?;
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "transaction page enriched"
        );

        Ok(Paginated {
            real_total,
            total,
            per_page,
            current_page,
            pages,
            items,
        })
    }

    /// Assemble the single-transaction view. A fetch failure for the
    /// transaction itself is fatal to the request; every enrichment around
    /// it degrades instead.
    pub async fn detail(&self, hash: B256) -> Result<TxDetail> {
        let tx = match self.store.transaction_by_hash(hash).await? {
            Some(tx) => tx,
            None => self
                .chain
                .transaction(hash)
                .await?
                .ok_or_else(|| Error::not_found(format!("transaction {hash}")))?,
        };

        let mut item =
            enrich::enrich_transaction(self.store.as_ref(), self.chain.as_ref(), tx).await?;

        // Contract creations resolve their recipient model through the
        // created contract's address.
        if item.to_model.is_none() {
            if let Some(created) = item.tx.contract_address {
                item.to_model = self
                    .store
                    .account_by_hash(created)
                    .await?
                    .map(enrich::with_display_name);
            }
        }

        let token_txs = self.store.token_transactions(hash).await?;

        let latest_block_number = match self.chain.head_number().await {
            Ok(head) => head,
            Err(err) => {
                warn!(%err, "failed to read chain head, falling back to the transaction's block");
                item.tx.block_number.unwrap_or(0)
            }
        };

        let input_data = self.render_input(&item).await?;

        Ok(TxDetail {
            tx: item,
            token_txs,
            latest_block_number,
            input_data,
        })
    }

    /// Paginated internal transfers with `address` as sender or recipient.
    pub async fn internal(
        &self,
        address: Address,
        limit: Option<u64>,
        page: Option<u64>,
    ) -> Result<Paginated<InternalTx>> {
        let request = PageRequest::transactions(page, limit);
        let total = self.store.count_internal_transactions(address).await?;
        let items = self
            .store
            .internal_transactions_page(address, request.offset(), request.per_page)
            .await?;
        Ok(Paginated::assemble(
            items,
            total,
            Some(total),
            request,
            self.limited_records,
        ))
    }

    /// A block page must come from the chain when the block is not
    /// mirrored at all, or when its header records more transactions than
    /// the local mirror holds for it.
    async fn under_mirrored(&self, number: u64) -> Result<bool> {
        let Some(block) = self.store.block_by_number(number).await? else {
            return Ok(true);
        };
        let mirrored = self.store.count_block_transactions(number).await?;
        Ok(block.tx_count > mirrored)
    }

    /// Hydrate the requested page slice straight from the live block's
    /// transaction list. Fetches run concurrently and are joined back in
    /// slice order; a failed unit is dropped without disturbing the order
    /// of the rest.
    async fn page_from_chain(
        &self,
        number: u64,
        request: PageRequest,
    ) -> Result<Paginated<Transaction>> {
        let Some(live) = self.chain.block_by_number(number).await? else {
            return Err(Error::not_found(format!("block {number}")));
        };

        let total = live.transactions.len() as u64;
        let start = request.offset().min(total) as usize;
        let end = (request.offset() + request.per_page).min(total) as usize;
        let slice = &live.transactions[start..end];

        let fetches = slice
            .iter()
            .map(|&hash| async move { (hash, self.chain.transaction(hash).await) });
        let mut items = Vec::with_capacity(slice.len());
        for (hash, outcome) in join_all(fetches).await {
            match outcome {
                Ok(Some(tx)) => items.push(tx),
                Ok(None) => warn!(%hash, "transaction missing on chain"),
                Err(err) => warn!(%hash, %err, "failed to fetch transaction"),
            }
        }

        Ok(Paginated::assemble(
            items,
            total,
            Some(total),
            request,
            self.limited_records,
        ))
    }

    /// Decode call data for display. The stored contract record is only
    /// consulted when the destination account is flagged as a contract.
    async fn render_input(&self, item: &EnrichedTx) -> Result<Option<String>> {
        let Some(to) = item.tx.to else {
            return Ok(None);
        };
        if item.tx.input.is_empty() {
            return Ok(None);
        }
        let is_contract = item
            .to_model
            .as_ref()
            .map(|account| account.is_contract)
            .unwrap_or(false);
        let contract = if is_contract {
            self.store.contract_by_hash(to).await?
        } else {
            None
        };
        Ok(InputDecoder::render(&item.tx, contract.as_ref()))
    }
}

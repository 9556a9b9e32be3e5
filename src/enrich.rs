//! Concurrent enrichment of transaction result sets: account models,
//! display names, and lazily resolved receipt status.

use alloy::primitives::{Address, B256};
use futures::future::join_all;
use serde::Serialize;
use tracing::warn;

use crate::data::known;
use crate::data::provider::ChainClient;
use crate::data::store::Store;
use crate::data::types::{Account, Transaction};
use crate::error::{Error, Result};

/// A transaction with its resolved sender and recipient account models.
#[derive(Debug, Clone, Serialize)]
pub struct EnrichedTx {
    #[serde(flatten)]
    pub tx: Transaction,
    pub from_model: Option<Account>,
    pub to_model: Option<Account>,
}

/// Attach account models and receipt status to an ordered result set.
///
/// All fan-out is joined in full before returning and the output
/// preserves input order item for item. A failed receipt lookup degrades
/// that one item to `status: None`; it is never dropped or reordered.
pub async fn enrich_transactions(
    store: &dyn Store,
    chain: &dyn ChainClient,
    txs: Vec<Transaction>,
) -> Result<Vec<EnrichedTx>> {
    if txs.is_empty() {
        return Ok(Vec::new());
    }

    // Distinct from/to addresses in first-seen order, one batch lookup.
    let mut addresses: Vec<Address> = Vec::new();
    for tx in &txs {
        if !addresses.contains(&tx.from) {
            addresses.push(tx.from);
        }
        if let Some(to) = tx.to {
            if !addresses.contains(&to) {
                addresses.push(to);
            }
        }
    }
    let accounts = store.accounts_by_hash(&addresses).await?;

    let mut items: Vec<EnrichedTx> = txs
        .into_iter()
        .map(|tx| {
            let from_model = accounts
                .iter()
                .find(|a| a.hash == tx.from)
                .cloned()
                .map(with_display_name);
            let to_model = tx
                .to
                .and_then(|to| accounts.iter().find(|a| a.hash == to).cloned())
                .map(with_display_name);
            EnrichedTx {
                tx,
                from_model,
                to_model,
            }
        })
        .collect();

    // Receipts for items with no resolved status yet, merged back by
    // position.
    let unresolved: Vec<(usize, B256)> = items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.tx.status.is_none())
        .map(|(idx, item)| (idx, item.tx.hash))
        .collect();
    if !unresolved.is_empty() {
        let lookups = unresolved
            .iter()
            .map(|&(_, hash)| async move { chain.transaction_receipt(hash).await });
        let receipts = join_all(lookups).await;

        for (&(idx, hash), outcome) in unresolved.iter().zip(receipts) {
            match outcome {
                Ok(receipt) => items[idx].tx.status = receipt.map(|r| r.status),
                Err(err) => {
                    warn!(%hash, %err, "failed to resolve receipt status");
                    items[idx].tx.status = None;
                }
            }
        }
    }

    Ok(items)
}

/// Enrich a single transaction, for the detail endpoint.
pub async fn enrich_transaction(
    store: &dyn Store,
    chain: &dyn ChainClient,
    tx: Transaction,
) -> Result<EnrichedTx> {
    let mut items = enrich_transactions(store, chain, vec![tx]).await?;
    items
        .pop()
        .ok_or_else(|| Error::store("enrichment returned an empty set"))
}

/// Overlay the static display-name table onto a stored account.
pub(crate) fn with_display_name(mut account: Account) -> Account {
    if let Some(name) = known::account_name(&account.hash) {
        account.account_name = Some(name.to_owned());
    }
    account
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    use crate::testutil::{self, MemoryStore, ScriptedChain};

    #[tokio::test]
    async fn test_enrichment_preserves_order_and_count() {
        let store = MemoryStore::default();

        let mut txs: Vec<_> = (0..7)
            .map(|i| testutil::confirmed_tx(i, 50 + i, testutil::addr(1), Some(testutil::addr(2))))
            .collect();
        for tx in &mut txs {
            tx.status = None;
        }
        let input_hashes: Vec<_> = txs.iter().map(|t| t.hash).collect();

        // Early items complete their receipt lookups last.
        let mut chain = ScriptedChain::new(100);
        for (i, tx) in txs.iter().enumerate() {
            chain = chain
                .with_receipt(tx.hash, true)
                .with_delay(tx.hash, 5 * (7 - i as u64));
        }

        let enriched = enrich_transactions(&store, &chain, txs).await.unwrap();
        let output_hashes: Vec<_> = enriched.iter().map(|t| t.tx.hash).collect();
        assert_eq!(input_hashes, output_hashes);
        assert!(enriched.iter().all(|t| t.tx.status == Some(true)));
    }

    #[tokio::test]
    async fn test_account_models_are_attached() {
        let store = MemoryStore::default();
        store.seed_account(testutil::addr(1), false, None);
        store.seed_account(testutil::addr(2), true, Some("Bridge"));
        let chain = ScriptedChain::new(100);

        let tx = testutil::confirmed_tx(1, 50, testutil::addr(1), Some(testutil::addr(2)));
        let enriched = enrich_transactions(&store, &chain, vec![tx]).await.unwrap();

        let item = &enriched[0];
        assert_eq!(item.from_model.as_ref().unwrap().hash, testutil::addr(1));
        let to_model = item.to_model.as_ref().unwrap();
        assert!(to_model.is_contract);
        assert_eq!(to_model.account_name.as_deref(), Some("Bridge"));
    }

    #[tokio::test]
    async fn test_well_known_name_overlays_stored_label() {
        let store = MemoryStore::default();
        store.seed_account(known::BLOCK_SIGNER, true, Some("stale label"));
        let chain = ScriptedChain::new(100);

        let tx = testutil::confirmed_tx(1, 50, testutil::addr(1), Some(known::BLOCK_SIGNER));
        let enriched = enrich_transactions(&store, &chain, vec![tx]).await.unwrap();

        let to_model = enriched[0].to_model.as_ref().unwrap();
        assert_eq!(to_model.account_name.as_deref(), Some("BlockSigner Contract"));
    }

    #[tokio::test]
    async fn test_unknown_accounts_leave_models_empty() {
        let store = MemoryStore::default();
        let chain = ScriptedChain::new(100);

        let tx = testutil::confirmed_tx(1, 50, testutil::addr(1), Some(testutil::addr(2)));
        let enriched = enrich_transactions(&store, &chain, vec![tx]).await.unwrap();
        assert!(enriched[0].from_model.is_none());
        assert!(enriched[0].to_model.is_none());
    }

    #[tokio::test]
    async fn test_missing_status_is_resolved_from_receipts() {
        let store = MemoryStore::default();
        let mut tx_ok = testutil::confirmed_tx(1, 50, testutil::addr(1), Some(testutil::addr(2)));
        tx_ok.status = None;
        let mut tx_failed = testutil::confirmed_tx(2, 50, testutil::addr(1), Some(testutil::addr(2)));
        tx_failed.status = None;
        let mut tx_resolved = testutil::confirmed_tx(3, 50, testutil::addr(1), Some(testutil::addr(2)));
        tx_resolved.status = Some(true);

        let chain = ScriptedChain::new(100)
            .with_receipt(tx_ok.hash, true)
            .with_receipt(tx_failed.hash, false);

        let enriched = enrich_transactions(&store, &chain, vec![tx_ok, tx_failed, tx_resolved])
            .await
            .unwrap();
        assert_eq!(enriched[0].tx.status, Some(true));
        assert_eq!(enriched[1].tx.status, Some(false));
        assert_eq!(enriched[2].tx.status, Some(true));
        // The already-resolved item triggered no receipt lookup.
        assert_eq!(chain.receipt_fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_receipt_lookup_degrades_to_null_status() {
        let store = MemoryStore::default();
        let mut healthy = testutil::confirmed_tx(1, 50, testutil::addr(1), Some(testutil::addr(2)));
        healthy.status = None;
        let mut degraded = testutil::confirmed_tx(2, 50, testutil::addr(1), Some(testutil::addr(2)));
        degraded.status = None;

        let chain = ScriptedChain::new(100)
            .with_receipt(healthy.hash, true)
            .failing_receipt(degraded.hash);

        let enriched = enrich_transactions(&store, &chain, vec![healthy, degraded.clone()])
            .await
            .unwrap();
        // The failed unit is kept, in position, with a null status.
        assert_eq!(enriched.len(), 2);
        assert_eq!(enriched[1].tx.hash, degraded.hash);
        assert_eq!(enriched[1].tx.status, None);
        assert_eq!(enriched[0].tx.status, Some(true));
    }

    #[tokio::test]
    async fn test_pending_without_receipt_stays_null() {
        let store = MemoryStore::default();
        let chain = ScriptedChain::new(100);

        let tx = testutil::pending_tx(1, testutil::addr(1), Some(testutil::addr(2)));
        let enriched = enrich_transactions(&store, &chain, vec![tx]).await.unwrap();
        assert_eq!(enriched[0].tx.status, None);
    }
}

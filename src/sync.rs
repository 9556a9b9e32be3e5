//! Gap-filling synchronization between the local mirror and the chain.

use std::collections::HashSet;

use alloy::primitives::B256;
use futures::future::join_all;
use tracing::{debug, warn};

use crate::data::provider::ChainClient;
use crate::data::store::Store;
use crate::data::types::Block;
use crate::error::Result;

/// Block numbers shown on one listing page: a window of `per_page`
/// numbers ending just below the chain head, shifted down one window per
/// page. Windows entirely past the head are empty, and numbers beyond the
/// head are never produced.
pub fn page_numbers(head: u64, page: u64, per_page: u64) -> Vec<u64> {
    let span = page.saturating_mul(per_page);
    if span.saturating_sub(head) >= per_page {
        return Vec::new();
    }
    let lo = head.saturating_sub(span);
    let hi = (lo + per_page).min(head);
    (lo..hi).collect()
}

/// Fetch and persist every requested block number absent from the store.
///
/// Missing numbers are fetched concurrently and the whole batch is joined
/// before returning, so the caller may read the page afterwards. A fetch
/// failure for one number is logged and leaves that number absent, to be
/// retried by a later request; it never aborts the rest of the batch.
/// Re-running over already-present numbers is a no-op.
pub async fn fill_missing_blocks(
    store: &dyn Store,
    chain: &dyn ChainClient,
    numbers: &[u64],
) -> Result<()> {
    if numbers.is_empty() {
        return Ok(());
    }

    let existing: HashSet<u64> = store
        .distinct_block_numbers(numbers)
        .await?
        .into_iter()
        .collect();
    let missing: Vec<u64> = numbers
        .iter()
        .copied()
        .filter(|n| !existing.contains(n))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    debug!(missing = missing.len(), "filling block gaps");

    let fetches = missing.iter().map(|&number| async move {
        match chain.block_by_number(number).await {
            Ok(Some(fetched)) => {
                if let Err(err) = store.insert_block(&fetched.header).await {
                    warn!(number, %err, "failed to persist fetched block");
                }
            }
            Ok(None) => warn!(number, "block not available on chain"),
            Err(err) => warn!(number, %err, "failed to fetch block"),
        }
    });
    join_all(fetches).await;

    Ok(())
}

/// Fetch one block from the chain by number and mirror it locally.
pub async fn mirror_block_by_number(
    store: &dyn Store,
    chain: &dyn ChainClient,
    number: u64,
) -> Result<Option<Block>> {
    let Some(fetched) = chain.block_by_number(number).await? else {
        return Ok(None);
    };
    store.insert_block(&fetched.header).await?;
    Ok(Some(fetched.header))
}

/// Fetch one block from the chain by hash and mirror it locally.
pub async fn mirror_block_by_hash(
    store: &dyn Store,
    chain: &dyn ChainClient,
    hash: B256,
) -> Result<Option<Block>> {
    let Some(fetched) = chain.block_by_hash(hash).await? else {
        return Ok(None);
    };
    store.insert_block(&fetched.header).await?;
    Ok(Some(fetched.header))
}

use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

use alloy::primitives::B256;
use serde::Deserialize;
use tracing::debug;

use crate::config::Settings;
use crate::data::provider::ChainClient;
use crate::data::store::{BlockFilter, Store};
use crate::data::types::Block;
use crate::error::{Error, Result};
use crate::page::{PageRequest, Paginated};
use crate::sync;

/// Listing filters accepted by `GET /blocks`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockListFilter {
    /// Newest first. Accepted for interface parity; this matches the
    /// default number-descending order.
    Latest,
}

/// Parameters for `GET /blocks`, already validated upstream.
#[derive(Debug, Clone, Default)]
pub struct BlockListQuery {
    pub limit: Option<u64>,
    pub page: Option<u64>,
    pub filter: Option<BlockListFilter>,
    /// When set, the listing switches from the head-anchored number window
    /// to an unfiltered store scan.
    pub to: Option<u64>,
}

/// Path slug for `GET /blocks/:slug`: a block number or a block hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockSlug {
    Number(u64),
    Hash(B256),
}

impl FromStr for BlockSlug {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(number) = s.parse::<u64>() {
            return Ok(BlockSlug::Number(number));
        }
        s.parse::<B256>()
            .map(BlockSlug::Hash)
            .map_err(|_| Error::not_found(format!("block {s}")))
    }
}

/// Read service for block listings and single-block lookups.
pub struct Blocks {
    store: Arc<dyn Store>,
    chain: Arc<dyn ChainClient>,
    limited_records: u64,
}

impl Blocks {
    pub fn new(store: Arc<dyn Store>, chain: Arc<dyn ChainClient>, settings: &Settings) -> Self {
        Self {
            store,
            chain,
            limited_records: settings.limited_records,
        }
    }

    /// List blocks below the current head, filling local gaps on demand.
    ///
    /// The head lookup is the primary dependency of this listing; its
    /// failure fails the request. Individual gap fetches degrade instead.
    pub async fn list(&self, query: &BlockListQuery) -> Result<Paginated<Block>> {
        let request = PageRequest::blocks(query.page, query.limit);
        let started = Instant::now();

        let head = self.chain.head_number().await?;
        let numbers = sync::page_numbers(head, request.page, request.per_page);
        sync::fill_missing_blocks(self.store.as_ref(), self.chain.as_ref(), &numbers).await?;

        let items = if query.to.is_some() {
            self.store
                .blocks_page(&BlockFilter::All, request.offset(), request.per_page)
                .await?
        } else {
            // The window already identifies this page, so no further
            // offset applies to it.
            self.store
                .blocks_page(&BlockFilter::Numbers(numbers), 0, request.per_page)
                .await?
        };
        debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            head,
            page = request.page,
            "blocks page assembled"
        );

        Ok(Paginated::assemble(
            items,
            head,
            None,
            request,
            self.limited_records,
        ))
    }

    /// Look up one block by number or hash, mirroring it from the chain
    /// when absent locally. A chain failure here is fatal: the block is
    /// the primary resource of the request.
    pub async fn by_slug(&self, slug: BlockSlug) -> Result<Block> {
        match slug {
            BlockSlug::Number(number) => {
                if let Some(block) = self.store.block_by_number(number).await? {
                    return Ok(block);
                }
                sync::mirror_block_by_number(self.store.as_ref(), self.chain.as_ref(), number)
                    .await?
                    .ok_or_else(|| Error::not_found(format!("block {number}")))
            }
            BlockSlug::Hash(hash) => {
                if let Some(block) = self.store.block_by_hash(hash).await? {
                    return Ok(block);
                }
                sync::mirror_block_by_hash(self.store.as_ref(), self.chain.as_ref(), hash)
                    .await?
                    .ok_or_else(|| Error::not_found(format!("block {hash}")))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::testutil::{self, MemoryStore, ScriptedChain};

    fn settings() -> Settings {
        Settings {
            rpc_url: String::new(),
            limited_records: 500_000,
        }
    }

    fn service(store: MemoryStore, chain: ScriptedChain) -> Blocks {
        Blocks::new(Arc::new(store), Arc::new(chain), &settings())
    }

    #[tokio::test]
    async fn test_listing_fills_gaps_and_returns_descending_page() {
        // Store has nothing mirrored; head is 100.
        let service = service(
            MemoryStore::default(),
            ScriptedChain::new(100).with_empty_blocks(90..100),
        );

        let page = service
            .list(&BlockListQuery {
                limit: Some(5),
                page: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();

        let numbers: Vec<u64> = page.items.iter().map(|b| b.number).collect();
        assert_eq!(numbers, vec![99, 98, 97, 96, 95]);
        assert_eq!(page.per_page, 5);
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total, 100);
    }

    #[tokio::test]
    async fn test_listing_per_page_is_capped() {
        let service = service(
            MemoryStore::default(),
            ScriptedChain::new(100).with_empty_blocks(75..100),
        );

        let page = service
            .list(&BlockListQuery {
                limit: Some(1000),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(page.per_page, 25);
        assert!(page.items.len() <= 25);
    }

    #[tokio::test]
    async fn test_listing_skips_unfetchable_numbers() {
        let service = service(
            MemoryStore::default(),
            ScriptedChain::new(100)
                .with_empty_blocks(95..100)
                .failing_block(97),
        );

        let page = service
            .list(&BlockListQuery {
                limit: Some(5),
                ..Default::default()
            })
            .await
            .unwrap();

        let numbers: Vec<u64> = page.items.iter().map(|b| b.number).collect();
        assert_eq!(numbers, vec![99, 98, 96, 95]);
    }

    #[tokio::test]
    async fn test_listing_with_to_scans_the_store() {
        let store = MemoryStore::default();
        for n in 0..20 {
            store.seed_block(n);
        }
        let service = service(store, ScriptedChain::new(20).with_empty_blocks(0..20));

        let page = service
            .list(&BlockListQuery {
                limit: Some(10),
                page: Some(2),
                to: Some(5),
                ..Default::default()
            })
            .await
            .unwrap();

        let numbers: Vec<u64> = page.items.iter().map(|b| b.number).collect();
        assert_eq!(numbers, (0..10).rev().collect::<Vec<u64>>());
    }

    #[tokio::test]
    async fn test_head_failure_fails_the_listing() {
        let service = service(MemoryStore::default(), ScriptedChain::new(0).failing_head());
        let err = service.list(&BlockListQuery::default()).await.unwrap_err();
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_slug_parses_number_and_hash() {
        assert_eq!("42".parse::<BlockSlug>().unwrap(), BlockSlug::Number(42));
        let hash = testutil::hash(7);
        assert_eq!(
            hash.to_string().parse::<BlockSlug>().unwrap(),
            BlockSlug::Hash(hash)
        );
        assert!("zz".parse::<BlockSlug>().is_err());
    }

    #[tokio::test]
    async fn test_by_slug_prefers_the_local_mirror() {
        let store = MemoryStore::default();
        store.seed_block(42);
        let service = service(store, ScriptedChain::new(100));

        let block = service.by_slug(BlockSlug::Number(42)).await.unwrap();
        assert_eq!(block.number, 42);
    }

    #[tokio::test]
    async fn test_by_slug_mirrors_absent_blocks_from_chain() {
        let chain = ScriptedChain::new(100).with_empty_blocks(42..43);
        let service = Blocks::new(
            Arc::new(MemoryStore::default()),
            Arc::new(chain),
            &settings(),
        );

        let block = service.by_slug(BlockSlug::Number(42)).await.unwrap();
        assert_eq!(block.number, 42);
        // The fetched block is now mirrored; a second lookup stays local.
        let again = service.by_slug(BlockSlug::Number(42)).await.unwrap();
        assert_eq!(again, block);
    }

    #[tokio::test]
    async fn test_by_slug_hash_lookup() {
        let chain = ScriptedChain::new(100).with_empty_blocks(42..43);
        let service = Blocks::new(
            Arc::new(MemoryStore::default()),
            Arc::new(chain),
            &settings(),
        );

        let block = service
            .by_slug(BlockSlug::Hash(testutil::hash(42)))
            .await
            .unwrap();
        assert_eq!(block.number, 42);
    }

    #[tokio::test]
    async fn test_by_slug_absent_everywhere_is_not_found() {
        let service = service(MemoryStore::default(), ScriptedChain::new(100));
        let err = service.by_slug(BlockSlug::Number(42)).await.unwrap_err();
        assert!(err.is_not_found());
    }
}

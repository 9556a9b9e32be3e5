//! Classification of transaction-listing queries into a single store
//! predicate, a sort order, and an aggregate-counter key.

use alloy::primitives::Address;

use crate::data::store::{Direction, TxCategory, TxFilter, TxSort};

// Counter keys maintained by the external aggregation job.
pub const ALL_TRANSACTION: &str = "allTransaction";
pub const SIGN_TRANSACTION: &str = "signTransaction";
pub const OTHER_TRANSACTION: &str = "otherTransaction";
pub const PENDING_TRANSACTION: &str = "pendingTransaction";

/// Listing parameters for `GET /txs`, already validated by the external
/// HTTP gate (lengths, ranges and enum spellings are its responsibility).
#[derive(Debug, Clone, Default)]
pub struct TxListQuery {
    pub limit: Option<u64>,
    pub page: Option<u64>,
    pub address: Option<Address>,
    pub block: Option<u64>,
    pub category: Option<TxCategory>,
    /// Narrows an address query to incoming or outgoing transactions.
    pub direction: Option<Direction>,
}

/// Outcome of classifying a listing query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedQuery {
    pub filter: TxFilter,
    pub sort: TxSort,
    /// SpecialAccount key holding the authoritative total, when one exists
    /// for this class of query. Address and block queries have none, and
    /// no live count is taken in their place.
    pub counter: Option<&'static str>,
}

/// Classify a listing query. First match wins: address, then block, then
/// named category, then the all-confirmed default.
pub fn resolve(query: &TxListQuery) -> ResolvedQuery {
    if let Some(address) = query.address {
        return ResolvedQuery {
            filter: TxFilter::ByAddress {
                address,
                direction: query.direction,
            },
            sort: TxSort::BlockNumberDesc,
            counter: None,
        };
    }

    if let Some(number) = query.block {
        return ResolvedQuery {
            filter: TxFilter::ByBlock(number),
            sort: TxSort::BlockNumberDesc,
            counter: None,
        };
    }

    match query.category {
        Some(TxCategory::SignTxs) => ResolvedQuery {
            filter: TxFilter::ByCategory(TxCategory::SignTxs),
            sort: TxSort::BlockNumberDesc,
            counter: Some(SIGN_TRANSACTION),
        },
        Some(TxCategory::OtherTxs) => ResolvedQuery {
            filter: TxFilter::ByCategory(TxCategory::OtherTxs),
            sort: TxSort::BlockNumberDesc,
            counter: Some(OTHER_TRANSACTION),
        },
        Some(TxCategory::Pending) => ResolvedQuery {
            filter: TxFilter::ByCategory(TxCategory::Pending),
            sort: TxSort::CreatedAtDesc,
            counter: Some(PENDING_TRANSACTION),
        },
        Some(TxCategory::All) => ResolvedQuery {
            filter: TxFilter::ByCategory(TxCategory::All),
            sort: TxSort::BlockNumberDesc,
            counter: Some(ALL_TRANSACTION),
        },
        None => ResolvedQuery {
            filter: TxFilter::Confirmed,
            sort: TxSort::BlockNumberDesc,
            counter: Some(ALL_TRANSACTION),
        },
    }
}

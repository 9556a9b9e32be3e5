//! Service layer behind the external HTTP gate: one read service per
//! controller, operating on already-validated parameters.

mod blocks;
mod txs;

pub use blocks::{BlockListFilter, BlockListQuery, BlockSlug, Blocks};
pub use txs::{TxDetail, Txs};

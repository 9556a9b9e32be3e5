use std::collections::BTreeMap;

use alloy::json_abi::JsonAbi;
use alloy::primitives::{Address, B256, Bytes, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A chain block header mirrored into the local store.
///
/// Inserted by the synchronizer on first observation and immutable
/// afterwards. `number` and `hash` are both valid lookup keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub number: u64,
    pub hash: B256,
    pub parent_hash: B256,
    pub timestamp: u64,
    /// Transaction count recorded in the chain header. May exceed the
    /// number of transactions mirrored locally for this block.
    pub tx_count: u64,
    pub gas_used: u64,
    pub gas_limit: u64,
    pub miner: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub hash: B256,
    pub from: Address,
    /// None for contract-creation transactions.
    pub to: Option<Address>,
    /// Address of the created contract when `to` is None.
    pub contract_address: Option<Address>,
    pub block_number: Option<u64>,
    /// True until the transaction is observed in a mined block.
    pub is_pending: bool,
    /// Receipt status. None until a receipt has been resolved; resolved
    /// lazily at enrichment time, never at mirror time.
    pub status: Option<bool>,
    /// Raw call data.
    pub input: Bytes,
    pub value: U256,
    pub gas: u64,
    pub gas_price: Option<u128>,
    pub created_at: DateTime<Utc>,
}

/// Address-level reference data. Read-only for this crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub hash: Address,
    pub is_contract: bool,
    /// Display label. The well-known-address table is overlaid onto this
    /// at enrichment time.
    pub account_name: Option<String>,
}

/// A contract's decoding surface: its parsed ABI plus the selector table
/// mapping each signature string to its 4-byte selector hex (sans `0x`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
    pub hash: Address,
    pub abi_code: JsonAbi,
    pub function_hashes: BTreeMap<String, String>,
}

/// Precomputed aggregate counter for one fixed query category, maintained
/// by an external job. When present it is authoritative and spares a live
/// collection count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecialAccount {
    pub hash: String,
    pub total_transaction_count: u64,
}

/// A token-transfer event row keyed by its parent transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenTx {
    pub transaction_hash: B256,
    /// The token contract that emitted the transfer.
    pub address: Address,
    pub from: Address,
    pub to: Address,
    pub value: U256,
    pub block_number: u64,
}

/// An internal (message-call) transfer extracted from execution traces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalTx {
    /// Hash of the enclosing transaction.
    pub hash: B256,
    pub block_number: u64,
    pub from: Address,
    pub to: Address,
    pub value: U256,
}

/// Receipt fields this crate consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub transaction_hash: B256,
    pub status: bool,
}

/// A live block as returned by the chain client: the header plus the
/// ordered list of its transaction hashes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainBlock {
    pub header: Block,
    pub transactions: Vec<B256>,
}

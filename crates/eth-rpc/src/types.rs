use alloy_primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize, Serializer};

use crate::quantity;

/// Block selector for calls, balances and log ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockNumberOrTag {
    #[default]
    Latest,
    Earliest,
    Pending,
    Number(u64),
}

impl From<u64> for BlockNumberOrTag {
    fn from(number: u64) -> Self {
        BlockNumberOrTag::Number(number)
    }
}

impl Serialize for BlockNumberOrTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            BlockNumberOrTag::Latest => serializer.serialize_str("latest"),
            BlockNumberOrTag::Earliest => serializer.serialize_str("earliest"),
            BlockNumberOrTag::Pending => serializer.serialize_str("pending"),
            BlockNumberOrTag::Number(n) => serializer.serialize_str(&quantity::encode_u64(*n)),
        }
    }
}

/// Parameters of `eth_call` and `eth_estimateGas`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<Address>,
    pub to: Address,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<U256>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Bytes>,
}

impl CallRequest {
    pub fn new(to: Address) -> Self {
        Self {
            to,
            ..Default::default()
        }
    }

    pub fn sender(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    pub fn value(mut self, value: U256) -> Self {
        self.value = Some(value);
        self
    }

    pub fn data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = Some(data.into());
        self
    }
}

/// Parameters of `eth_getLogs`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFilter {
    pub from_block: BlockNumberOrTag,
    pub to_block: BlockNumberOrTag,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<Option<B256>>,
}

/// The subset of a block header the wallet reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    #[serde(default, with = "quantity::hex_opt_u64")]
    pub number: Option<u64>,
    #[serde(default)]
    pub hash: Option<B256>,
    #[serde(with = "quantity::hex_u64")]
    pub timestamp: u64,
    /// Absent on pre-London chains.
    #[serde(default, with = "quantity::hex_opt_u128")]
    pub base_fee_per_gas: Option<u128>,
}

/// An event log entry as returned by `eth_getLogs` and inside receipts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
    #[serde(default)]
    pub block_hash: Option<B256>,
    #[serde(default, with = "quantity::hex_opt_u64")]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub transaction_hash: Option<B256>,
    #[serde(default, with = "quantity::hex_opt_u64")]
    pub transaction_index: Option<u64>,
    #[serde(default, with = "quantity::hex_opt_u64")]
    pub log_index: Option<u64>,
    #[serde(default)]
    pub removed: bool,
}

/// Receipt of a mined transaction (`eth_getTransactionReceipt`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    #[serde(default, with = "quantity::hex_opt_u64")]
    pub transaction_index: Option<u64>,
    #[serde(default)]
    pub block_hash: Option<B256>,
    #[serde(default, with = "quantity::hex_opt_u64")]
    pub block_number: Option<u64>,
    pub from: Address,
    #[serde(default)]
    pub to: Option<Address>,
    #[serde(with = "quantity::hex_u64")]
    pub gas_used: u64,
    #[serde(default, with = "quantity::hex_opt_u64")]
    pub cumulative_gas_used: Option<u64>,
    #[serde(default, with = "quantity::hex_opt_u128")]
    pub effective_gas_price: Option<u128>,
    #[serde(default)]
    pub contract_address: Option<Address>,
    #[serde(default)]
    pub logs: Vec<Log>,
    /// `1` on success, `0` on revert. Pre-Byzantium receipts carry a state root instead.
    #[serde(default, with = "quantity::hex_opt_u64")]
    pub status: Option<u64>,
}

impl TransactionReceipt {
    /// False only when the node reports an explicit revert.
    pub fn succeeded(&self) -> bool {
        self.status != Some(0)
    }
}

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, Bytes, B256, U256};
use futures_timer::Delay;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{Result, RpcError};
use crate::quantity;
use crate::transport::{HttpTransport, Transport};
use crate::types::{Block, BlockNumberOrTag, CallRequest, Log, LogFilter, TransactionReceipt};

/// Typed Ethereum JSON-RPC client over any [`Transport`].
///
/// Cheap to clone; clones share the transport.
#[derive(Clone)]
pub struct Provider {
    url: String,
    transport: Arc<dyn Transport>,
}

impl Provider {
    /// Connects to an HTTP(S) endpoint. The URL is validated, not dialed.
    pub fn new_http(url: &str) -> Result<Self> {
        let transport = HttpTransport::new(url)?;
        Ok(Self {
            url: transport.url().to_string(),
            transport: Arc::new(transport),
        })
    }

    /// Wraps an existing transport. `label` is only used for display.
    pub fn with_transport(label: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        Self {
            url: label.into(),
            transport,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn request<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        debug!(method, url = %self.url, "rpc call");
        let value = self.transport.request(method, params).await?;
        serde_json::from_value(value).map_err(|e| RpcError::Decode(format!("{method}: {e}")))
    }

    async fn request_u64(&self, method: &str, params: Value) -> Result<u64> {
        let text: String = self.request(method, params).await?;
        quantity::decode_u64(&text)
    }

    async fn request_u128(&self, method: &str, params: Value) -> Result<u128> {
        let text: String = self.request(method, params).await?;
        quantity::decode_u128(&text)
    }

    pub async fn chain_id(&self) -> Result<u64> {
        self.request_u64("eth_chainId", json!([])).await
    }

    pub async fn block_number(&self) -> Result<u64> {
        self.request_u64("eth_blockNumber", json!([])).await
    }

    /// Balance in wei.
    pub async fn get_balance(&self, address: Address, block: BlockNumberOrTag) -> Result<U256> {
        self.request("eth_getBalance", json!([address, block])).await
    }

    /// Executes a read-only call and returns the raw return data.
    pub async fn call(&self, request: &CallRequest, block: BlockNumberOrTag) -> Result<Bytes> {
        self.request("eth_call", json!([request, block])).await
    }

    pub async fn estimate_gas(&self, request: &CallRequest) -> Result<u64> {
        self.request_u64("eth_estimateGas", json!([request])).await
    }

    /// Legacy gas price in wei.
    pub async fn gas_price(&self) -> Result<u128> {
        self.request_u128("eth_gasPrice", json!([])).await
    }

    /// Node's suggested EIP-1559 tip in wei.
    pub async fn max_priority_fee_per_gas(&self) -> Result<u128> {
        self.request_u128("eth_maxPriorityFeePerGas", json!([])).await
    }

    pub async fn get_block(&self, block: BlockNumberOrTag) -> Result<Option<Block>> {
        self.request("eth_getBlockByNumber", json!([block, false]))
            .await
    }

    pub async fn latest_block(&self) -> Result<Block> {
        self.get_block(BlockNumberOrTag::Latest)
            .await?
            .ok_or_else(|| RpcError::Decode("eth_getBlockByNumber: latest block is null".into()))
    }

    /// Nonce of `address` at `block` (use `Pending` to include queued transactions).
    pub async fn transaction_count(
        &self,
        address: Address,
        block: BlockNumberOrTag,
    ) -> Result<u64> {
        self.request_u64("eth_getTransactionCount", json!([address, block]))
            .await
    }

    /// Broadcasts a signed transaction and returns the hash the node reports.
    pub async fn send_raw_transaction(&self, raw_tx: &[u8]) -> Result<B256> {
        let raw = format!("0x{}", hex::encode(raw_tx));
        self.request("eth_sendRawTransaction", json!([raw])).await
    }

    /// `None` while the transaction is pending or unknown.
    pub async fn transaction_receipt(&self, tx_hash: B256) -> Result<Option<TransactionReceipt>> {
        self.request("eth_getTransactionReceipt", json!([tx_hash]))
            .await
    }

    /// Polls until the transaction is mined. There is no deadline; callers
    /// that need one race this future against their own timer.
    pub async fn wait_for_receipt(
        &self,
        tx_hash: B256,
        poll_interval: Duration,
    ) -> Result<TransactionReceipt> {
        loop {
            if let Some(receipt) = self.transaction_receipt(tx_hash).await? {
                return Ok(receipt);
            }
            debug!(%tx_hash, "receipt not available yet");
            Delay::new(poll_interval).await;
        }
    }

    pub async fn get_logs(&self, filter: &LogFilter) -> Result<Vec<Log>> {
        self.request("eth_getLogs", json!([filter])).await
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider").field("url", &self.url).finish()
    }
}

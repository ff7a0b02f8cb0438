//! JavaScript bindings for [`EthereumWallet`].
//!
//! Thin wrappers only: arguments are converted, the core facade does the
//! work, results come back as plain JS objects and failures as `Error`s
//! whose `name` is the [`ErrorKind`](crate::ErrorKind).

use std::sync::Arc;

use eth_rpc::BlockNumberOrTag;
use js_sys::Promise;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::config::WalletConfig;
use crate::error::WalletError;
use crate::facade::EthereumWallet;

#[wasm_bindgen(js_name = EthereumWallet)]
pub struct WasmEthereumWallet {
    inner: Arc<EthereumWallet>,
}

#[wasm_bindgen(js_class = EthereumWallet)]
impl WasmEthereumWallet {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmEthereumWallet {
        Self {
            inner: Arc::new(EthereumWallet::new()),
        }
    }

    /// Builds a wallet from a JSON config; omitted keys keep their defaults.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config_json: &str) -> Result<WasmEthereumWallet, JsValue> {
        let config = WalletConfig::from_json(config_json).map_err(to_js_error)?;
        let inner = EthereumWallet::with_config(config).map_err(to_js_error)?;
        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    #[wasm_bindgen(js_name = createNewWallet)]
    pub fn create_new_wallet(&self) -> Result<JsValue, JsValue> {
        to_js(&self.inner.create_new_wallet().map_err(to_js_error)?)
    }

    #[wasm_bindgen(js_name = importFromPrivateKey)]
    pub fn import_from_private_key(&self, private_key: &str) -> Result<JsValue, JsValue> {
        to_js(&self.inner.import_from_private_key(private_key).map_err(to_js_error)?)
    }

    #[wasm_bindgen(js_name = importFromMnemonic)]
    pub fn import_from_mnemonic(&self, mnemonic: &str) -> Result<JsValue, JsValue> {
        to_js(&self.inner.import_from_mnemonic(mnemonic).map_err(to_js_error)?)
    }

    #[wasm_bindgen(js_name = connectProvider)]
    pub fn connect_provider(&self, rpc_url: Option<String>) -> Result<(), JsValue> {
        self.inner
            .connect_provider(rpc_url.as_deref())
            .map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = isConnected)]
    pub fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }

    #[wasm_bindgen(js_name = getAddress)]
    pub fn get_address(&self) -> Option<String> {
        self.inner.get_address()
    }

    #[wasm_bindgen(js_name = getEthBalance)]
    pub fn get_eth_balance(&self, address: Option<String>) -> Promise {
        let wallet = self.inner.clone();
        future_to_promise(async move {
            let balance = wallet
                .get_eth_balance(address.as_deref())
                .await
                .map_err(to_js_error)?;
            Ok(JsValue::from_str(&balance))
        })
    }

    #[wasm_bindgen(js_name = getUsdtBalance)]
    pub fn get_usdt_balance(&self, address: Option<String>) -> Promise {
        let wallet = self.inner.clone();
        future_to_promise(async move {
            let balance = wallet
                .get_usdt_balance(address.as_deref())
                .await
                .map_err(to_js_error)?;
            Ok(JsValue::from_str(&balance))
        })
    }

    /// Resolves to the transaction receipt once mined.
    #[wasm_bindgen(js_name = sendEth)]
    pub fn send_eth(&self, to: String, amount: String) -> Promise {
        let wallet = self.inner.clone();
        future_to_promise(async move {
            let receipt = wallet.send_eth(&to, &amount).await.map_err(to_js_error)?;
            to_js(&receipt)
        })
    }

    #[wasm_bindgen(js_name = sendUsdt)]
    pub fn send_usdt(&self, to: String, amount: String) -> Promise {
        let wallet = self.inner.clone();
        future_to_promise(async move {
            let receipt = wallet.send_usdt(&to, &amount).await.map_err(to_js_error)?;
            to_js(&receipt)
        })
    }

    #[wasm_bindgen(js_name = signMessage)]
    pub fn sign_message(&self, message: String) -> Promise {
        let wallet = self.inner.clone();
        future_to_promise(async move {
            let signature = wallet.sign_message(&message).map_err(to_js_error)?;
            Ok(JsValue::from_str(&signature))
        })
    }

    #[wasm_bindgen(js_name = verifyMessage)]
    pub fn verify_message(&self, message: &str, signature: &str) -> Result<String, JsValue> {
        self.inner
            .verify_message(message, signature)
            .map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = exportWallet)]
    pub fn export_wallet(&self, password: String) -> Promise {
        let wallet = self.inner.clone();
        future_to_promise(async move {
            let json = wallet.export_wallet(&password).map_err(to_js_error)?;
            Ok(JsValue::from_str(&json))
        })
    }

    #[wasm_bindgen(js_name = importFromJson)]
    pub fn import_from_json(&self, json: String, password: String) -> Promise {
        let wallet = self.inner.clone();
        future_to_promise(async move {
            let info = wallet
                .import_from_json(&json, &password)
                .map_err(to_js_error)?;
            to_js(&info)
        })
    }

    /// `startBlock` defaults to 0. `endBlock` may be a block number,
    /// `"latest"`, or omitted.
    #[wasm_bindgen(js_name = getTransactionHistory)]
    pub fn get_transaction_history(
        &self,
        address: Option<String>,
        start_block: Option<f64>,
        end_block: JsValue,
    ) -> Promise {
        let wallet = self.inner.clone();
        future_to_promise(async move {
            let start_block = match start_block {
                Some(n) => block_number(n).ok_or_else(|| {
                    js_error("InvalidArgument", "startBlock must be a non-negative integer")
                })?,
                None => 0,
            };
            let end_block = parse_block(&end_block)?;
            let logs = wallet
                .get_transaction_history(address.as_deref(), start_block, end_block)
                .await
                .map_err(to_js_error)?;
            to_js(&logs)
        })
    }
}

impl Default for WasmEthereumWallet {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_block(value: &JsValue) -> Result<BlockNumberOrTag, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(BlockNumberOrTag::Latest);
    }
    if let Some(number) = value.as_f64().and_then(block_number) {
        return Ok(BlockNumberOrTag::Number(number));
    }
    match value.as_string().as_deref() {
        Some("latest") => Ok(BlockNumberOrTag::Latest),
        _ => Err(js_error(
            "InvalidArgument",
            "endBlock must be a non-negative integer or \"latest\"",
        )),
    }
}

/// Largest integer a JS number holds exactly (2^53 - 1).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A JS number that is a whole, non-negative, exactly representable block.
fn block_number(value: f64) -> Option<u64> {
    (value >= 0.0 && value <= MAX_SAFE_INTEGER && value.fract() == 0.0).then_some(value as u64)
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    let json = serde_json::to_string(value)
        .map_err(|e| to_js_error(WalletError::Internal(e.to_string())))?;
    js_sys::JSON::parse(&json)
}

fn to_js_error(err: WalletError) -> JsValue {
    js_error(err.kind().as_str(), &err.to_string())
}

fn js_error(name: &str, message: &str) -> JsValue {
    let error = js_sys::Error::new(message);
    error.set_name(name);
    error.into()
}

//! The `EthereumWallet` facade: one loaded wallet, one provider.

use std::sync::Arc;

use chain_eth::abi::{decode_uint256, decode_uint8};
use chain_eth::address::{checksum_address, parse_address};
use chain_eth::erc20::{encode_balance_of, encode_decimals, encode_transfer};
use chain_eth::message::{decode_signature_hex, recover_address};
use chain_eth::transaction::EthTransaction;
use chain_eth::units::{format_ether, format_units, parse_ether, parse_units};
use chain_eth::{Address, U256};
use eth_rpc::{
    BlockNumberOrTag, CallRequest, Log, LogFilter, Provider, RpcError, TransactionReceipt,
    Transport,
};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::config::WalletConfig;
use crate::error::{Result, WalletError};
use crate::keystore::encrypt_keystore;
use crate::mnemonic::validate_mnemonic;
use crate::signer::{LocalWallet, WalletInfo};

/// Wallet and provider as seen by one operation.
#[derive(Clone, Default)]
struct Session {
    wallet: Option<Arc<LocalWallet>>,
    provider: Option<Arc<Provider>>,
}

/// Holds at most one wallet and one provider connection.
///
/// Every operation snapshots the pair on entry, so replacing the wallet or
/// the provider never affects calls already in flight. Sends on one
/// instance run one at a time from nonce lookup until the node accepts the
/// broadcast; waiting for the receipt happens outside that section.
pub struct EthereumWallet {
    config: WalletConfig,
    session: RwLock<Session>,
    send_lock: tokio::sync::Mutex<()>,
}

impl Default for EthereumWallet {
    fn default() -> Self {
        Self::new()
    }
}

impl EthereumWallet {
    pub fn new() -> Self {
        Self {
            config: WalletConfig::default(),
            session: RwLock::new(Session::default()),
            send_lock: tokio::sync::Mutex::new(()),
        }
    }

    pub fn with_config(config: WalletConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::new()
        })
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    fn snapshot(&self) -> Session {
        self.session.read().clone()
    }

    fn load(&self, wallet: LocalWallet, info: WalletInfo) -> WalletInfo {
        let address = wallet.checksum_address();
        let mut session = self.session.write();
        session.wallet = Some(Arc::new(wallet));

        match &session.provider {
            Some(provider) => info!(%address, url = provider.url(), "wallet loaded and bound to provider"),
            None => info!(%address, "wallet loaded"),
        }
        info
    }

    // ─── Wallet lifecycle ──────────────────────────────────────────────

    /// Generates a fresh mnemonic and loads the wallet derived from it.
    pub fn create_new_wallet(&self) -> Result<WalletInfo> {
        let wallet = LocalWallet::generate(&self.config)?;
        let info = wallet.info();
        Ok(self.load(wallet, info))
    }

    /// On failure the previously loaded wallet stays in place.
    pub fn import_from_private_key(&self, private_key: &str) -> Result<WalletInfo> {
        let wallet = LocalWallet::from_private_key(private_key)?;
        let info = wallet.info();
        Ok(self.load(wallet, info))
    }

    pub fn import_from_mnemonic(&self, phrase: &str) -> Result<WalletInfo> {
        if !validate_mnemonic(phrase) {
            return Err(WalletError::InvalidMnemonic("Invalid mnemonic phrase".into()));
        }
        let wallet = LocalWallet::from_mnemonic(phrase, &self.config.derivation_path)?;
        let info = wallet.info();
        Ok(self.load(wallet, info))
    }

    /// Decrypts a keystore v3 document and loads its key. Only the address
    /// and public key are returned.
    pub fn import_from_json(&self, json: &str, password: &str) -> Result<WalletInfo> {
        let wallet = LocalWallet::from_keystore(json, password)?;
        let info = wallet.public_info();
        Ok(self.load(wallet, info))
    }

    /// Checksummed address of the loaded wallet.
    pub fn get_address(&self) -> Option<String> {
        self.session
            .read()
            .wallet
            .as_ref()
            .map(|w| w.checksum_address())
    }

    // ─── Provider ──────────────────────────────────────────────────────

    /// Binds an HTTP JSON-RPC endpoint, or the configured default when
    /// `rpc_url` is `None`. The endpoint is not contacted here.
    pub fn connect_provider(&self, rpc_url: Option<&str>) -> Result<()> {
        let url = rpc_url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or(&self.config.default_rpc_url);

        let provider = Provider::new_http(url).map_err(|e| match e {
            RpcError::InvalidUrl(msg) => WalletError::InvalidUrl(msg),
            other => WalletError::Rpc(other),
        })?;
        self.attach(provider);
        Ok(())
    }

    /// Binds a caller-supplied transport. `label` is used for logging only.
    pub fn connect_with_transport(&self, label: &str, transport: Arc<dyn Transport>) {
        self.attach(Provider::with_transport(label, transport));
    }

    fn attach(&self, provider: Provider) {
        let mut session = self.session.write();
        match &session.wallet {
            Some(wallet) => info!(
                url = provider.url(),
                address = %wallet.checksum_address(),
                "provider connected, wallet bound"
            ),
            None => info!(url = provider.url(), "provider connected"),
        }
        session.provider = Some(Arc::new(provider));
    }

    pub fn is_connected(&self) -> bool {
        self.session.read().provider.is_some()
    }

    // ─── Reads ─────────────────────────────────────────────────────────

    /// ETH balance as a decimal string with 18 decimals.
    pub async fn get_eth_balance(&self, address: Option<&str>) -> Result<String> {
        let session = self.snapshot();
        let provider = require_provider(&session)?;
        let target = resolve_target(&session, address)?;

        let wei = provider
            .get_balance(target, BlockNumberOrTag::Latest)
            .await?;
        Ok(format_ether(wei))
    }

    /// Token balance formatted with the contract's own `decimals()`.
    pub async fn get_usdt_balance(&self, address: Option<&str>) -> Result<String> {
        let session = self.snapshot();
        let provider = require_provider(&session)?;
        let target = resolve_target(&session, address)?;
        let token = self.config.token()?;

        let request = CallRequest::new(token).data(encode_balance_of(target));
        let raw = provider.call(&request, BlockNumberOrTag::Latest).await?;
        let balance = decode_uint256(&raw)
            .map_err(|e| RpcError::Decode(format!("balanceOf: {e}")))?;
        let decimals = token_decimals(provider, token).await?;

        Ok(format_units(balance, decimals))
    }

    /// Raw logs emitted by `address` in the block range.
    ///
    /// This filters on the emitting contract, so it is not a complete
    /// transaction history for externally owned accounts.
    pub async fn get_transaction_history(
        &self,
        address: Option<&str>,
        start_block: u64,
        end_block: BlockNumberOrTag,
    ) -> Result<Vec<Log>> {
        let session = self.snapshot();
        let provider = require_provider(&session)?;
        let target = resolve_target(&session, address)?;

        let to_block = match end_block {
            BlockNumberOrTag::Latest => BlockNumberOrTag::Number(provider.block_number().await?),
            other => other,
        };

        let filter = LogFilter {
            from_block: BlockNumberOrTag::Number(start_block),
            to_block,
            address: Some(target),
            topics: Vec::new(),
        };
        let logs = provider.get_logs(&filter).await?;
        debug!(address = %checksum_address(&target), count = logs.len(), "fetched logs");
        Ok(logs)
    }

    // ─── Sends ─────────────────────────────────────────────────────────

    /// Sends `amount` ETH (decimal string) and waits for the receipt.
    pub async fn send_eth(&self, to: &str, amount: &str) -> Result<TransactionReceipt> {
        let session = self.snapshot();
        let wallet = require_wallet(&session)?;
        let provider = require_provider(&session)?;

        let to = parse_address(to)?;
        let value = parse_ether(amount)?;

        self.submit(wallet, provider, to, value, Vec::new()).await
    }

    /// Sends `amount` tokens (decimal string, scaled by the live
    /// `decimals()`) and waits for the receipt.
    pub async fn send_usdt(&self, to: &str, amount: &str) -> Result<TransactionReceipt> {
        let session = self.snapshot();
        let wallet = require_wallet(&session)?;
        let provider = require_provider(&session)?;

        let to = parse_address(to)?;
        let token = self.config.token()?;

        let decimals = token_decimals(provider, token).await?;
        let units = parse_units(amount, decimals)?;

        self.submit(wallet, provider, token, U256::ZERO, encode_transfer(to, units))
            .await
    }

    async fn submit(
        &self,
        wallet: &LocalWallet,
        provider: &Provider,
        to: Address,
        value: U256,
        data: Vec<u8>,
    ) -> Result<TransactionReceipt> {
        let guard = self.send_lock.lock().await;
        let from = wallet.address();

        let chain_id = provider.chain_id().await?;
        let nonce = provider
            .transaction_count(from, BlockNumberOrTag::Pending)
            .await?;
        let (max_priority_fee_per_gas, max_fee_per_gas) = self.fee_data(provider).await?;

        let estimate = CallRequest::new(to)
            .sender(from)
            .value(value)
            .data(data.clone());
        let gas_limit = provider.estimate_gas(&estimate).await?;

        let tx = EthTransaction {
            chain_id,
            nonce,
            max_priority_fee_per_gas,
            max_fee_per_gas,
            gas_limit,
            to,
            value,
            data,
        };
        let signed = wallet.sign_transaction(&tx)?;

        info!(
            from = %wallet.checksum_address(),
            to = %checksum_address(&to),
            nonce,
            gas_limit,
            tx_hash = %signed.tx_hash,
            "submitting transaction"
        );
        let tx_hash = provider.send_raw_transaction(&signed.raw_tx).await?;
        // The pending nonce now counts this transaction.
        drop(guard);
        if tx_hash != signed.tx_hash {
            warn!(local = %signed.tx_hash, node = %tx_hash, "node reported a different tx hash");
        }

        let receipt = provider
            .wait_for_receipt(tx_hash, self.config.receipt_poll_interval())
            .await?;
        info!(%tx_hash, block = ?receipt.block_number, status = ?receipt.status, "transaction mined");

        if !receipt.succeeded() {
            return Err(WalletError::TransactionReverted {
                tx_hash,
                receipt: Box::new(receipt),
            });
        }
        Ok(receipt)
    }

    /// Returns `(max_priority_fee_per_gas, max_fee_per_gas)`.
    async fn fee_data(&self, provider: &Provider) -> Result<(u128, u128)> {
        let block = provider.latest_block().await?;

        let Some(base_fee) = block.base_fee_per_gas else {
            let gas_price = provider.gas_price().await?;
            return Ok((gas_price, gas_price));
        };

        let priority_fee = match provider.max_priority_fee_per_gas().await {
            Ok(fee) => fee,
            Err(RpcError::Rpc { code, message, .. }) => {
                warn!(code, %message, "eth_maxPriorityFeePerGas unavailable, using fallback tip");
                self.config.fallback_priority_fee_wei
            }
            Err(e) => return Err(e.into()),
        };

        let max_fee = base_fee.saturating_mul(2).saturating_add(priority_fee);
        Ok((priority_fee, max_fee))
    }

    // ─── Messages and keystores ────────────────────────────────────────

    /// EIP-191 personal signature of `message`, 0x-prefixed.
    pub fn sign_message(&self, message: &str) -> Result<String> {
        let session = self.snapshot();
        require_wallet(&session)?.sign_message(message.as_bytes())
    }

    /// Checksummed address that signed `message`. Needs no loaded wallet.
    pub fn verify_message(&self, message: &str, signature: &str) -> Result<String> {
        let bytes = decode_signature_hex(signature)?;
        let signer = recover_address(message.as_bytes(), &bytes)?;
        Ok(checksum_address(&signer))
    }

    /// Encrypts the loaded key into a keystore v3 JSON document.
    ///
    /// CPU-bound: at the default scrypt cost this takes on the order of a
    /// second.
    pub fn export_wallet(&self, password: &str) -> Result<String> {
        let session = self.snapshot();
        let wallet = require_wallet(&session)?;

        let json = encrypt_keystore(
            wallet.signing_key(),
            wallet.address(),
            password,
            self.config.scrypt_log_n,
        )?;
        info!(address = %wallet.checksum_address(), "wallet exported");
        Ok(json)
    }
}

fn require_wallet(session: &Session) -> Result<&LocalWallet> {
    session.wallet.as_deref().ok_or(WalletError::NoWalletLoaded)
}

fn require_provider(session: &Session) -> Result<&Provider> {
    session
        .provider
        .as_deref()
        .ok_or(WalletError::NoProviderConnected)
}

/// Explicit address if non-empty, else the loaded wallet's.
fn resolve_target(session: &Session, address: Option<&str>) -> Result<Address> {
    match address.map(str::trim).filter(|a| !a.is_empty()) {
        Some(address) => Ok(parse_address(address)?),
        None => session
            .wallet
            .as_ref()
            .map(|w| w.address())
            .ok_or(WalletError::NoAddressAvailable),
    }
}

async fn token_decimals(provider: &Provider, token: Address) -> Result<u8> {
    let request = CallRequest::new(token).data(encode_decimals());
    let raw = provider.call(&request, BlockNumberOrTag::Latest).await?;
    Ok(decode_uint8(&raw).map_err(|e| RpcError::Decode(format!("decimals: {e}")))?)
}

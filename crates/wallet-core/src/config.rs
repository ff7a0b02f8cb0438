use std::time::Duration;

use chain_eth::address::parse_address;
use chain_eth::chains::DEFAULT_RPC_URL;
use chain_eth::erc20::USDT_CONTRACT_ADDRESS;
use chain_eth::Address;
use crypto_utils::kdf::DEFAULT_SCRYPT_LOG_N;
use serde::{Deserialize, Serialize};

use crate::error::{Result, WalletError};
use crate::hd_derivation::{parse_derivation_path, DEFAULT_ETH_PATH};
use crate::mnemonic::SUPPORTED_WORD_COUNTS;

const ONE_GWEI: u128 = 1_000_000_000;

/// Tunables for [`EthereumWallet`](crate::EthereumWallet).
///
/// Every field has a default, so a JSON document only needs the keys it
/// overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WalletConfig {
    /// Endpoint used by `connect_provider` when the caller passes none.
    pub default_rpc_url: String,
    /// ERC-20 contract behind `get_usdt_balance` / `send_usdt`.
    pub token_address: String,
    /// BIP-32 path for mnemonic-derived keys.
    pub derivation_path: String,
    /// Length of newly generated mnemonics.
    pub mnemonic_words: usize,
    /// Scrypt cost exponent for exported keystores.
    pub scrypt_log_n: u8,
    pub receipt_poll_interval_ms: u64,
    /// Tip used when the node does not implement `eth_maxPriorityFeePerGas`.
    pub fallback_priority_fee_wei: u128,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            default_rpc_url: DEFAULT_RPC_URL.to_string(),
            token_address: USDT_CONTRACT_ADDRESS.to_string(),
            derivation_path: DEFAULT_ETH_PATH.to_string(),
            mnemonic_words: 12,
            scrypt_log_n: DEFAULT_SCRYPT_LOG_N,
            receipt_poll_interval_ms: 4_000,
            fallback_priority_fee_wei: ONE_GWEI,
        }
    }
}

impl WalletConfig {
    /// Parses and validates a JSON config.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| WalletError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_WORD_COUNTS.contains(&self.mnemonic_words) {
            return Err(WalletError::InvalidConfig(format!(
                "mnemonicWords must be one of {SUPPORTED_WORD_COUNTS:?}, got {}",
                self.mnemonic_words
            )));
        }

        parse_derivation_path(&self.derivation_path)?;
        self.token()?;

        if !(1..=20).contains(&self.scrypt_log_n) {
            return Err(WalletError::InvalidConfig(format!(
                "scryptLogN must be between 1 and 20, got {}",
                self.scrypt_log_n
            )));
        }

        if self.receipt_poll_interval_ms == 0 {
            return Err(WalletError::InvalidConfig(
                "receiptPollIntervalMs must be positive".into(),
            ));
        }

        Ok(())
    }

    /// Token contract as a parsed address.
    pub fn token(&self) -> Result<Address> {
        parse_address(&self.token_address)
            .map_err(|e| WalletError::InvalidConfig(format!("tokenAddress: {e}")))
    }

    pub fn receipt_poll_interval(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_interval_ms)
    }
}

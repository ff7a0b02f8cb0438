use std::fmt;

use chain_eth::error::EthError;
use chain_eth::B256;
use crypto_utils::CryptoError;
use eth_rpc::{RpcError, TransactionReceipt};
use thiserror::Error;

/// Error returned by every wallet operation.
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("No wallet loaded")]
    NoWalletLoaded,

    #[error("Provider not connected. Call connect_provider() first.")]
    NoProviderConnected,

    #[error("No address provided and no wallet loaded")]
    NoAddressAvailable,

    #[error("Failed to decrypt wallet: {0}")]
    DecryptionFailed(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("Invalid RPC URL: {0}")]
    InvalidUrl(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Transaction {tx_hash} reverted")]
    TransactionReverted {
        tx_hash: B256,
        receipt: Box<TransactionReceipt>,
    },

    /// Node or transport error, unmodified.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Stable error code for bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidKey,
    InvalidMnemonic,
    NoWalletLoaded,
    NoProviderConnected,
    NoAddressAvailable,
    DecryptionFailed,
    InvalidAddress,
    InvalidAmount,
    InvalidSignature,
    InvalidUrl,
    InvalidConfig,
    EncryptionFailed,
    TransactionReverted,
    UnderlyingSdkError,
    Internal,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::InvalidKey => "InvalidKey",
            ErrorKind::InvalidMnemonic => "InvalidMnemonic",
            ErrorKind::NoWalletLoaded => "NoWalletLoaded",
            ErrorKind::NoProviderConnected => "NoProviderConnected",
            ErrorKind::NoAddressAvailable => "NoAddressAvailable",
            ErrorKind::DecryptionFailed => "DecryptionFailed",
            ErrorKind::InvalidAddress => "InvalidAddress",
            ErrorKind::InvalidAmount => "InvalidAmount",
            ErrorKind::InvalidSignature => "InvalidSignature",
            ErrorKind::InvalidUrl => "InvalidUrl",
            ErrorKind::InvalidConfig => "InvalidConfig",
            ErrorKind::EncryptionFailed => "EncryptionFailed",
            ErrorKind::TransactionReverted => "TransactionReverted",
            ErrorKind::UnderlyingSdkError => "UnderlyingSdkError",
            ErrorKind::Internal => "Internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl WalletError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WalletError::InvalidKey(_) => ErrorKind::InvalidKey,
            WalletError::InvalidMnemonic(_) => ErrorKind::InvalidMnemonic,
            WalletError::NoWalletLoaded => ErrorKind::NoWalletLoaded,
            WalletError::NoProviderConnected => ErrorKind::NoProviderConnected,
            WalletError::NoAddressAvailable => ErrorKind::NoAddressAvailable,
            WalletError::DecryptionFailed(_) => ErrorKind::DecryptionFailed,
            WalletError::InvalidAddress(_) => ErrorKind::InvalidAddress,
            WalletError::InvalidAmount(_) => ErrorKind::InvalidAmount,
            WalletError::InvalidSignature(_) => ErrorKind::InvalidSignature,
            WalletError::InvalidUrl(_) => ErrorKind::InvalidUrl,
            WalletError::InvalidConfig(_) => ErrorKind::InvalidConfig,
            WalletError::EncryptionFailed(_) => ErrorKind::EncryptionFailed,
            WalletError::TransactionReverted { .. } => ErrorKind::TransactionReverted,
            WalletError::Rpc(_) => ErrorKind::UnderlyingSdkError,
            WalletError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<CryptoError> for WalletError {
    fn from(e: CryptoError) -> Self {
        WalletError::EncryptionFailed(e.to_string())
    }
}

impl From<EthError> for WalletError {
    fn from(e: EthError) -> Self {
        match e {
            EthError::InvalidAddress(msg) => WalletError::InvalidAddress(msg),
            EthError::InvalidAmount(msg) => WalletError::InvalidAmount(msg),
            EthError::InvalidSignature(msg) => WalletError::InvalidSignature(msg),
            other => WalletError::Internal(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, WalletError>;

//! Ethereum wallet facade.
//!
//! [`EthereumWallet`] holds one key-pair and one JSON-RPC provider and
//! exposes wallet creation and import, ETH and USDT balances and transfers,
//! EIP-191 message signing, keystore v3 export/import and a log-based
//! history query.
//!
//! Offline pieces live in `chain-eth` (addresses, ABI, transactions,
//! units) and `crypto-utils` (KDFs, AES-CTR); network access goes through
//! `eth-rpc`. The `wasm` feature adds `wasm-bindgen` bindings.

pub mod config;
pub mod error;
pub mod facade;
pub mod hd_derivation;
pub mod keystore;
pub mod mnemonic;
pub mod signer;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::WalletConfig;
pub use error::{ErrorKind, Result, WalletError};
pub use eth_rpc::{BlockNumberOrTag, Log, TransactionReceipt};
pub use facade::EthereumWallet;
pub use signer::{LocalWallet, WalletInfo};

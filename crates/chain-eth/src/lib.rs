//! Ethereum chain support for the wallet facade.
//!
//! This crate is offline-only and provides:
//! - Ethereum address derivation from secp256k1 public keys (with EIP-55 checksums)
//! - EIP-1559 transaction encoding and signing
//! - EIP-191 personal-message signing and signer recovery
//! - ERC-20 call encoding for the fixed token surface
//! - Conversion between smallest-unit integers and decimal strings
//! - The default public RPC endpoint and native-currency decimals

pub mod abi;
pub mod address;
pub mod chains;
pub mod erc20;
pub mod error;
pub mod message;
pub mod transaction;
pub mod units;

pub use alloy_primitives::{Address, B256, U256};

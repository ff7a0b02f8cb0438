//! # crypto-utils
//!
//! Key derivation, AES-128-CTR encryption and secure random generation
//! for Web3 Secret Storage keystores and mnemonic entropy.

pub mod encryption;
pub mod error;
pub mod kdf;
pub mod random;

pub use error::CryptoError;

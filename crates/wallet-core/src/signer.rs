use std::fmt;

use chain_eth::address::{address_from_verifying_key, checksum_address};
use chain_eth::transaction::{sign_transaction, EthTransaction, SignedEthTransaction};
use chain_eth::{message, Address};
use k256::ecdsa::SigningKey;
use serde::Serialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::WalletConfig;
use crate::error::{Result, WalletError};
use crate::hd_derivation::{derive_signing_key, parse_derivation_path};
use crate::keystore::decrypt_keystore;
use crate::mnemonic::{generate_mnemonic, mnemonic_to_seed, normalize_phrase, SecretPhrase};

/// A secp256k1 key held in memory, with the mnemonic it came from if any.
#[derive(Clone)]
pub struct LocalWallet {
    signing_key: SigningKey,
    address: Address,
    mnemonic: Option<SecretPhrase>,
    derivation_path: Option<String>,
}

impl LocalWallet {
    /// Creates a wallet from a freshly generated mnemonic.
    pub fn generate(config: &WalletConfig) -> Result<Self> {
        let phrase = generate_mnemonic(config.mnemonic_words)?;
        Self::from_mnemonic(phrase.expose(), &config.derivation_path)
    }

    /// Restores the key at `path` from a BIP-39 phrase (no passphrase).
    pub fn from_mnemonic(phrase: &str, path: &str) -> Result<Self> {
        let phrase = SecretPhrase::new(normalize_phrase(phrase));
        let seed = mnemonic_to_seed(phrase.expose(), "")?;
        let key = derive_signing_key(&seed[..], &parse_derivation_path(path)?)?;

        let mut wallet = Self::from_signing_key(key);
        wallet.mnemonic = Some(phrase);
        wallet.derivation_path = Some(path.to_string());
        Ok(wallet)
    }

    /// Accepts 64 hex characters, with or without `0x`.
    pub fn from_private_key(private_key: &str) -> Result<Self> {
        let trimmed = private_key.trim();
        let hex_part = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if hex_part.len() != 64 {
            return Err(WalletError::InvalidKey(format!(
                "expected 64 hex characters, got {}",
                hex_part.len()
            )));
        }

        let mut bytes =
            hex::decode(hex_part).map_err(|e| WalletError::InvalidKey(e.to_string()))?;
        let key = SigningKey::from_slice(&bytes);
        bytes.zeroize();

        let key = key.map_err(|_| WalletError::InvalidKey("not a valid secp256k1 scalar".into()))?;
        Ok(Self::from_signing_key(key))
    }

    /// Decrypts a keystore v3 document.
    pub fn from_keystore(json: &str, password: &str) -> Result<Self> {
        decrypt_keystore(json, password).map(Self::from_signing_key)
    }

    pub fn from_signing_key(signing_key: SigningKey) -> Self {
        let address = address_from_verifying_key(signing_key.verifying_key());
        Self {
            signing_key,
            address,
            mnemonic: None,
            derivation_path: None,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// EIP-55 mixed-case address.
    pub fn checksum_address(&self) -> String {
        checksum_address(&self.address)
    }

    pub fn private_key_hex(&self) -> String {
        format!("0x{}", hex::encode(self.signing_key.to_bytes()))
    }

    /// Uncompressed SEC1 public key (`0x04 || x || y`).
    pub fn public_key_hex(&self) -> String {
        let point = self.signing_key.verifying_key().to_encoded_point(false);
        format!("0x{}", hex::encode(point.as_bytes()))
    }

    pub fn mnemonic(&self) -> Option<&SecretPhrase> {
        self.mnemonic.as_ref()
    }

    pub fn derivation_path(&self) -> Option<&str> {
        self.derivation_path.as_deref()
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// Full record, secrets included.
    pub fn info(&self) -> WalletInfo {
        WalletInfo {
            address: self.checksum_address(),
            private_key: Some(self.private_key_hex()),
            public_key: self.public_key_hex(),
            mnemonic: self.mnemonic.as_ref().map(|m| m.expose().to_string()),
        }
    }

    /// Address and public key only.
    pub fn public_info(&self) -> WalletInfo {
        WalletInfo {
            address: self.checksum_address(),
            private_key: None,
            public_key: self.public_key_hex(),
            mnemonic: None,
        }
    }

    /// EIP-191 personal signature as 0x-prefixed hex (`r || s || v`).
    pub fn sign_message(&self, message: &[u8]) -> Result<String> {
        let signature = message::sign_message(message, &self.signing_key)?;
        Ok(format!("0x{}", hex::encode(signature)))
    }

    pub fn sign_transaction(&self, tx: &EthTransaction) -> Result<SignedEthTransaction> {
        Ok(sign_transaction(tx, &self.signing_key)?)
    }
}

impl fmt::Debug for LocalWallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalWallet")
            .field("address", &self.checksum_address())
            .finish_non_exhaustive()
    }
}

/// Wallet record returned to callers. Absent secrets are omitted from JSON.
#[derive(Clone, PartialEq, Eq, Serialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct WalletInfo {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    pub public_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mnemonic: Option<String>,
}

impl fmt::Debug for WalletInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalletInfo")
            .field("address", &self.address)
            .field("public_key", &self.public_key)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .field("mnemonic", &self.mnemonic.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hd_derivation::DEFAULT_ETH_PATH;

    const TEST_MNEMONIC: &str =
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
    const KEY_ONE: &str = "0x0000000000000000000000000000000000000000000000000000000000000001";

    #[test]
    fn from_mnemonic_known_vector() {
        let wallet = LocalWallet::from_mnemonic(TEST_MNEMONIC, DEFAULT_ETH_PATH).unwrap();

        assert_eq!(
            wallet.checksum_address(),
            "0x9858EfFD232B4033E47d90003D41EC34EcaEda94"
        );
        assert_eq!(
            wallet.private_key_hex(),
            "0x1ab42cc412b618bdea3a599e3c9bae199ebf030895b039e9db1e30dafb12b727"
        );
        assert_eq!(wallet.mnemonic().unwrap().expose(), TEST_MNEMONIC);
        assert_eq!(wallet.derivation_path(), Some(DEFAULT_ETH_PATH));
    }

    #[test]
    fn from_mnemonic_normalizes_whitespace() {
        let messy = format!("  {}\n", TEST_MNEMONIC.replace(' ', "   "));
        let wallet = LocalWallet::from_mnemonic(&messy, DEFAULT_ETH_PATH).unwrap();
        assert_eq!(wallet.mnemonic().unwrap().expose(), TEST_MNEMONIC);
    }

    #[test]
    fn from_mnemonic_rejects_invalid_phrase() {
        let err = LocalWallet::from_mnemonic("invalid mnemonic phrase here", DEFAULT_ETH_PATH)
            .unwrap_err();
        assert!(matches!(err, WalletError::InvalidMnemonic(_)));
    }

    #[test]
    fn from_private_key_with_and_without_prefix() {
        let prefixed = LocalWallet::from_private_key(KEY_ONE).unwrap();
        let bare = LocalWallet::from_private_key(&KEY_ONE[2..]).unwrap();

        assert_eq!(
            prefixed.checksum_address(),
            "0x7E5F4552091A69125d5DfCb7b8C2659029395Bdf"
        );
        assert_eq!(prefixed.address(), bare.address());
        assert!(prefixed.mnemonic().is_none());
    }

    #[test]
    fn from_private_key_rejects_bad_input() {
        for bad in [
            "",
            "0x1234",
            "invalid_key",
            "0xzz00000000000000000000000000000000000000000000000000000000000001",
            "0x0000000000000000000000000000000000000000000000000000000000000000",
        ] {
            let err = LocalWallet::from_private_key(bad).unwrap_err();
            assert!(matches!(err, WalletError::InvalidKey(_)), "{bad}");
        }
    }

    #[test]
    fn public_key_is_uncompressed() {
        let wallet = LocalWallet::from_private_key(KEY_ONE).unwrap();
        let public_key = wallet.public_key_hex();

        assert_eq!(public_key.len(), 2 + 130);
        assert!(public_key.starts_with("0x04"));
        // Generator point x coordinate.
        assert!(public_key.starts_with(
            "0x0479be667ef9dcbbac55a06295ce870b07029bfcdb2dce28d959f2815b16f81798"
        ));
    }

    #[test]
    fn generate_uses_config_word_count() {
        let config = WalletConfig {
            mnemonic_words: 24,
            ..WalletConfig::default()
        };
        let wallet = LocalWallet::generate(&config).unwrap();
        assert_eq!(wallet.mnemonic().unwrap().word_count(), 24);

        let restored =
            LocalWallet::from_mnemonic(wallet.mnemonic().unwrap().expose(), DEFAULT_ETH_PATH)
                .unwrap();
        assert_eq!(restored.address(), wallet.address());
    }

    #[test]
    fn info_and_public_info() {
        let wallet = LocalWallet::from_mnemonic(TEST_MNEMONIC, DEFAULT_ETH_PATH).unwrap();

        let full = serde_json::to_value(wallet.info()).unwrap();
        assert_eq!(full["address"], "0x9858EfFD232B4033E47d90003D41EC34EcaEda94");
        assert!(full["privateKey"].is_string());
        assert!(full["publicKey"].is_string());
        assert_eq!(full["mnemonic"], TEST_MNEMONIC);

        let public = serde_json::to_value(wallet.public_info()).unwrap();
        assert!(public.get("privateKey").is_none());
        assert!(public.get("mnemonic").is_none());
    }

    #[test]
    fn debug_output_hides_secrets() {
        let wallet = LocalWallet::from_mnemonic(TEST_MNEMONIC, DEFAULT_ETH_PATH).unwrap();

        let wallet_debug = format!("{wallet:?}");
        assert!(wallet_debug.contains("0x9858EfFD232B4033E47d90003D41EC34EcaEda94"));
        assert!(!wallet_debug.contains("1ab42cc4"));

        let info_debug = format!("{:?}", wallet.info());
        assert!(!info_debug.contains("1ab42cc4"));
        assert!(!info_debug.contains("abandon"));
    }

    #[test]
    fn sign_message_recovers_to_address() {
        let wallet = LocalWallet::from_private_key(KEY_ONE).unwrap();
        let signature = wallet.sign_message(b"hello world").unwrap();

        assert_eq!(signature.len(), 2 + 130);
        let bytes = message::decode_signature_hex(&signature).unwrap();
        let recovered = message::recover_address(b"hello world", &bytes).unwrap();
        assert_eq!(recovered, wallet.address());
    }
}

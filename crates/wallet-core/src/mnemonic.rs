use std::fmt;

use bip39::{Language, Mnemonic};
use crypto_utils::random::random_bytes;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::error::{Result, WalletError};

/// BIP-39 phrase lengths accepted on import and for generation.
pub const SUPPORTED_WORD_COUNTS: [usize; 5] = [12, 15, 18, 21, 24];

/// Generates a fresh English BIP-39 mnemonic with `word_count` words.
pub fn generate_mnemonic(word_count: usize) -> Result<SecretPhrase> {
    if !SUPPORTED_WORD_COUNTS.contains(&word_count) {
        return Err(WalletError::InvalidMnemonic(format!(
            "unsupported word count {word_count}"
        )));
    }

    // 11 bits per word, one checksum bit per 32 bits of entropy.
    let entropy = random_bytes(word_count * 4 / 3);
    let mnemonic = Mnemonic::from_entropy_in(Language::English, &entropy)
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;

    Ok(SecretPhrase::new(mnemonic.to_string()))
}

/// Returns whether `phrase` is a valid English BIP-39 mnemonic (words and checksum).
pub fn validate_mnemonic(phrase: &str) -> bool {
    Mnemonic::parse_in_normalized(Language::English, phrase).is_ok()
}

/// Derives the 64-byte BIP-39 seed. The buffer is wiped on drop.
pub fn mnemonic_to_seed(phrase: &str, passphrase: &str) -> Result<Zeroizing<[u8; 64]>> {
    let mnemonic = Mnemonic::parse_in_normalized(Language::English, phrase)
        .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;

    Ok(Zeroizing::new(mnemonic.to_seed(passphrase)))
}

/// Joins the words of `phrase` with single spaces.
pub fn normalize_phrase(phrase: &str) -> String {
    phrase.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Mnemonic held by a loaded wallet. Wiped on drop and redacted in `Debug`.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretPhrase(String);

impl SecretPhrase {
    pub fn new(phrase: String) -> Self {
        Self(phrase)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn word_count(&self) -> usize {
        self.0.split_whitespace().count()
    }
}

impl fmt::Debug for SecretPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretPhrase([{} words])", self.word_count())
    }
}

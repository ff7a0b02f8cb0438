use aes::Aes128;
use ctr::cipher::{KeyIvInit, StreamCipher};

use crate::error::CryptoError;
use crate::random::random_bytes_fixed;

type Aes128Ctr = ctr::Ctr128BE<Aes128>;

/// AES-128 key size in bytes.
pub const KEY_SIZE: usize = 16;

/// AES-CTR initialization vector size in bytes.
pub const IV_SIZE: usize = 16;

/// Encrypts `plaintext` with AES-128-CTR under `key` and `iv`.
///
/// CTR is a stream mode, so the ciphertext has the same length as the
/// plaintext and carries no authentication tag. Keystores authenticate it
/// separately with a keccak MAC.
pub fn encrypt(plaintext: &[u8], key: &[u8], iv: &[u8; IV_SIZE]) -> Result<Vec<u8>, CryptoError> {
    let mut buffer = plaintext.to_vec();
    apply_keystream(&mut buffer, key, iv)?;
    Ok(buffer)
}

/// Decrypts data previously encrypted with [`encrypt`].
pub fn decrypt(ciphertext: &[u8], key: &[u8], iv: &[u8; IV_SIZE]) -> Result<Vec<u8>, CryptoError> {
    let mut buffer = ciphertext.to_vec();
    apply_keystream(&mut buffer, key, iv)?;
    Ok(buffer)
}

/// Generates a random 16-byte IV.
pub fn generate_iv() -> [u8; IV_SIZE] {
    random_bytes_fixed::<IV_SIZE>()
}

fn apply_keystream(buffer: &mut [u8], key: &[u8], iv: &[u8; IV_SIZE]) -> Result<(), CryptoError> {
    let key: &[u8; KEY_SIZE] = key.try_into().map_err(|_| CryptoError::InvalidKeyLength {
        expected: KEY_SIZE,
        actual: key.len(),
    })?;

    let mut cipher = Aes128Ctr::new(key.into(), iv.into());
    cipher.apply_keystream(buffer);
    Ok(())
}

use pbkdf2::pbkdf2_hmac;
use scrypt::Params;
use sha2::Sha256;

use crate::error::CryptoError;
use crate::random::random_bytes_fixed;

/// Scrypt cost used for newly written keystores: n = 2^17 = 131072.
pub const DEFAULT_SCRYPT_LOG_N: u8 = 17;

/// Scrypt block size parameter for newly written keystores.
pub const DEFAULT_SCRYPT_R: u32 = 8;

/// Scrypt parallelization parameter for newly written keystores.
pub const DEFAULT_SCRYPT_P: u32 = 1;

/// Derived key length for Web3 Secret Storage (16 bytes AES key + 16 bytes MAC key).
pub const KEYSTORE_DKLEN: usize = 32;

/// Derives `dklen` bytes from `password` and `salt` using scrypt with cost
/// `n = 2^log_n`.
///
/// This is the CPU and memory heavy step of keystore encryption; with the
/// default parameters it allocates 128 MiB.
pub fn scrypt_derive(
    password: &[u8],
    salt: &[u8],
    log_n: u8,
    r: u32,
    p: u32,
    dklen: usize,
) -> Result<Vec<u8>, CryptoError> {
    let params = Params::new(log_n, r, p, dklen)
        .map_err(|e| CryptoError::InvalidKdfParams(format!("scrypt: {e}")))?;

    let mut output = vec![0u8; dklen];
    scrypt::scrypt(password, salt, &params, &mut output)
        .map_err(|e| CryptoError::KdfFailed(format!("scrypt: {e}")))?;

    Ok(output)
}

/// Converts a keystore `n` value into the `log_n` exponent scrypt expects.
pub fn scrypt_log_n(n: u64) -> Result<u8, CryptoError> {
    if n < 2 || !n.is_power_of_two() {
        return Err(CryptoError::InvalidKdfParams(format!(
            "scrypt n must be a power of two greater than 1, got {n}"
        )));
    }
    Ok(n.trailing_zeros() as u8)
}

/// Derives `dklen` bytes from `password` and `salt` using PBKDF2-HMAC-SHA256.
pub fn pbkdf2_sha256_derive(
    password: &[u8],
    salt: &[u8],
    rounds: u32,
    dklen: usize,
) -> Result<Vec<u8>, CryptoError> {
    if rounds == 0 {
        return Err(CryptoError::InvalidKdfParams(
            "pbkdf2 iteration count must be positive".into(),
        ));
    }

    let mut output = vec![0u8; dklen];
    pbkdf2_hmac::<Sha256>(password, salt, rounds, &mut output);
    Ok(output)
}

/// Generates a cryptographically secure random 32-byte salt.
pub fn generate_salt() -> [u8; 32] {
    random_bytes_fixed::<32>()
}

//! EIP-191 personal messages (`personal_sign`).

use alloy_primitives::{Address, B256};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};

use crate::address::address_from_verifying_key;
use crate::error::EthError;

/// Length of an `r || s || v` signature.
pub const SIGNATURE_LEN: usize = 65;

const PERSONAL_MESSAGE_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Hashes a message as `keccak256("\x19Ethereum Signed Message:\n" + len + message)`.
pub fn hash_message(message: &[u8]) -> B256 {
    let mut hasher = Keccak256::new();
    hasher.update(PERSONAL_MESSAGE_PREFIX.as_bytes());
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message);
    B256::from_slice(&hasher.finalize())
}

/// Signs a personal message, returning `r[32] || s[32] || v` with `v` in {27, 28}.
pub fn sign_message(
    message: &[u8],
    signing_key: &SigningKey,
) -> Result<[u8; SIGNATURE_LEN], EthError> {
    let hash = hash_message(message);

    let (signature, recovery_id) = signing_key
        .sign_prehash_recoverable(hash.as_slice())
        .map_err(|e| EthError::SigningError(e.to_string()))?;

    let mut out = [0u8; SIGNATURE_LEN];
    out[..64].copy_from_slice(&signature.to_bytes());
    out[64] = 27 + recovery_id.is_y_odd() as u8;
    Ok(out)
}

/// Recovers the address that produced `signature` over a personal message.
///
/// `v` may be 0/1 or 27/28. High-s signatures are rejected.
pub fn recover_address(message: &[u8], signature: &[u8]) -> Result<Address, EthError> {
    if signature.len() != SIGNATURE_LEN {
        return Err(EthError::InvalidSignature(format!(
            "expected {SIGNATURE_LEN} bytes, got {}",
            signature.len()
        )));
    }

    let v = match signature[64] {
        v @ (0 | 1) => v,
        v @ (27 | 28) => v - 27,
        other => {
            return Err(EthError::InvalidSignature(format!(
                "invalid recovery byte {other}"
            )))
        }
    };

    let sig = Signature::from_slice(&signature[..64])
        .map_err(|e| EthError::InvalidSignature(e.to_string()))?;
    if sig.normalize_s().is_some() {
        return Err(EthError::InvalidSignature("non-canonical s value".into()));
    }

    let recovery_id = RecoveryId::from_byte(v)
        .ok_or_else(|| EthError::InvalidSignature(format!("invalid recovery id {v}")))?;

    let hash = hash_message(message);
    let key = VerifyingKey::recover_from_prehash(hash.as_slice(), &sig, recovery_id)
        .map_err(|e| EthError::InvalidSignature(e.to_string()))?;

    Ok(address_from_verifying_key(&key))
}

/// Parses a hex signature (with or without `0x`) into raw bytes.
pub fn decode_signature_hex(signature: &str) -> Result<Vec<u8>, EthError> {
    let hex_part = signature.strip_prefix("0x").unwrap_or(signature);
    hex::decode(hex_part).map_err(|e| EthError::InvalidSignature(format!("invalid hex: {e}")))
}
